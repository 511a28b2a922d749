//! Shared fixtures: a scripted transport and a fake SIM

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use ts43_entitlement::http::HttpRequest;
use ts43_entitlement::{
    CarrierConfig, DeviceInfo, ErrorCode, HttpTransport, ServiceEntitlementError, Telephony,
    TelephonyError, TransportResponse,
};

pub const SERVER_URL: &str = "https://entitlement.example.com/ts43";
pub const IMEI: &str = "359881234567890";
pub const IMSI: &str = "001010123456789";
pub const MCC_MNC: &str = "00101";
pub const EAP_ID: &str = "0001010123456789@nai.epc.mnc001.mcc001.3gppnetwork.org";

/// EAP-Request/AKA-Challenge, identifier 0x42, RAND 0x11.., AUTN 0x22..
pub const CHALLENGE: &str = "AUIARBcBAAABBQAAEREREREREREREREREREREQIFAAAiIiIiIiIiIiIiIiIiIiIiCwUAADMzMzMzMzMzMzMzMzMzMzM=";
/// USIM input for [`CHALLENGE`]
pub const SIM_REQUEST: &str = "EBEREREREREREREREREREREQIiIiIiIiIiIiIiIiIiIiIg==";
/// Successful USIM result: RES 0x11 x8, CK 0x22 x16, IK 0x33 x16
pub const SECURITY_CONTEXT: &str = "2wgRERERERERERAiIiIiIiIiIiIiIiIiIiIiEDMzMzMzMzMzMzMzMzMzMzM=";
/// USIM synchronization failure with AUTS 0x01..0x0e
pub const SYNC_FAILURE_CONTEXT: &str = "3A4BAgMEBQYHCAkKCwwNDg==";
/// EAP-Response/AKA-Challenge for [`CHALLENGE`] and [`SECURITY_CONTEXT`]
pub const CHALLENGE_RESPONSE: &str = "AkIAKBcBAAADAwBAERERERERERELBQAAV0L0wZrjBEQdGvYB0cJ55w==";
/// EAP-Response/AKA-Synchronization-Failure for [`SYNC_FAILURE_CONTEXT`]
pub const SYNC_FAILURE_RESPONSE: &str = "AkIAGBcEAAAEBAECAwQFBgcICQoLDA0O";

pub const XML_CONTENT_TYPE: &str = "text/vnd.wap.connectivity-xml";
pub const EAP_RELAY_CONTENT_TYPE: &str = "application/vnd.gsma.eap-relay.v1.0+json";

pub fn init_tracing() {
    ts43_telemetry::init_test_tracing();
}

pub fn config() -> CarrierConfig {
    CarrierConfig::builder()
        .server_url(SERVER_URL)
        .client_ts43("client-1.0")
        .build()
}

pub fn post_config() -> CarrierConfig {
    CarrierConfig::builder()
        .server_url(SERVER_URL)
        .client_ts43("client-1.0")
        .use_http_post(true)
        .build()
}

/// Transport replaying scripted responses and recording every request
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, ServiceEntitlementError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: TransportResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: ServiceEntitlementError) {
        self.responses.lock().push_back(Err(error));
    }

    pub fn push_xml(&self, body: &str) {
        self.push(
            TransportResponse::new(200)
                .with_header("Content-Type", XML_CONTENT_TYPE)
                .with_body(body),
        );
    }

    pub fn push_json(&self, body: &str) {
        self.push(
            TransportResponse::new(200)
                .with_header("Content-Type", "application/json")
                .with_body(body),
        );
    }

    pub fn push_challenge(&self, challenge: &str) {
        self.push(
            TransportResponse::new(200)
                .with_header("Content-Type", EAP_RELAY_CONTENT_TYPE)
                .with_body(format!(r#"{{"eap-relay-packet":"{challenge}"}}"#)),
        );
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock()[index].clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(
        &self,
        request: &HttpRequest,
    ) -> Result<TransportResponse, ServiceEntitlementError> {
        self.requests.lock().push(request.clone());
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(ServiceEntitlementError::new(
                ErrorCode::ServerNotConnectable,
                "no scripted response",
            ))
        })
    }
}

/// Single-slot phone whose USIM answers from a script
pub struct MockTelephony {
    pub modem_count: usize,
    pub imsi: Option<String>,
    pub mcc_mnc: Option<String>,
    icc_results: Mutex<VecDeque<Result<Option<String>, TelephonyError>>>,
    icc_requests: Mutex<Vec<String>>,
}

impl Default for MockTelephony {
    fn default() -> Self {
        Self {
            modem_count: 1,
            imsi: Some(IMSI.to_string()),
            mcc_mnc: Some(MCC_MNC.to_string()),
            icc_results: Mutex::new(VecDeque::new()),
            icc_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockTelephony {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Phone whose SIM reports no subscriber id
    pub fn without_imsi() -> Arc<Self> {
        Arc::new(Self {
            imsi: None,
            ..Self::default()
        })
    }

    pub fn push_icc_result(&self, result: Result<Option<String>, TelephonyError>) {
        self.icc_results.lock().push_back(result);
    }

    pub fn icc_requests(&self) -> Vec<String> {
        self.icc_requests.lock().clone()
    }
}

#[async_trait]
impl Telephony for MockTelephony {
    fn active_modem_count(&self) -> usize {
        self.modem_count
    }

    fn imei(&self, _slot_index: usize) -> Option<String> {
        Some(IMEI.to_string())
    }

    fn subscriber_id(&self, _slot_index: usize) -> Option<String> {
        self.imsi.clone()
    }

    fn sim_operator(&self, _slot_index: usize) -> Option<String> {
        self.mcc_mnc.clone()
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            vendor: "Pixl".to_string(),
            model: "Pixel 8 Pro".to_string(),
            software_version: "14".to_string(),
        }
    }

    async fn icc_authentication(
        &self,
        _slot_index: usize,
        data: &str,
    ) -> Result<Option<String>, TelephonyError> {
        self.icc_requests.lock().push(data.to_string());
        self.icc_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TelephonyError::Unavailable("no scripted result".to_string())))
    }
}

/// Query parameters of a GET request
pub fn query(request: &HttpRequest) -> HashMap<String, Vec<String>> {
    let url = url::Url::parse(&request.url).expect("request url");
    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in url.query_pairs() {
        params.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    params
}

/// Single query parameter of a GET request
pub fn param(request: &HttpRequest, key: &str) -> Option<String> {
    query(request).get(key).and_then(|values| values.first().cloned())
}

/// XML entitlement document with an APPLICATION block and optional TOKEN
pub fn odsa_xml(app_id: &str, parms: &str, token: Option<&str>) -> String {
    let token = token
        .map(|t| {
            format!(r#"<characteristic type="TOKEN"><parm name="token" value="{t}"/></characteristic>"#)
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0"?>
<wap-provisioningdoc version="1.1">
    <characteristic type="VERS">
        <parm name="version" value="1"/>
        <parm name="validity" value="172800"/>
    </characteristic>
    {token}
    <characteristic type="APPLICATION">
        <parm name="AppID" value="{app_id}"/>
        {parms}
    </characteristic>
</wap-provisioningdoc>"#
    )
}
