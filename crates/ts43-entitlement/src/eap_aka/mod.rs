//! EAP-AKA relay over HTTP (RFC 4187, GSMA TS.43 section 2.8.1)
//!
//! Requests without a token run the full authentication: the server answers
//! the first request with a base64 `eap-relay-packet`, the USIM computes the
//! response, and the exchange continues until the server returns the
//! entitlement document. A synchronization failure on the SIM is reported to
//! the server, which answers with a fresh challenge.

mod challenge;
mod keys;
mod response;
mod security_context;

pub use challenge::EapAkaChallenge;
pub use keys::MasterKey;
pub use response::{challenge_response_packet, synchronization_failure_packet, EapAkaResponse};
pub use security_context::SecurityContext;

use crate::config::CarrierConfig;
use crate::errors::{ErrorCode, ServiceEntitlementError};
use crate::http::{
    cookie_header, header, HttpClient, HttpRequest, HttpResponse, CONTENT_TYPE_EAP_RELAY_JSON,
    CONTENT_TYPE_JSON,
};
use crate::odsa::EsimOdsaOperation;
use crate::params::{self, ParamStyle, RequestParams, TerminalIdentity};
use crate::request::ServiceEntitlementRequest;
use crate::telephony::Telephony;
use crate::types::ContentType;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub(crate) const CODE_REQUEST: u8 = 1;
pub(crate) const CODE_RESPONSE: u8 = 2;
pub(crate) const TYPE_EAP_AKA: u8 = 23;
pub(crate) const SUBTYPE_AKA_CHALLENGE: u8 = 1;
pub(crate) const SUBTYPE_SYNCHRONIZATION_FAILURE: u8 = 4;
pub(crate) const EAP_AKA_HEADER_LENGTH: usize = 8;

/// EAP-AKA attribute types
pub(crate) mod attribute {
    pub const AT_RAND: u8 = 1;
    pub const AT_AUTN: u8 = 2;
    pub const AT_RES: u8 = 3;
    pub const AT_AUTS: u8 = 4;
    pub const AT_MAC: u8 = 11;
}

/// JSON key carrying EAP packets in both directions
pub const EAP_RELAY_PACKET: &str = "eap-relay-packet";

/// Further challenges answered after the first one, whether caused by a
/// synchronization failure or by the server
pub const MAX_EAP_AKA_ATTEMPTS: u32 = 3;

/// Permanent EAP-AKA identity:
/// `0<IMSI>@<realm>.mnc<MNC>.mcc<MCC>.3gppnetwork.org`.
///
/// A two-digit MNC is zero-padded. Returns `None` when the MCC-MNC is shorter
/// than five digits.
pub fn permanent_identity(imsi: &str, mcc_mnc: &str, realm: &str) -> Option<String> {
    if mcc_mnc.len() < 5 || !mcc_mnc.is_ascii() || imsi.is_empty() {
        return None;
    }
    let (mcc, mnc) = mcc_mnc.split_at(3);
    let mnc = if mnc.len() == 2 { format!("0{mnc}") } else { mnc.to_string() };
    Some(format!("0{imsi}@{realm}.mnc{mnc}.mcc{mcc}.3gppnetwork.org"))
}

/// `User-Agent` sent with every request
pub fn user_agent(client_ts43: &str, terminal: &TerminalIdentity) -> String {
    format!(
        "PRD-TS43 term-{}/{} {}/{} OS-Android/{}",
        terminal.vendor,
        terminal.model,
        client_ts43,
        crate::VERSION,
        terminal.software_version
    )
}

/// Headers shared by every request of one exchange
struct Exchange<'a> {
    accept: &'static str,
    user_agent: String,
    additional_headers: &'a [(&'a str, &'a str)],
}

impl Exchange<'_> {
    fn apply(&self, mut request: HttpRequest, accept: &str) -> HttpRequest {
        request = request
            .with_header(header::ACCEPT, accept)
            .with_header(header::USER_AGENT, self.user_agent.as_str());
        for (name, value) in self.additional_headers {
            request = request.with_header(name, *value);
        }
        request
    }
}

/// Entitlement requests for one SIM slot, with embedded EAP-AKA
pub struct EapAkaApi {
    config: CarrierConfig,
    http: HttpClient,
    telephony: Arc<dyn Telephony>,
    slot_index: usize,
}

impl EapAkaApi {
    pub fn new(
        config: CarrierConfig,
        http: HttpClient,
        telephony: Arc<dyn Telephony>,
        slot_index: usize,
    ) -> Self {
        Self {
            config,
            http,
            telephony,
            slot_index,
        }
    }

    pub fn config(&self) -> &CarrierConfig {
        &self.config
    }

    /// Entitlement status of `app_ids`
    pub async fn query_entitlement_status(
        &self,
        app_ids: &[&str],
        request: &ServiceEntitlementRequest,
        additional_headers: &[(&str, &str)],
    ) -> Result<HttpResponse, ServiceEntitlementError> {
        self.authenticated_request(app_ids, request, None, additional_headers)
            .await
    }

    /// One ODSA operation for `app_id`
    pub async fn perform_esim_odsa(
        &self,
        app_id: &str,
        request: &ServiceEntitlementRequest,
        operation: &EsimOdsaOperation,
        additional_headers: &[(&str, &str)],
    ) -> Result<HttpResponse, ServiceEntitlementError> {
        self.authenticated_request(&[app_id], request, Some(operation), additional_headers)
            .await
    }

    /// First leg of the OIDC flow: the server redirects to the
    /// authentication endpoint instead of running EAP-AKA
    pub async fn acquire_oidc_authentication_endpoint(
        &self,
        app_id: &str,
        request: &ServiceEntitlementRequest,
        additional_headers: &[(&str, &str)],
    ) -> Result<String, ServiceEntitlementError> {
        let terminal = self.terminal_identity(request);
        let mut params = RequestParams::default();
        params::append_service_entitlement(
            &mut params,
            &[app_id],
            request,
            &terminal,
            self.param_style(),
        );
        let exchange = self.exchange(request, &terminal, additional_headers);

        let response = self
            .http
            .request(exchange.apply(self.initial_request(&params)?, exchange.accept))
            .await?;
        response.location.filter(|l| !l.is_empty()).ok_or_else(|| {
            ServiceEntitlementError::new(
                ErrorCode::MalformedHttpResponse,
                "No Location header in OIDC response",
            )
        })
    }

    /// Second leg of the OIDC flow: fetch the entitlement document from the
    /// URL the authentication server redirected back to
    pub async fn query_entitlement_status_from_oidc(
        &self,
        url: &str,
        request: &ServiceEntitlementRequest,
        additional_headers: &[(&str, &str)],
    ) -> Result<HttpResponse, ServiceEntitlementError> {
        let url = url::Url::parse(url).map_err(|e| {
            ServiceEntitlementError::new(
                ErrorCode::ServerNotConnectable,
                format!("Invalid OIDC URL: {url}"),
            )
            .with_source(e)
        })?;
        let terminal = self.terminal_identity(request);
        let exchange = self.exchange(request, &terminal, additional_headers);
        self.http
            .request(exchange.apply(HttpRequest::get(url.as_str()), exchange.accept))
            .await
    }

    pub fn history(&self) -> Vec<String> {
        self.http.history()
    }

    pub fn clear_history(&self) {
        self.http.clear_history()
    }

    async fn authenticated_request(
        &self,
        app_ids: &[&str],
        request: &ServiceEntitlementRequest,
        operation: Option<&EsimOdsaOperation>,
        additional_headers: &[(&str, &str)],
    ) -> Result<HttpResponse, ServiceEntitlementError> {
        let terminal = self.terminal_identity(request);
        let identity = if request.has_token() {
            None
        } else {
            Some(self.eap_identity()?)
        };
        let imsi = self.telephony.subscriber_id(self.slot_index);

        let mut params = RequestParams::default();
        params::append_authentication(&mut params, request, imsi.as_deref(), identity.as_deref());
        params::append_service_entitlement(
            &mut params,
            app_ids,
            request,
            &terminal,
            self.param_style(),
        );
        if let Some(operation) = operation {
            params::append_odsa(&mut params, operation);
        }

        let exchange = self.exchange(request, &terminal, additional_headers);
        let initial = self.initial_request(&params)?;

        match identity {
            None => {
                debug!("Fast re-authentication");
                self.http.request(exchange.apply(initial, exchange.accept)).await
            }
            Some(identity) => {
                info!(slot = self.slot_index, "Full EAP-AKA authentication");
                let response = self
                    .http
                    .request(exchange.apply(initial, CONTENT_TYPE_EAP_RELAY_JSON))
                    .await?;
                let challenge = eap_aka_challenge(&response)?.ok_or_else(|| {
                    ServiceEntitlementError::new(
                        ErrorCode::MalformedHttpResponse,
                        format!("Failed to parse EAP-AKA challenge: {}", response.body),
                    )
                })?;
                let cookies = cookie_header(&response.cookies);
                self.respond_to_challenges(challenge, &cookies, &identity, &exchange)
                    .await
            }
        }
    }

    async fn respond_to_challenges(
        &self,
        first: String,
        cookies: &str,
        identity: &str,
        exchange: &Exchange<'_>,
    ) -> Result<HttpResponse, ServiceEntitlementError> {
        let accept = format!("{CONTENT_TYPE_EAP_RELAY_JSON}, {}", exchange.accept);
        let mut challenge = first;
        let mut remaining = MAX_EAP_AKA_ATTEMPTS;

        loop {
            let parsed = EapAkaChallenge::parse(&challenge)?;
            let reply = EapAkaResponse::respond(
                self.telephony.as_ref(),
                self.slot_index,
                &parsed,
                identity,
            )
            .await?;

            challenge = match reply {
                EapAkaResponse::Challenge(packet) => {
                    let response = self.post_eap_packet(&packet, cookies, &accept, exchange).await?;
                    let Some(next) = eap_aka_challenge(&response)? else {
                        debug!("EAP-AKA authentication succeeded");
                        return Ok(response);
                    };
                    debug!(remaining, "Received another challenge");
                    if remaining == 0 {
                        warn!("EAP-AKA attempts exhausted");
                        return Err(ServiceEntitlementError::new(
                            ErrorCode::EapAkaFailure,
                            "Unable to EAP-AKA authenticate",
                        ));
                    }
                    next
                }
                EapAkaResponse::SynchronizationFailure(packet) => {
                    debug!(remaining, "Synchronization failure");
                    let response = self
                        .post_eap_packet(&packet, cookies, CONTENT_TYPE_EAP_RELAY_JSON, exchange)
                        .await?;
                    let next = eap_aka_challenge(&response)?.ok_or_else(|| {
                        ServiceEntitlementError::new(
                            ErrorCode::MalformedHttpResponse,
                            format!("Failed to parse EAP-AKA challenge: {}", response.body),
                        )
                    })?;
                    if remaining == 0 {
                        warn!("EAP-AKA resynchronization attempts exhausted");
                        return Err(ServiceEntitlementError::new(
                            ErrorCode::EapAkaSynchronizationFailure,
                            "Unable to recover from EAP-AKA synchronization failure",
                        ));
                    }
                    next
                }
            };
            remaining -= 1;
        }
    }

    async fn post_eap_packet(
        &self,
        packet: &str,
        cookies: &str,
        accept: &str,
        exchange: &Exchange<'_>,
    ) -> Result<HttpResponse, ServiceEntitlementError> {
        let request = HttpRequest::post(
            self.config.server_url.as_str(),
            json!({ EAP_RELAY_PACKET: packet }),
        )
        .with_header(header::CONTENT_TYPE, CONTENT_TYPE_EAP_RELAY_JSON)
        .with_header(header::COOKIE, cookies);
        self.http.request(exchange.apply(request, accept)).await
    }

    fn initial_request(&self, params: &RequestParams) -> Result<HttpRequest, ServiceEntitlementError> {
        if self.config.use_http_post {
            Ok(HttpRequest::post(self.config.server_url.as_str(), params.to_json())
                .with_header(header::CONTENT_TYPE, CONTENT_TYPE_JSON))
        } else {
            Ok(HttpRequest::get(params.to_url(&self.config.server_url)?.as_str()))
        }
    }

    fn exchange<'a>(
        &self,
        request: &ServiceEntitlementRequest,
        terminal: &TerminalIdentity,
        additional_headers: &'a [(&'a str, &'a str)],
    ) -> Exchange<'a> {
        Exchange {
            accept: request.accept_content_type.as_header(),
            user_agent: user_agent(&self.config.client_ts43, terminal),
            additional_headers,
        }
    }

    fn param_style(&self) -> ParamStyle {
        if self.config.use_http_post {
            ParamStyle::JsonBody
        } else {
            ParamStyle::Query
        }
    }

    fn terminal_identity(&self, request: &ServiceEntitlementRequest) -> TerminalIdentity {
        let imei = self.telephony.imei(self.slot_index);
        TerminalIdentity::resolve(request, &self.telephony.device_info(), imei.as_deref())
    }

    fn eap_identity(&self) -> Result<String, ServiceEntitlementError> {
        let imsi = self.telephony.subscriber_id(self.slot_index);
        let mcc_mnc = self.telephony.sim_operator(self.slot_index);
        imsi.as_deref()
            .zip(mcc_mnc.as_deref())
            .and_then(|(imsi, mcc_mnc)| {
                permanent_identity(imsi, mcc_mnc, &self.config.eap_aka_realm)
            })
            .ok_or_else(|| {
                warn!(slot = self.slot_index, "IMSI or MCC-MNC unavailable");
                ServiceEntitlementError::new(
                    ErrorCode::PhoneNotAvailable,
                    "Subscriber identity not available for EAP-AKA",
                )
            })
    }
}

/// Challenge carried by `response`, if any. XML bodies never carry one.
fn eap_aka_challenge(response: &HttpResponse) -> Result<Option<String>, ServiceEntitlementError> {
    match response.content_type {
        ContentType::Json => {
            let body: Value = serde_json::from_str(&response.body).map_err(|e| {
                ServiceEntitlementError::new(
                    ErrorCode::MalformedHttpResponse,
                    "Failed to parse json object",
                )
                .with_source(e)
            })?;
            Ok(body
                .get(EAP_RELAY_PACKET)
                .and_then(Value::as_str)
                .map(str::to_string))
        }
        ContentType::Xml => Ok(None),
        ContentType::Unknown => Err(ServiceEntitlementError::new(
            ErrorCode::MalformedHttpResponse,
            "Unknown HTTP content type",
        )),
    }
}
