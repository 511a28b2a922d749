//! TS.43 request parameter serialization
//!
//! Parameters are collected in wire order and rendered either as a GET query
//! string or as a JSON POST body. Empty values are never sent.

use crate::errors::{ErrorCode, ServiceEntitlementError};
use crate::odsa::{EsimOdsaOperation, OperationType};
use crate::request::ServiceEntitlementRequest;
use crate::types::{trim_to, DeviceInfo};
use serde_json::{Map, Value};
use url::Url;

pub const MAX_TERMINAL_VENDOR_LENGTH: usize = 4;
pub const MAX_TERMINAL_MODEL_LENGTH: usize = 10;
pub const MAX_TERMINAL_SOFTWARE_VERSION_LENGTH: usize = 20;

/// Wire parameter names
pub mod name {
    // Authentication
    pub const IMSI: &str = "IMSI";
    pub const TOKEN: &str = "token";
    pub const TEMPORARY_TOKEN: &str = "temporary_token";
    pub const EAP_ID: &str = "EAP_ID";

    // Service entitlement
    pub const NOTIF_ACTION: &str = "notif_action";
    pub const NOTIF_TOKEN: &str = "notif_token";
    pub const TERMINAL_ID: &str = "terminal_id";
    pub const APP_VERSION: &str = "app_version";
    pub const APP_NAME: &str = "app_name";
    pub const BOOST_TYPE: &str = "boost_type";
    pub const APP: &str = "app";
    pub const TERMINAL_VENDOR: &str = "terminal_vendor";
    pub const TERMINAL_MODEL: &str = "terminal_model";
    pub const TERMINAL_SW_VERSION: &str = "terminal_sw_version";
    pub const VERS: &str = "vers";
    pub const ENTITLEMENT_VERSION: &str = "entitlement_version";

    // ODSA
    pub const OPERATION: &str = "operation";
    pub const OPERATION_TYPE: &str = "operation_type";
    pub const OPERATION_TARGETS: &str = "operation_targets";
    pub const COMPANION_TERMINAL_ID: &str = "companion_terminal_id";
    pub const COMPANION_TERMINAL_VENDOR: &str = "companion_terminal_vendor";
    pub const COMPANION_TERMINAL_MODEL: &str = "companion_terminal_model";
    pub const COMPANION_TERMINAL_SW_VERSION: &str = "companion_terminal_sw_version";
    pub const COMPANION_TERMINAL_FRIENDLY_NAME: &str = "companion_terminal_friendly_name";
    pub const COMPANION_TERMINAL_SERVICE: &str = "companion_terminal_service";
    pub const COMPANION_TERMINAL_ICCID: &str = "companion_terminal_iccid";
    pub const COMPANION_TERMINAL_EID: &str = "companion_terminal_eid";
    pub const TERMINAL_ICCID: &str = "terminal_iccid";
    pub const TERMINAL_EID: &str = "terminal_eid";
    pub const TARGET_TERMINAL_ID: &str = "target_terminal_id";
    pub const TARGET_TERMINAL_IMEIS: &str = "target_terminal_imeis";
    pub const TARGET_TERMINAL_ICCID: &str = "target_terminal_iccid";
    pub const TARGET_TERMINAL_EID: &str = "target_terminal_eid";
    pub const TARGET_TERMINAL_SERIAL_NUMBER: &str = "target_terminal_sn";
    pub const TARGET_TERMINAL_MODEL: &str = "target_terminal_model";
    pub const OLD_TERMINAL_ICCID: &str = "old_terminal_iccid";
    pub const OLD_TERMINAL_ID: &str = "old_terminal_id";
    pub const MESSAGE_RESPONSE: &str = "MSG_response";
    pub const MESSAGE_BUTTON: &str = "MSG_btn";
    pub const REQUESTOR_ID: &str = "requestor_id";
}

/// How `app` ids are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// One `app` pair per id
    Query,
    /// A single `app` value; several ids become `[a,b]`
    JsonBody,
}

/// Ordered request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    /// Append a parameter, skipping empty values
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value));
        }
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a repeated `key`
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Render as a query string appended to `base`
    pub fn to_url(&self, base: &str) -> Result<Url, ServiceEntitlementError> {
        let mut url = Url::parse(base).map_err(|e| {
            ServiceEntitlementError::new(
                ErrorCode::ServerNotConnectable,
                format!("Invalid server URL: {base}"),
            )
            .with_source(e)
        })?;
        if !self.pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Render as a JSON object. A repeated key keeps its last value.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (key, value) in &self.pairs {
            body.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(body)
    }
}

/// Append `IMSI`+`token`, `temporary_token`, or `EAP_ID`
pub fn append_authentication(
    params: &mut RequestParams,
    request: &ServiceEntitlementRequest,
    imsi: Option<&str>,
    eap_identity: Option<&str>,
) {
    if !request.authentication_token.is_empty() {
        params.push(name::IMSI, imsi.unwrap_or_default());
        params.push(name::TOKEN, request.authentication_token.as_str());
    } else if !request.temporary_token.is_empty() {
        params.push(name::TEMPORARY_TOKEN, request.temporary_token.as_str());
    } else if let Some(identity) = eap_identity {
        params.push(name::EAP_ID, identity);
    }
}

/// Terminal identity with device fallbacks applied and lengths trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalIdentity {
    pub id: String,
    pub vendor: String,
    pub model: String,
    pub software_version: String,
}

impl TerminalIdentity {
    pub fn resolve(
        request: &ServiceEntitlementRequest,
        device: &DeviceInfo,
        imei: Option<&str>,
    ) -> Self {
        let pick = |own: &str, fallback: &str| {
            if own.is_empty() { fallback.to_string() } else { own.to_string() }
        };
        Self {
            id: pick(&request.terminal_id, imei.unwrap_or_default()),
            vendor: trim_to(
                &pick(&request.terminal_vendor, &device.vendor),
                MAX_TERMINAL_VENDOR_LENGTH,
            ),
            model: trim_to(
                &pick(&request.terminal_model, &device.model),
                MAX_TERMINAL_MODEL_LENGTH,
            ),
            software_version: trim_to(
                &pick(&request.terminal_software_version, &device.software_version),
                MAX_TERMINAL_SOFTWARE_VERSION_LENGTH,
            ),
        }
    }
}

/// Append the service entitlement parameters (TS.43 section 2.2)
pub fn append_service_entitlement(
    params: &mut RequestParams,
    app_ids: &[&str],
    request: &ServiceEntitlementRequest,
    terminal: &TerminalIdentity,
    style: ParamStyle,
) {
    if !request.notification_token.is_empty() {
        params.push(name::NOTIF_ACTION, request.notification_action.code().to_string());
        params.push(name::NOTIF_TOKEN, request.notification_token.as_str());
    }
    params.push(name::TERMINAL_ID, terminal.id.as_str());
    params.push(name::APP_VERSION, request.app_version.as_str());
    params.push(name::APP_NAME, request.app_name.as_str());
    params.push(name::BOOST_TYPE, request.boost_type.as_str());

    match style {
        ParamStyle::Query => {
            for app_id in app_ids {
                params.push(name::APP, *app_id);
            }
        }
        ParamStyle::JsonBody if app_ids.len() == 1 => params.push(name::APP, app_ids[0]),
        ParamStyle::JsonBody => params.push(name::APP, format!("[{}]", app_ids.join(","))),
    }

    params.push(name::TERMINAL_VENDOR, terminal.vendor.as_str());
    params.push(name::TERMINAL_MODEL, terminal.model.as_str());
    params.push(name::TERMINAL_SW_VERSION, terminal.software_version.as_str());
    params.push(name::VERS, request.configuration_version.to_string());
    params.push(name::ENTITLEMENT_VERSION, request.entitlement_version.as_str());
}

/// Append the ODSA operation parameters (TS.43 section 6.2)
pub fn append_odsa(params: &mut RequestParams, op: &EsimOdsaOperation) {
    params.push(name::OPERATION, op.operation.as_str());
    if op.operation_type != OperationType::NotSet {
        params.push(name::OPERATION_TYPE, op.operation_type.code().to_string());
    }
    params.push(name::OPERATION_TARGETS, op.operation_targets.join(","));

    params.push(name::COMPANION_TERMINAL_ID, op.companion_terminal_id.as_str());
    params.push(name::COMPANION_TERMINAL_VENDOR, op.companion_terminal_vendor.as_str());
    params.push(name::COMPANION_TERMINAL_MODEL, op.companion_terminal_model.as_str());
    params.push(
        name::COMPANION_TERMINAL_SW_VERSION,
        op.companion_terminal_software_version.as_str(),
    );
    params.push(
        name::COMPANION_TERMINAL_FRIENDLY_NAME,
        op.companion_terminal_friendly_name.as_str(),
    );
    params.push(name::COMPANION_TERMINAL_SERVICE, op.companion_terminal_service.as_str());
    params.push(name::COMPANION_TERMINAL_ICCID, op.companion_terminal_iccid.as_str());
    params.push(name::COMPANION_TERMINAL_EID, op.companion_terminal_eid.as_str());

    params.push(name::TERMINAL_ICCID, op.terminal_iccid.as_str());
    params.push(name::TERMINAL_EID, op.terminal_eid.as_str());

    params.push(name::TARGET_TERMINAL_ID, op.target_terminal_id.as_str());
    for imei in &op.target_terminal_ids {
        params.push(name::TARGET_TERMINAL_IMEIS, imei.as_str());
    }
    params.push(name::TARGET_TERMINAL_ICCID, op.target_terminal_iccid.as_str());
    params.push(name::TARGET_TERMINAL_EID, op.target_terminal_eid.as_str());
    params.push(
        name::TARGET_TERMINAL_SERIAL_NUMBER,
        op.target_terminal_serial_number.as_str(),
    );
    params.push(name::TARGET_TERMINAL_MODEL, op.target_terminal_model.as_str());

    params.push(name::OLD_TERMINAL_ICCID, op.old_terminal_iccid.as_str());
    params.push(name::OLD_TERMINAL_ID, op.old_terminal_id.as_str());

    params.push(name::MESSAGE_RESPONSE, op.message_response.as_str());
    if let Some(button) = op.message_button {
        params.push(name::MESSAGE_BUTTON, button.as_str());
    }
    params.push(name::REQUESTOR_ID, op.requestor_id.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odsa::{CompanionService, MessageButton, OdsaOperationName};
    use crate::types::NotificationAction;

    fn terminal() -> TerminalIdentity {
        TerminalIdentity::resolve(
            &ServiceEntitlementRequest::default(),
            &DeviceInfo {
                vendor: "Samsung".to_string(),
                model: "SM-G998B-Ultra".to_string(),
                software_version: "UP1A.231005.007.G998BXXU".to_string(),
            },
            Some("356938035643809"),
        )
    }

    #[test]
    fn test_terminal_identity_fallbacks() {
        let terminal = terminal();
        assert_eq!(terminal.id, "356938035643809");
        assert_eq!(terminal.vendor, "Sams");
        assert_eq!(terminal.model, "SM-G998B-U");
        assert_eq!(terminal.software_version, "UP1A.231005.007.G998");
    }

    #[test]
    fn test_authentication_precedence() {
        let mut request = ServiceEntitlementRequest {
            authentication_token: "tok".to_string(),
            temporary_token: "tmp".to_string(),
            ..Default::default()
        };
        let mut params = RequestParams::default();
        append_authentication(&mut params, &request, Some("001010123456789"), Some("eap"));
        assert_eq!(params.get(name::IMSI), Some("001010123456789"));
        assert_eq!(params.get(name::TOKEN), Some("tok"));
        assert!(!params.contains(name::TEMPORARY_TOKEN));
        assert!(!params.contains(name::EAP_ID));

        request.authentication_token.clear();
        let mut params = RequestParams::default();
        append_authentication(&mut params, &request, None, Some("eap"));
        assert_eq!(params.pairs(), &[("temporary_token".to_string(), "tmp".to_string())]);

        request.temporary_token.clear();
        let mut params = RequestParams::default();
        append_authentication(&mut params, &request, None, Some("eap"));
        assert_eq!(params.get(name::EAP_ID), Some("eap"));
    }

    #[test]
    fn test_service_params_query_style() {
        let request = ServiceEntitlementRequest {
            notification_token: "fcm-token".to_string(),
            notification_action: NotificationAction::EnableFcm,
            app_name: "com.example.esim".to_string(),
            ..Default::default()
        };
        let mut params = RequestParams::default();
        append_service_entitlement(
            &mut params,
            &["ap2004", "ap2005"],
            &request,
            &terminal(),
            ParamStyle::Query,
        );

        assert_eq!(params.get(name::NOTIF_ACTION), Some("2"));
        assert_eq!(params.get(name::NOTIF_TOKEN), Some("fcm-token"));
        assert_eq!(params.get_all(name::APP), vec!["ap2004", "ap2005"]);
        assert_eq!(params.get(name::VERS), Some("0"));
        assert_eq!(params.get(name::ENTITLEMENT_VERSION), Some("2.0"));
        assert!(!params.contains(name::APP_VERSION));
        assert!(!params.contains(name::BOOST_TYPE));

        let url = params.to_url("https://es.example.com/path?x=1").unwrap();
        assert!(url.as_str().starts_with("https://es.example.com/path?x=1&notif_action=2"));
        assert!(url.as_str().contains("app=ap2004&app=ap2005"));
    }

    #[test]
    fn test_service_params_json_style() {
        let request = ServiceEntitlementRequest::default();
        let mut params = RequestParams::default();
        append_service_entitlement(
            &mut params,
            &["ap2004", "ap2005"],
            &request,
            &terminal(),
            ParamStyle::JsonBody,
        );
        let body = params.to_json();
        assert_eq!(body["app"], "[ap2004,ap2005]");
        assert_eq!(body["terminal_vendor"], "Sams");
        assert!(body.get("notif_token").is_none());

        let mut params = RequestParams::default();
        append_service_entitlement(&mut params, &["ap2009"], &request, &terminal(), ParamStyle::JsonBody);
        assert_eq!(params.to_json()["app"], "ap2009");
    }

    #[test]
    fn test_odsa_params_omit_unused_fields() {
        for operation in OdsaOperationName::ALL {
            let mut params = RequestParams::default();
            append_odsa(&mut params, &EsimOdsaOperation::new(operation));
            assert_eq!(
                params.pairs(),
                &[("operation".to_string(), operation.as_str().to_string())]
            );
        }
    }

    #[test]
    fn test_odsa_params_populated() {
        let op = EsimOdsaOperation {
            operation: OdsaOperationName::ManageSubscription,
            operation_type: crate::odsa::OperationType::Subscribe,
            operation_targets: vec!["ManageSubscription".into(), "AcquireConfiguration".into()],
            companion_terminal_service: CompanionService::SharedNumber,
            target_terminal_ids: vec!["111".into(), "222".into()],
            message_button: Some(MessageButton::Accepted),
            message_response: "ok".into(),
            ..Default::default()
        };
        let mut params = RequestParams::default();
        append_odsa(&mut params, &op);

        assert_eq!(params.get(name::OPERATION_TYPE), Some("0"));
        assert_eq!(
            params.get(name::OPERATION_TARGETS),
            Some("ManageSubscription,AcquireConfiguration")
        );
        assert_eq!(params.get(name::COMPANION_TERMINAL_SERVICE), Some("SharedNumber"));
        assert_eq!(params.get_all(name::TARGET_TERMINAL_IMEIS), vec!["111", "222"]);
        assert_eq!(params.get(name::MESSAGE_BUTTON), Some("1"));
        assert_eq!(params.get(name::MESSAGE_RESPONSE), Some("ok"));
        assert!(!params.contains(name::REQUESTOR_ID));
    }
}
