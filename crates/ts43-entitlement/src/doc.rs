//! TS.43 structured document model
//!
//! Entitlement responses are either XML provisioning documents made of nested
//! `characteristic` blocks holding `parm` name/value pairs, or the equivalent
//! JSON objects. Both are flattened into a map keyed by the characteristic
//! path (joined with `|`) and then by the lowercased parm name.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

type ParseResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Separator between characteristic names in a path key
pub const PATH_SEPARATOR: &str = "|";

/// Characteristic types
pub mod characteristic {
    pub const APPLICATION: &str = "APPLICATION";
    pub const PRIMARY_CONFIGURATION: &str = "PrimaryConfiguration";
    pub const COMPANION_CONFIGURATIONS: &str = "CompanionConfigurations";
    pub const COMPANION_CONFIGURATION: &str = "CompanionConfiguration";
    pub const ENTERPRISE_CONFIGURATION: &str = "EnterpriseConfiguration";
    pub const SUBSCRIBER_INFO: &str = "SubscriberInfo";
    pub const USER: &str = "USER";
    pub const TOKEN: &str = "TOKEN";
    pub const VERS: &str = "VERS";
    pub const DOWNLOAD_INFO: &str = "DownloadInfo";
    pub const MSG: &str = "MSG";
}

/// Parm names
pub mod parm {
    pub const TOKEN: &str = "token";
    pub const VALIDITY: &str = "validity";
    pub const VERSION: &str = "version";
    pub const APP_ID: &str = "AppID";

    // General result
    pub const OPERATION_RESULT: &str = "OperationResult";
    pub const GENERAL_ERROR_URL: &str = "GeneralErrorURL";
    pub const GENERAL_ERROR_USER_DATA: &str = "GeneralErrorUserData";
    pub const GENERAL_ERROR_TEXT: &str = "GeneralErrorText";

    // CheckEligibility
    pub const PRIMARY_APP_ELIGIBILITY: &str = "PrimaryAppEligibility";
    pub const COMPANION_APP_ELIGIBILITY: &str = "CompanionAppEligibility";
    pub const ENTERPRISE_APP_ELIGIBILITY: &str = "EnterpriseAppEligibility";
    pub const NOT_ENABLED_URL: &str = "NotEnabledURL";
    pub const NOT_ENABLED_USER_DATA: &str = "NotEnabledUserData";
    pub const NOT_ENABLED_CONTENTS_TYPE: &str = "NotEnabledContentsType";
    pub const COMPANION_DEVICE_SERVICES: &str = "CompanionDeviceServices";

    // ManageSubscription
    pub const SUBSCRIPTION_RESULT: &str = "SubscriptionResult";
    pub const SUBSCRIPTION_SERVICE_URL: &str = "SubscriptionServiceURL";
    pub const SUBSCRIPTION_SERVICE_USER_DATA: &str = "SubscriptionServiceUserData";
    pub const SUBSCRIPTION_SERVICE_CONTENTS_TYPE: &str = "SubscriptionServiceContentsType";

    // DownloadInfo
    pub const PROFILE_ACTIVATION_CODE: &str = "ProfileActivationCode";
    pub const PROFILE_ICCID: &str = "ProfileIccid";
    pub const PROFILE_SMDP_ADDRESS: &str = "ProfileSmdpAddress";

    // ManageService / AcquireConfiguration
    pub const SERVICE_STATUS: &str = "ServiceStatus";
    pub const ICCID: &str = "ICCID";
    pub const POLLING_INTERVAL: &str = "PollingInterval";

    // MSG
    pub const MESSAGE: &str = "Message";
    pub const ACCEPT_BUTTON: &str = "Accept_btn";
    pub const ACCEPT_BUTTON_LABEL: &str = "Accept_btn_label";
    pub const REJECT_BUTTON: &str = "Reject_btn";
    pub const REJECT_BUTTON_LABEL: &str = "Reject_btn_label";
    pub const ACCEPT_FREETEXT: &str = "Accept_freetext";

    // AcquireTemporaryToken
    pub const TEMPORARY_TOKEN: &str = "TemporaryToken";
    pub const TEMPORARY_TOKEN_EXPIRY: &str = "TemporaryTokenExpiry";
    pub const OPERATION_TARGETS: &str = "OperationTargets";

    // GetPhoneNumber / GetSubscriberInfo
    pub const MSISDN: &str = "msisdn";
    pub const SIM_ID_TYPE: &str = "SimIdType";
    pub const SIM_ID: &str = "SimID";
    pub const MVNO_NAME: &str = "MvnoName";
}

/// Parsed TS.43 document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ts43Doc {
    parms: HashMap<String, HashMap<String, String>>,
}

impl Ts43Doc {
    /// Parse a response body, detecting JSON or XML from its first character.
    /// A malformed body yields an empty document.
    pub fn parse(body: &str) -> Self {
        if body.trim_start().starts_with('{') {
            Self::from_json(body)
        } else {
            Self::from_xml(body)
        }
    }

    pub fn from_xml(xml: &str) -> Self {
        match parse_xml(xml) {
            Ok(parms) => Self { parms },
            Err(e) => {
                warn!(error = %e, "Failed to parse TS.43 XML document");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Self {
        match parse_json(json) {
            Ok(parms) => Self { parms },
            Err(e) => {
                warn!(error = %e, "Failed to parse TS.43 JSON document");
                Self::default()
            }
        }
    }

    /// Look up a parm under the characteristic `path`.
    /// The path matches exactly; the parm name is case-insensitive.
    pub fn get(&self, path: &[&str], parm: &str) -> Option<&str> {
        self.parms
            .get(&path.join(PATH_SEPARATOR))
            .and_then(|parms| parms.get(&parm.to_lowercase()))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get), treating an empty value as absent
    pub fn get_non_empty(&self, path: &[&str], parm: &str) -> Option<&str> {
        self.get(path, parm).filter(|v| !v.is_empty())
    }

    /// Whether any parm was recorded under `path`
    pub fn contains(&self, path: &[&str]) -> bool {
        self.parms.contains_key(&path.join(PATH_SEPARATOR))
    }

    pub fn is_empty(&self) -> bool {
        self.parms.is_empty()
    }

    fn insert(&mut self, path: String, name: &str, value: String) {
        self.parms
            .entry(path)
            .or_default()
            .insert(name.to_lowercase(), value);
    }
}

// ==================== XML ====================

enum Frame {
    Root,
    Characteristic(String),
    Skipped,
}

fn parse_xml(xml: &str) -> ParseResult<HashMap<String, HashMap<String, String>>> {
    let escaped = escape_bare_ampersands(xml);
    let mut reader = Reader::from_str(&escaped);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut doc = Ts43Doc::default();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let frame = visit_element(&stack, &e, &mut doc)?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                visit_element(&stack, &e, &mut doc)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(doc.parms)
}

/// Record a `parm` and return the frame for the element's children.
/// Only children of the root element or of a typed characteristic are visited.
fn visit_element(stack: &[Frame], e: &BytesStart<'_>, doc: &mut Ts43Doc) -> ParseResult<Frame> {
    match stack.last() {
        None => return Ok(Frame::Root),
        Some(Frame::Skipped) => return Ok(Frame::Skipped),
        Some(_) => {}
    }

    match e.name().as_ref() {
        b"characteristic" => Ok(match attribute(e, b"type")? {
            Some(kind) => Frame::Characteristic(kind),
            None => Frame::Skipped,
        }),
        b"parm" => {
            if let Some(name) = attribute(e, b"name")? {
                let value = attribute(e, b"value")?.unwrap_or_default();
                doc.insert(characteristic_path(stack), &name, value);
            }
            Ok(Frame::Skipped)
        }
        _ => Ok(Frame::Skipped),
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> ParseResult<Option<String>> {
    match e.try_get_attribute(key)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn characteristic_path(stack: &[Frame]) -> String {
    stack
        .iter()
        .filter_map(|frame| match frame {
            Frame::Characteristic(kind) => Some(kind.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Servers routinely put raw `&` in URL-valued attributes; escape any `&`
/// that does not start an entity reference.
fn escape_bare_ampersands(xml: &str) -> String {
    const ENTITIES: [&str; 6] = ["amp;", "lt;", "gt;", "quot;", "apos;", "#"];

    let mut out = String::with_capacity(xml.len());
    for (i, ch) in xml.char_indices() {
        if ch == '&' && !ENTITIES.iter().any(|entity| xml[i + 1..].starts_with(entity)) {
            out.push_str("&amp;");
        } else {
            out.push(ch);
        }
    }
    out
}

// ==================== JSON ====================

fn parse_json(json: &str) -> ParseResult<HashMap<String, HashMap<String, String>>> {
    let value: Value = serde_json::from_str(json)?;
    let mut doc = Ts43Doc::default();

    if let Value::Object(root) = value {
        for (key, child) in root {
            match child {
                Value::Object(_) | Value::Array(_) => {
                    let mut path = vec![top_level_characteristic(&key)];
                    walk_json(&mut path, &child, &mut doc);
                }
                scalar => doc.insert(String::new(), &key, scalar_to_string(&scalar)),
            }
        }
    }

    Ok(doc.parms)
}

/// JSON documents key application blocks by app id ("ap2009": {...})
fn top_level_characteristic(key: &str) -> String {
    if crate::is_app_id_format(key) {
        characteristic::APPLICATION.to_string()
    } else {
        key.to_uppercase()
    }
}

fn walk_json(path: &mut Vec<String>, value: &Value, doc: &mut Ts43Doc) {
    match value {
        Value::Object(fields) => {
            for (key, child) in fields {
                match child {
                    Value::Object(_) => {
                        path.push(key.clone());
                        walk_json(path, child, doc);
                        path.pop();
                    }
                    Value::Array(items) if items.iter().all(Value::is_object) => {
                        path.push(key.clone());
                        for item in items {
                            walk_json(path, item, doc);
                        }
                        path.pop();
                    }
                    Value::Array(items) => {
                        let joined = items.iter().map(scalar_to_string).collect::<Vec<_>>().join(",");
                        doc.insert(path.join(PATH_SEPARATOR), key, joined);
                    }
                    scalar => doc.insert(path.join(PATH_SEPARATOR), key, scalar_to_string(scalar)),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_json(path, item, doc);
            }
        }
        _ => {}
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0"?>
<wap-provisioningdoc version="1.1">
  <characteristic type="VERS">
    <parm name="version" value="1"/>
    <parm name="validity" value="172800"/>
  </characteristic>
  <characteristic type="TOKEN">
    <parm name="token" value="ASH127AHHA88SF"/>
  </characteristic>
  <characteristic type="APPLICATION">
    <parm name="AppID" value="ap2009"/>
    <parm name="OperationResult" value="1"/>
    <parm name="GeneralErrorURL" value="https://es.example.com/error?a=1&b=2"/>
    <characteristic type="DownloadInfo">
      <parm name="ProfileIccid" value="89001"/>
    </characteristic>
  </characteristic>
</wap-provisioningdoc>"#;

    #[test]
    fn test_xml_nested_paths() {
        let doc = Ts43Doc::from_xml(XML);
        assert_eq!(doc.get(&["TOKEN"], "token"), Some("ASH127AHHA88SF"));
        assert_eq!(doc.get(&["VERS"], "validity"), Some("172800"));
        assert_eq!(doc.get(&["APPLICATION"], "AppID"), Some("ap2009"));
        assert_eq!(
            doc.get(&["APPLICATION", "DownloadInfo"], "ProfileIccid"),
            Some("89001")
        );
        assert_eq!(doc.get(&["DownloadInfo"], "ProfileIccid"), None);
    }

    #[test]
    fn test_parm_name_case_insensitive() {
        let doc = Ts43Doc::from_xml(XML);
        assert_eq!(doc.get(&["APPLICATION"], "operationresult"), Some("1"));
        assert_eq!(doc.get(&["TOKEN"], "TOKEN"), Some("ASH127AHHA88SF"));
        assert_eq!(doc.get(&["token"], "token"), None);
    }

    #[test]
    fn test_bare_ampersand_escaped() {
        let doc = Ts43Doc::from_xml(XML);
        assert_eq!(
            doc.get(&["APPLICATION"], "GeneralErrorURL"),
            Some("https://es.example.com/error?a=1&b=2")
        );
        assert_eq!(escape_bare_ampersands("a&amp;b&c&#38;"), "a&amp;b&amp;c&#38;");
    }

    #[test]
    fn test_untyped_characteristic_skipped() {
        let xml = r#"<doc><characteristic><parm name="a" value="1"/></characteristic>
            <other><parm name="b" value="2"/></other><parm name="c" value="3"/></doc>"#;
        let doc = Ts43Doc::from_xml(xml);
        assert_eq!(doc.get(&[], "a"), None);
        assert_eq!(doc.get(&[], "b"), None);
        assert_eq!(doc.get(&[], "c"), Some("3"));
    }

    #[test]
    fn test_malformed_xml_is_empty() {
        let doc = Ts43Doc::from_xml("<doc><characteristic type=\"TOKEN\"></doc>");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_json_document() {
        let json = r#"{
            "Vers": {"version": "1", "validity": "172800"},
            "Token": {"token": "abc"},
            "ap2009": {
                "OperationResult": 1,
                "OperationTargets": ["CheckEligibility", "ManageService"],
                "DownloadInfo": {"ProfileIccid": "89001"}
            }
        }"#;
        let doc = Ts43Doc::parse(json);
        assert_eq!(doc.get(&["TOKEN"], "token"), Some("abc"));
        assert_eq!(doc.get(&["VERS"], "version"), Some("1"));
        assert_eq!(doc.get(&["APPLICATION"], "OperationResult"), Some("1"));
        assert_eq!(
            doc.get(&["APPLICATION"], "OperationTargets"),
            Some("CheckEligibility,ManageService")
        );
        assert_eq!(
            doc.get(&["APPLICATION", "DownloadInfo"], "ProfileIccid"),
            Some("89001")
        );
    }

    #[test]
    fn test_get_non_empty() {
        let doc = Ts43Doc::from_xml(
            r#"<doc><characteristic type="TOKEN"><parm name="token" value=""/></characteristic></doc>"#,
        );
        assert!(doc.contains(&["TOKEN"]));
        assert_eq!(doc.get(&["TOKEN"], "token"), Some(""));
        assert_eq!(doc.get_non_empty(&["TOKEN"], "token"), None);
    }
}
