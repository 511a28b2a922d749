//! Typed ODSA responses (TS.43 section 6.5)
//!
//! Every response embeds the general [`OdsaResponse`] block. Field decoding
//! follows an explicit [`Policy`] per field: a malformed `GeneralErrorURL`
//! fails the whole operation, while malformed operation-specific fields are
//! logged and dropped.

use super::download::{split_list, DownloadInfo, MessageInfo};
use crate::doc::{characteristic, parm, Ts43Doc};
use crate::errors::{ErrorCode, ServiceEntitlementError};
use crate::types::ContentType;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use tracing::warn;
use url::Url;

const APPLICATION: &[&str] = &[characteristic::APPLICATION];
const PRIMARY_CONFIGURATION: &[&str] =
    &[characteristic::APPLICATION, characteristic::PRIMARY_CONFIGURATION];

/// What to do when a present field fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Fail the operation with `MALFORMED_HTTP_RESPONSE`
    HardFail,
    /// Log a warning and treat the field as absent
    SoftFail,
}

/// Decode an optional field. Absent or empty values are `None` under both
/// policies.
pub fn parse_field<T, E, F>(
    raw: Option<&str>,
    field: &str,
    policy: Policy,
    decode: F,
) -> Result<Option<T>, ServiceEntitlementError>
where
    E: Display,
    F: FnOnce(&str) -> Result<T, E>,
{
    let Some(raw) = raw.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match decode(raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => match policy {
            Policy::HardFail => Err(ServiceEntitlementError::new(
                ErrorCode::MalformedHttpResponse,
                format!("Malformed {field} {raw}: {e}"),
            )),
            Policy::SoftFail => {
                warn!(field, value = raw, error = %e, "Dropping malformed field");
                Ok(None)
            }
        },
    }
}

/// ISO-8601 offset date-time; seconds may be omitted
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
        .map(|t| t.with_timezone(&Utc))
}

fn non_empty(doc: &Ts43Doc, path: &[&str], name: &str) -> Option<String> {
    doc.get_non_empty(path, name).map(str::to_string)
}

/// `OperationResult` (TS.43 table 38)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationResult {
    #[default]
    Unknown,
    Success,
    ErrorGeneral,
    ErrorInvalidOperation,
    ErrorInvalidParameter,
    WarningNotSupportedOperation,
    ErrorInvalidMsgResponse,
}

impl OperationResult {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1" => Self::Success,
            "100" => Self::ErrorGeneral,
            "101" => Self::ErrorInvalidOperation,
            "102" => Self::ErrorInvalidParameter,
            "103" => Self::WarningNotSupportedOperation,
            "104" => Self::ErrorInvalidMsgResponse,
            _ => Self::Unknown,
        }
    }
}

/// Result block shared by all ODSA operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OdsaResponse {
    pub operation_result: OperationResult,
    pub general_error_url: Option<Url>,
    pub general_error_user_data: Option<String>,
    pub general_error_text: Option<String>,
}

impl OdsaResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        Ok(Self {
            operation_result: doc
                .get(APPLICATION, parm::OPERATION_RESULT)
                .map(OperationResult::parse)
                .unwrap_or_default(),
            general_error_url: parse_field(
                doc.get(APPLICATION, parm::GENERAL_ERROR_URL),
                parm::GENERAL_ERROR_URL,
                Policy::HardFail,
                Url::parse,
            )?,
            general_error_user_data: non_empty(doc, APPLICATION, parm::GENERAL_ERROR_USER_DATA),
            general_error_text: non_empty(doc, APPLICATION, parm::GENERAL_ERROR_TEXT),
        })
    }
}

/// `PrimaryAppEligibility` / `CompanionAppEligibility`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EligibilityResult {
    #[default]
    Unknown,
    Disabled,
    Enabled,
    Incompatible,
}

impl EligibilityResult {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "0" => Self::Disabled,
            "1" => Self::Enabled,
            "2" => Self::Incompatible,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckEligibilityResponse {
    pub general: OdsaResponse,
    pub app_eligibility: EligibilityResult,
    pub companion_device_services: Vec<String>,
    pub not_enabled_url: Option<Url>,
    pub not_enabled_user_data: Option<String>,
    pub not_enabled_contents_type: ContentType,
}

impl CheckEligibilityResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        // Companion eligibility is only consulted when the primary one is absent
        let eligibility = doc
            .get_non_empty(APPLICATION, parm::PRIMARY_APP_ELIGIBILITY)
            .or_else(|| doc.get_non_empty(APPLICATION, parm::COMPANION_APP_ELIGIBILITY));

        Ok(Self {
            general: OdsaResponse::from_doc(doc)?,
            app_eligibility: eligibility.map(EligibilityResult::parse).unwrap_or_default(),
            companion_device_services: doc
                .get_non_empty(APPLICATION, parm::COMPANION_DEVICE_SERVICES)
                .map(split_list)
                .unwrap_or_default(),
            not_enabled_url: parse_field(
                doc.get(APPLICATION, parm::NOT_ENABLED_URL),
                parm::NOT_ENABLED_URL,
                Policy::SoftFail,
                Url::parse,
            )?,
            not_enabled_user_data: non_empty(doc, APPLICATION, parm::NOT_ENABLED_USER_DATA),
            not_enabled_contents_type: doc
                .get(APPLICATION, parm::NOT_ENABLED_CONTENTS_TYPE)
                .map(ContentType::parse)
                .unwrap_or_default(),
        })
    }
}

/// `SubscriptionResult` (TS.43 table 41)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionResult {
    #[default]
    Unknown,
    ContinueToWebsheet,
    DownloadProfile,
    Done,
    DelayedDownload,
    Dismiss,
    DeleteProfileInUse,
    RedownloadableProfileIsMandatory,
    RequiresUserInput,
}

impl SubscriptionResult {
    /// Accepts the numeric wire codes and the symbolic names
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1" | "CONTINUE_TO_WEBSHEET" => Self::ContinueToWebsheet,
            "2" | "DOWNLOAD_PROFILE" => Self::DownloadProfile,
            "3" | "DONE" => Self::Done,
            "4" | "DELAYED_DOWNLOAD" => Self::DelayedDownload,
            "5" | "DISMISS" => Self::Dismiss,
            "6" | "DELETE_PROFILE_IN_USE" => Self::DeleteProfileInUse,
            "7" | "REDOWNLOADABLE_PROFILE_IS_MANDATORY" => Self::RedownloadableProfileIsMandatory,
            "8" | "REQUIRES_USER_INPUT" => Self::RequiresUserInput,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManageSubscriptionResponse {
    pub general: OdsaResponse,
    pub subscription_result: SubscriptionResult,
    pub subscription_service_url: Option<Url>,
    pub subscription_service_user_data: Option<String>,
    pub subscription_service_contents_type: ContentType,
    pub download_info: Option<DownloadInfo>,
}

impl ManageSubscriptionResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        let mut response = Self {
            general: OdsaResponse::from_doc(doc)?,
            subscription_result: doc
                .get(APPLICATION, parm::SUBSCRIPTION_RESULT)
                .map(SubscriptionResult::parse)
                .unwrap_or_default(),
            ..Default::default()
        };

        match response.subscription_result {
            SubscriptionResult::ContinueToWebsheet => {
                response.subscription_service_url = parse_field(
                    doc.get(APPLICATION, parm::SUBSCRIPTION_SERVICE_URL),
                    parm::SUBSCRIPTION_SERVICE_URL,
                    Policy::SoftFail,
                    Url::parse,
                )?;
                // User data and contents type only accompany a usable URL
                if response.subscription_service_url.is_some() {
                    response.subscription_service_user_data =
                        non_empty(doc, APPLICATION, parm::SUBSCRIPTION_SERVICE_USER_DATA);
                    response.subscription_service_contents_type = doc
                        .get(APPLICATION, parm::SUBSCRIPTION_SERVICE_CONTENTS_TYPE)
                        .map(ContentType::parse)
                        .unwrap_or_default();
                }
            }
            SubscriptionResult::DownloadProfile => {
                response.download_info = DownloadInfo::from_doc(
                    doc,
                    &[characteristic::APPLICATION, characteristic::DOWNLOAD_INFO],
                );
            }
            _ => {}
        }
        Ok(response)
    }
}

/// `ServiceStatus` (TS.43 table 43)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    #[default]
    Unknown,
    Activated,
    Activating,
    Deactivated,
    DeactivatedNoReuse,
}

impl ServiceStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1" => Self::Activated,
            "2" => Self::Activating,
            "3" => Self::Deactivated,
            "4" => Self::DeactivatedNoReuse,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManageServiceResponse {
    pub general: OdsaResponse,
    pub service_status: ServiceStatus,
}

impl ManageServiceResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        Ok(Self {
            general: OdsaResponse::from_doc(doc)?,
            service_status: doc
                .get(APPLICATION, parm::SERVICE_STATUS)
                .map(ServiceStatus::parse)
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigurationType {
    #[default]
    Unknown,
    Primary,
    Companion,
    Enterprise,
}

/// One configuration block of an AcquireConfiguration response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub config_type: ConfigurationType,
    pub service_status: ServiceStatus,
    pub iccid: Option<String>,
    /// Seconds between status polls
    pub polling_interval: Option<i32>,
    pub download_info: Option<DownloadInfo>,
    pub message_info: Option<MessageInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireConfigurationResponse {
    pub general: OdsaResponse,
    pub configurations: Vec<Configuration>,
}

impl AcquireConfigurationResponse {
    /// Only the primary configuration is read
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        let general = OdsaResponse::from_doc(doc)?;
        let primary = Configuration {
            config_type: ConfigurationType::Primary,
            service_status: doc
                .get(PRIMARY_CONFIGURATION, parm::SERVICE_STATUS)
                .map(ServiceStatus::parse)
                .unwrap_or_default(),
            iccid: non_empty(doc, PRIMARY_CONFIGURATION, parm::ICCID),
            polling_interval: parse_field(
                doc.get(PRIMARY_CONFIGURATION, parm::POLLING_INTERVAL),
                parm::POLLING_INTERVAL,
                Policy::SoftFail,
                |raw| raw.trim().parse::<i32>(),
            )?,
            download_info: DownloadInfo::from_doc(
                doc,
                &[
                    characteristic::APPLICATION,
                    characteristic::PRIMARY_CONFIGURATION,
                    characteristic::DOWNLOAD_INFO,
                ],
            ),
            message_info: MessageInfo::from_doc(
                doc,
                &[
                    characteristic::APPLICATION,
                    characteristic::PRIMARY_CONFIGURATION,
                    characteristic::MSG,
                ],
            ),
        };
        Ok(Self {
            general,
            configurations: vec![primary],
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireTemporaryTokenResponse {
    pub general: OdsaResponse,
    pub temporary_token: String,
    pub temporary_token_expiry: Option<DateTime<Utc>>,
    pub operation_targets: Vec<String>,
}

impl AcquireTemporaryTokenResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        let general = OdsaResponse::from_doc(doc)?;
        let temporary_token = doc
            .get(APPLICATION, parm::TEMPORARY_TOKEN)
            .ok_or_else(|| {
                ServiceEntitlementError::new(
                    ErrorCode::TokenNotAvailable,
                    "temporary token is not available.",
                )
            })?
            .to_string();

        Ok(Self {
            general,
            temporary_token,
            temporary_token_expiry: parse_field(
                doc.get(APPLICATION, parm::TEMPORARY_TOKEN_EXPIRY),
                parm::TEMPORARY_TOKEN_EXPIRY,
                Policy::SoftFail,
                parse_expiry,
            )?,
            operation_targets: doc
                .get_non_empty(APPLICATION, parm::OPERATION_TARGETS)
                .map(split_list)
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetPhoneNumberResponse {
    pub general: OdsaResponse,
    pub msisdn: Option<String>,
}

impl GetPhoneNumberResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        Ok(Self {
            general: OdsaResponse::from_doc(doc)?,
            msisdn: non_empty(doc, APPLICATION, parm::MSISDN),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetSubscriberInfoResponse {
    pub general: OdsaResponse,
    pub msisdn: Option<String>,
    pub sim_id_type: Option<String>,
    pub sim_id: Option<String>,
    pub mvno_name: Option<String>,
}

impl GetSubscriberInfoResponse {
    pub fn from_doc(doc: &Ts43Doc) -> Result<Self, ServiceEntitlementError> {
        let path = &[characteristic::APPLICATION, characteristic::SUBSCRIBER_INFO];
        Ok(Self {
            general: OdsaResponse::from_doc(doc)?,
            msisdn: non_empty(doc, path, parm::MSISDN),
            sim_id_type: non_empty(doc, path, parm::SIM_ID_TYPE),
            sim_id: non_empty(doc, path, parm::SIM_ID),
            mvno_name: non_empty(doc, path, parm::MVNO_NAME),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(parms: &str) -> Ts43Doc {
        Ts43Doc::from_xml(&format!(
            r#"<wap-provisioningdoc version="1.1">
                <characteristic type="APPLICATION">
                    <parm name="AppID" value="ap2009"/>
                    {parms}
                </characteristic>
            </wap-provisioningdoc>"#
        ))
    }

    #[test]
    fn test_general_result() {
        let doc = application(
            r#"<parm name="OperationResult" value="100"/>
               <parm name="GeneralErrorURL" value="https://es.example.com/error"/>
               <parm name="GeneralErrorText" value="Try later"/>"#,
        );
        let general = OdsaResponse::from_doc(&doc).unwrap();
        assert_eq!(general.operation_result, OperationResult::ErrorGeneral);
        assert_eq!(
            general.general_error_url.as_ref().map(Url::as_str),
            Some("https://es.example.com/error")
        );
        assert_eq!(general.general_error_text.as_deref(), Some("Try later"));
        assert_eq!(general.general_error_user_data, None);
    }

    #[test]
    fn test_unknown_operation_result() {
        let doc = application(r#"<parm name="OperationResult" value="42"/>"#);
        assert_eq!(
            OdsaResponse::from_doc(&doc).unwrap().operation_result,
            OperationResult::Unknown
        );
        assert_eq!(
            OdsaResponse::from_doc(&application("")).unwrap().operation_result,
            OperationResult::Unknown
        );
    }

    #[test]
    fn test_malformed_general_error_url_is_fatal() {
        let doc = application(r#"<parm name="GeneralErrorURL" value="not a url"/>"#);
        let err = OdsaResponse::from_doc(&doc).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedHttpResponse);
    }

    #[test]
    fn test_malformed_subscription_service_url_is_dropped() {
        let doc = application(
            r#"<parm name="SubscriptionResult" value="1"/>
               <parm name="SubscriptionServiceURL" value="not a url"/>
               <parm name="SubscriptionServiceUserData" value="imsi=001"/>"#,
        );
        let response = ManageSubscriptionResponse::from_doc(&doc).unwrap();
        assert_eq!(response.subscription_result, SubscriptionResult::ContinueToWebsheet);
        assert_eq!(response.subscription_service_url, None);
        assert_eq!(response.subscription_service_user_data, None);
    }

    #[test]
    fn test_websheet_fields() {
        let doc = application(
            r#"<parm name="SubscriptionResult" value="1"/>
               <parm name="SubscriptionServiceURL" value="https://websheet.example.com"/>
               <parm name="SubscriptionServiceUserData" value="imsi=001"/>
               <parm name="SubscriptionServiceContentsType" value="json"/>"#,
        );
        let response = ManageSubscriptionResponse::from_doc(&doc).unwrap();
        assert!(response.subscription_service_url.is_some());
        assert_eq!(response.subscription_service_user_data.as_deref(), Some("imsi=001"));
        assert_eq!(response.subscription_service_contents_type, ContentType::Json);
    }

    #[test]
    fn test_subscription_result_mapping() {
        assert_eq!(
            SubscriptionResult::parse("7"),
            SubscriptionResult::RedownloadableProfileIsMandatory
        );
        assert_eq!(
            SubscriptionResult::parse("REDOWNLOADABLE_PROFILE_IS_MANDATORY"),
            SubscriptionResult::RedownloadableProfileIsMandatory
        );
        assert_eq!(SubscriptionResult::parse("4"), SubscriptionResult::DelayedDownload);
        assert_eq!(SubscriptionResult::parse("99"), SubscriptionResult::Unknown);
        assert_eq!(SubscriptionResult::parse(""), SubscriptionResult::Unknown);
    }

    #[test]
    fn test_eligibility_fallback() {
        let companion_only = application(r#"<parm name="CompanionAppEligibility" value="2"/>"#);
        assert_eq!(
            CheckEligibilityResponse::from_doc(&companion_only).unwrap().app_eligibility,
            EligibilityResult::Incompatible
        );

        let both = application(
            r#"<parm name="PrimaryAppEligibility" value="0"/>
               <parm name="CompanionAppEligibility" value="1"/>"#,
        );
        assert_eq!(
            CheckEligibilityResponse::from_doc(&both).unwrap().app_eligibility,
            EligibilityResult::Disabled
        );

        assert_eq!(
            CheckEligibilityResponse::from_doc(&application("")).unwrap().app_eligibility,
            EligibilityResult::Unknown
        );
    }

    #[test]
    fn test_check_eligibility_fields() {
        let doc = application(
            r#"<parm name="PrimaryAppEligibility" value="1"/>
               <parm name="CompanionDeviceServices" value="SharedNumber , DiffNumber"/>
               <parm name="NotEnabledURL" value="::bad::"/>
               <parm name="NotEnabledContentsType" value="xml"/>"#,
        );
        let response = CheckEligibilityResponse::from_doc(&doc).unwrap();
        assert_eq!(response.companion_device_services, vec!["SharedNumber", "DiffNumber"]);
        assert_eq!(response.not_enabled_url, None);
        assert_eq!(response.not_enabled_contents_type, ContentType::Xml);
    }

    #[test]
    fn test_acquire_configuration() {
        let doc = Ts43Doc::from_xml(
            r#"<wap-provisioningdoc version="1.1">
                <characteristic type="APPLICATION">
                    <parm name="OperationResult" value="1"/>
                    <characteristic type="PrimaryConfiguration">
                        <parm name="ICCID" value="8901234567890123456"/>
                        <parm name="ServiceStatus" value="2"/>
                        <parm name="PollingInterval" value="soon"/>
                    </characteristic>
                </characteristic>
            </wap-provisioningdoc>"#,
        );
        let response = AcquireConfigurationResponse::from_doc(&doc).unwrap();
        assert_eq!(response.configurations.len(), 1);
        let config = &response.configurations[0];
        assert_eq!(config.config_type, ConfigurationType::Primary);
        assert_eq!(config.service_status, ServiceStatus::Activating);
        assert_eq!(config.iccid.as_deref(), Some("8901234567890123456"));
        assert_eq!(config.polling_interval, None);
        assert_eq!(config.download_info, None);
    }

    #[test]
    fn test_temporary_token_required_expiry_optional() {
        let missing = application(r#"<parm name="OperationResult" value="1"/>"#);
        let err = AcquireTemporaryTokenResponse::from_doc(&missing).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TokenNotAvailable);

        let bad_expiry = application(
            r#"<parm name="TemporaryToken" value="tmp-123"/>
               <parm name="TemporaryTokenExpiry" value="tomorrow"/>
               <parm name="OperationTargets" value="ManageSubscription, AcquireConfiguration"/>"#,
        );
        let response = AcquireTemporaryTokenResponse::from_doc(&bad_expiry).unwrap();
        assert_eq!(response.temporary_token, "tmp-123");
        assert_eq!(response.temporary_token_expiry, None);
        assert_eq!(
            response.operation_targets,
            vec!["ManageSubscription", "AcquireConfiguration"]
        );

        let with_expiry = application(
            r#"<parm name="TemporaryToken" value="tmp-123"/>
               <parm name="TemporaryTokenExpiry" value="2024-01-02T03:04:05+01:00"/>"#,
        );
        let expiry = AcquireTemporaryTokenResponse::from_doc(&with_expiry)
            .unwrap()
            .temporary_token_expiry
            .unwrap();
        assert_eq!(expiry.to_rfc3339(), "2024-01-02T02:04:05+00:00");
    }

    #[test]
    fn test_temporary_token_expiry_without_seconds() {
        let doc = application(
            r#"<parm name="TemporaryToken" value="tmp-123"/>
               <parm name="TemporaryTokenExpiry" value="2026-10-18T10:00+02:00"/>"#,
        );
        let expiry = AcquireTemporaryTokenResponse::from_doc(&doc)
            .unwrap()
            .temporary_token_expiry
            .unwrap();
        assert_eq!(expiry.to_rfc3339(), "2026-10-18T08:00:00+00:00");
    }

    #[test]
    fn test_subscriber_info() {
        let doc = Ts43Doc::parse(
            r#"{"ap2014": {"OperationResult": "1",
                "SubscriberInfo": {"MSISDN": "+15551234567", "SimIdType": "ICCID",
                                   "SimID": "8901", "MvnoName": ""}}}"#,
        );
        let response = GetSubscriberInfoResponse::from_doc(&doc).unwrap();
        assert_eq!(response.general.operation_result, OperationResult::Success);
        assert_eq!(response.msisdn.as_deref(), Some("+15551234567"));
        assert_eq!(response.sim_id_type.as_deref(), Some("ICCID"));
        assert_eq!(response.sim_id.as_deref(), Some("8901"));
        assert_eq!(response.mvno_name, None);
    }

    #[test]
    fn test_parse_field_policies() {
        let decode = |raw: &str| raw.parse::<i32>();
        assert_eq!(parse_field(None, "f", Policy::HardFail, decode).unwrap(), None);
        assert_eq!(parse_field(Some(""), "f", Policy::HardFail, decode).unwrap(), None);
        assert_eq!(parse_field(Some("5"), "f", Policy::HardFail, decode).unwrap(), Some(5));
        assert_eq!(parse_field(Some("x"), "f", Policy::SoftFail, decode).unwrap(), None);
        assert!(parse_field(Some("x"), "f", Policy::HardFail, decode).is_err());
    }
}
