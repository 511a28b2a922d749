//! Per-call entitlement request parameters

use crate::types::{AcceptContentType, NotificationAction};
use serde::{Deserialize, Serialize};

/// Default TS.43 entitlement version
pub const DEFAULT_ENTITLEMENT_VERSION: &str = "2.0";

/// Parameters of a single entitlement request.
///
/// At most one of `authentication_token` and `temporary_token` is sent; a
/// non-empty authentication token takes precedence. With neither set, the
/// request authenticates with an embedded EAP-AKA exchange.
///
/// Empty terminal vendor/model/software version fall back to the
/// [`DeviceInfo`](crate::DeviceInfo) reported by the telephony layer, and an
/// empty terminal id falls back to the IMEI of the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEntitlementRequest {
    pub configuration_version: i32,
    pub entitlement_version: String,
    pub authentication_token: String,
    pub temporary_token: String,
    pub terminal_id: String,
    pub terminal_vendor: String,
    pub terminal_model: String,
    pub terminal_software_version: String,
    pub app_name: String,
    pub app_version: String,
    /// Push token for server-initiated notifications; empty disables them
    pub notification_token: String,
    pub notification_action: NotificationAction,
    pub accept_content_type: AcceptContentType,
    /// Data plan boost type (ap2010)
    pub boost_type: String,
}

impl Default for ServiceEntitlementRequest {
    fn default() -> Self {
        Self {
            configuration_version: 0,
            entitlement_version: DEFAULT_ENTITLEMENT_VERSION.to_string(),
            authentication_token: String::new(),
            temporary_token: String::new(),
            terminal_id: String::new(),
            terminal_vendor: String::new(),
            terminal_model: String::new(),
            terminal_software_version: String::new(),
            app_name: String::new(),
            app_version: String::new(),
            notification_token: String::new(),
            notification_action: NotificationAction::default(),
            accept_content_type: AcceptContentType::default(),
            boost_type: String::new(),
        }
    }
}

impl ServiceEntitlementRequest {
    /// Whether the request carries a token and can skip EAP-AKA
    pub fn has_token(&self) -> bool {
        !self.authentication_token.is_empty() || !self.temporary_token.is_empty()
    }
}
