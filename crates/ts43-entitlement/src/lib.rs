//! # TS.43 Service Entitlement Client
//!
//! Client side of the GSMA TS.43 entitlement configuration protocol:
//!
//! - **Entitlement status** - per-app entitlement queries (VoWiFi, VoLTE, ...)
//! - **EAP-AKA** - embedded SIM authentication relayed over HTTP (RFC 4187)
//! - **ODSA** - On-Device Service Activation operations for eSIM
//! - **Tokens** - authentication token acquisition and rotation
//!
//! ## Example
//! ```rust,ignore
//! use ts43_entitlement::{CarrierConfig, Credential, Ts43Operation};
//! use ts43_entitlement::odsa::CheckEligibilityRequest;
//!
//! let config = CarrierConfig::builder()
//!     .server_url("https://entitlement.example.com")
//!     .client_ts43("client-1.0")
//!     .build();
//! let operation = Ts43Operation::new(
//!     config,
//!     telephony,
//!     0,
//!     None,
//!     Credential::Normal(token),
//!     "com.example.odsa",
//! )?;
//!
//! let response = operation
//!     .check_eligibility(&CheckEligibilityRequest {
//!         app_id: ts43_entitlement::app_id::ODSA_PRIMARY.to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod authentication;
pub mod config;
pub mod doc;
pub mod eap_aka;
pub mod entitlement;
pub mod errors;
pub mod http;
pub mod odsa;
pub mod params;
pub mod request;
pub mod telephony;
pub mod ts43_operation;
pub mod types;

// Re-exports
pub use config::CarrierConfig;
pub use errors::{ErrorCode, Result, ServiceEntitlementError, TelephonyError, Ts43Error};
pub use types::*;

pub use authentication::{Ts43AuthToken, Ts43Authentication, VALIDITY_NOT_AVAILABLE};
pub use doc::Ts43Doc;
pub use entitlement::ServiceEntitlement;
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportResponse};
pub use request::ServiceEntitlementRequest;
pub use telephony::Telephony;
pub use ts43_operation::{Credential, Session, TokenType, Ts43Operation};

/// Client version, reported in the User-Agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// TS.43 application identifiers
pub mod app_id {
    pub const VOLTE: &str = "ap2003";
    pub const VOWIFI: &str = "ap2004";
    pub const SMSOIP: &str = "ap2005";
    pub const ODSA_COMPANION: &str = "ap2006";
    pub const ODSA_PRIMARY: &str = "ap2009";
    pub const DATA_PLAN_BOOST: &str = "ap2010";
    pub const SERVER_INITIATED_REQUESTS: &str = "ap2011";
    pub const DIRECT_CARRIER_BILLING: &str = "ap2012";
    pub const PRIVATE_USER_IDENTITY: &str = "ap2013";
    pub const PHONE_NUMBER_INFORMATION: &str = "ap2014";
    pub const SATELLITE_ENTITLEMENT: &str = "ap2016";
    pub const ODSA_CROSS_TS43: &str = "ap2017";

    pub const ALL: &[&str] = &[
        VOLTE,
        VOWIFI,
        SMSOIP,
        ODSA_COMPANION,
        ODSA_PRIMARY,
        DATA_PLAN_BOOST,
        SERVER_INITIATED_REQUESTS,
        DIRECT_CARRIER_BILLING,
        PRIVATE_USER_IDENTITY,
        PHONE_NUMBER_INFORMATION,
        SATELLITE_ENTITLEMENT,
        ODSA_CROSS_TS43,
    ];
}

/// Whether `app_id` is one of the known TS.43 application identifiers
pub fn is_valid_app_id(app_id: &str) -> bool {
    app_id::ALL.contains(&app_id)
}

/// `ap` followed by four digits; JSON documents key applications this way
pub(crate) fn is_app_id_format(key: &str) -> bool {
    key.len() == 6
        && key.starts_with("ap")
        && key[2..].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_app_ids() {
        assert!(is_valid_app_id(app_id::VOWIFI));
        assert!(is_valid_app_id("ap2017"));
        assert!(!is_valid_app_id("ap2015"));
        assert!(!is_valid_app_id(""));
    }

    #[test]
    fn test_app_id_format() {
        assert!(is_app_id_format("ap2009"));
        assert!(is_app_id_format("ap9999"));
        assert!(!is_app_id_format("Token"));
        assert!(!is_app_id_format("ap20091"));
        assert!(!is_app_id_format("apx009"));
    }
}
