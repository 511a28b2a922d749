//! TS.43 authentication token acquisition

use crate::config::CarrierConfig;
use crate::doc::{characteristic, parm, Ts43Doc};
use crate::entitlement::ServiceEntitlement;
use crate::errors::{ErrorCode, Result, ServiceEntitlementError, Ts43Error};
use crate::http::HttpTransport;
use crate::request::{ServiceEntitlementRequest, DEFAULT_ENTITLEMENT_VERSION};
use crate::telephony::{check_slot, Telephony};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// Token validity when the server does not report one
pub const VALIDITY_NOT_AVAILABLE: i64 = -1;

/// Authentication token handed out by the entitlement server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ts43AuthToken {
    pub token: String,
    /// `Set-Cookie` values to replay with the token
    pub cookies: Vec<String>,
    /// Validity in seconds, or [`VALIDITY_NOT_AVAILABLE`]
    pub validity: i64,
}

/// Obtains authentication tokens through an EAP-AKA entitlement query
pub struct Ts43Authentication {
    config: CarrierConfig,
    entitlement_version: String,
    telephony: Arc<dyn Telephony>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl Ts43Authentication {
    pub fn new(
        config: CarrierConfig,
        entitlement_version: Option<&str>,
        telephony: Arc<dyn Telephony>,
    ) -> Result<Self> {
        Url::parse(&config.server_url).map_err(|e| {
            Ts43Error::InvalidArgument(format!("invalid server url {}: {e}", config.server_url))
        })?;

        Ok(Self {
            config,
            entitlement_version: entitlement_version
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_ENTITLEMENT_VERSION)
                .to_string(),
            telephony,
            transport: None,
        })
    }

    /// Send requests through `transport` instead of the default client
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Authenticate with the SIM in `slot_index` and return the token for
    /// `app_id`
    #[instrument(skip(self))]
    pub async fn get_auth_token(
        &self,
        slot_index: i32,
        app_id: &str,
        app_name: &str,
        app_version: &str,
    ) -> Result<Ts43AuthToken> {
        if !crate::is_valid_app_id(app_id) {
            return Err(Ts43Error::InvalidArgument(format!("invalid app id {app_id}")));
        }
        let slot = check_slot(self.telephony.as_ref(), slot_index)?;

        let entitlement = match &self.transport {
            Some(transport) => ServiceEntitlement::with_transport(
                self.config.clone(),
                transport.clone(),
                self.telephony.clone(),
                slot,
                false,
            ),
            None => ServiceEntitlement::new(self.config.clone(), self.telephony.clone(), slot, false)?,
        };

        let request = ServiceEntitlementRequest {
            entitlement_version: self.entitlement_version.clone(),
            terminal_id: self.telephony.imei(slot).unwrap_or_default(),
            app_name: app_name.to_string(),
            app_version: app_version.to_string(),
            ..Default::default()
        };

        let response = entitlement
            .get_entitlement_status_response(&[app_id], &request, &[])
            .await?;
        let doc = Ts43Doc::parse(&response.body);

        let token = doc
            .get_non_empty(&[characteristic::TOKEN], parm::TOKEN)
            .ok_or_else(|| {
                ServiceEntitlementError::new(
                    ErrorCode::TokenNotAvailable,
                    "auth token is not available.",
                )
            })?
            .to_string();

        let validity = doc
            .get(&[characteristic::TOKEN], parm::VALIDITY)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or_else(|| {
                debug!("Token validity not available");
                VALIDITY_NOT_AVAILABLE
            });

        info!(app_id, validity, "Auth token acquired");
        Ok(Ts43AuthToken {
            token,
            cookies: response.cookies,
            validity,
        })
    }

    /// OIDC authentication server lookup
    pub async fn get_oidc_auth_server(
        &self,
        _slot_index: i32,
        _app_id: &str,
        _app_name: &str,
        _app_version: &str,
    ) -> Result<Url> {
        Err(Ts43Error::Unsupported("get_oidc_auth_server"))
    }

    /// Token retrieval after OIDC authentication
    pub async fn get_auth_token_from_oidc(&self, _aes_url: &Url) -> Result<Ts43AuthToken> {
        Err(Ts43Error::Unsupported("get_auth_token_from_oidc"))
    }
}
