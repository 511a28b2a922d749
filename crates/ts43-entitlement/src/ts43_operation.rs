//! TS.43 ODSA operations with token rotation
//!
//! A [`Ts43Operation`] is bound to one SIM slot and one entitlement server.
//! Every successful response may carry a fresh authentication token; the
//! operation swaps it into its [`Session`] so the next call uses it.

use crate::config::CarrierConfig;
use crate::doc::{characteristic, parm, Ts43Doc};
use crate::entitlement::ServiceEntitlement;
use crate::errors::{Result, Ts43Error};
use crate::http::HttpTransport;
use crate::odsa::{
    AcquireConfigurationRequest, AcquireConfigurationResponse, AcquireTemporaryTokenRequest,
    AcquireTemporaryTokenResponse, CheckEligibilityRequest, CheckEligibilityResponse,
    EsimOdsaOperation, GetPhoneNumberRequest, GetPhoneNumberResponse, GetSubscriberInfoRequest,
    GetSubscriberInfoResponse, ManageServiceRequest, ManageServiceResponse,
    ManageSubscriptionRequest, ManageSubscriptionResponse, OdsaResponse,
};
use crate::request::{ServiceEntitlementRequest, DEFAULT_ENTITLEMENT_VERSION};
use crate::telephony::{check_slot, Telephony};
use crate::types::{AcceptContentType, NotificationAction};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Normal,
    Temporary,
}

/// Token the operation authenticates with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Authentication token from a previous entitlement query
    Normal(String),
    /// Temporary token from AcquireTemporaryToken
    Temporary(String),
}

impl Credential {
    pub fn new(token: impl Into<String>, token_type: TokenType) -> Self {
        match token_type {
            TokenType::Normal => Self::Normal(token.into()),
            TokenType::Temporary => Self::Temporary(token.into()),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Self::Normal(token) | Self::Temporary(token) => token,
        }
    }

    pub fn token_type(&self) -> TokenType {
        match self {
            Self::Normal(_) => TokenType::Normal,
            Self::Temporary(_) => TokenType::Temporary,
        }
    }
}

/// Authentication state between operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    credential: Credential,
}

impl Session {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Session after the server handed out `token`. A temporary credential
    /// stays in place; only normal tokens rotate.
    pub fn with_rotated_token(&self, token: &str) -> Self {
        match &self.credential {
            Credential::Normal(_) => Self::new(Credential::Normal(token.to_string())),
            Credential::Temporary(_) => {
                debug!("Temporary credential in use, ignoring rotated token");
                self.clone()
            }
        }
    }

    fn apply(&self, request: &mut ServiceEntitlementRequest) {
        match &self.credential {
            Credential::Normal(token) => request.authentication_token = token.clone(),
            Credential::Temporary(token) => request.temporary_token = token.clone(),
        }
    }
}

/// ODSA client for one slot
pub struct Ts43Operation {
    entitlement: ServiceEntitlement,
    entitlement_version: String,
    app_name: String,
    imei: String,
    session: Mutex<Session>,
}

impl Ts43Operation {
    /// Operation client over the default `reqwest` transport
    pub fn new(
        config: CarrierConfig,
        telephony: Arc<dyn Telephony>,
        slot_index: i32,
        entitlement_version: Option<&str>,
        credential: Credential,
        app_name: &str,
    ) -> Result<Self> {
        Self::build(
            config,
            None,
            telephony,
            slot_index,
            entitlement_version,
            credential,
            app_name,
        )
    }

    /// Operation client over a caller-supplied transport
    pub fn with_transport(
        config: CarrierConfig,
        transport: Arc<dyn HttpTransport>,
        telephony: Arc<dyn Telephony>,
        slot_index: i32,
        entitlement_version: Option<&str>,
        credential: Credential,
        app_name: &str,
    ) -> Result<Self> {
        Self::build(
            config,
            Some(transport),
            telephony,
            slot_index,
            entitlement_version,
            credential,
            app_name,
        )
    }

    fn build(
        config: CarrierConfig,
        transport: Option<Arc<dyn HttpTransport>>,
        telephony: Arc<dyn Telephony>,
        slot_index: i32,
        entitlement_version: Option<&str>,
        credential: Credential,
        app_name: &str,
    ) -> Result<Self> {
        Url::parse(&config.server_url).map_err(|e| {
            Ts43Error::InvalidArgument(format!("invalid server url {}: {e}", config.server_url))
        })?;
        let slot = check_slot(telephony.as_ref(), slot_index)?;
        let imei = telephony.imei(slot).unwrap_or_default();

        let entitlement = match transport {
            Some(transport) => {
                ServiceEntitlement::with_transport(config, transport, telephony, slot, false)
            }
            None => ServiceEntitlement::new(config, telephony, slot, false)?,
        };

        Ok(Self {
            entitlement,
            entitlement_version: entitlement_version
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_ENTITLEMENT_VERSION)
                .to_string(),
            app_name: app_name.to_string(),
            imei,
            session: Mutex::new(Session::new(credential)),
        })
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.session.lock().await.clone()
    }

    #[instrument(skip(self, request), fields(app_id = %request.app_id))]
    pub async fn check_eligibility(
        &self,
        request: &CheckEligibilityRequest,
    ) -> Result<CheckEligibilityResponse> {
        require_app_id(&request.app_id)?;
        let mut session = self.session.lock().await;
        let entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::default(),
            &request.notification_token,
            request.notification_action,
        );
        let doc = self
            .perform(
                &mut session,
                &request.app_id,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        Ok(CheckEligibilityResponse::from_doc(&doc)?)
    }

    #[instrument(skip(self, request), fields(app_id = %request.app_id))]
    pub async fn manage_subscription(
        &self,
        request: &ManageSubscriptionRequest,
    ) -> Result<ManageSubscriptionResponse> {
        require_app_id(&request.app_id)?;
        let mut session = self.session.lock().await;
        let entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::Xml,
            &request.notification_token,
            request.notification_action,
        );
        let doc = self
            .perform(
                &mut session,
                &request.app_id,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        Ok(ManageSubscriptionResponse::from_doc(&doc)?)
    }

    #[instrument(skip(self, request), fields(app_id = %request.app_id))]
    pub async fn manage_service(
        &self,
        request: &ManageServiceRequest,
    ) -> Result<ManageServiceResponse> {
        require_app_id(&request.app_id)?;
        let mut session = self.session.lock().await;
        let entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::default(),
            "",
            NotificationAction::default(),
        );
        let doc = self
            .perform(
                &mut session,
                &request.app_id,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        Ok(ManageServiceResponse::from_doc(&doc)?)
    }

    #[instrument(skip(self, request), fields(app_id = %request.app_id))]
    pub async fn acquire_configuration(
        &self,
        request: &AcquireConfigurationRequest,
    ) -> Result<AcquireConfigurationResponse> {
        require_app_id(&request.app_id)?;
        let mut session = self.session.lock().await;
        let entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::default(),
            &request.notification_token,
            request.notification_action,
        );
        let doc = self
            .perform(
                &mut session,
                &request.app_id,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        Ok(AcquireConfigurationResponse::from_doc(&doc)?)
    }

    /// Ask the server for a temporary token scoped to the requested operations
    #[instrument(skip(self, request), fields(app_id = %request.app_id))]
    pub async fn acquire_temporary_token(
        &self,
        request: &AcquireTemporaryTokenRequest,
    ) -> Result<AcquireTemporaryTokenResponse> {
        require_app_id(&request.app_id)?;
        let mut session = self.session.lock().await;
        let entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::default(),
            "",
            NotificationAction::default(),
        );
        let doc = self
            .perform(
                &mut session,
                &request.app_id,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        let response = AcquireTemporaryTokenResponse::from_doc(&doc)?;
        info!(expiry = ?response.temporary_token_expiry, "Temporary token acquired");
        Ok(response)
    }

    #[instrument(skip(self, request))]
    pub async fn get_phone_number(
        &self,
        request: &GetPhoneNumberRequest,
    ) -> Result<GetPhoneNumberResponse> {
        let mut session = self.session.lock().await;
        let mut entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::default(),
            "",
            NotificationAction::default(),
        );
        if !request.terminal_id.is_empty() {
            entitlement_request.terminal_id = request.terminal_id.clone();
        }
        let doc = self
            .perform(
                &mut session,
                crate::app_id::PHONE_NUMBER_INFORMATION,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        Ok(GetPhoneNumberResponse::from_doc(&doc)?)
    }

    #[instrument(skip(self, request))]
    pub async fn get_subscriber_info(
        &self,
        request: &GetSubscriberInfoRequest,
    ) -> Result<GetSubscriberInfoResponse> {
        let mut session = self.session.lock().await;
        let entitlement_request = self.entitlement_request(
            &session,
            AcceptContentType::Json,
            "",
            NotificationAction::default(),
        );
        let doc = self
            .perform(
                &mut session,
                crate::app_id::PHONE_NUMBER_INFORMATION,
                &entitlement_request,
                &request.to_operation(),
            )
            .await?;
        Ok(GetSubscriberInfoResponse::from_doc(&doc)?)
    }

    /// Data plan listing (TS.43 AcquirePlan)
    pub async fn acquire_plans(&self, _app_id: &str) -> Result<()> {
        Err(Ts43Error::Unsupported("acquire_plans"))
    }

    fn entitlement_request(
        &self,
        session: &Session,
        accept_content_type: AcceptContentType,
        notification_token: &str,
        notification_action: NotificationAction,
    ) -> ServiceEntitlementRequest {
        let mut request = ServiceEntitlementRequest {
            entitlement_version: self.entitlement_version.clone(),
            terminal_id: self.imei.clone(),
            app_name: self.app_name.clone(),
            notification_token: notification_token.to_string(),
            notification_action,
            accept_content_type,
            ..Default::default()
        };
        session.apply(&mut request);
        request
    }

    /// Dispatch `operation`, check the general result and rotate the token
    async fn perform(
        &self,
        session: &mut Session,
        app_id: &str,
        request: &ServiceEntitlementRequest,
        operation: &EsimOdsaOperation,
    ) -> Result<Ts43Doc> {
        let body = self
            .entitlement
            .perform_esim_odsa(app_id, request, operation)
            .await
            .map_err(|e| {
                warn!(
                    operation = operation.operation.as_str(),
                    code = %e.code(),
                    error = %e,
                    "ODSA operation failed"
                );
                e
            })?;

        let doc = Ts43Doc::parse(&body);
        let general = OdsaResponse::from_doc(&doc)?;
        debug!(
            operation = operation.operation.as_str(),
            result = ?general.operation_result,
            "ODSA operation completed"
        );

        if let Some(token) = doc.get_non_empty(&[characteristic::TOKEN], parm::TOKEN) {
            *session = session.with_rotated_token(token);
        }
        Ok(doc)
    }
}

fn require_app_id(app_id: &str) -> Result<()> {
    if app_id.is_empty() {
        return Err(Ts43Error::InvalidArgument("app id is required".to_string()));
    }
    Ok(())
}
