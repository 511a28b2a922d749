//! Service entitlement façade
//!
//! Sends entitlement status queries and ODSA operations to the carrier's
//! entitlement server and returns the raw response. Authentication is
//! handled transparently: fast re-authentication with a token when the
//! request carries one, embedded EAP-AKA otherwise.

use crate::config::CarrierConfig;
use crate::eap_aka::EapAkaApi;
use crate::errors::{Result, ServiceEntitlementError, Ts43Error};
use crate::http::{HttpClient, HttpResponse, HttpTransport, ReqwestTransport};
use crate::odsa::EsimOdsaOperation;
use crate::request::ServiceEntitlementRequest;
use crate::telephony::Telephony;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Entitlement client for one SIM slot
pub struct ServiceEntitlement {
    api: EapAkaApi,
    /// Request of the last OIDC endpoint lookup, reused for the follow-up query
    oidc_request: Mutex<Option<ServiceEntitlementRequest>>,
}

impl ServiceEntitlement {
    /// Client over the default `reqwest` transport
    pub fn new(
        config: CarrierConfig,
        telephony: Arc<dyn Telephony>,
        slot_index: usize,
        save_http_history: bool,
    ) -> std::result::Result<Self, ServiceEntitlementError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(
            config,
            transport,
            telephony,
            slot_index,
            save_http_history,
        ))
    }

    /// Client over a caller-supplied transport
    pub fn with_transport(
        config: CarrierConfig,
        transport: Arc<dyn HttpTransport>,
        telephony: Arc<dyn Telephony>,
        slot_index: usize,
        save_http_history: bool,
    ) -> Self {
        let http = HttpClient::new(transport, save_http_history);
        Self {
            api: EapAkaApi::new(config, http, telephony, slot_index),
            oidc_request: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CarrierConfig {
        self.api.config()
    }

    /// Entitlement status of `app_ids`; returns the response body
    pub async fn query_entitlement_status(
        &self,
        app_ids: &[&str],
        request: &ServiceEntitlementRequest,
    ) -> std::result::Result<String, ServiceEntitlementError> {
        Ok(self
            .get_entitlement_status_response(app_ids, request, &[])
            .await?
            .body)
    }

    /// Like [`query_entitlement_status`](Self::query_entitlement_status),
    /// returning the whole response so cookies can be reused
    #[instrument(skip(self, request, additional_headers))]
    pub async fn get_entitlement_status_response(
        &self,
        app_ids: &[&str],
        request: &ServiceEntitlementRequest,
        additional_headers: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, ServiceEntitlementError> {
        self.api
            .query_entitlement_status(app_ids, request, additional_headers)
            .await
    }

    /// Run one ODSA operation; returns the response body
    pub async fn perform_esim_odsa(
        &self,
        app_id: &str,
        request: &ServiceEntitlementRequest,
        operation: &EsimOdsaOperation,
    ) -> std::result::Result<String, ServiceEntitlementError> {
        Ok(self
            .get_esim_odsa_response(app_id, request, operation, &[])
            .await?
            .body)
    }

    #[instrument(skip(self, request, operation, additional_headers), fields(operation = operation.operation.as_str()))]
    pub async fn get_esim_odsa_response(
        &self,
        app_id: &str,
        request: &ServiceEntitlementRequest,
        operation: &EsimOdsaOperation,
        additional_headers: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, ServiceEntitlementError> {
        self.api
            .perform_esim_odsa(app_id, request, operation, additional_headers)
            .await
    }

    /// Ask the server for its OIDC authentication endpoint. The request is
    /// kept for [`query_entitlement_status_from_oidc`](Self::query_entitlement_status_from_oidc).
    #[instrument(skip(self, request, additional_headers))]
    pub async fn acquire_oidc_authentication_endpoint(
        &self,
        app_id: &str,
        request: &ServiceEntitlementRequest,
        additional_headers: &[(&str, &str)],
    ) -> std::result::Result<String, ServiceEntitlementError> {
        *self.oidc_request.lock() = Some(request.clone());
        let endpoint = self
            .api
            .acquire_oidc_authentication_endpoint(app_id, request, additional_headers)
            .await?;
        debug!(endpoint = %endpoint, "OIDC authentication endpoint acquired");
        Ok(endpoint)
    }

    /// Fetch the entitlement document after OIDC authentication; returns the
    /// response body
    pub async fn query_entitlement_status_from_oidc(&self, url: &str) -> Result<String> {
        Ok(self
            .get_entitlement_status_response_from_oidc(url, &[])
            .await?
            .body)
    }

    #[instrument(skip(self, additional_headers))]
    pub async fn get_entitlement_status_response_from_oidc(
        &self,
        url: &str,
        additional_headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let request = self.oidc_request.lock().clone().ok_or_else(|| {
            warn!("OIDC query without a prior endpoint request");
            Ts43Error::InvalidArgument(
                "acquire_oidc_authentication_endpoint must be called first".to_string(),
            )
        })?;
        Ok(self
            .api
            .query_entitlement_status_from_oidc(url, &request, additional_headers)
            .await?)
    }

    /// Recorded request/response pairs, if history is enabled
    pub fn history(&self) -> Vec<String> {
        self.api.history()
    }

    pub fn clear_history(&self) {
        self.api.clear_history()
    }
}
