//! Query entitlement status with an existing authentication token
//!
//! ```text
//! TS43_SERVER_URL=https://es.example.com/ts43 TS43_AUTH_TOKEN=... \
//!     cargo run -p ts43-entitlement --example query_status -- ap2004
//! ```
//!
//! `TS43_CONFIG` may point at a JSON carrier config instead of
//! `TS43_SERVER_URL`. Without a SIM, EAP-AKA is not available, so a token
//! is required.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use ts43_entitlement::{
    CarrierConfig, ServiceEntitlement, ServiceEntitlementRequest, Telephony, TelephonyError,
};

/// Device identity taken from the environment; no USIM access
struct EnvTelephony {
    imei: Option<String>,
    imsi: Option<String>,
    mcc_mnc: Option<String>,
}

impl EnvTelephony {
    fn from_env() -> Self {
        Self {
            imei: std::env::var("TS43_IMEI").ok(),
            imsi: std::env::var("TS43_IMSI").ok(),
            mcc_mnc: std::env::var("TS43_MCC_MNC").ok(),
        }
    }
}

#[async_trait]
impl Telephony for EnvTelephony {
    fn active_modem_count(&self) -> usize {
        1
    }

    fn imei(&self, _slot_index: usize) -> Option<String> {
        self.imei.clone()
    }

    fn subscriber_id(&self, _slot_index: usize) -> Option<String> {
        self.imsi.clone()
    }

    fn sim_operator(&self, _slot_index: usize) -> Option<String> {
        self.mcc_mnc.clone()
    }

    async fn icc_authentication(
        &self,
        _slot_index: usize,
        _data: &str,
    ) -> Result<Option<String>, TelephonyError> {
        Err(TelephonyError::Unavailable("no USIM attached".to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ts43_telemetry::init("ts43-query-status")?;

    let config = match std::env::var("TS43_CONFIG") {
        Ok(path) => CarrierConfig::from_file(&path)?,
        Err(_) => CarrierConfig::builder()
            .server_url(std::env::var("TS43_SERVER_URL")?)
            .build(),
    };
    let app_ids: Vec<String> = std::env::args().skip(1).collect();
    anyhow::ensure!(!app_ids.is_empty(), "usage: query_status <app id>...");
    let app_ids: Vec<&str> = app_ids.iter().map(String::as_str).collect();

    let request = ServiceEntitlementRequest {
        authentication_token: std::env::var("TS43_AUTH_TOKEN").unwrap_or_default(),
        ..Default::default()
    };

    let service = ServiceEntitlement::new(config, Arc::new(EnvTelephony::from_env()), 0, false)?;
    info!(?app_ids, "Querying entitlement status");
    let body = service.query_entitlement_status(&app_ids, &request).await?;
    println!("{body}");
    Ok(())
}
