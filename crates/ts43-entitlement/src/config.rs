//! Carrier configuration

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Default connect/read timeout in seconds
pub const DEFAULT_TIMEOUT_IN_SEC: u64 = 30;

/// Default realm used to build the EAP-AKA identity
pub const DEFAULT_EAP_AKA_REALM: &str = "nai.epc";

/// Per-carrier entitlement server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    /// Entitlement server URL
    pub server_url: String,
    /// Client identifier placed in the User-Agent (e.g. "client-ts43")
    pub client_ts43: String,
    /// Send parameters as a JSON POST body instead of a GET query
    pub use_http_post: bool,
    /// Connect and read timeout, in seconds
    pub timeout_in_sec: u64,
    /// Local address outgoing connections bind to
    pub network: Option<IpAddr>,
    /// Realm of the EAP-AKA permanent identity
    pub eap_aka_realm: String,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            client_ts43: String::new(),
            use_http_post: false,
            timeout_in_sec: DEFAULT_TIMEOUT_IN_SEC,
            network: None,
            eap_aka_realm: DEFAULT_EAP_AKA_REALM.to_string(),
        }
    }
}

impl CarrierConfig {
    pub fn builder() -> CarrierConfigBuilder {
        CarrierConfigBuilder::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, crate::Ts43Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Ts43Error::Config(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| crate::Ts43Error::Config(e.to_string()))
    }

    /// Get connect/read timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_in_sec)
    }
}

/// Builder for [`CarrierConfig`]
#[derive(Debug, Default)]
pub struct CarrierConfigBuilder {
    config: CarrierConfig,
}

impl CarrierConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn client_ts43(mut self, client: impl Into<String>) -> Self {
        self.config.client_ts43 = client.into();
        self
    }

    pub fn use_http_post(mut self, use_post: bool) -> Self {
        self.config.use_http_post = use_post;
        self
    }

    pub fn timeout_in_sec(mut self, seconds: u64) -> Self {
        self.config.timeout_in_sec = seconds;
        self
    }

    pub fn network(mut self, local_address: IpAddr) -> Self {
        self.config.network = Some(local_address);
        self
    }

    pub fn eap_aka_realm(mut self, realm: impl Into<String>) -> Self {
        self.config.eap_aka_realm = realm.into();
        self
    }

    pub fn build(self) -> CarrierConfig {
        self.config
    }
}
