//! TS.43 Telemetry
//!
//! Tracing setup for the entitlement client and its tests.

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{init_test_tracing, init_tracing};

/// Initialize tracing from the environment
pub fn init(component: &str) -> Result<(), TelemetryError> {
    init_tracing(component, &TelemetryConfig::from_env())
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}
