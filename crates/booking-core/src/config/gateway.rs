//! Upstream service client configuration.

use serde::{Deserialize, Serialize};

/// Settings for the upstream gateways.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaysConfig {
    /// Availability (event) service client.
    #[serde(default)]
    pub availability: AvailabilityGatewayConfig,
    /// Payment service client.
    #[serde(default)]
    pub payment: PaymentGatewayConfig,
}

/// Availability service client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityGatewayConfig {
    /// Base URL of the availability service.
    #[serde(default = "default_availability_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_availability_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AvailabilityGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_availability_url(),
            timeout_seconds: default_availability_timeout(),
        }
    }
}

/// Payment service client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentGatewayConfig {
    /// Base URL of the payment service.
    #[serde(default = "default_payment_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_payment_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PaymentGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_payment_url(),
            timeout_seconds: default_payment_timeout(),
        }
    }
}

fn default_availability_url() -> String {
    "http://localhost:50051".to_string()
}

fn default_availability_timeout() -> u64 {
    5
}

fn default_payment_url() -> String {
    "http://localhost:50054".to_string()
}

fn default_payment_timeout() -> u64 {
    30
}
