//! Payment Service client.
//!
//! Every failure of a capture, including an unreachable service, is
//! reported as `PaymentFailed`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use booking_core::config::PaymentGatewayConfig;
use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;

/// Payment capture for one booking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturePaymentRequest {
    pub session_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub user_id: String,
    pub event_id: String,
}

/// Successful capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
}

/// Captures payment for completed sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Capture the full session amount.
    async fn capture_payment(&self, request: CapturePaymentRequest) -> AppResult<PaymentReceipt>;
}

/// HTTP client for the Payment Service.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    http: Client,
    base_url: String,
}

impl HttpPaymentGateway {
    /// Build a client from configuration.
    pub fn new(config: &PaymentGatewayConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build payment client", e)
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(
        skip(self, request),
        fields(session_id = %request.session_id, amount = request.amount),
        level = "debug"
    )]
    async fn capture_payment(&self, request: CapturePaymentRequest) -> AppResult<PaymentReceipt> {
        let url = format!("{}/api/payments/capture", self.base_url);

        let receipt: PaymentReceipt = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::with_source(ErrorKind::PaymentFailed, "Payment capture failed", e))?
            .json()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::PaymentFailed, "Invalid payment response", e)
            })?;

        debug!(payment_id = %receipt.payment_id, "Payment captured");
        Ok(receipt)
    }
}
