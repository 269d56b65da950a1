//! In-process gateways for development runs and tests.
//!
//! Both mocks succeed by default, record every call, and can be switched
//! into a failing mode.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use booking_core::error::AppError;
use booking_core::result::AppResult;

use crate::availability::{
    AvailabilityGateway, BlockSeatsRequest, BlockSeatsResult, ReleaseSeatsResult,
    SeatAvailability,
};
use crate::payment::{CapturePaymentRequest, PaymentGateway, PaymentReceipt};

#[derive(Debug, Default)]
struct AvailabilityState {
    /// Seat id -> status override. Unlisted seats are available.
    statuses: HashMap<String, String>,
    unreachable: bool,
    fail_blocks: bool,
    fail_releases: bool,
    block_calls: Vec<BlockSeatsRequest>,
    release_calls: Vec<(String, Vec<String>)>,
}

/// Scripted availability service.
#[derive(Debug, Clone, Default)]
pub struct MockAvailabilityGateway {
    state: Arc<Mutex<AvailabilityState>>,
}

impl MockAvailabilityGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `status` for `seat_id` from now on.
    pub async fn set_seat_status(&self, seat_id: &str, status: &str) {
        self.state
            .lock()
            .await
            .statuses
            .insert(seat_id.to_string(), status.to_string());
    }

    /// Make every call fail as if the service were down.
    pub async fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().await.unreachable = unreachable;
    }

    /// Make block calls fail.
    pub async fn fail_blocks(&self, fail: bool) {
        self.state.lock().await.fail_blocks = fail;
    }

    /// Make release calls fail.
    pub async fn fail_releases(&self, fail: bool) {
        self.state.lock().await.fail_releases = fail;
    }

    /// Block calls received so far.
    pub async fn block_calls(&self) -> Vec<BlockSeatsRequest> {
        self.state.lock().await.block_calls.clone()
    }

    /// Release calls received so far, as `(event_id, seat_ids)`.
    pub async fn release_calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().await.release_calls.clone()
    }
}

#[async_trait]
impl AvailabilityGateway for MockAvailabilityGateway {
    async fn get_seat_availability(
        &self,
        _event_id: &str,
        seat_id: &str,
    ) -> AppResult<SeatAvailability> {
        let state = self.state.lock().await;
        if state.unreachable {
            return Err(AppError::upstream_unavailable("Availability service unreachable"));
        }
        Ok(state
            .statuses
            .get(seat_id)
            .map(|status| SeatAvailability {
                status: status.clone(),
            })
            .unwrap_or_else(SeatAvailability::available))
    }

    async fn block_seats(&self, request: BlockSeatsRequest) -> AppResult<BlockSeatsResult> {
        let mut state = self.state.lock().await;
        state.block_calls.push(request.clone());
        if state.unreachable || state.fail_blocks {
            return Err(AppError::upstream_unavailable("Seat block failed"));
        }
        Ok(BlockSeatsResult {
            blocked_seat_ids: request.seat_ids,
            failed_seat_ids: Vec::new(),
        })
    }

    async fn release_seats(
        &self,
        event_id: &str,
        seat_ids: &[String],
    ) -> AppResult<ReleaseSeatsResult> {
        let mut state = self.state.lock().await;
        state
            .release_calls
            .push((event_id.to_string(), seat_ids.to_vec()));
        if state.unreachable || state.fail_releases {
            return Err(AppError::upstream_unavailable("Seat release failed"));
        }
        Ok(ReleaseSeatsResult {
            released_seat_ids: seat_ids.to_vec(),
            failed_seat_ids: Vec::new(),
        })
    }
}

#[derive(Debug, Default)]
struct PaymentState {
    decline: bool,
    captures: Vec<CapturePaymentRequest>,
}

/// Scripted payment service.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    state: Arc<Mutex<PaymentState>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decline every capture from now on.
    pub async fn set_decline(&self, decline: bool) {
        self.state.lock().await.decline = decline;
    }

    /// Capture requests received so far, declined ones included.
    pub async fn captures(&self) -> Vec<CapturePaymentRequest> {
        self.state.lock().await.captures.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn capture_payment(&self, request: CapturePaymentRequest) -> AppResult<PaymentReceipt> {
        let mut state = self.state.lock().await;
        state.captures.push(request.clone());
        if state.decline {
            return Err(AppError::payment_failed("Card declined"));
        }

        let payment_id = format!("pay_{}_{}", request.session_id, state.captures.len());
        info!(
            payment_id = %payment_id,
            amount = request.amount,
            "Mock payment captured"
        );
        Ok(PaymentReceipt { payment_id })
    }
}
