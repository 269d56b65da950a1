//! Availability Service client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use booking_core::config::AvailabilityGatewayConfig;
use booking_core::error::{AppError, ErrorKind};
use booking_core::result::AppResult;

/// Remote status value meaning the seat can be sold.
pub const SEAT_STATUS_AVAILABLE: &str = "available";

/// Remote seat status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAvailability {
    /// Status reported by the Availability Service.
    pub status: String,
}

impl SeatAvailability {
    /// A seat reported as available.
    pub fn available() -> Self {
        Self {
            status: SEAT_STATUS_AVAILABLE.to_string(),
        }
    }

    /// Whether the seat can be reserved.
    pub fn is_available(&self) -> bool {
        self.status.eq_ignore_ascii_case(SEAT_STATUS_AVAILABLE)
    }
}

/// Request to block seats until a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSeatsRequest {
    /// Event the seats belong to.
    pub event_id: String,
    /// Seats to block.
    pub seat_ids: Vec<String>,
    /// Human-readable reason stored with the block.
    pub reason: String,
    /// When the block lapses.
    pub blocked_until: DateTime<Utc>,
}

/// Outcome of a block call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSeatsResult {
    #[serde(default)]
    pub blocked_seat_ids: Vec<String>,
    #[serde(default)]
    pub failed_seat_ids: Vec<String>,
}

/// Outcome of a release call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSeatsResult {
    #[serde(default)]
    pub released_seat_ids: Vec<String>,
    #[serde(default)]
    pub failed_seat_ids: Vec<String>,
}

/// Seat status source of truth.
#[async_trait]
pub trait AvailabilityGateway: Send + Sync + 'static {
    /// Fetch the remote status of one seat.
    async fn get_seat_availability(
        &self,
        event_id: &str,
        seat_id: &str,
    ) -> AppResult<SeatAvailability>;

    /// Block seats remotely until `blocked_until`.
    async fn block_seats(&self, request: BlockSeatsRequest) -> AppResult<BlockSeatsResult>;

    /// Unblock seats remotely.
    async fn release_seats(
        &self,
        event_id: &str,
        seat_ids: &[String],
    ) -> AppResult<ReleaseSeatsResult>;
}

#[derive(Debug, Serialize)]
struct ReleaseSeatsBody<'a> {
    seat_ids: &'a [String],
}

/// HTTP client for the Availability Service.
#[derive(Debug, Clone)]
pub struct HttpAvailabilityGateway {
    http: Client,
    base_url: Url,
}

impl HttpAvailabilityGateway {
    /// Build a client from configuration.
    pub fn new(config: &AvailabilityGatewayConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build availability client",
                    e,
                )
            })?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid availability base_url", e)
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "Availability base_url {base_url} cannot carry a path"
            )));
        }

        Ok(Self { http, base_url })
    }

    /// `base_url` extended by `segments`, each percent-encoded as one
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::configuration("Availability base_url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn upstream(context: &'static str) -> impl FnOnce(reqwest::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::UpstreamUnavailable, context, e)
}

#[async_trait]
impl AvailabilityGateway for HttpAvailabilityGateway {
    #[instrument(skip(self), level = "debug")]
    async fn get_seat_availability(
        &self,
        event_id: &str,
        seat_id: &str,
    ) -> AppResult<SeatAvailability> {
        let url = self.endpoint(&["api", "events", event_id, "seats", seat_id, "availability"])?;

        let availability: SeatAvailability = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream("Availability service request failed"))?
            .json()
            .await
            .map_err(upstream("Invalid availability response"))?;

        debug!(status = %availability.status, "Seat availability fetched");
        Ok(availability)
    }

    #[instrument(
        skip(self, request),
        fields(event_id = %request.event_id, seats = request.seat_ids.len()),
        level = "debug"
    )]
    async fn block_seats(&self, request: BlockSeatsRequest) -> AppResult<BlockSeatsResult> {
        let url = self.endpoint(&["api", "events", &request.event_id, "seats", "block"])?;

        let result: BlockSeatsResult = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream("Seat block request failed"))?
            .json()
            .await
            .map_err(upstream("Invalid seat block response"))?;

        debug!(
            blocked = result.blocked_seat_ids.len(),
            failed = result.failed_seat_ids.len(),
            "Seats blocked"
        );
        Ok(result)
    }

    #[instrument(skip(self, seat_ids), fields(seats = seat_ids.len()), level = "debug")]
    async fn release_seats(
        &self,
        event_id: &str,
        seat_ids: &[String],
    ) -> AppResult<ReleaseSeatsResult> {
        let url = self.endpoint(&["api", "events", event_id, "seats", "release"])?;

        let result: ReleaseSeatsResult = self
            .http
            .post(url)
            .json(&ReleaseSeatsBody { seat_ids })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream("Seat release request failed"))?
            .json()
            .await
            .map_err(upstream("Invalid seat release response"))?;

        debug!(
            released = result.released_seat_ids.len(),
            failed = result.failed_seat_ids.len(),
            "Seats released"
        );
        Ok(result)
    }
}
