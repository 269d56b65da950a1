//! Input validation helpers shared by the managers.

use chrono::{DateTime, Duration, Utc};

use booking_core::error::AppError;
use booking_core::result::AppResult;
use booking_entity::SeatPricing;

/// Reject empty or whitespace-only identifiers.
pub(crate) fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject missing categories and negative prices.
pub(crate) fn pricing(pricing: &SeatPricing) -> AppResult<()> {
    require("pricing_category", &pricing.pricing_category)?;
    if pricing.base_price < 0 {
        return Err(AppError::validation("base_price must be non-negative"));
    }
    if pricing.final_price < 0 {
        return Err(AppError::validation("final_price must be non-negative"));
    }
    Ok(())
}

/// Deadline `ttl` after `now`; lifetimes above `max` are rejected.
pub(crate) fn deadline(
    now: DateTime<Utc>,
    ttl: Duration,
    max: Duration,
) -> AppResult<DateTime<Utc>> {
    if ttl > max {
        return Err(AppError::validation(format!(
            "ttl must not exceed {} minutes",
            max.num_minutes()
        )));
    }
    now.checked_add_signed(ttl)
        .ok_or_else(|| AppError::validation("ttl is out of range"))
}
