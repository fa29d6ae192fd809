//! Per-client rate limiting.

use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tracing::info;

/// Rates at or above this disable the limiter entirely
pub const UNLIMITED_REQUESTS_PER_SECOND: u32 = 100_000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Invalid rate limit: {requests_per_second} requests/s with burst size {burst_size}")]
pub struct InvalidRateLimit {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Interval after which one request of quota is replenished
pub fn replenish_period(requests_per_second: u32) -> Option<Duration> {
    (requests_per_second > 0).then(|| Duration::from_secs(1) / requests_per_second)
}

/// Wrap `router` in a per-IP limiter.
///
/// Each client may send `burst_size` requests at once and `requests_per_second`
/// sustained. Clients are keyed by `x-forwarded-for`, `x-real-ip` or `forwarded`,
/// falling back to the peer address.
pub fn apply_rate_limit(
    router: Router,
    requests_per_second: u32,
    burst_size: u32,
) -> Result<Router, InvalidRateLimit> {
    if requests_per_second >= UNLIMITED_REQUESTS_PER_SECOND {
        info!(requests_per_second, "Rate limiting disabled");
        return Ok(router);
    }

    let invalid = || InvalidRateLimit {
        requests_per_second,
        burst_size,
    };
    let period = replenish_period(requests_per_second).ok_or_else(invalid)?;

    let config = GovernorConfigBuilder::default()
        .period(period)
        .burst_size(burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .ok_or_else(invalid)?;

    Ok(router.layer(GovernorLayer::new(config)))
}
