//! Outbound pacing for provider calls
//!
//! A single token bucket shared by every request to the provider, so
//! overlapping aggregation runs stay inside the upstream rate limit together.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

/// Calls allowed back to back before pacing kicks in. Two lets a league's
/// standings and fixtures requests go out together.
pub const DEFAULT_BURST: u32 = 2;

/// Token bucket releasing one call per `pacing` interval.
pub struct OutboundLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    pacing: Duration,
}

impl OutboundLimiter {
    /// Create a limiter releasing one call every `pacing`, with `burst` slack.
    ///
    /// A zero interval disables pacing.
    pub fn new(pacing: Duration, burst: u32) -> Self {
        let limiter = Quota::with_period(pacing).map(|quota| {
            let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
            RateLimiter::direct(quota.allow_burst(burst))
        });

        Self { limiter, pacing }
    }

    /// Limiter that never waits
    #[cfg(test)]
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO, DEFAULT_BURST)
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait until the next outbound call is allowed.
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter
            && limiter.check().is_err()
        {
            debug!("Pacing outbound call ({:?} interval)", self.pacing);
            limiter.until_ready().await;
        }
    }
}
