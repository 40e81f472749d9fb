//! Per-client rate limiting using governor.
//!
//! Each client address gets its own bucket. The quota allows a burst of
//! `requests_per_minute` and refills one request every `60s / n`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use tracing::{debug, warn};

use super::{responses::too_many_requests, AppState};
use crate::errors::{AppError, AppResult};

/// Keyed limiter shared by every request of one application instance
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
    requests_per_minute: u32,
}

impl ClientRateLimiter {
    pub fn per_minute(requests_per_minute: u32) -> AppResult<Self> {
        let rate = NonZeroU32::new(requests_per_minute).ok_or_else(|| {
            AppError::configuration("requests per minute must be greater than zero")
        })?;
        Ok(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(rate)),
            clock: DefaultClock::default(),
            requests_per_minute,
        })
    }

    /// Consume one request for `client`, or return how long to wait
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    /// Forget clients whose buckets have fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Periodically drop idle client buckets so the key map stays small
pub fn spawn_pruning(limiter: Arc<ClientRateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.prune();
            debug!("Rate limiter tracking {} clients", limiter.tracked_clients());
        }
    })
}

/// Client address from the connection, or the unspecified address when the
/// server was not started with connect info
pub(crate) fn client_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Rate limiting middleware for the profile endpoint
pub async fn profile_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let client = client_ip(&request);
    match limiter.check(client) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            let retry_after = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            warn!(
                client = %client,
                path = %request.uri().path(),
                retry_after_seconds = retry_after,
                "Rate limit exceeded"
            );
            too_many_requests(
                format!(
                    "Rate limit exceeded: {} per 1 minute",
                    limiter.requests_per_minute()
                ),
                retry_after.max(1),
            )
        }
    }
}
