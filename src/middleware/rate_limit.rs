use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    DefaultKeyedRateLimiter, Quota, RateLimiter,
    clock::{Clock, DefaultClock},
};
use kaayjang_config::RateLimitConfig;
use kaayjang_core::AppError;
use tracing::warn;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Token bucket per client IP: `max_requests` tokens, one regained every
/// `window / max_requests`.
pub struct ApiRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
}

impl ApiRateLimiter {
    /// `None` when rate limiting is disabled.
    pub fn from_config(config: &RateLimitConfig) -> Option<Arc<Self>> {
        if !config.enabled {
            return None;
        }

        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.replenish_interval())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Some(Arc::new(Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }))
    }

    /// Seconds until `ip` may retry, or `None` if the request is allowed.
    fn check(&self, ip: IpAddr) -> Option<u64> {
        match self.limiter.check_key(&ip) {
            Ok(()) => None,
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                Some(wait.as_secs().max(1))
            }
        }
    }

    /// Drops buckets that are full again, every minute, until the limiter
    /// itself is dropped.
    pub fn spawn_pruning(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            interval.tick().await;
            loop {
                interval.tick().await;
                match weak.upgrade() {
                    Some(limiter) => limiter.limiter.retain_recent(),
                    None => break,
                }
            }
        });
    }
}

/// The peer address, or the first `X-Forwarded-For` entry when there is no
/// socket (e.g. in-process requests).
fn client_ip(req: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    req.headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<ApiRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    if let Some(retry_after) = limiter.check(ip) {
        warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

        let mut response = AppError::too_many_requests(anyhow!(
            "Too many requests, please try again later"
        ))
        .into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(RETRY_AFTER, value);
        }
        return response;
    }

    next.run(req).await
}
