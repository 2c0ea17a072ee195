//! Login rate limiting
//!
//! Per-client token bucket in front of the login route. Every login attempt
//! costs a full KDF evaluation, so unthrottled guessing is both an online
//! brute-force vector and a CPU sink.
//!
//! Clients are keyed by the socket peer address. Forwarding headers are
//! ignored because any client can set them.

use crate::rejection::GateRejection;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use governor::{Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Tracked clients before idle buckets are pruned
const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRateLimitConfig {
    /// Sustained attempts per minute per client; 0 disables limiting
    pub attempts_per_minute: u32,
    /// Attempts allowed back to back before the sustained rate applies
    pub burst: u32,
}

impl Default for LoginRateLimitConfig {
    fn default() -> Self {
        Self {
            attempts_per_minute: 10,
            burst: 5,
        }
    }
}

/// Uses a boxed closure to keep governor's generic types out of the middleware
type CheckFn = Arc<dyn Fn(&IpAddr) -> bool + Send + Sync>;

/// Rate limit middleware factory
#[derive(Clone)]
pub struct LoginRateLimit {
    check: Option<CheckFn>,
}

impl LoginRateLimit {
    pub fn new(config: LoginRateLimitConfig) -> Self {
        let Some(per_minute) = NonZeroU32::new(config.attempts_per_minute) else {
            return Self { check: None };
        };
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);

        let limiter = RateLimiter::keyed(Quota::per_minute(per_minute).allow_burst(burst));
        let prune_at = AtomicUsize::new(MAX_TRACKED_CLIENTS);
        let check: CheckFn = Arc::new(move |ip: &IpAddr| {
            if limiter.len() > prune_at.load(Ordering::Relaxed) {
                limiter.retain_recent();
                prune_at.store(next_prune_at(limiter.len()), Ordering::Relaxed);
            }
            limiter.check_key(ip).is_ok()
        });

        Self { check: Some(check) }
    }

    pub fn is_enabled(&self) -> bool {
        self.check.is_some()
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoginRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoginRateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRateLimitService {
            service,
            check: self.check.clone(),
        }))
    }
}

pub struct LoginRateLimitService<S> {
    service: S,
    check: Option<CheckFn>,
}

impl<S, B> Service<ServiceRequest> for LoginRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(check) = &self.check {
            let ip = peer_ip(&req);
            if !check(&ip) {
                warn!(client = %ip, "login rate limit exceeded");
                let response = GateRejection::RateLimited.error_response();
                return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}

/// Table size that triggers the next prune, given the buckets that survived
/// the last one. Live buckets are never dropped, so the bar moves up with them
/// and a table of active clients is not rescanned on every attempt.
fn next_prune_at(survivors: usize) -> usize {
    MAX_TRACKED_CLIENTS.max(survivors.saturating_mul(2))
}

/// Socket peer address; requests without one share a single bucket.
fn peer_ip(req: &ServiceRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
