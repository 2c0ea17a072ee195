use actix_middleware::{LoginRateLimit, LoginRateLimitConfig};
use operator_auth::OperatorAuth;

/// Shared across all workers. Built once after the signing key is derived.
#[derive(Clone)]
pub struct AppState {
    pub auth: OperatorAuth,
    /// Shared so every worker draws from the same per-client buckets
    pub login_limit: LoginRateLimit,
}

impl AppState {
    pub fn new(auth: OperatorAuth, login_limit: LoginRateLimitConfig) -> Self {
        Self {
            auth,
            login_limit: LoginRateLimit::new(login_limit),
        }
    }
}
