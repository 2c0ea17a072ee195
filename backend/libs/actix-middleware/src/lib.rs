//! # Actix Middleware Library
//!
//! Request pipeline components for the team server
//!
//! ## Modules
//! - `jwt_auth`: operator bearer token gate and principal extractor
//! - `logging`: structured access log
//! - `rate_limit`: per-client login throttling
//! - `rejection`: uniform error bodies for stopped requests

pub mod jwt_auth;
pub mod logging;
pub mod rate_limit;
pub mod rejection;

pub use jwt_auth::{Operator, OperatorAuthMiddleware};
pub use logging::AccessLog;
pub use rate_limit::{LoginRateLimit, LoginRateLimitConfig};
pub use rejection::{unauthorized, ErrorBody, GateRejection};
