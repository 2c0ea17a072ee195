//! Responses for requests stopped before reaching a handler
//!
//! Every authentication failure renders the same body regardless of cause, so a
//! client cannot tell a bad signature from an expired token or a wrong password.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use operator_auth::AuthError;
use serde::Serialize;
use thiserror::Error;

/// JSON body shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub code: u16,
}

#[derive(Debug, Error)]
pub enum GateRejection {
    #[error("unauthorized: {}", .0.kind())]
    Unauthorized(AuthError),

    #[error("too many login attempts")]
    RateLimited,
}

impl ResponseError for GateRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            GateRejection::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GateRejection::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            GateRejection::Unauthorized(_) => unauthorized(),
            GateRejection::RateLimited => HttpResponse::TooManyRequests().json(ErrorBody {
                error: "too_many_requests",
                code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            }),
        }
    }
}

/// The one 401 response this server sends.
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
        .json(ErrorBody {
            error: "unauthorized",
            code: StatusCode::UNAUTHORIZED.as_u16(),
        })
}
