use actix_middleware::{unauthorized, ErrorBody};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use operator_auth::AuthError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) if e.is_rejection() => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => unauthorized(),
            status => HttpResponse::build(status).json(ErrorBody {
                error: "internal_error",
                code: status.as_u16(),
            }),
        }
    }
}
