use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Largest login body accepted, in bytes
pub const LOGIN_BODY_LIMIT: usize = 4 * 1024;

/// Login request. Deliberately not `Debug`.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds until `expires_at`
    pub expires_in: i64,
}

/// Exchange the operator password for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorResponse),
        (status = 413, description = "Request body too large"),
        (status = 429, description = "Too many login attempts", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let issuer = state.auth.issuer().clone();
    let request = serde_json::from_slice::<LoginRequest>(&body);

    // Malformed bodies still pay for one KDF pass so they look like a wrong password
    let outcome = web::block(move || match request {
        Ok(request) => issuer.issue(&request.password),
        Err(_) => Err(issuer.reject_malformed()),
    })
    .await
    .map_err(|e| AppError::Internal(format!("login worker failed: {e}")))?;

    let client = req.peer_addr().map(|addr| addr.ip().to_string());

    match outcome {
        Ok(token) => {
            info!(client = ?client, expires_at = %token.expires_at(), "operator login succeeded");
            Ok(HttpResponse::Ok().json(LoginResponse {
                expires_at: token.expires_at(),
                expires_in: token.expires_in(),
                token_type: "Bearer".to_string(),
                token: token.into_string(),
            }))
        }
        Err(e) if e.is_rejection() => {
            warn!(client = ?client, reason = e.kind(), "operator login rejected");
            Err(e.into())
        }
        Err(e) => {
            error!(error = %e, "operator login failed");
            Err(e.into())
        }
    }
}
