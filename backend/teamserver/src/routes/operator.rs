use actix_middleware::Operator;
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated operator's view of its own token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub subject: String,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[utoipa::path(
    get,
    path = "/api/operator/session",
    tag = "operator",
    responses(
        (status = 200, description = "Current operator session", body = SessionResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn session(operator: Operator) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse {
        subject: operator.subject().to_string(),
        token_id: operator.token_id().to_string(),
        issued_at: operator.issued_at(),
        expires_at: operator.expires_at(),
    })
}
