//! OpenAPI documentation for the team server operator API

use crate::routes::{auth, health, operator};
use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Error body shared by every non-2xx response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Team Server Operator API",
        description = "Operator authentication and the protected control-plane surface. Log in with the operator password, then send the returned token as `Authorization: Bearer <token>`.",
        license(name = "MIT")
    ),
    paths(auth::login, operator::session, health::health),
    components(schemas(
        auth::LoginRequest,
        auth::LoginResponse,
        operator::SessionResponse,
        health::HealthResponse,
        ErrorResponse
    )),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "operator", description = "Authenticated operator endpoints"),
        (name = "health", description = "Liveness"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Operator token from POST /auth/login"))
                        .build(),
                ),
            )
        }
    }
}
