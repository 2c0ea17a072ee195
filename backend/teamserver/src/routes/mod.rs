use crate::openapi::ApiDoc;
use crate::state::AppState;
use actix_middleware::OperatorAuthMiddleware;
use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

pub mod auth;
pub mod health;
pub mod operator;

/// Register every route. Anything mounted under `/api` requires an operator token.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()))
        .route("/health", web::get().to(health::health))
        .route("/openapi.json", web::get().to(openapi_json))
        .service(
            web::scope("/auth")
                .wrap(state.login_limit.clone())
                .app_data(web::PayloadConfig::new(auth::LOGIN_BODY_LIMIT))
                .route("/login", web::post().to(auth::login)),
        )
        .service(
            web::scope("/api")
                .wrap(OperatorAuthMiddleware::new(state.auth.validator().clone()))
                .route("/operator/session", web::get().to(operator::session)),
        );
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
