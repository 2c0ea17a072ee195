use actix_middleware::LoginRateLimitConfig;
use actix_web::{http::StatusCode, test, App};
use chrono::{Duration, Utc};
use operator_auth::{AuthConfig, KdfParams, OperatorAuth, OperatorCredential, TokenPolicy};
use serde_json::json;
use teamserver::routes::{self, auth::LoginResponse, operator::SessionResponse};
use teamserver::AppState;

const UNAUTHORIZED_BODY: &[u8] = br#"{"error":"unauthorized","code":401}"#;

fn init_state(password: &str, login_limit: LoginRateLimitConfig) -> AppState {
    let config = AuthConfig {
        kdf: KdfParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
        tokens: TokenPolicy::default(),
    };
    let auth =
        OperatorAuth::initialize(OperatorCredential::new(password).unwrap(), config).unwrap();
    AppState::new(auth, login_limit)
}

fn unlimited() -> LoginRateLimitConfig {
    LoginRateLimitConfig {
        attempts_per_minute: 0,
        burst: 0,
    }
}

#[actix_web::test]
async fn test_operator_scenario() {
    let state = init_state("hunter2", unlimited());
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    // Correct password yields a bearer token
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "password": "hunter2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: LoginResponse = test::read_body_json(resp).await;
    assert_eq!(login.token_type, "Bearer");
    assert_eq!(login.expires_in, 8 * 3600);

    // Wrong password yields 401 and no token
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "password": "hunter3" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], UNAUTHORIZED_BODY);

    // Token opens protected routes
    let req = test::TestRequest::get()
        .uri("/api/operator/session")
        .insert_header(("Authorization", format!("Bearer {}", login.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let session: SessionResponse = test::read_body_json(resp).await;
    assert_eq!(session.subject, "operator");
    assert_eq!(session.expires_at, login.expires_at);

    // Last character flipped
    let mut flipped = login.token.clone();
    let last = flipped.pop().unwrap();
    flipped.push(if last == 'A' { 'B' } else { 'A' });
    let req = test::TestRequest::get()
        .uri("/api/operator/session")
        .insert_header(("Authorization", format!("Bearer {}", flipped)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_replay_after_expiry_rejected() {
    let state = init_state("hunter2", unlimited());
    let expired = state
        .auth
        .issuer()
        .issue_at("hunter2", Utc::now() - Duration::hours(8) - Duration::seconds(1))
        .unwrap();

    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::get()
        .uri("/api/operator/session")
        .insert_header(("Authorization", format!("Bearer {}", expired.as_str())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], UNAUTHORIZED_BODY);
}

#[actix_web::test]
async fn test_malformed_login_looks_like_wrong_password() {
    let state = init_state("hunter2", unlimited());
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let wrong = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "password": "hunter3" }))
        .to_request();
    let wrong = test::call_service(&app, wrong).await;
    let wrong_status = wrong.status();
    let wrong_body = test::read_body(wrong).await;

    for payload in [
        "not json",
        "{}",
        r#"{"password": 42}"#,
        r#"{"passwd": "hunter2"}"#,
    ] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), wrong_status, "payload {:?}", payload);
        assert_eq!(test::read_body(resp).await, wrong_body);
    }
}

#[actix_web::test]
async fn test_oversized_login_refused() {
    let state = init_state("hunter2", unlimited());
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let password = "x".repeat(8 * 1024);
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "password": password }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn test_login_is_rate_limited() {
    let state = init_state(
        "hunter2",
        LoginRateLimitConfig {
            attempts_per_minute: 1,
            burst: 2,
        },
    );
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;
    let client = "198.51.100.7:50000".parse().unwrap();

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(client)
            .set_json(json!({ "password": "guess" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused once the bucket is empty
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(client)
        .set_json(json!({ "password": "hunter2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_public_routes() {
    let state = init_state("hunter2", unlimited());
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "ok" }));

    let req = test::TestRequest::get().uri("/openapi.json").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: serde_json::Value = test::read_body_json(resp).await;
    assert!(doc["paths"]["/auth/login"].is_object());
}

#[actix_web::test]
async fn test_protected_route_without_token() {
    let state = init_state("hunter2", unlimited());
    let app =
        test::init_service(App::new().configure(|cfg| routes::configure(cfg, &state))).await;

    let req = test::TestRequest::get()
        .uri("/api/operator/session")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get("WWW-Authenticate").unwrap(), "Bearer");
}
