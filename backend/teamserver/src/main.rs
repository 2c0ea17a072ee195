use actix_middleware::AccessLog;
use actix_web::{App, HttpServer};
use anyhow::Context;
use clap::Parser;
use operator_auth::{CredentialStrength, OperatorAuth, OperatorCredential};
use teamserver::{cli::Cli, config::Settings, logging, routes, state::AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Nothing is configured or bound without a password
    let credential = OperatorCredential::from_launch_arg(cli.password)
        .context("usage: teamserver <PASSWORD>")?;

    let settings = Settings::from_env()?;
    logging::init_tracing(settings.log_format);

    match credential.strength() {
        CredentialStrength::Weak => tracing::warn!(
            "operator password is weak; captured tokens are easier to brute-force offline"
        ),
        strength => tracing::info!(strength = strength.as_str(), "operator password accepted"),
    }

    let auth = OperatorAuth::initialize(credential, settings.auth.clone())
        .context("failed to derive operator signing key")?;
    let state = AppState::new(auth, settings.login_limit);

    if !state.login_limit.is_enabled() {
        tracing::warn!("login rate limiting disabled");
    }

    let bind_addr = cli
        .bind
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| settings.server.bind_addr());
    tracing::info!(%bind_addr, "starting teamserver");

    let mut server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(AccessLog)
            .configure(move |cfg| routes::configure(cfg, &state))
    });
    if let Some(workers) = settings.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(&bind_addr)
        .with_context(|| format!("failed to bind {bind_addr}"))?
        .run()
        .await
        .context("server terminated abnormally")
}
