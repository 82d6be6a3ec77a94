use std::time::Duration;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use cakeorder_auth_types::cookie::CookieSettings;
use cakeorder_core::tracing::init_tracing;
use cakeorder_store::config::StoreConfig;
use cakeorder_store::infra::mail::SmtpMailer;
use cakeorder_store::router::build_router;
use cakeorder_store::state::AppState;
use cakeorder_store::usecase::outbox::OutboxRelay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = StoreConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState {
        db,
        http,
        jwt_secret: config.jwt_secret,
        email_verify_secret: config.email_verify_secret,
        domain_url: config.domain_url,
        cookie: CookieSettings {
            domain: config.cookie_domain,
            secure: config.cookie_secure,
        },
        cloudinary: config.cloudinary,
        razorpay: config.razorpay,
    };

    // Outbox relay
    let relay = OutboxRelay {
        outbox: state.outbox_repo(),
        mailer: SmtpMailer::new(&config.smtp)?,
    };
    tokio::spawn(relay.run(Duration::from_secs(config.outbox_poll_secs.max(1))));

    // HTTP server
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.store_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("store service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
