//! Stillpoint API server entry point.
//!
//! Loads configuration, connects adapters, and serves the checkout API.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stillpoint::adapters::http::{checkout_router, CheckoutAppState};
use stillpoint::adapters::postgres::{
    PostgresCustomerRegistry, PostgresDeliveryLog, PostgresProductCatalog, PostgresPurchaseLedger,
};
use stillpoint::adapters::resend::{ResendConfig, ResendMailer};
use stillpoint::adapters::stripe::{StripeConfig, StripePaymentGateway};
use stillpoint::config::AppConfig;
use stillpoint::ports::{Mailer, PaymentGateway};

#[tokio::main]
async fn main() {
    let config = AppConfig::load().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    // RUST_LOG wins over the configured filter when set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database pool created");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        tracing::info!("Migrations applied");
    }

    let gateway: Option<Arc<dyn PaymentGateway>> = match (
        &config.payment.stripe_api_key,
        &config.payment.stripe_webhook_secret,
    ) {
        (Some(api_key), Some(webhook_secret)) => {
            let stripe = StripeConfig::new(api_key.clone(), webhook_secret.clone())
                .with_require_livemode(config.server.is_production());
            Some(Arc::new(StripePaymentGateway::new(stripe)))
        }
        _ => {
            tracing::warn!("Stripe keys absent, paid checkout and webhooks are disabled");
            None
        }
    };

    let mailer: Option<Arc<dyn Mailer>> = match &config.email.resend_api_key {
        Some(api_key) => Some(Arc::new(ResendMailer::new(ResendConfig::new(
            api_key.clone(),
            config.email.from_header(),
        )))),
        None => {
            tracing::warn!("Resend key absent, delivery emails will be logged instead of sent");
            None
        }
    };

    let state = CheckoutAppState {
        catalog: Arc::new(PostgresProductCatalog::new(pool.clone())),
        registry: Arc::new(PostgresCustomerRegistry::new(pool.clone())),
        ledger: Arc::new(PostgresPurchaseLedger::new(pool.clone())),
        delivery_log: Arc::new(PostgresDeliveryLog::new(pool)),
        gateway,
        mailer,
        download_base_url: config.email.download_base_url.clone(),
    };

    let app = checkout_router()
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config))
        // 64 KB cap; gateway events are typically under 20 KB
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!("stillpoint listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// CORS from configured origins; permissive when none are set (development).
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
