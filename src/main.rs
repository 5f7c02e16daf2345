//! CompanionX API server.

use std::sync::Arc;

use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use companionx::adapters::http::{api_router, AppState, JwtVerifier};
use companionx::adapters::notifications::{LoggingNotificationSink, WebhookNotificationSink};
use companionx::adapters::PostgresEntityStore;
use companionx::application::Notifier;
use companionx::config::{AppConfig, LogFormat, ServerConfig};
use companionx::ports::NotificationSink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let sink: Arc<dyn NotificationSink> = match config.notifications.webhook() {
        Some(webhook) => {
            tracing::info!(url = %webhook.url(), "Delivering notifications by webhook");
            Arc::new(WebhookNotificationSink::new(webhook)?)
        }
        None => Arc::new(LoggingNotificationSink),
    };

    let state = AppState::new(
        Arc::new(PostgresEntityStore::new(pool)),
        Notifier::new(sink),
        config.pricing.schedule()?,
        JwtVerifier::from_config(&config.auth),
    );
    let app = api_router(state).layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "CompanionX listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("CompanionX shutting down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
