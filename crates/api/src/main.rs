use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use orientati_api::config::ServerConfig;
use orientati_api::error::set_expose_internal;
use orientati_api::router::build_app_router;
use orientati_api::state::AppState;
use orientati_broker::{
    AmqpTransport, BrokerConfig, BrokerService, Dispatcher, LoggingHandler, MessageBus, Transport,
};
use orientati_core::config::{env_required, env_string};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = env_string("LOG_FORMAT", "text").eq_ignore_ascii_case("json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orientati_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(fmt::layer))
        .with(sentry_tracing::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        api_prefix = %config.api_prefix,
        "Loaded server configuration"
    );
    set_expose_internal(!config.is_production());

    // --- Error reporting ---
    // Events are dropped until a client is bound, so the tracing layer above
    // stays inert without SENTRY_DSN. The guard flushes on drop.
    let _sentry = init_sentry(&config)?;

    // --- Database ---
    let database_url = env_required("DATABASE_URL")?;

    let pool = orientati_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    orientati_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    orientati_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Message bus + broker ---
    let bus = Arc::new(MessageBus::default());
    let broker = match BrokerConfig::from_env()? {
        Some(broker_config) => {
            let mut dispatcher = Dispatcher::new();
            for exchange in &broker_config.exchanges {
                dispatcher.register(exchange.clone(), Arc::new(LoggingHandler));
            }
            let transport = AmqpTransport::new(broker_config.url.clone());
            let endpoint = transport.endpoint();
            match BrokerService::start(
                transport,
                broker_config.exchanges.clone(),
                broker_config.retry,
                Arc::clone(&bus),
                dispatcher,
            )
            .await
            {
                Ok(service) => {
                    tracing::info!(exchanges = ?broker_config.exchanges, "Broker service started");
                    Some(service)
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        endpoint = %endpoint,
                        "Unable to connect to the message broker"
                    );
                    // Return rather than exit so the Sentry guard flushes.
                    return Err(e).context("Message broker unavailable");
                }
            }
        }
        None => {
            tracing::warn!("BROKER_URL is not set, broker subscription disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let service = axum::ServiceExt::<axum::extract::Request>::into_make_service(app);
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(service) = broker {
        let timeout = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(timeout, service.shutdown()).await.is_err() {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Broker shutdown timed out"
            );
        }
    }
    drop(bus);

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Bind a Sentry client when `SENTRY_DSN` is configured.
fn init_sentry(config: &ServerConfig) -> anyhow::Result<Option<sentry::ClientInitGuard>> {
    let Some(dsn) = config.sentry_dsn.as_deref() else {
        tracing::info!("SENTRY_DSN is not set, error reporting disabled");
        return Ok(None);
    };
    let dsn: sentry::types::Dsn = dsn.parse().context("Invalid SENTRY_DSN")?;

    let release = match &config.sentry_release {
        Some(release) => Some(release.clone().into()),
        None => sentry::release_name!(),
    };
    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release,
        environment: Some(config.environment.clone().into()),
        ..Default::default()
    });
    tracing::info!(environment = %config.environment, "Sentry error reporting enabled");
    Ok(Some(guard))
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM to initiate graceful shutdown.
///
/// A handler that cannot be installed is logged and never fires, so the
/// other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
