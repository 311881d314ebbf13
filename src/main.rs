use learning_proxy::config::AppConfig;
use learning_proxy::{build_router, db, AppState};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = AppConfig::from_env();
    if let Err(e) = config.validate() {
        tracing::error!("❌ Invalid configuration: {}", e);
        return Err(e.into());
    }

    tracing::info!(
        "Configuration - Environment: {}, PostgREST: {}, Token verifier: {}, Image upload: {}",
        config.environment,
        config.postgrest_url,
        config.token_verifier.as_str(),
        if config.freeimage_api_key.is_empty() { "❌" } else { "✅" }
    );
    if config.is_development() {
        tracing::info!("Allowed origins: {}", config.allowed_origins.join(", "));
    }

    let db_pool = db::create_pool(&config.database)?;
    if !db::test_connection(&db_pool).await {
        tracing::warn!("Database not reachable yet; token checks will fail until it is");
    }

    let port = config.port;
    let shared_state = Arc::new(AppState::new(config, db_pool)?);
    let app = build_router(shared_state);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    tracing::info!("🔐 Auth proxy listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
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

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,learning_proxy=debug,sqlx=info,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,learning_proxy=info,sqlx=warn,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("🔐 Learning Platform Auth Proxy starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
