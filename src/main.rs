use file_blog::{
    AppState, FileRepository, MemorySessionStore, RepositoryState, SessionState,
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging, the record store and session store, then serves
/// HTTP until the process is stopped.
#[tokio::main]
async fn main() {
    // 1. Environment: an optional .env file feeds both logging and configuration.
    dotenv::dotenv().ok();

    // 2. Logging filter: RUST_LOG wins, otherwise app debug + request summaries.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "file_blog=debug,tower_http=info".into());

    // Subscriber is installed before the config is read so credential fallback
    // warnings are not lost. The format is switched on APP_ENV directly for the same reason.
    let production = std::env::var("APP_ENV").is_ok_and(|value| value == "production");
    if production {
        // PROD: JSON lines for log aggregation.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // LOCAL: pretty output for humans.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    // Fails fast on missing production credentials.
    let config = AppConfig::load();
    tracing::info!("Blog starting in {:?} mode", config.env);
    if config.env == Env::Local && !config.cookie_secure {
        tracing::info!("Session cookie is not marked Secure; serve over HTTPS in production.");
    }

    // 3. Record Store: creates the articles directory if it does not exist yet.
    let repo = match FileRepository::open(&config.articles_dir).await {
        Ok(repo) => Arc::new(repo) as RepositoryState,
        Err(err) => {
            tracing::error!(error = %err, dir = %config.articles_dir, "FATAL: cannot open articles directory");
            std::process::exit(1);
        }
    };

    // 4. Session Store
    let sessions = Arc::new(MemorySessionStore::new(config.session_ttl_secs)) as SessionState;

    // 5. Unified State Assembly and Router
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, sessions, config));

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %bind_addr, "FATAL: failed to bind HTTP listener");
            std::process::exit(1);
        }
    };
    tracing::info!("Blog running at http://{}", bind_addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server error");
    }
}
