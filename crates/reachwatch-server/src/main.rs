mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use reachwatch_collector::Collector;
use reachwatch_core::SettingsStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(reachwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Arc::new(SettingsStore::load(&config.settings_path).await?);
    let fetchers = reachwatch_scraper::default_fetchers(&config)?;
    let collector = Arc::new(Collector::new(Arc::clone(&settings), fetchers).await);
    tracing::info!(
        env = %config.env,
        settings = %config.settings_path.display(),
        ttl_secs = collector.ttl().as_secs(),
        "reachwatch starting"
    );

    let webhook_client =
        reachwatch_scraper::build_http_client(config.request_timeout_secs, &config.user_agent)?;
    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&collector),
        Arc::clone(&settings),
        webhook_client,
    )
    .await?;

    let auth = AuthState::from_tokens(&config.api_tokens);
    let app = build_app(
        AppState {
            collector,
            settings,
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
