mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use sqlshelf_api::assistant::Assistant;
use sqlshelf_api::{AppStateInner, Settings};
use sqlshelf_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlshelf=debug,sqlshelf_api=debug,sqlshelf_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    let assistant = match config.assistant {
        Some(ai) => {
            info!("AI assistant enabled ({} models)", ai.models.len());
            Some(Assistant::new(ai)?)
        }
        None => {
            info!("GEMINI_API_KEY not set, AI assistant disabled");
            None
        }
    };

    let settings = Settings {
        jwt_secret: config.jwt_secret,
        token_ttl: config.token_ttl,
        public_url: config.public_url,
    };
    let app = sqlshelf_api::router(AppStateInner::new(db, settings, assistant));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("SQLShelf server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
