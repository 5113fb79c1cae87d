use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use grl_gateway::{App, AppState, Config};
use grl_shortener::{ShortenerService, ShortenerSettings};
use grl_storage::{Store, StoreRepository};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let _telemetry = grl_telemetry::init(&config.telemetry_settings())?;

    info!(
        db_path = %config.db_path.display(),
        collection = %config.collection,
        id_encoding = %config.id_encoding,
        mode = %config.mode,
        "starting grl"
    );

    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;

    if let Err(err) = store.ensure_collection(&config.collection, config.collection_policy()) {
        close_store(store);
        return Err(anyhow::Error::new(err).context("failed to prepare collection"));
    }

    let repository = StoreRepository::new(store.clone(), config.collection.as_str());
    let settings = ShortenerSettings::builder()
        .encoding(config.encoding())
        .build();
    let service = ShortenerService::new(repository, settings);
    let state = AppState::new(Arc::new(service), config.shorten_mode());

    let served = serve(config.listen_addr(), state).await;
    if let Err(err) = &served {
        error!(error = %err, "server stopped with an error");
    }

    close_store(store);
    served
}

async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")
}

/// Every request holds a store handle only while it runs, so once the server
/// has drained this is the last one.
fn close_store(store: Store) {
    match store.close() {
        Ok(()) => info!("store closed"),
        Err(err) => warn!(error = %err, "store not closed cleanly"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
