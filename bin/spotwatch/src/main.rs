use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{Config, RawQuote, TickStore};
use engine::{CoinbaseClient, Ingestor, Poller, SnapshotWriter};
use store::SqliteTickStore;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().unwrap_or_else(|e| panic!("{e}"));
    info!(instruments = ?cfg.instruments, "Spotwatch starting");

    // ── Database ──────────────────────────────────────────────────────────────
    let sqlite = SqliteTickStore::connect(&cfg.database_url)
        .await
        .unwrap_or_else(|e| panic!("Failed to open tick store: {e}"));
    let store: Arc<dyn TickStore> = Arc::new(sqlite);
    info!(url = %cfg.database_url, "Tick store ready");

    // ── Quote source ──────────────────────────────────────────────────────────
    let coinbase = CoinbaseClient::new(&cfg.coinbase_base_url, cfg.fetch_timeout)
        .unwrap_or_else(|e| panic!("Failed to build Coinbase client: {e}"));

    // ── Pipeline ──────────────────────────────────────────────────────────────
    let (quote_tx, quote_rx) = mpsc::channel::<RawQuote>(256);
    let ingestor = Arc::new(Ingestor::new(store.clone()));
    let poller = Poller::new(
        Arc::new(coinbase),
        cfg.instruments.clone(),
        cfg.fetch_interval,
        cfg.fetch_timeout,
        quote_tx,
    );

    tokio::spawn(ingestor.run(quote_rx));
    tokio::spawn(poller.run());

    // ── OHLC snapshots (optional) ─────────────────────────────────────────────
    if let Some(dir) = &cfg.snapshot_dir {
        let writer = SnapshotWriter::new(
            store.clone(),
            cfg.instruments.clone(),
            dir,
            cfg.snapshot_interval,
        );
        tokio::spawn(writer.run());
    }

    // ── Read API ──────────────────────────────────────────────────────────────
    let api_state = api::AppState {
        store,
        instruments: Arc::new(cfg.instruments.clone()),
        app_user: cfg.app_user.clone(),
        app_pass: cfg.app_pass.clone(),
    };
    let port = cfg.http_port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "Read API stopped");
        }
    });

    // Keep main alive
    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
