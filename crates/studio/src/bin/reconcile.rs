//! Cascade reconcile over a JSON snapshot.
//!
//! Reads `{ "products": [...], "designs": [...] }` from `VENDORA_SNAPSHOT` and
//! loads it into an in-memory catalog, which applies the snapshot's design
//! decisions to its products. By default one store refresh picks them up and
//! the resulting dashboard stats are printed as JSON. With `VENDORA_WATCH`
//! set, the studio background services keep running until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vendora_core::design::Design;
use vendora_core::product::{RawVendorProduct, VendorProduct};
use vendora_events::{EventBus, StudioEvent, Toast};
use vendora_studio::clock::SystemClock;
use vendora_studio::config::StudioConfig;
use vendora_studio::memory::{InMemoryCatalog, InMemoryTransformStorage};
use vendora_studio::product_store::ProductStore;
use vendora_studio::runtime::StudioRuntime;

#[derive(Debug, Deserialize)]
struct Snapshot {
    products: Vec<RawVendorProduct>,
    #[serde(default)]
    designs: Vec<Design>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vendora_studio=debug,vendora_reconcile=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StudioConfig::from_env()?;
    let path = config
        .snapshot_path
        .clone()
        .context("VENDORA_SNAPSHOT must point at a snapshot file")?;

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw).context("parsing snapshot")?;
    let products = snapshot
        .products
        .into_iter()
        .map(VendorProduct::ingest)
        .collect::<Result<Vec<_>, _>>()
        .context("ingesting products")?;

    tracing::info!(
        products = products.len(),
        designs = snapshot.designs.len(),
        watch = config.watch,
        "Snapshot loaded"
    );

    let clock = Arc::new(SystemClock);
    let catalog = Arc::new(InMemoryCatalog::new(clock.clone()));
    catalog.seed(products, snapshot.designs);

    if config.watch {
        return watch(&config, catalog, clock).await;
    }

    let events = Arc::new(EventBus::new(config.event_bus_capacity));
    let mut notifications = events.subscribe();
    let store = ProductStore::new(catalog.clone(), events, clock);

    store.load().await?;
    catalog.apply_design_decisions();
    let report = store.refresh().await?;

    for event in vendora_events::drain(&mut notifications) {
        log_toast(&event);
    }

    tracing::info!(
        changes = report.changes.len(),
        unvalidated_drafts = report.stats.unvalidated_drafts(),
        "Reconcile complete"
    );
    println!("{}", serde_json::to_string_pretty(&report.stats)?);
    Ok(())
}

/// Run the studio background services over the snapshot until shutdown.
async fn watch(
    config: &StudioConfig,
    catalog: Arc<InMemoryCatalog>,
    clock: Arc<SystemClock>,
) -> anyhow::Result<()> {
    let storage = Arc::new(InMemoryTransformStorage::new());
    let runtime = StudioRuntime::start(config, catalog.clone(), storage, clock);
    let toast_handle = tokio::spawn(log_toasts(runtime.events.subscribe()));

    runtime.store.load().await?;
    catalog.apply_design_decisions();

    shutdown_signal().await;

    let stats = runtime.store.stats().await;
    runtime.shutdown().await;
    // Every bus handle is gone now, which ends the toast logger.
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), toast_handle).await;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn log_toast(event: &StudioEvent) {
    if let Some(toast) = Toast::from_event(event) {
        tracing::info!(level = ?toast.level, title = %toast.title, "{}", toast.message);
    }
}

async fn log_toasts(mut rx: broadcast::Receiver<StudioEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => log_toast(&event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Toast logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Wait for Ctrl-C or, on Unix, SIGTERM.
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
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
