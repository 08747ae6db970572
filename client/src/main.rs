//! QuoteSync demo client.
//!
//! Wires the sync service to an in-memory persistence store and a simulated
//! remote collection, then lets the scheduler run cycles until ctrl-c. The
//! event stream the embedding UI would render is logged instead.

use quotesync_client::{
    Config, EventBus, InMemoryGateway, MemoryStore, Scheduler, Severity, SyncService, UiEvent,
};
use quotesync_engine::Quote;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The stock collection a fresh install starts with.
fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "default-1",
            "The best way to predict the future is to create it.",
            "Motivation",
            0,
        ),
        Quote::new(
            "default-2",
            "Life is what happens when you're busy making other plans.",
            "Life",
            0,
        ),
        Quote::new(
            "default-3",
            "Do not be afraid to give up the good to go for the great.",
            "Success",
            0,
        ),
    ]
}

/// What the simulated remote already holds.
fn remote_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "server-1",
            "Simplicity is the soul of efficiency.",
            "Server",
            1_700_000_000_000,
        ),
        Quote::new(
            "server-2",
            "Make it work, make it right, make it fast.",
            "Server",
            1_700_000_100_000,
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotesync_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        "Starting QuoteSync client, syncing every {:?}",
        config.sync_interval
    );

    let gateway = InMemoryGateway::with_records(remote_quotes());
    let (events, mut event_rx) = EventBus::channel();

    let mut service = SyncService::load(MemoryStore::new(), gateway, events)?;
    let seeded = service.seed_if_empty(default_quotes())?;
    if seeded > 0 {
        tracing::info!("seeded {} default quote(s)", seeded);
    }

    // A local edit so the first cycle has something to push
    service.add_quote("What gets measured gets managed.", "Productivity")?;

    let service = Arc::new(Mutex::new(service));

    if config.sync_on_start {
        service.lock().await.sync_cycle().await?;
    }

    let handle = Scheduler::spawn(service.clone(), config.sync_interval);

    // Render the event stream the way a UI would
    let renderer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                UiEvent::Notice { message, severity } => match severity {
                    Severity::Warning | Severity::Error => tracing::warn!("[notice] {}", message),
                    _ => tracing::info!("[notice] {}", message),
                },
                UiEvent::ConflictPending { conflict } => {
                    tracing::warn!(
                        "[conflict] '{}' differs: local '{}' vs server '{}'",
                        conflict.record_id(),
                        conflict.local.text,
                        conflict.server.text
                    );
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    handle.stop().await;
    drop(service);
    let _ = renderer.await;

    Ok(())
}
