//! Scheduling wrapper - periodic and on-demand sync cycles.
//!
//! A single tokio task owns the cadence: a fixed interval plus a manual
//! trigger. Cycles never overlap - the service sits behind a mutex and a
//! contended tick is skipped, not queued. Shutdown is cooperative: an
//! in-flight cycle always completes before the task exits.

use crate::gateway::RemoteGateway;
use crate::storage::StateStore;
use crate::sync::SyncService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running scheduler task.
///
/// Dropping the handle stops the scheduler after any in-flight cycle.
pub struct SchedulerHandle {
    trigger: mpsc::Sender<()>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request a sync cycle now, without waiting for the next tick.
    ///
    /// Requests coalesce: asking while one is already queued is a no-op.
    pub fn request_sync(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the scheduler, waiting for any in-flight cycle to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// The periodic sync trigger.
pub struct Scheduler;

impl Scheduler {
    /// Spawn the scheduler task for a shared sync service.
    ///
    /// The first scheduled cycle fires one full interval after spawn; run
    /// one explicitly beforehand if sync-on-start is wanted.
    pub fn spawn<S, G>(
        service: Arc<Mutex<SyncService<S, G>>>,
        interval: Duration,
    ) -> SchedulerHandle
    where
        S: StateStore + 'static,
        G: RemoteGateway + 'static,
    {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval's first tick completes immediately; the cadence
            // starts one interval from now
            ticker.tick().await;

            loop {
                tokio::select! {
                    // Err means the handle is gone - shut down either way
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                    Some(()) = trigger_rx.recv() => {}
                }
                run_cycle(&service).await;
            }
        });

        SchedulerHandle {
            trigger: trigger_tx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

async fn run_cycle<S, G>(service: &Mutex<SyncService<S, G>>)
where
    S: StateStore,
    G: RemoteGateway,
{
    // A held lock means a cycle (or a resolution) is in flight; skip this
    // tick rather than stack a second cycle behind it.
    match service.try_lock() {
        Ok(mut svc) => {
            if let Err(err) = svc.sync_cycle().await {
                tracing::error!("sync cycle failed: {}", err);
            }
        }
        Err(_) => tracing::debug!("sync already in flight, skipping tick"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;
    use crate::gateway::InMemoryGateway;
    use crate::storage::MemoryStore;
    use quotesync_engine::Quote;

    fn shared_service(
        gateway: Arc<InMemoryGateway>,
    ) -> Arc<Mutex<SyncService<MemoryStore, Arc<InMemoryGateway>>>> {
        let svc = SyncService::load(MemoryStore::new(), gateway, EventBus::sink()).unwrap();
        Arc::new(Mutex::new(svc))
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_cycle_fires_after_one_interval() {
        let gateway = Arc::new(InMemoryGateway::with_records(vec![Quote::new(
            "r", "remote", "c", 5,
        )]));
        let service = shared_service(gateway);
        let handle = Scheduler::spawn(service.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(!service.lock().await.quotes().contains("r"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.stop().await;

        assert!(service.lock().await.quotes().contains("r"));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_trigger_does_not_wait_for_the_tick() {
        let gateway = Arc::new(InMemoryGateway::with_records(vec![Quote::new(
            "r", "remote", "c", 5,
        )]));
        let service = shared_service(gateway);
        let handle = Scheduler::spawn(service.clone(), Duration::from_secs(3600));

        handle.request_sync();
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.stop().await;

        assert!(service.lock().await.quotes().contains("r"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_cycles() {
        let gateway = Arc::new(InMemoryGateway::new());
        let service = shared_service(gateway.clone());
        let handle = Scheduler::spawn(service.clone(), Duration::from_secs(30));

        handle.stop().await;

        // A record added to the remote after stop is never fetched
        gateway.set_records(vec![Quote::new("late", "t", "c", 1)]);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!service.lock().await.quotes().contains("late"));
    }
}
