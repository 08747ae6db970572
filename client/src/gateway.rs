//! Remote gateway - the engine's view of the other side.
//!
//! The gateway hides everything about how the remote collection is reached.
//! It hands back raw JSON values (normalization is the engine's job, not the
//! transport's) and takes the change log's wire shape on push. Push is
//! all-or-nothing from the change log's perspective: an `Err` means the
//! whole drained batch is retained for the next cycle.

use async_trait::async_trait;
use quotesync_engine::{Change, Quote};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Gateway failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Remote unreachable or non-OK status
    #[error("transport failure: {0}")]
    Transport(String),

    /// Remote payload was not a JSON array
    #[error("malformed remote payload: {0}")]
    Parse(String),
}

/// Fetch/push capability over the remote quote collection.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Fetch the remote snapshot as raw JSON values.
    async fn fetch_snapshot(&self) -> Result<Vec<serde_json::Value>, GatewayError>;

    /// Push pending changes. Best-effort and all-or-nothing: `Ok(())` clears
    /// the drained batch, `Err` retains it in full.
    async fn push(&self, changes: &[Change]) -> Result<(), GatewayError>;
}

#[async_trait]
impl<T: RemoteGateway + ?Sized> RemoteGateway for std::sync::Arc<T> {
    async fn fetch_snapshot(&self) -> Result<Vec<serde_json::Value>, GatewayError> {
        (**self).fetch_snapshot().await
    }

    async fn push(&self, changes: &[Change]) -> Result<(), GatewayError> {
        (**self).push(changes).await
    }
}

/// Simulated remote collection.
///
/// Stands in for a real server: holds its own record set, accepts pushes,
/// and can be toggled offline to exercise the degraded paths. This is the
/// only gateway the repo ships - there is deliberately no network
/// implementation behind the contract.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    records: Mutex<Vec<Quote>>,
    offline: AtomicBool,
    reject_pushes: AtomicBool,
}

impl InMemoryGateway {
    /// Create an empty simulated remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulated remote pre-populated with records.
    pub fn with_records(records: Vec<Quote>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Simulate the remote being unreachable (both fetch and push fail).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Simulate the remote rejecting pushes while fetch keeps working.
    pub fn set_reject_pushes(&self, reject: bool) {
        self.reject_pushes.store(reject, Ordering::SeqCst);
    }

    /// Replace the remote collection wholesale.
    pub fn set_records(&self, records: Vec<Quote>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
    }

    /// Snapshot of the remote collection (inspection in tests and demos).
    pub fn records(&self) -> Vec<Quote> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn fetch_snapshot(&self) -> Result<Vec<serde_json::Value>, GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("remote unreachable".into()));
        }

        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .iter()
            .map(|q| serde_json::to_value(q).map_err(|e| GatewayError::Parse(e.to_string())))
            .collect()
    }

    async fn push(&self, changes: &[Change]) -> Result<(), GatewayError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("remote unreachable".into()));
        }
        if self.reject_pushes.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("push rejected".into()));
        }

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        for change in changes {
            let incoming = change.record.clone();
            match records.iter_mut().find(|q| q.id == incoming.id) {
                Some(existing) => *existing = incoming,
                None => records.push(incoming),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: &str, ts: u64) -> Quote {
        Quote::new(id, format!("text-{id}"), "c", ts)
    }

    #[tokio::test]
    async fn fetch_returns_remote_records_as_values() {
        let gateway = InMemoryGateway::with_records(vec![quote("a", 1), quote("b", 2)]);

        let snapshot = gateway.fetch_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0]["id"], "a");
        assert_eq!(snapshot[1]["lastModified"], 2);
    }

    #[tokio::test]
    async fn offline_fails_fetch_and_push() {
        let gateway = InMemoryGateway::new();
        gateway.set_offline(true);

        assert!(matches!(
            gateway.fetch_snapshot().await,
            Err(GatewayError::Transport(_))
        ));
        assert!(matches!(
            gateway.push(&[Change::add(quote("a", 1))]).await,
            Err(GatewayError::Transport(_))
        ));

        gateway.set_offline(false);
        assert!(gateway.fetch_snapshot().await.is_ok());
    }

    #[tokio::test]
    async fn push_upserts_into_remote_collection() {
        let gateway = InMemoryGateway::with_records(vec![quote("a", 1)]);

        gateway
            .push(&[
                Change::update(Quote::new("a", "edited", "c", 5)),
                Change::add(quote("b", 2)),
            ])
            .await
            .unwrap();

        let records = gateway.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "edited");
        assert_eq!(records[1].id, "b");
    }

    #[tokio::test]
    async fn rejected_push_leaves_remote_untouched() {
        let gateway = InMemoryGateway::with_records(vec![quote("a", 1)]);
        gateway.set_reject_pushes(true);

        let result = gateway.push(&[Change::add(quote("b", 2))]).await;
        assert!(result.is_err());
        assert_eq!(gateway.records().len(), 1);

        // Fetch still works in this failure mode
        assert!(gateway.fetch_snapshot().await.is_ok());
    }
}
