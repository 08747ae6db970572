//! # QuoteSync Client
//!
//! The orchestration layer around [`quotesync_engine`]: it owns the
//! persistence slots, the remote gateway, the wall clock, the event surface
//! the UI renders, and the scheduler that drives periodic sync cycles.
//!
//! The split mirrors the engine's no-IO rule: everything deterministic
//! lives in the engine crate; everything that touches time, storage, or the
//! remote lives here.
//!
//! ## Quick Start
//!
//! ```rust
//! use quotesync_client::{EventBus, InMemoryGateway, MemoryStore, SyncService};
//! use quotesync_engine::Quote;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gateway = InMemoryGateway::with_records(vec![
//!     Quote::new("server-1", "Less is more.", "Server", 100),
//! ]);
//! let mut service =
//!     SyncService::load(MemoryStore::new(), gateway, EventBus::sink()).unwrap();
//!
//! let report = service.sync_cycle().await.unwrap();
//! assert_eq!(report.merge.unwrap().added, 1);
//! # });
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod scheduler;
pub mod storage;
pub mod sync;

// Re-export main types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError};
pub use error::{Result, SyncError};
pub use event::{EventBus, Severity, UiEvent};
pub use gateway::{GatewayError, InMemoryGateway, RemoteGateway};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use storage::{MemoryStore, StateStore, StorageError, CHANGELOG_SLOT, QUOTES_SLOT};
pub use sync::{PushStatus, SyncReport, SyncService};
