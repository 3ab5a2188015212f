//! Poll/dedup/dispatch loop for giveaway-scout.
//!
//! Each cycle loads the subscriber snapshot, fetches every source once,
//! drops stale and already-dispatched items, matches titles against the
//! keyword list and sends a notification for each remaining item.

pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod message;
pub mod scheduler;

pub use dedup::{item_key, DedupCache, DedupScope, DedupStore, DEFAULT_DEDUP_CAPACITY};
pub use dispatcher::{CycleReport, DispatchSettings, PollDispatcher};
pub use error::{RecoveryScope, ScanError};
pub use filter::{matches, KeywordMatcher, RecencyWindow};
pub use message::format_notification;
pub use scheduler::{spawn_scheduler, ReadinessGate, SchedulerHandle};
