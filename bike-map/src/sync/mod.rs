//! Live station synchronization.
//!
//! [`StationSync`] polls the realtime feed on a fixed interval, runs every
//! row through the classifier, and publishes [`SyncState`] snapshots over a
//! `watch` channel. It is the only writer of the station collection.

mod state;
mod synchronizer;


pub use state::{SyncOutcome, SyncState};
pub use synchronizer::{DEFAULT_POLL_INTERVAL, StationSync, SyncConfig};
