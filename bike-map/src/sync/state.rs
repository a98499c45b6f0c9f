//! Published synchronizer state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::ApiError;
use crate::domain::Station;

/// Snapshot of the live station collection.
///
/// On a failed cycle the previous `stations` stay in place alongside the
/// new `error`; they are not marked stale.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncState {
    pub stations: Arc<Vec<Station>>,
    /// A fetch is in flight.
    pub loading: bool,
    /// Why the most recent cycle failed.
    pub error: Option<String>,
    /// When the collection was last replaced. Never set by a failure.
    pub last_updated: Option<DateTime<Utc>>,
}

impl SyncState {
    /// Whether a successful sync has ever completed.
    pub fn has_data(&self) -> bool {
        self.last_updated.is_some()
    }
}

/// What one call into the synchronizer did.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// New stations were published.
    Published { stations: usize },
    /// The fetch failed; previous stations were kept.
    Failed(ApiError),
    /// Another fetch was already in flight, so none was started.
    Skipped,
    /// The synchronizer was stopped; nothing was (or will be) published.
    Cancelled,
}
