//! Process-wide registry of tracked instruments.
//!
//! The map sits behind a read/write lock and each entry behind its own mutex,
//! so evaluation passes of different cycles only contend on the instrument
//! they are merging into.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::models::instrument::{FundingInterval, InstrumentState};

pub type InstrumentHandle = Arc<Mutex<InstrumentState>>;

/// Outcome of syncing the registry against a discovery listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

#[derive(Debug, Default)]
pub struct InstrumentRegistry {
    entries: RwLock<BTreeMap<String, InstrumentHandle>>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked set with `listing`.
    ///
    /// Known symbols keep their state and take the new price, unknown ones
    /// are added and symbols missing from the listing are dropped.
    pub async fn sync_symbols(&self, listing: &[(String, f64)]) -> SyncSummary {
        let mut entries = self.entries.write().await;
        let mut next = BTreeMap::new();
        let mut summary = SyncSummary::default();

        for (symbol, price) in listing {
            let handle = match entries.remove(symbol) {
                Some(handle) => {
                    handle.lock().await.price = *price;
                    summary.updated += 1;
                    handle
                }
                None => {
                    summary.added += 1;
                    Arc::new(Mutex::new(InstrumentState::new(symbol.clone(), *price)))
                }
            };
            next.insert(symbol.clone(), handle);
        }

        summary.removed = entries.len();
        *entries = next;

        info!(
            added = summary.added,
            updated = summary.updated,
            removed = summary.removed,
            total = entries.len(),
            "InstrumentRegistry: synced {} instruments",
            entries.len()
        );

        summary
    }

    /// Handles of every tracked instrument, in symbol order.
    pub async fn snapshot(&self) -> Vec<InstrumentHandle> {
        self.entries.read().await.values().cloned().collect()
    }

    pub async fn get(&self, symbol: &str) -> Option<InstrumentHandle> {
        self.entries.read().await.get(symbol).cloned()
    }

    pub async fn symbols(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Set funding intervals on tracked instruments.
    ///
    /// Entries with a zero interval and unknown symbols are ignored. Returns
    /// the intervals that were applied.
    pub async fn apply_funding_intervals(
        &self,
        intervals: &[FundingInterval],
    ) -> Vec<FundingInterval> {
        let entries = self.entries.write().await;
        let mut applied = Vec::new();

        for interval in intervals {
            if interval.interval_hours == 0 {
                continue;
            }
            let Some(handle) = entries.get(&interval.symbol) else {
                debug!(symbol = %interval.symbol, "InstrumentRegistry: funding interval for untracked symbol {}", interval.symbol);
                continue;
            };
            handle.lock().await.funding_interval_hours = interval.interval_hours;
            applied.push(interval.clone());
        }

        applied
    }
}
