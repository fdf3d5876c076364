//! Fetched datasets and the derived-view cache.
//!
//! The store only changes when a fetch completes. Each fetch is issued a
//! ticket carrying a per-dataset sequence number; a response whose ticket is
//! older than the newest issued for that dataset is discarded, so a slow
//! earlier request can never overwrite fresher data.

use std::collections::HashMap;

use previx_core::construction_cost::ConstructionCost;
use previx_core::types::Dataset;
use previx_core::wear::WearCoefficient;

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub dataset: Dataset,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct DataStore {
    wear: Vec<WearCoefficient>,
    costs: Vec<ConstructionCost>,
    /// Bumped on every applied fetch; keys the derived-view cache.
    revision: u64,
    next_seq: u64,
    latest: HashMap<Dataset, u64>,
}

impl DataStore {
    pub fn wear(&self) -> &[WearCoefficient] {
        &self.wear
    }

    pub fn costs(&self) -> &[ConstructionCost] {
        &self.costs
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a new fetch for `dataset`, superseding earlier ones.
    pub fn begin_fetch(&mut self, dataset: Dataset) -> FetchTicket {
        self.next_seq += 1;
        self.latest.insert(dataset, self.next_seq);
        FetchTicket {
            dataset,
            seq: self.next_seq,
        }
    }

    /// Whether `ticket` is still the newest fetch for its dataset.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.get(&ticket.dataset) == Some(&ticket.seq)
    }

    /// Replace the wear list. Returns `false` (and changes nothing) for a
    /// superseded or mismatched ticket.
    pub fn apply_wear(&mut self, ticket: FetchTicket, rows: Vec<WearCoefficient>) -> bool {
        if ticket.dataset != Dataset::WearCoefficients || !self.is_current(ticket) {
            tracing::debug!(seq = ticket.seq, "Discarding stale wear coefficient response");
            return false;
        }
        self.wear = rows;
        self.revision += 1;
        true
    }

    /// Replace the cost list. Same contract as [`Self::apply_wear`].
    pub fn apply_costs(&mut self, ticket: FetchTicket, rows: Vec<ConstructionCost>) -> bool {
        if ticket.dataset != Dataset::ConstructionCosts || !self.is_current(ticket) {
            tracing::debug!(seq = ticket.seq, "Discarding stale construction cost response");
            return false;
        }
        self.costs = rows;
        self.revision += 1;
        true
    }
}

/// Single-entry cache: recomputes only when the key changes.
#[derive(Debug)]
pub struct Memo<K, V> {
    key: Option<K>,
    value: V,
}

impl<K, V: Default> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            key: None,
            value: V::default(),
        }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> &V {
        if self.key.as_ref() != Some(&key) {
            self.value = compute();
            self.key = Some(key);
        }
        &self.value
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
