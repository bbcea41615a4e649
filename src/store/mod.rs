//! Ordered store of intake records.
//!
//! The store is the single mutable collection in the application. Records
//! are kept newest-first, identifiers come from a monotonically increasing
//! counter, and the summary statistics are recomputed inside every mutating
//! operation so readers always observe post-mutation values.

use crate::models::{RecordDraft, StatementRecord, Stats};
use crate::stats;
use tracing::debug;

/// Newest-first collection of [`StatementRecord`]s with cached statistics.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Vec<StatementRecord>,
    stats: Stats,
    next_id: u64,
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            stats: Stats::default(),
            next_id: 1,
        }
    }

    /// Prepends the drafts as one contiguous group, preserving their
    /// relative order, and assigns each a fresh id.
    ///
    /// No deduplication by filename or content is performed.
    pub fn add(&mut self, drafts: Vec<RecordDraft>) {
        if drafts.is_empty() {
            return;
        }

        let mut group: Vec<StatementRecord> = drafts
            .into_iter()
            .map(|draft| {
                let id = self.next_id;
                self.next_id += 1;
                StatementRecord::from_draft(id, draft)
            })
            .collect();

        group.append(&mut self.records);
        self.records = group;
        self.recompute();
        debug!("Store now holds {} records", self.records.len());
    }

    /// Removes the record with the given id. Returns whether a record was
    /// removed; an unknown id is a silent no-op.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.records.iter().position(|r| r.id == id) {
            Some(index) => {
                self.records.remove(index);
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.records.clear();
        self.recompute();
    }

    /// Current records, newest first.
    pub fn records(&self) -> &[StatementRecord] {
        &self.records
    }

    /// Statistics for the current contents.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn recompute(&mut self) {
        self.stats = stats::compute(&self.records);
    }
}
