// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Adjustment Store
// ─────────────────────────────────────────────────────────────────────
//! Repository for per-pattern adjustment records.
//!
//! The in-memory backend keeps records in a `DashMap`; an update runs
//! while the entry's shard lock is held, so concurrent feedback on the
//! same pattern cannot interleave a read-modify-write.

use dashmap::DashMap;

use rhetoric_types::AdjustmentRecord;

/// Trait for adjustment record storage.
pub trait AdjustmentStore: Send + Sync {
    /// Snapshot of the record, if any.
    fn get(&self, pattern_id: &str) -> Option<AdjustmentRecord>;

    /// Run `update` on the record (created on first use) as a single
    /// critical section. Returns the record after the update.
    fn atomic_update(
        &self,
        pattern_id: &str,
        update: &mut dyn FnMut(&mut AdjustmentRecord),
    ) -> AdjustmentRecord;

    /// Delete the record and its history. Returns true if one existed.
    fn reset(&self, pattern_id: &str) -> bool;

    /// Insert a record loaded from durable storage, replacing any
    /// existing one.
    fn restore(&self, record: AdjustmentRecord);

    /// All records, ordered by pattern id.
    fn snapshot(&self) -> Vec<AdjustmentRecord>;
}

/// Default process-local store.
#[derive(Default)]
pub struct InMemoryAdjustmentStore {
    records: DashMap<String, AdjustmentRecord>,
}

impl InMemoryAdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AdjustmentStore for InMemoryAdjustmentStore {
    fn get(&self, pattern_id: &str) -> Option<AdjustmentRecord> {
        self.records.get(pattern_id).map(|r| r.clone())
    }

    fn atomic_update(
        &self,
        pattern_id: &str,
        update: &mut dyn FnMut(&mut AdjustmentRecord),
    ) -> AdjustmentRecord {
        let mut entry = self
            .records
            .entry(pattern_id.to_string())
            .or_insert_with(|| AdjustmentRecord::new(pattern_id));
        update(entry.value_mut());
        entry.value().clone()
    }

    fn reset(&self, pattern_id: &str) -> bool {
        self.records.remove(pattern_id).is_some()
    }

    fn restore(&self, record: AdjustmentRecord) {
        self.records.insert(record.pattern_id().to_string(), record);
    }

    fn snapshot(&self) -> Vec<AdjustmentRecord> {
        let mut all: Vec<AdjustmentRecord> = self.records.iter().map(|r| r.clone()).collect();
        all.sort_by(|a, b| a.pattern_id().cmp(b.pattern_id()));
        all
    }
}
