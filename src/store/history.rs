//! In-memory closure history store

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::{ClosedTab, ClosureKind, ClosureRecord, RecordId};

/// Ordered collection of closure records, most-recent-first.
///
/// Single-owner: callers mutate through `&mut self` and the store holds no
/// internal synchronization. Cross-thread readers must go through a
/// serialized hand-off onto the owning thread; `query` hands out cloned
/// snapshots so a reader never aliases a record being rewritten by
/// [`ClosureHistoryStore::replace_with_remainder`].
#[derive(Debug, Default)]
pub struct ClosureHistoryStore {
    records: Vec<ClosureRecord>,
    next_id: u64,
}

impl ClosureHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load persisted records at startup, preserving their ids and order.
    /// The id counter advances past the largest persisted id.
    pub fn hydrate(records: Vec<ClosureRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id.0 + 1).max().unwrap_or(0);
        Self { records, next_id }
    }

    /// Insert a new record at the head (it becomes the most recent).
    /// Growth is unbounded; exposure is bounded at query time.
    pub fn insert(&mut self, kind: ClosureKind, closed_at: DateTime<Utc>) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        debug!(record_id = %id, "inserting closure record");
        self.records.insert(0, ClosureRecord { id, closed_at, kind });
        id
    }

    /// Snapshot of the first `max_count` records in current order. Clones,
    /// so the snapshot stays consistent across later mutation.
    pub fn query(&self, max_count: usize) -> Vec<ClosureRecord> {
        self.records.iter().take(max_count).cloned().collect()
    }

    pub fn get(&self, id: RecordId) -> Option<&ClosureRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Most recent record, if any.
    pub fn head(&self) -> Option<&ClosureRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove a record. Absent ids are a no-op.
    pub fn remove(&mut self, id: RecordId) {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() < before {
            debug!(record_id = %id, "removed closure record");
        }
    }

    /// Rewrite a Group or Bulk record to hold only `remaining` tabs after a
    /// partial restore, keeping relative order and pruning title-map
    /// entries whose group no longer has a representative tab. An empty
    /// remainder removes the record; a `Tab` record is removed outright.
    pub fn replace_with_remainder(&mut self, id: RecordId, remaining: Vec<ClosedTab>) {
        if remaining.is_empty() {
            self.remove(id);
            return;
        }
        let Some(slot) = self.records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        let rewritten = match &slot.kind {
            ClosureKind::Tab(_) => {
                // A lone tab has no partial representation.
                None
            }
            ClosureKind::Group(group) => {
                let mut group = group.clone();
                group.tabs = remaining;
                Some(ClosureKind::Group(group))
            }
            ClosureKind::Bulk(bulk) => {
                let mut bulk = bulk.clone();
                bulk.tabs = remaining;
                bulk.group_titles
                    .retain(|id, _| bulk.tabs.iter().any(|t| t.group == Some(*id)));
                Some(ClosureKind::Bulk(bulk))
            }
        };
        match rewritten {
            Some(kind) => slot.kind = kind,
            None => self.remove(id),
        }
    }

    pub fn clear(&mut self) {
        debug!(count = self.records.len(), "clearing closure history");
        self.records.clear();
    }

    /// Full snapshot for persistence flushes.
    pub fn snapshot(&self) -> Vec<ClosureRecord> {
        self.records.clone()
    }
}
