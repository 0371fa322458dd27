//! Public facade over the closure history subsystem
//!
//! Owns the in-memory store, the two-phase tracker, and the restore engine;
//! hydrates from the persistence adapter at construction and snapshots back
//! after every store mutation. Persistence is best-effort: a failed save is
//! logged and never fails the operation that triggered it.

use tracing::warn;

use crate::error::HistoryResult;
use crate::model::{ClosureRecord, RecordId};
use crate::restore::{RestoreEngine, RestoreOutcome, SingleTabGroupPolicy};
use crate::session::{Disposition, LiveSessionAdapter};
use crate::store::{ClosureHistoryStore, PersistenceAdapter};
use crate::tracker::{CloseRequest, CloseToken, CloseTracker, PendingUnit};

/// The caller-facing API of the closure history subsystem.
///
/// Single-owner like its parts; intended to live on the session's main
/// control thread with reads handed off through a command queue.
pub struct ClosureHistoryService {
    store: ClosureHistoryStore,
    tracker: CloseTracker,
    engine: RestoreEngine,
    persistence: Option<Box<dyn PersistenceAdapter>>,
}

impl ClosureHistoryService {
    /// In-memory only; nothing survives the session.
    pub fn new() -> Self {
        Self {
            store: ClosureHistoryStore::new(),
            tracker: CloseTracker::new(),
            engine: RestoreEngine::new(),
            persistence: None,
        }
    }

    /// Hydrate from `persistence` and snapshot back after every mutation.
    /// A failed load starts empty rather than failing session startup.
    pub fn with_persistence(persistence: Box<dyn PersistenceAdapter>) -> Self {
        let records = match persistence.load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to load closure history; starting empty");
                Vec::new()
            }
        };
        Self {
            store: ClosureHistoryStore::hydrate(records),
            tracker: CloseTracker::new(),
            engine: RestoreEngine::new(),
            persistence: Some(persistence),
        }
    }

    pub fn set_single_tab_group_policy(&mut self, policy: SingleTabGroupPolicy) {
        self.engine = RestoreEngine::with_policy(policy);
    }

    /// The `max_count` most recent closure records.
    pub fn get_entries(&self, max_count: usize) -> Vec<ClosureRecord> {
        self.store.query(max_count)
    }

    pub fn clear_entries(&mut self) {
        self.store.clear();
        self.flush();
    }

    /// Begin a (possibly undoable) close.
    pub fn begin_close(&mut self, request: CloseRequest) -> CloseToken {
        let token = self.tracker.begin_close(request, &mut self.store);
        self.flush();
        token
    }

    /// Commit a pending close into history.
    pub fn commit_close(&mut self, token: CloseToken) -> HistoryResult<Option<RecordId>> {
        let id = self.tracker.commit(token, &mut self.store)?;
        self.flush();
        Ok(id)
    }

    /// Revert a pending close; the returned units carry their original
    /// identities and belong back in the live session.
    pub fn revert_close(&mut self, token: CloseToken) -> HistoryResult<Vec<PendingUnit>> {
        self.tracker.revert(token)
    }

    /// Commit every close still pending, e.g. at session teardown.
    pub fn commit_all_closures(&mut self) -> Vec<RecordId> {
        let ids = self.tracker.commit_all(&mut self.store);
        if !ids.is_empty() {
            self.flush();
        }
        ids
    }

    pub async fn restore_most_recent<S: LiveSessionAdapter>(
        &mut self,
        session: &mut S,
    ) -> HistoryResult<RestoreOutcome> {
        let outcome = self
            .engine
            .restore_most_recent(&mut self.store, session)
            .await?;
        self.flush();
        Ok(outcome)
    }

    pub async fn restore_entry<S: LiveSessionAdapter>(
        &mut self,
        session: &mut S,
        id: RecordId,
    ) -> HistoryResult<RestoreOutcome> {
        let outcome = self.engine.restore_entry(&mut self.store, session, id).await?;
        self.flush();
        Ok(outcome)
    }

    pub async fn restore_unit<S: LiveSessionAdapter>(
        &mut self,
        session: &mut S,
        id: RecordId,
        unit_index: usize,
    ) -> HistoryResult<RestoreOutcome> {
        let outcome = self
            .engine
            .restore_unit(&mut self.store, session, id, unit_index)
            .await?;
        self.flush();
        Ok(outcome)
    }

    pub async fn open_unit<S: LiveSessionAdapter>(
        &mut self,
        session: &mut S,
        id: RecordId,
        unit_index: usize,
        disposition: Disposition,
    ) -> HistoryResult<RestoreOutcome> {
        let outcome = self
            .engine
            .open_unit(&mut self.store, session, id, unit_index, disposition)
            .await?;
        self.flush();
        Ok(outcome)
    }

    /// Best-effort persistence snapshot; failures are logged, not surfaced.
    fn flush(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if let Err(e) = persistence.save(&self.store.snapshot()) {
            warn!(error = %e, "failed to persist closure history");
        }
    }
}

impl Default for ClosureHistoryService {
    fn default() -> Self {
        Self::new()
    }
}
