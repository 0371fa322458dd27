//! Restore engine
//!
//! Translates closure records back into live-session operations. The store
//! is only mutated after every adapter call for a restore has been
//! acknowledged, so an adapter failure partway through leaves the record in
//! history for retry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HistoryError, HistoryResult};
use crate::model::{ClosedTab, ClosureKind, ClosureRecord, GroupId, RecordId, UnitId};
use crate::session::{Disposition, LiveSessionAdapter, SessionUnavailable, UnitContent};
use crate::store::ClosureHistoryStore;

/// What to do when a bulk restore finds a group with exactly one surviving
/// tab: flatten it to a standalone tab (default) or keep the one-tab group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingleTabGroupPolicy {
    #[default]
    Flatten,
    Preserve,
}

/// Units created in the live session by one restore operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub record_id: RecordId,
    /// Live identities in creation order
    pub units: Vec<UnitId>,
}

/// Restores whole records or single units out of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreEngine {
    policy: SingleTabGroupPolicy,
}

impl RestoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SingleTabGroupPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SingleTabGroupPolicy {
        self.policy
    }

    /// Restore the head of the store, if any, and remove it.
    pub async fn restore_most_recent<S: LiveSessionAdapter>(
        &self,
        store: &mut ClosureHistoryStore,
        session: &mut S,
    ) -> HistoryResult<RestoreOutcome> {
        let id = store.head().map(|r| r.id).ok_or(HistoryError::NotFound)?;
        self.restore_entry(store, session, id).await
    }

    /// Restore a whole record (tab, group, or bulk event) and remove it
    /// from the store.
    pub async fn restore_entry<S: LiveSessionAdapter>(
        &self,
        store: &mut ClosureHistoryStore,
        session: &mut S,
        id: RecordId,
    ) -> HistoryResult<RestoreOutcome> {
        let record = store.get(id).cloned().ok_or(HistoryError::NotFound)?;
        if let Err(violation) = record.kind.validate() {
            // Should have been caught at load; drop it and keep the rest.
            store.remove(id);
            return Err(HistoryError::MalformedRecord(violation.to_string()));
        }
        let units = self.restore_record(session, &record).await?;
        store.remove(id);
        debug!(record_id = %id, units = units.len(), "restored closure record");
        Ok(RestoreOutcome {
            record_id: id,
            units,
        })
    }

    /// Restore exactly one tab-shaped unit out of a record, rewriting the
    /// record to hold the remainder. On a `Tab` record only index 0 is
    /// valid and behaves like [`RestoreEngine::restore_entry`].
    pub async fn restore_unit<S: LiveSessionAdapter>(
        &self,
        store: &mut ClosureHistoryStore,
        session: &mut S,
        id: RecordId,
        unit_index: usize,
    ) -> HistoryResult<RestoreOutcome> {
        self.open_unit(store, session, id, unit_index, Disposition::NewForegroundTab)
            .await
    }

    /// Like [`RestoreEngine::restore_unit`] with an explicit placement
    /// disposition. `NewWindow` and `SaveAsFile` skip group placement; the
    /// store is still rewritten with the unit excluded.
    pub async fn open_unit<S: LiveSessionAdapter>(
        &self,
        store: &mut ClosureHistoryStore,
        session: &mut S,
        id: RecordId,
        unit_index: usize,
        disposition: Disposition,
    ) -> HistoryResult<RestoreOutcome> {
        let record = store.get(id).cloned().ok_or(HistoryError::NotFound)?;
        let tab = record
            .kind
            .units()
            .get(unit_index)
            .cloned()
            .ok_or(HistoryError::NotFound)?;

        let title = tab
            .group
            .and_then(|g| record.kind.group_title(g))
            .map(|t| t.map(String::from));
        let unit = self
            .restore_tab(session, &tab, disposition, title)
            .await?;

        let mut remaining = record.kind.units().to_vec();
        remaining.remove(unit_index);
        store.replace_with_remainder(id, remaining);
        debug!(record_id = %id, unit_index, "restored single unit from record");
        Ok(RestoreOutcome {
            record_id: id,
            units: vec![unit],
        })
    }

    /// Drive the adapter for a whole record. No store mutation happens
    /// here; callers remove or rewrite the record only after success.
    async fn restore_record<S: LiveSessionAdapter>(
        &self,
        session: &mut S,
        record: &ClosureRecord,
    ) -> HistoryResult<Vec<UnitId>> {
        match &record.kind {
            ClosureKind::Tab(tab) => {
                let unit = self
                    .restore_tab(session, tab, Disposition::NewForegroundTab, None)
                    .await?;
                Ok(vec![unit])
            }
            ClosureKind::Group(group) => {
                let mut units = Vec::with_capacity(group.tabs.len());
                for tab in &group.tabs {
                    let unit = create_unit(session, tab, Disposition::NewForegroundTab).await?;
                    session
                        .place_in_group(unit, group.group, group.title.clone())
                        .await
                        .map_err(unavailable)?;
                    units.push(unit);
                }
                Ok(units)
            }
            ClosureKind::Bulk(bulk) => {
                let survivors = group_member_counts(&bulk.tabs);
                let mut units = Vec::with_capacity(bulk.tabs.len());
                for tab in &bulk.tabs {
                    let unit = create_unit(session, tab, Disposition::NewForegroundTab).await?;
                    if let Some(group) = tab.group {
                        let count = survivors.get(&group).copied().unwrap_or(0);
                        if self.keep_grouped(count, session.group_exists(group)) {
                            let title = bulk.group_titles.get(&group).cloned().flatten();
                            session
                                .place_in_group(unit, group, title)
                                .await
                                .map_err(unavailable)?;
                        }
                    }
                    units.push(unit);
                }
                Ok(units)
            }
        }
    }

    /// Restore one tab-shaped unit. Group membership is re-established when
    /// the tab had any and the disposition keeps it in the session: joining
    /// the live group with the same identity when one exists, creating it
    /// fresh otherwise.
    async fn restore_tab<S: LiveSessionAdapter>(
        &self,
        session: &mut S,
        tab: &ClosedTab,
        disposition: Disposition,
        group_title: Option<Option<String>>,
    ) -> HistoryResult<UnitId> {
        let unit = create_unit(session, tab, disposition).await?;
        if let Some(group) = tab.group {
            if disposition.joins_session() {
                session
                    .place_in_group(unit, group, group_title.flatten())
                    .await
                    .map_err(unavailable)?;
            }
        }
        Ok(unit)
    }

    fn keep_grouped(&self, survivors: usize, live_group_exists: bool) -> bool {
        // A group already live (from an earlier partial restore) is always
        // joined; the flattening choice only applies to groups this restore
        // would have to resurrect for a single tab.
        if live_group_exists || survivors > 1 {
            return true;
        }
        self.policy == SingleTabGroupPolicy::Preserve
    }
}

fn group_member_counts(tabs: &[ClosedTab]) -> HashMap<GroupId, usize> {
    let mut counts = HashMap::new();
    for tab in tabs {
        if let Some(group) = tab.group {
            *counts.entry(group).or_insert(0) += 1;
        }
    }
    counts
}

async fn create_unit<S: LiveSessionAdapter>(
    session: &mut S,
    tab: &ClosedTab,
    disposition: Disposition,
) -> HistoryResult<UnitId> {
    session
        .create_unit(
            disposition,
            UnitContent {
                title: tab.title.clone(),
                url: tab.url.clone(),
            },
        )
        .await
        .map_err(unavailable)
}

fn unavailable(err: SessionUnavailable) -> HistoryError {
    HistoryError::SessionUnavailable(err.reason)
}
