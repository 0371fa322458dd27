//! Two-phase undoable close tracking
//!
//! A close that allows undo is provisional: the units are hidden from the
//! live session but nothing enters history until the closure is committed.
//! Reverting hands the original units back, identities untouched. The
//! lifecycle is an explicit state machine; illegal transitions come back
//! as [`HistoryError::InvalidTransition`] rather than being swallowed.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{HistoryError, HistoryResult};
use crate::model::{BulkClosure, ClosedGroup, ClosedTab, ClosureKind, GroupId, RecordId, UnitId};
use crate::store::ClosureHistoryStore;

/// Token identifying one closure-in-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CloseToken(pub Uuid);

impl CloseToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CloseToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group membership of a pending unit, captured at `begin_close` time so
/// commit can rebuild the title map even after the live group is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGroupMembership {
    pub group: GroupId,
    pub title: Option<String>,
}

/// A live unit captured for a provisional closure. `unit` is the original
/// live identity, preserved verbatim on revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUnit {
    pub unit: UnitId,
    pub title: String,
    pub url: String,
    pub membership: Option<PendingGroupMembership>,
}

impl PendingUnit {
    fn to_closed_tab(&self) -> ClosedTab {
        ClosedTab {
            title: self.title.clone(),
            url: self.url.clone(),
            group: self.membership.as_ref().map(|m| m.group),
        }
    }
}

/// Descriptor present when an entire group is being closed as one unit.
/// Without it, a single grouped tab closed on its own commits as a `Tab`
/// record keeping its group id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WholeGroupClose {
    pub group: GroupId,
    pub title: Option<String>,
}

/// Parameters of one close operation.
#[derive(Debug, Clone)]
pub struct CloseRequest {
    /// Most-recently-closed-first, matching record ordering
    pub units: Vec<PendingUnit>,
    /// Set when the closure is a full group closed as a unit
    pub whole_group: Option<WholeGroupClose>,
    /// When false, the closure commits immediately (no undo window)
    pub allow_undo: bool,
    /// When false, the closure never produces a record (e.g. a group
    /// hidden for sync rather than closed)
    pub save_to_history: bool,
}

impl CloseRequest {
    pub fn tabs(units: Vec<PendingUnit>) -> Self {
        Self {
            units,
            whole_group: None,
            allow_undo: true,
            save_to_history: true,
        }
    }

    pub fn group(group: WholeGroupClose, units: Vec<PendingUnit>) -> Self {
        Self {
            units,
            whole_group: Some(group),
            allow_undo: true,
            save_to_history: true,
        }
    }

    pub fn allow_undo(mut self, allow: bool) -> Self {
        self.allow_undo = allow;
        self
    }

    pub fn save_to_history(mut self, save: bool) -> Self {
        self.save_to_history = save;
        self
    }
}

enum CloseState {
    Pending {
        units: Vec<PendingUnit>,
        whole_group: Option<WholeGroupClose>,
        save_to_history: bool,
    },
    Committed,
    Reverted,
}

impl CloseState {
    fn name(&self) -> &'static str {
        match self {
            CloseState::Pending { .. } => "pending",
            CloseState::Committed => "committed",
            CloseState::Reverted => "reverted",
        }
    }
}

/// Tracks provisional closures between `begin_close` and their commit or
/// revert. Single-owner like the store; no internal synchronization.
#[derive(Default)]
pub struct CloseTracker {
    closures: HashMap<CloseToken, CloseState>,
    /// Pending tokens in begin order, for commit_all
    order: Vec<CloseToken>,
}

impl CloseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a close. With `allow_undo` false the closure is committed
    /// before this returns; the token then only witnesses the finished
    /// state.
    pub fn begin_close(
        &mut self,
        request: CloseRequest,
        store: &mut ClosureHistoryStore,
    ) -> CloseToken {
        let token = CloseToken::new();
        debug!(%token, units = request.units.len(), allow_undo = request.allow_undo, "beginning close");
        self.closures.insert(
            token,
            CloseState::Pending {
                units: request.units,
                whole_group: request.whole_group,
                save_to_history: request.save_to_history,
            },
        );
        self.order.push(token);
        if !request.allow_undo {
            // Infallible here: the token was inserted as Pending just above.
            let _ = self.commit(token, store);
        }
        token
    }

    /// Promote a pending closure into history. Returns the record id, or
    /// `None` when the closure was flagged `save_to_history = false` or
    /// captured no units.
    pub fn commit(
        &mut self,
        token: CloseToken,
        store: &mut ClosureHistoryStore,
    ) -> HistoryResult<Option<RecordId>> {
        let state = self.closures.get_mut(&token).ok_or(HistoryError::NotFound)?;
        let (units, whole_group, save_to_history) =
            match std::mem::replace(state, CloseState::Committed) {
                CloseState::Pending {
                    units,
                    whole_group,
                    save_to_history,
                } => (units, whole_group, save_to_history),
                finished => {
                    let name = finished.name();
                    *state = finished;
                    return Err(HistoryError::InvalidTransition { state: name });
                }
            };
        self.order.retain(|t| *t != token);

        if !save_to_history || units.is_empty() {
            debug!(%token, "committed close without history record");
            return Ok(None);
        }

        let kind = build_record(&units, whole_group);
        let id = store.insert(kind, Utc::now());
        debug!(%token, record_id = %id, "committed close into history");
        Ok(Some(id))
    }

    /// Abandon a pending closure, handing back the original units (original
    /// identities) for reinstatement. No record is produced.
    pub fn revert(&mut self, token: CloseToken) -> HistoryResult<Vec<PendingUnit>> {
        let state = self.closures.get_mut(&token).ok_or(HistoryError::NotFound)?;
        let units = match std::mem::replace(state, CloseState::Reverted) {
            CloseState::Pending { units, .. } => units,
            finished => {
                let name = finished.name();
                *state = finished;
                return Err(HistoryError::InvalidTransition { state: name });
            }
        };
        self.order.retain(|t| *t != token);
        debug!(%token, units = units.len(), "reverted close");
        Ok(units)
    }

    /// Commit every closure still pending, oldest first.
    pub fn commit_all(&mut self, store: &mut ClosureHistoryStore) -> Vec<RecordId> {
        let pending: Vec<CloseToken> = self.order.clone();
        let mut committed = Vec::new();
        for token in pending {
            if let Ok(Some(id)) = self.commit(token, store) {
                committed.push(id);
            }
        }
        committed
    }

    /// Number of closures still pending.
    pub fn pending_count(&self) -> usize {
        self.order.len()
    }
}

/// Variant selection at commit time: whole-group descriptor wins, a single
/// unit stays a `Tab` (grouped or not), anything else becomes a bulk event
/// with one title-map entry per represented group.
fn build_record(units: &[PendingUnit], whole_group: Option<WholeGroupClose>) -> ClosureKind {
    if let Some(group) = whole_group {
        let tabs = units
            .iter()
            .map(|u| ClosedTab::in_group(u.title.clone(), u.url.clone(), group.group))
            .collect();
        return ClosureKind::Group(ClosedGroup {
            group: group.group,
            title: group.title,
            tabs,
        });
    }

    if units.len() == 1 {
        return ClosureKind::Tab(units[0].to_closed_tab());
    }

    let mut group_titles = HashMap::new();
    for unit in units {
        if let Some(membership) = &unit.membership {
            group_titles
                .entry(membership.group)
                .or_insert_with(|| membership.title.clone());
        }
    }
    ClosureKind::Bulk(BulkClosure {
        group_titles,
        tabs: units.iter().map(|u| u.to_closed_tab()).collect(),
    })
}
