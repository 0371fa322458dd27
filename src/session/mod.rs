//! Live-session adapter boundary
//!
//! The restore engine never reaches into the live browsing session; it
//! drives it through the three primitives of [`LiveSessionAdapter`]. Unit
//! creation can be asynchronous in a real session, so the trait is async
//! and the engine awaits acknowledgment before touching the store.

pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{GroupId, UnitId};

pub use mock::MockLiveSession;

/// Placement policy for a restored unit.
///
/// `NewWindow` and `SaveAsFile` hand the unit off without adding it to the
/// current session, so restored group membership does not apply to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    CurrentTab,
    NewBackgroundTab,
    NewForegroundTab,
    NewWindow,
    SaveAsFile,
}

impl Disposition {
    /// Whether a unit opened this way joins the current live session.
    pub fn joins_session(&self) -> bool {
        !matches!(self, Disposition::NewWindow | Disposition::SaveAsFile)
    }
}

/// Content for a unit about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContent {
    pub title: String,
    pub url: String,
}

/// Transient live-session failure; surfaced to callers as
/// [`HistoryError::SessionUnavailable`](crate::error::HistoryError).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct SessionUnavailable {
    pub reason: String,
}

impl SessionUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The live browsing-session container, seen through the only three
/// primitives restoration needs.
#[async_trait]
pub trait LiveSessionAdapter: Send {
    /// Create a browsing unit at the position dictated by `disposition`
    /// and return its live identity.
    async fn create_unit(
        &mut self,
        disposition: Disposition,
        content: UnitContent,
    ) -> Result<UnitId, SessionUnavailable>;

    /// Place a unit into the group with the given logical identity,
    /// creating the group (with `title`) if it does not exist yet.
    async fn place_in_group(
        &mut self,
        unit: UnitId,
        group: GroupId,
        title: Option<String>,
    ) -> Result<(), SessionUnavailable>;

    /// Whether a live group with this identity currently exists.
    fn group_exists(&self, group: GroupId) -> bool;
}
