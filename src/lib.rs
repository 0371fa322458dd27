//! tabvault: closure history and restoration for tabbed browsing sessions
//!
//! Remembers recently closed browsing units (tabs, tab groups, whole-session
//! bulk closures) with their structural relationships, and restores any
//! subset back into a live session while keeping group membership and
//! ordering consistent. Closes can be two-phase: provisional (undoable)
//! until committed into history or reverted with original identity intact.

pub mod error;
pub mod model;
pub mod restore;
pub mod service;
pub mod session;
pub mod store;
pub mod tracker;

pub use error::{HistoryError, HistoryResult};
pub use model::{
    BulkClosure, ClosedGroup, ClosedTab, ClosureKind, ClosureRecord, GroupId, RecordId, UnitId,
};
pub use restore::{RestoreEngine, RestoreOutcome, SingleTabGroupPolicy};
pub use service::ClosureHistoryService;
pub use session::{Disposition, LiveSessionAdapter, MockLiveSession, SessionUnavailable, UnitContent};
pub use store::{ClosureHistoryStore, PersistenceAdapter, SqliteClosureStore, SqliteStoreError};
pub use tracker::{
    CloseRequest, CloseToken, CloseTracker, PendingGroupMembership, PendingUnit, WholeGroupClose,
};
