//! Closure history storage
//!
//! In-memory ordered store of closure records plus the persistence adapter
//! boundary and its SQLite implementation.

mod history;
mod persistence;

pub use history::ClosureHistoryStore;
pub use persistence::{PersistenceAdapter, SqliteClosureStore, SqliteStoreError};
