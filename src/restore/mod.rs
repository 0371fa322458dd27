//! Restoration of closure records into a live session

mod engine;

pub use engine::{RestoreEngine, RestoreOutcome, SingleTabGroupPolicy};
