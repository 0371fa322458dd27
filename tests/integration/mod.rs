//! Integration tests for tabvault
//!
//! These tests verify that the store, tracker, restore engine, and
//! persistence adapter work together correctly.

#[path = "../common/mod.rs"]
pub mod common;

pub mod close_restore_flow;
pub mod ordering_properties;
pub mod persistence_reload;
