//! Shared test utilities for tabvault
//!
//! Fixture builders for pending units and closure records used across the
//! integration tests.

use tabvault::{GroupId, PendingGroupMembership, PendingUnit, UnitId};

/// An ungrouped pending unit with a fresh live identity.
pub fn unit(title: &str, url: &str) -> PendingUnit {
    PendingUnit {
        unit: UnitId::new(),
        title: title.to_string(),
        url: url.to_string(),
        membership: None,
    }
}

/// A pending unit belonging to `group` with the given group title.
pub fn grouped_unit(title: &str, url: &str, group: GroupId, group_title: Option<&str>) -> PendingUnit {
    PendingUnit {
        unit: UnitId::new(),
        title: title.to_string(),
        url: url.to_string(),
        membership: Some(PendingGroupMembership {
            group,
            title: group_title.map(String::from),
        }),
    }
}
