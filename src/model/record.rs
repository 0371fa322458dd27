//! Closure record variants and their invariants

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, RecordId};

/// One closed tab, standalone or inside a group/bulk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedTab {
    /// Page title at closure time
    pub title: String,
    /// Last committed URL
    pub url: String,
    /// Group the tab belonged to at closure time, if any
    pub group: Option<GroupId>,
}

impl ClosedTab {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            group: None,
        }
    }

    pub fn in_group(title: impl Into<String>, url: impl Into<String>, group: GroupId) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            group: Some(group),
        }
    }
}

/// A whole tab group closed as a unit.
///
/// `title` distinguishes "never titled" (`None`) from "explicitly untitled"
/// (`Some("")`); both survive persistence and restore unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedGroup {
    pub group: GroupId,
    pub title: Option<String>,
    /// Most-recently-closed-first within the group
    pub tabs: Vec<ClosedTab>,
}

/// A whole-session closure spanning possibly several groups plus ungrouped
/// tabs (close-all-tabs, close-window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkClosure {
    /// Title for every group represented among `tabs`
    pub group_titles: HashMap<GroupId, Option<String>>,
    /// Most-recently-closed-first across the whole closure
    pub tabs: Vec<ClosedTab>,
}

/// The three shapes a closure record can take.
///
/// A closed enum on purpose: every consumer matches all variants, so adding
/// a fourth closure shape is a compile-checked exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClosureKind {
    Tab(ClosedTab),
    Group(ClosedGroup),
    Bulk(BulkClosure),
}

/// A structural invariant violation found in a record, typically one loaded
/// from persistence. The offending record is dropped; the rest of history
/// stays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordViolation {
    /// A bulk tab references a group absent from the title map
    UnknownGroup(GroupId),
    /// A group record contains a tab with a different (or no) group id
    ForeignTab { expected: GroupId },
}

impl std::fmt::Display for RecordViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordViolation::UnknownGroup(group) => {
                write!(f, "bulk tab references unknown group {group}")
            }
            RecordViolation::ForeignTab { expected } => {
                write!(f, "group record {expected} contains a tab from another group")
            }
        }
    }
}

impl ClosureKind {
    /// Check the structural invariants of this record shape.
    pub fn validate(&self) -> Result<(), RecordViolation> {
        match self {
            ClosureKind::Tab(_) => Ok(()),
            ClosureKind::Group(group) => {
                for tab in &group.tabs {
                    if tab.group != Some(group.group) {
                        return Err(RecordViolation::ForeignTab {
                            expected: group.group,
                        });
                    }
                }
                Ok(())
            }
            ClosureKind::Bulk(bulk) => {
                for tab in &bulk.tabs {
                    if let Some(group) = tab.group {
                        if !bulk.group_titles.contains_key(&group) {
                            return Err(RecordViolation::UnknownGroup(group));
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// The tab-shaped units of this record in stored order. A `Tab` record
    /// is its own single unit.
    pub fn units(&self) -> &[ClosedTab] {
        match self {
            ClosureKind::Tab(tab) => std::slice::from_ref(tab),
            ClosureKind::Group(group) => &group.tabs,
            ClosureKind::Bulk(bulk) => &bulk.tabs,
        }
    }

    /// Title for `group` as this record knows it, if it knows the group.
    pub fn group_title(&self, group: GroupId) -> Option<Option<&str>> {
        match self {
            ClosureKind::Tab(_) => None,
            ClosureKind::Group(closed) if closed.group == group => Some(closed.title.as_deref()),
            ClosureKind::Group(_) => None,
            ClosureKind::Bulk(bulk) => bulk.group_titles.get(&group).map(|t| t.as_deref()),
        }
    }
}

/// One entry of the closure history: common identity and ordering fields
/// around the variant payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureRecord {
    pub id: RecordId,
    /// Ordering timestamp (most-recent-first); not otherwise significant
    pub closed_at: DateTime<Utc>,
    pub kind: ClosureKind,
}
