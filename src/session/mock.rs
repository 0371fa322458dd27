//! Mock live session for deterministic testing
//!
//! Implements [`LiveSessionAdapter`] over plain in-memory state so restore
//! flows can be verified without a real browsing session. Supports failure
//! injection for exercising the session-unavailable paths.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{GroupId, UnitId};
use crate::session::{Disposition, LiveSessionAdapter, SessionUnavailable, UnitContent};

/// One unit the mock session has created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedUnit {
    pub unit: UnitId,
    pub disposition: Disposition,
    pub title: String,
    pub url: String,
    pub group: Option<GroupId>,
}

/// A live group as the mock session sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveGroup {
    pub title: Option<String>,
    pub members: Vec<UnitId>,
}

/// Deterministic in-memory stand-in for the live browsing session.
#[derive(Debug, Default)]
pub struct MockLiveSession {
    /// Units in creation order
    pub units: Vec<PlacedUnit>,
    /// Live groups keyed by logical identity
    pub groups: HashMap<GroupId, LiveGroup>,
    /// Unit currently in the foreground, if any
    pub current: Option<UnitId>,
    /// Times a group was created (first placement), per group
    pub group_creations: HashMap<GroupId, usize>,
    /// When set, every adapter call fails with this reason
    unavailable: Option<String>,
    /// When set, fail after this many more successful adapter calls
    fail_after: Option<usize>,
}

impl MockLiveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent adapter call fail.
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }

    pub fn set_available(&mut self) {
        self.unavailable = None;
        self.fail_after = None;
    }

    /// Let `calls` more adapter calls succeed, then fail. Used to verify
    /// that a mid-restore failure leaves the store untouched.
    pub fn fail_after(&mut self, calls: usize) {
        self.fail_after = Some(calls);
    }

    fn check_available(&mut self) -> Result<(), SessionUnavailable> {
        if let Some(reason) = &self.unavailable {
            return Err(SessionUnavailable::new(reason.clone()));
        }
        if let Some(remaining) = self.fail_after {
            if remaining == 0 {
                return Err(SessionUnavailable::new("session went away mid-restore"));
            }
            self.fail_after = Some(remaining - 1);
        }
        Ok(())
    }

    /// Units in creation order with their URLs, for assertions.
    pub fn urls(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.url.as_str()).collect()
    }

    /// The unit currently shown, if any.
    pub fn current_unit(&self) -> Option<&PlacedUnit> {
        let current = self.current?;
        self.units.iter().find(|u| u.unit == current)
    }

    pub fn group_members(&self, group: GroupId) -> &[UnitId] {
        self.groups
            .get(&group)
            .map(|g| g.members.as_slice())
            .unwrap_or(&[])
    }
}

#[async_trait]
impl LiveSessionAdapter for MockLiveSession {
    async fn create_unit(
        &mut self,
        disposition: Disposition,
        content: UnitContent,
    ) -> Result<UnitId, SessionUnavailable> {
        self.check_available()?;
        let unit = UnitId::new();
        match disposition {
            Disposition::CurrentTab => {
                // Replaces whatever is current; the old unit stays in the
                // session but loses focus.
                self.current = Some(unit);
            }
            Disposition::NewForegroundTab => self.current = Some(unit),
            Disposition::NewBackgroundTab | Disposition::NewWindow | Disposition::SaveAsFile => {}
        }
        self.units.push(PlacedUnit {
            unit,
            disposition,
            title: content.title,
            url: content.url,
            group: None,
        });
        Ok(unit)
    }

    async fn place_in_group(
        &mut self,
        unit: UnitId,
        group: GroupId,
        title: Option<String>,
    ) -> Result<(), SessionUnavailable> {
        self.check_available()?;
        if !self.groups.contains_key(&group) {
            *self.group_creations.entry(group).or_insert(0) += 1;
        }
        let live = self.groups.entry(group).or_insert_with(|| LiveGroup {
            title: title.clone(),
            members: Vec::new(),
        });
        live.members.push(unit);
        if let Some(placed) = self.units.iter_mut().find(|u| u.unit == unit) {
            placed.group = Some(group);
        }
        Ok(())
    }

    fn group_exists(&self, group: GroupId) -> bool {
        self.groups.contains_key(&group)
    }
}
