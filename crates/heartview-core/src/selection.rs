//! Record selection for batch deletion.
//!
//! The selection is a set of record ids and must always be a subset of the
//! ids currently present in the fetched list; callers re-intersect it via
//! [`RecordSelection::retain_present`] whenever the list changes. "Select
//! all" targets the currently visible (filtered) rows, not the full fetch.

use std::collections::HashSet;

/// Ids marked for batch deletion.
#[derive(Debug, Clone, Default)]
pub struct RecordSelection {
    ids: HashSet<String>,
}

impl RecordSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one record's membership. Returns true when the record ends up
    /// selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Drop one record from the selection.
    pub fn remove(&mut self, id: &str) {
        self.ids.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the selection with the given visible rows ("select all" on).
    pub fn select_visible<I, S>(&mut self, visible: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = visible.into_iter().map(Into::into).collect();
    }

    /// Clear the selection ("select all" off, or after a reload).
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids still present in the fetched list.
    pub fn retain_present<'a, I>(&mut self, present: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = present.into_iter().collect();
        self.ids.retain(|id| present.contains(id.as_str()));
    }

    /// Whether the select-all control should render checked for these
    /// visible rows.
    pub fn covers<'a, I>(&self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for id in visible {
            any = true;
            if !self.ids.contains(id) {
                return false;
            }
        }
        any
    }

    /// Selected ids in a stable order for issuing deletes.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}
