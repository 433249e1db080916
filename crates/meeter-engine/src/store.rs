//! One availability grid per event member.

use std::collections::BTreeMap;

use crate::grid::TimeGrid;

/// Owns the [`TimeGrid`] of every member of one event.
///
/// Grids are only reachable through this type; callers outside the crate get
/// shared references, never a mutable handle into the map.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityStore {
    grids: BTreeMap<String, TimeGrid>,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an all-unavailable grid for `username`.
    ///
    /// Membership is checked by the caller; an existing grid is replaced.
    pub fn create(&mut self, username: &str) {
        self.grids
            .insert(username.to_string(), TimeGrid::new(username));
    }

    /// Drop the grid of `username`. Returns `false` if there was none.
    pub fn remove(&mut self, username: &str) -> bool {
        self.grids.remove(username).is_some()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.grids.contains_key(username)
    }

    pub fn grid(&self, username: &str) -> Option<&TimeGrid> {
        self.grids.get(username)
    }

    pub(crate) fn grid_mut(&mut self, username: &str) -> Option<&mut TimeGrid> {
        self.grids.get_mut(username)
    }

    /// Every stored grid, in no meaningful order.
    pub fn grids(&self) -> impl Iterator<Item = &TimeGrid> {
        self.grids.values()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
