//! Collapse member grids into a per-slot availability tally.
//!
//! The count grid is a true tally, not a boolean OR: `count[d][t]` is the number
//! of members free at slot `t` of day `d`. It is rebuilt for every search.

use crate::error::{MeetError, Result};
use crate::grid::{TimeGrid, DAYS, SLOTS_PER_DAY};

/// Number of available members per slot over the event horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountGrid {
    counts: Vec<[u32; SLOTS_PER_DAY]>,
    members: usize,
}

impl CountGrid {
    pub fn get(&self, day: usize, slot: usize) -> Option<u32> {
        self.counts.get(day).and_then(|row| row.get(slot)).copied()
    }

    pub fn row(&self, day: usize) -> Option<&[u32; SLOTS_PER_DAY]> {
        self.counts.get(day)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32; SLOTS_PER_DAY]> {
        self.counts.iter()
    }

    pub fn days(&self) -> usize {
        self.counts.len()
    }

    /// Number of grids that were tallied.
    pub fn members(&self) -> usize {
        self.members
    }
}

/// Tally `grids` cell by cell.
///
/// Runs in `O(members * DAYS * SLOTS_PER_DAY)`; the order of `grids` does not
/// affect the result.
///
/// # Errors
/// Returns `MeetError::NoGrids` if `grids` is empty.
pub fn aggregate<'a, I>(grids: I) -> Result<CountGrid>
where
    I: IntoIterator<Item = &'a TimeGrid>,
{
    let mut counts = vec![[0u32; SLOTS_PER_DAY]; DAYS];
    let mut members = 0;

    for grid in grids {
        members += 1;
        for (day, totals) in counts.iter_mut().enumerate() {
            let Some(row) = grid.row(day) else { break };
            for (total, &free) in totals.iter_mut().zip(row) {
                *total += u32::from(free);
            }
        }
    }

    if members == 0 {
        return Err(MeetError::NoGrids);
    }

    Ok(CountGrid { counts, members })
}
