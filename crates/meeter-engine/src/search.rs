//! Best meeting window search over a [`CountGrid`].
//!
//! Every candidate is a start slot on one day. Its score is the sum of member
//! counts over the whole meeting window, so a window where three members are
//! free for its full length beats one where four members overlap only briefly.
//!
//! ## Constraints
//!
//! Optional event settings are resolved once into [`SearchConstraints`]:
//!
//! - the window length falls back to [`SearchConfig::default_length`],
//! - the earliest searchable day is the one containing `now + search_delay`,
//!   and on that day no window starts before that instant's slot,
//! - the latest searchable day is the deadline, or the end of the grid horizon,
//! - every window must fit inside the daily `[min_slot, max_slot)` span.
//!
//! ## Ranking
//!
//! The best `cutoff` windows are kept in a bounded min-heap. Equal scores are
//! ordered by earliest day, then earliest slot, so results are deterministic and
//! no tied candidate is dropped arbitrarily.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::aggregate::CountGrid;
use crate::error::{MeetError, Result};
use crate::grid::{self, DAYS, SLOTS_PER_DAY};

/// Tunables for the best-time search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of windows returned.
    pub cutoff: usize,
    /// Minimum lead time, in minutes, between "now" and a proposed start.
    pub search_delay_minutes: i64,
    /// Window length in slots when the event has none set.
    pub default_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cutoff: 3,
            search_delay_minutes: 120,
            default_length: 6,
        }
    }
}

impl SearchConfig {
    /// # Errors
    /// Returns `MeetError::InvalidInput` for a negative search delay.
    pub fn validate(&self) -> Result<()> {
        if self.search_delay_minutes < 0 {
            return Err(MeetError::input("Search delay must not be negative"));
        }
        Ok(())
    }

    /// `now + search_delay`, or `None` when that instant is not representable.
    pub fn earliest_start(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        Duration::try_minutes(self.search_delay_minutes)
            .and_then(|delay| now.checked_add_signed(delay))
    }
}

/// Fully resolved bounds for one search. Day and slot indices are relative to
/// the event's creation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConstraints {
    /// Meeting length in slots.
    pub window_length: usize,
    /// First searchable day. May be negative or past the horizon.
    pub min_day: i64,
    /// Last searchable day, inclusive.
    pub max_day: i64,
    /// First slot of the daily window.
    pub min_slot: usize,
    /// End of the daily window, exclusive.
    pub max_slot: usize,
    /// Earliest start slot on `min_day` only.
    pub first_day_slot: Option<usize>,
}

impl SearchConstraints {
    /// Constraints covering the full horizon and the full day.
    pub fn unbounded(window_length: usize) -> Self {
        Self {
            window_length,
            min_day: 0,
            max_day: DAYS as i64 - 1,
            min_slot: 0,
            max_slot: SLOTS_PER_DAY,
            first_day_slot: None,
        }
    }

    /// Constraints that admit no day at all.
    pub fn exhausted(window_length: usize) -> Self {
        Self {
            min_day: DAYS as i64,
            ..Self::unbounded(window_length)
        }
    }

    /// Resolve the search bounds from event settings.
    ///
    /// `earliest` is "now + search delay"; when it falls on or after `origin`,
    /// it sets both the first searchable day and that day's earliest slot.
    pub fn resolve(
        origin: NaiveDate,
        earliest: NaiveDateTime,
        window_length: usize,
        deadline: Option<NaiveDate>,
        daily_slots: (usize, usize),
    ) -> Self {
        let earliest_day = grid::day_index(origin, earliest.date());
        let (min_day, first_day_slot) = if earliest_day >= 0 {
            (earliest_day, Some(grid::slot_floor(earliest.time())))
        } else {
            (0, None)
        };

        let horizon_end = DAYS as i64 - 1;
        let max_day = deadline
            .map(|date| grid::day_index(origin, date).min(horizon_end))
            .unwrap_or(horizon_end);

        let (min_slot, max_slot) = daily_slots;

        Self {
            window_length,
            min_day,
            max_day,
            min_slot,
            max_slot: max_slot.min(SLOTS_PER_DAY),
            first_day_slot,
        }
    }

    /// True when no day can contribute a candidate.
    pub fn is_empty(&self) -> bool {
        self.window_length == 0
            || self.min_day > self.max_day
            || self.max_day < 0
            || self.min_day >= DAYS as i64
    }

    /// Inclusive range of start slots allowed on `day`, if any.
    fn start_slots(&self, day: i64) -> Option<(usize, usize)> {
        let mut first = self.min_slot;
        if day == self.min_day {
            if let Some(clamp) = self.first_day_slot {
                first = first.max(clamp);
            }
        }
        let last = self.max_slot.checked_sub(self.window_length)?;
        (first <= last).then_some((first, last))
    }
}

/// A scored window in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredWindow {
    pub score: u64,
    pub day: usize,
    pub slot: usize,
}

impl Ord for ScoredWindow {
    /// Greater is better: higher score, then earlier day, then earlier slot.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.day.cmp(&self.day))
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

impl PartialOrd for ScoredWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A ranked meeting start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub start: NaiveDateTime,
    pub day: usize,
    pub slot: usize,
    pub score: u64,
}

impl Candidate {
    pub fn from_window(origin: NaiveDate, window: ScoredWindow) -> Self {
        Self {
            start: grid::slot_instant(origin, window.day, window.slot),
            day: window.day,
            slot: window.slot,
            score: window.score,
        }
    }
}

/// Keeps the `capacity` best windows seen so far.
struct TopWindows {
    capacity: usize,
    heap: BinaryHeap<Reverse<ScoredWindow>>,
}

impl TopWindows {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(DAYS * SLOTS_PER_DAY)),
        }
    }

    fn offer(&mut self, window: ScoredWindow) {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(window));
            return;
        }
        if let Some(Reverse(worst)) = self.heap.peek() {
            if window > *worst {
                self.heap.pop();
                self.heap.push(Reverse(window));
            }
        }
    }

    fn into_sorted(self) -> Vec<ScoredWindow> {
        let mut windows: Vec<ScoredWindow> =
            self.heap.into_iter().map(|Reverse(w)| w).collect();
        windows.sort_by(|a, b| b.cmp(a));
        windows
    }
}

/// Find the `cutoff` best windows in `counts` under `constraints`.
///
/// Results are sorted best first. Returns an empty list when `cutoff` is zero
/// or the constraints leave nothing to search.
pub fn best_windows(
    counts: &CountGrid,
    constraints: &SearchConstraints,
    cutoff: usize,
) -> Vec<ScoredWindow> {
    if cutoff == 0 || constraints.is_empty() {
        return Vec::new();
    }

    let len = constraints.window_length;
    let mut top = TopWindows::new(cutoff);

    for day in constraints.min_day.max(0)..=constraints.max_day {
        let Some(row) = counts.row(day as usize) else {
            break;
        };
        let Some((first, last)) = constraints.start_slots(day) else {
            continue;
        };

        // Sliding sum: add the slot entering the window, drop the one leaving.
        let mut score: u64 = row[first..first + len].iter().map(|&n| u64::from(n)).sum();
        top.offer(ScoredWindow {
            score,
            day: day as usize,
            slot: first,
        });
        for slot in first + 1..=last {
            score = score + u64::from(row[slot + len - 1]) - u64::from(row[slot - 1]);
            top.offer(ScoredWindow {
                score,
                day: day as usize,
                slot,
            });
        }
    }

    top.into_sorted()
}

/// Like [`best_windows`], with each window converted to an absolute start time.
pub fn best_candidates(
    counts: &CountGrid,
    constraints: &SearchConstraints,
    cutoff: usize,
    origin: NaiveDate,
) -> Vec<Candidate> {
    best_windows(counts, constraints, cutoff)
        .into_iter()
        .map(|window| Candidate::from_window(origin, window))
        .collect()
}
