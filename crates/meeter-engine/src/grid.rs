//! Per-member availability grid.
//!
//! A [`TimeGrid`] covers a fixed horizon of [`DAYS`] days starting at the owning
//! event's creation date. Each day is split into [`SLOTS_PER_DAY`] half-hour
//! slots; a `true` cell means the member is available for that slot.
//!
//! Writes are plain overwrites, so re-applying an edit is idempotent. Indices
//! outside the horizon are rejected, never clamped.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::error::{MeetError, Result};

/// Number of days covered by every grid.
pub const DAYS: usize = 60;

/// Number of slots in one day.
pub const SLOTS_PER_DAY: usize = 48;

/// Length of one slot in minutes.
pub const SLOT_MINUTES: u32 = 30;

/// A member's availability over the event horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    owner: String,
    cells: Vec<[bool; SLOTS_PER_DAY]>,
}

impl TimeGrid {
    /// A grid with every slot unavailable.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            cells: vec![[false; SLOTS_PER_DAY]; DAYS],
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Read one cell. `None` outside the horizon.
    pub fn get(&self, day: usize, slot: usize) -> Option<bool> {
        self.cells.get(day).and_then(|row| row.get(slot)).copied()
    }

    pub fn row(&self, day: usize) -> Option<&[bool; SLOTS_PER_DAY]> {
        self.cells.get(day)
    }

    /// Number of available slots across the whole horizon.
    pub fn available_slots(&self) -> usize {
        self.cells.iter().flatten().filter(|&&cell| cell).count()
    }

    /// Verify that `[slot_start, slot_end)` on `day` lies inside the horizon.
    pub fn check_range(day: usize, slot_start: usize, slot_end: usize) -> Result<()> {
        if day >= DAYS || slot_start > slot_end || slot_end > SLOTS_PER_DAY {
            return Err(MeetError::OutOfRange {
                day,
                slot_start,
                slot_end,
            });
        }
        Ok(())
    }

    /// Set `[slot_start, slot_end)` on `day` to `value`.
    ///
    /// # Errors
    /// Returns `MeetError::OutOfRange` without touching the grid if the range
    /// leaves the horizon or is reversed.
    pub fn set_range(
        &mut self,
        day: usize,
        slot_start: usize,
        slot_end: usize,
        value: bool,
    ) -> Result<()> {
        Self::check_range(day, slot_start, slot_end)?;
        self.cells[day][slot_start..slot_end].fill(value);
        Ok(())
    }

    /// Set every slot of `day` to `value`.
    pub fn set_day(&mut self, day: usize, value: bool) -> Result<()> {
        self.set_range(day, 0, SLOTS_PER_DAY, value)
    }

    /// Apply `[slot_start, slot_end)` to every day index that falls on `weekday`,
    /// given that day index 0 falls on `origin_weekday`.
    pub fn set_weekly(
        &mut self,
        origin_weekday: Weekday,
        weekday: Weekday,
        slot_start: usize,
        slot_end: usize,
        value: bool,
    ) -> Result<()> {
        let offset = weekday_offset(origin_weekday, weekday);
        Self::check_range(offset, slot_start, slot_end)?;
        for day in (offset..DAYS).step_by(7) {
            self.cells[day][slot_start..slot_end].fill(value);
        }
        Ok(())
    }
}

/// First day index that falls on `weekday` when day 0 falls on `origin`.
pub fn weekday_offset(origin: Weekday, weekday: Weekday) -> usize {
    let origin = origin.num_days_from_monday() as usize;
    let weekday = weekday.num_days_from_monday() as usize;
    (weekday + 7 - origin) % 7
}

/// Whether `time` sits exactly on a slot boundary.
pub fn is_slot_aligned(time: NaiveTime) -> bool {
    time.minute() % SLOT_MINUTES == 0 && time.second() == 0 && time.nanosecond() == 0
}

/// Slot containing `time` (`hour * 2 + minute / 30`).
pub fn slot_floor(time: NaiveTime) -> usize {
    (time.hour() * 2 + time.minute() / SLOT_MINUTES) as usize
}

/// Slot that starts exactly at `time`.
///
/// # Errors
/// Returns `MeetError::InvalidInput` if `time` is not on a half-hour boundary.
pub fn slot_of(time: NaiveTime) -> Result<usize> {
    if !is_slot_aligned(time) {
        return Err(MeetError::input(format!(
            "{time} is not on a {SLOT_MINUTES}-minute boundary"
        )));
    }
    Ok(slot_floor(time))
}

/// Signed number of days from `origin` to `date`.
pub fn day_index(origin: NaiveDate, date: NaiveDate) -> i64 {
    (date - origin).num_days()
}

/// The instant at which slot `slot` of day `day` starts.
pub fn slot_instant(origin: NaiveDate, day: usize, slot: usize) -> NaiveDateTime {
    let minutes = (slot as i64) * i64::from(SLOT_MINUTES);
    origin.and_time(NaiveTime::MIN) + Duration::days(day as i64) + Duration::minutes(minutes)
}

