//! Event records and the availability edits applied to them.
//!
//! An [`Event`] owns its members' grids through an [`AvailabilityStore`]. The
//! `apply_*` methods validate their whole input before the first cell is
//! written, so a rejected edit leaves every grid untouched.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, CountGrid};
use crate::error::{MeetError, Result};
use crate::grid::{self, TimeGrid, DAYS, SLOTS_PER_DAY};
use crate::search::{SearchConfig, SearchConstraints};
use crate::store::AvailabilityStore;

pub type EventId = u64;

/// An event behind its own lock; every operation on it holds the lock throughout.
pub type SharedEvent = Arc<Mutex<Event>>;

/// Longest accepted title, in characters.
pub const MAX_TITLE: usize = 100;

/// Shortest accepted meeting length, in slots.
pub const MIN_EVENT_LENGTH: usize = 1;

/// Longest accepted meeting length, in slots (one fortnight).
pub const MAX_EVENT_LENGTH: usize = 14 * SLOTS_PER_DAY;

/// Daily time-of-day window a meeting must fit in. `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
    pub min_time: Option<NaiveTime>,
    pub max_time: Option<NaiveTime>,
}

impl DailyWindow {
    /// Validate alignment and ordering of both bounds.
    pub fn new(min_time: Option<NaiveTime>, max_time: Option<NaiveTime>) -> Result<Self> {
        for time in [min_time, max_time].into_iter().flatten() {
            grid::slot_of(time)?;
        }
        let window = Self { min_time, max_time };
        let (min_slot, max_slot) = window.slots();
        if max_slot <= min_slot {
            return Err(MeetError::input("Daily window must end after it starts"));
        }
        Ok(window)
    }

    /// `[min_slot, max_slot)` slot bounds; full day when unset.
    pub fn slots(&self) -> (usize, usize) {
        let min = self.min_time.map(grid::slot_floor).unwrap_or(0);
        let max = self.max_time.map(grid::slot_floor).unwrap_or(SLOTS_PER_DAY);
        (min, max)
    }
}

/// Read-only snapshot of an event for members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub id: EventId,
    pub title: String,
    pub members: BTreeSet<String>,
    pub admin: String,
    pub create_time: NaiveDateTime,
    /// Meeting length in slots.
    pub length: Option<usize>,
    pub deadline: Option<NaiveDate>,
    pub min_time: Option<NaiveTime>,
    pub max_time: Option<NaiveTime>,
}

#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    title: String,
    admin: String,
    members: BTreeSet<String>,
    create_time: NaiveDateTime,
    event_length: Option<usize>,
    event_deadline: Option<NaiveDate>,
    window: DailyWindow,
    availabilities: AvailabilityStore,
}

pub fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE {
        return Err(MeetError::input(format!(
            "Title must be between 1 and {MAX_TITLE} characters"
        )));
    }
    Ok(())
}

pub fn validate_length(length: usize) -> Result<()> {
    if !(MIN_EVENT_LENGTH..=MAX_EVENT_LENGTH).contains(&length) {
        return Err(MeetError::input(format!(
            "Event length must be between {MIN_EVENT_LENGTH} and {MAX_EVENT_LENGTH} slots"
        )));
    }
    Ok(())
}

/// A deadline may not be in the past and must fall inside the grid horizon of
/// an event created on `create_date`.
pub fn validate_deadline(deadline: NaiveDate, today: NaiveDate, create_date: NaiveDate) -> Result<()> {
    if deadline < today {
        return Err(MeetError::input("Event deadline is in the past"));
    }
    if grid::day_index(create_date, deadline) >= DAYS as i64 {
        return Err(MeetError::input(format!(
            "Event deadline is more than {DAYS} days after creation"
        )));
    }
    Ok(())
}

impl Event {
    /// A new event whose only member is `admin`.
    pub fn new(id: EventId, title: &str, admin: &str, create_time: NaiveDateTime) -> Self {
        let mut availabilities = AvailabilityStore::new();
        availabilities.create(admin);
        Self {
            id,
            title: title.to_string(),
            admin: admin.to_string(),
            members: BTreeSet::from([admin.to_string()]),
            create_time,
            event_length: None,
            event_deadline: None,
            window: DailyWindow::default(),
            availabilities,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    pub fn create_time(&self) -> NaiveDateTime {
        self.create_time
    }

    pub fn is_member(&self, username: &str) -> bool {
        self.members.contains(username)
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn availabilities(&self) -> &AvailabilityStore {
        &self.availabilities
    }

    /// Add `username` with a fresh grid. Returns `false` if already a member.
    pub fn add_member(&mut self, username: &str) -> bool {
        if !self.members.insert(username.to_string()) {
            return false;
        }
        self.availabilities.create(username);
        true
    }

    /// Remove `username` and its grid. Returns `false` if not a member.
    pub fn remove_member(&mut self, username: &str) -> bool {
        if !self.members.remove(username) {
            return false;
        }
        self.availabilities.remove(username);
        true
    }

    pub fn set_length(&mut self, length: usize) -> Result<()> {
        validate_length(length)?;
        self.event_length = Some(length);
        Ok(())
    }

    pub fn set_deadline(&mut self, deadline: NaiveDate, today: NaiveDate) -> Result<()> {
        validate_deadline(deadline, today, self.create_time.date())?;
        self.event_deadline = Some(deadline);
        Ok(())
    }

    pub fn set_window(&mut self, window: DailyWindow) {
        self.window = window;
    }

    pub fn details(&self) -> EventDetails {
        EventDetails {
            id: self.id,
            title: self.title.clone(),
            members: self.members.clone(),
            admin: self.admin.clone(),
            create_time: self.create_time,
            length: self.event_length,
            deadline: self.event_deadline,
            min_time: self.window.min_time,
            max_time: self.window.max_time,
        }
    }

    /// First instant past the grid horizon: midnight `DAYS` days after creation.
    pub fn horizon_end(&self) -> NaiveDateTime {
        self.create_time.date().and_time(NaiveTime::MIN) + Duration::days(DAYS as i64)
    }

    fn grid_mut(&mut self, username: &str) -> Result<&mut TimeGrid> {
        self.availabilities
            .grid_mut(username)
            .ok_or_else(|| MeetError::input("User not in event"))
    }

    /// Set `[start, end)` on every day that falls on `weekday`.
    pub fn apply_weekly(
        &mut self,
        username: &str,
        value: bool,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<()> {
        if end <= start {
            return Err(MeetError::input("Invalid time interval"));
        }
        let slot_start = grid::slot_of(start)?;
        let slot_end = grid::slot_of(end)?;
        let origin_weekday = self.create_time.weekday();
        self.grid_mut(username)?
            .set_weekly(origin_weekday, weekday, slot_start, slot_end, value)
    }

    /// Set the one-off range `[start, end)`, which may span several days.
    pub fn apply_special(
        &mut self,
        username: &str,
        value: bool,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<()> {
        if end <= start {
            return Err(MeetError::input("Invalid time range"));
        }
        if start < self.create_time {
            return Err(MeetError::input("Start or end time is before event creation"));
        }
        if end > self.horizon_end() {
            return Err(MeetError::input("Start or end time is past the availability horizon"));
        }
        let slot_start = grid::slot_of(start.time())?;
        let slot_end = grid::slot_of(end.time())?;

        let origin = self.create_time.date();
        let first_day = grid::day_index(origin, start.date()) as usize;
        let last_day = grid::day_index(origin, end.date()) as usize;

        let mut ranges = Vec::with_capacity(last_day - first_day + 1);
        for day in first_day..=last_day {
            let lo = if day == first_day { slot_start } else { 0 };
            let hi = if day == last_day { slot_end } else { SLOTS_PER_DAY };
            if lo < hi {
                TimeGrid::check_range(day, lo, hi)?;
                ranges.push((day, lo, hi));
            }
        }

        let grid = self.grid_mut(username)?;
        for (day, lo, hi) in ranges {
            grid.set_range(day, lo, hi, value)?;
        }
        Ok(())
    }

    /// Set every slot of `date`.
    pub fn apply_daily(&mut self, username: &str, value: bool, date: NaiveDate) -> Result<()> {
        let day = grid::day_index(self.create_time.date(), date);
        if day < 0 {
            return Err(MeetError::input("Date is before event creation"));
        }
        if day >= DAYS as i64 {
            return Err(MeetError::input("Date is past the availability horizon"));
        }
        self.grid_mut(username)?.set_day(day as usize, value)
    }

    /// Tally every member's grid.
    pub fn count_grid(&self) -> Result<CountGrid> {
        aggregate::aggregate(self.availabilities.grids())
    }

    /// Resolve this event's optional settings into search bounds as seen at `now`.
    ///
    /// A search delay reaching past the representable calendar leaves nothing to search.
    pub fn search_constraints(
        &self,
        now: NaiveDateTime,
        config: &SearchConfig,
    ) -> Result<SearchConstraints> {
        config.validate()?;
        let window_length = self.event_length.unwrap_or(config.default_length);
        let Some(earliest) = config.earliest_start(now) else {
            return Ok(SearchConstraints::exhausted(window_length));
        };
        Ok(SearchConstraints::resolve(
            self.create_time.date(),
            earliest,
            window_length,
            self.event_deadline,
            self.window.slots(),
        ))
    }
}
