//! The explicit store that owns every user and event.
//!
//! A [`Planner`] is created by the caller (one per server instance or test) and
//! passed wherever operations run; there is no global registry. Every method
//! runs its guards first and performs no work when one fails.
//!
//! Each event sits behind its own mutex. Guards, validation, grid writes,
//! aggregation and search for one event all run under that lock, so a search
//! never sees a half-applied edit. The event handle is cloned out of the map
//! before locking, and no directory entry is held while an event lock is requested.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::aggregate::CountGrid;
use crate::clock::{Clock, SystemClock};
use crate::error::{MeetError, Result};
use crate::event::{
    validate_deadline, validate_length, validate_title, DailyWindow, Event, EventDetails, EventId,
    SharedEvent,
};
use crate::guard::{check_event_id, check_is_admin, check_is_member, Directory};
use crate::search::{best_candidates, Candidate, SearchConfig};

#[derive(Debug)]
pub struct Planner {
    users: Directory,
    events: DashMap<EventId, SharedEvent>,
    next_event_id: AtomicU64,
    clock: Arc<dyn Clock>,
    config: SearchConfig,
}

// Edits validate before writing, so an event behind a poisoned lock is still consistent.
fn lock(event: &SharedEvent) -> MutexGuard<'_, Event> {
    event.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Planner {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SearchConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Directory::new(),
            events: DashMap::new(),
            next_event_id: AtomicU64::new(1),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ── Sessions ────────────────────────────────────────────────────────────

    /// Register `username` and log them in.
    pub fn register(&self, username: &str) -> Result<()> {
        self.users.register(username)?;
        info!(username, "registered user");
        Ok(())
    }

    pub fn log_in(&self, username: &str) -> Result<()> {
        self.users.set_logged_in(username, true)
    }

    pub fn log_out(&self, username: &str) -> Result<()> {
        self.users.set_logged_in(username, false)
    }

    /// Events `username` belongs to, most recently joined last.
    pub fn joined_events(&self, username: &str) -> Result<Vec<EventId>> {
        self.users
            .record(username)
            .map(|record| record.joined_event_ids)
            .ok_or_else(|| MeetError::input("User does not exist"))
    }

    // ── Guarded access ──────────────────────────────────────────────────────

    /// Run `f` on the event after the member guards pass.
    fn with_member_event<T>(
        &self,
        username: &str,
        event_id: EventId,
        f: impl FnOnce(&mut Event) -> Result<T>,
    ) -> Result<T> {
        self.users.check_username(username)?;
        let shared = check_event_id(&self.events, event_id)?;
        let mut event = lock(&shared);
        check_is_member(&event, username)?;
        self.users.check_logged_in(username)?;
        f(&mut event)
    }

    /// Run `f` on the event after the admin guards pass.
    fn with_admin_event<T>(
        &self,
        admin: &str,
        event_id: EventId,
        f: impl FnOnce(&mut Event) -> Result<T>,
    ) -> Result<T> {
        self.users.check_username(admin)?;
        let shared = check_event_id(&self.events, event_id)?;
        let mut event = lock(&shared);
        check_is_admin(&event, admin)?;
        self.users.check_logged_in(admin)?;
        f(&mut event)
    }

    // ── Event administration ────────────────────────────────────────────────

    /// Create an event administered by `admin` with the given extra members.
    ///
    /// # Errors
    /// Input error for an unknown admin or member, a bad title, length or
    /// deadline; auth error if `admin` is not logged in.
    pub fn create_event(
        &self,
        admin: &str,
        title: &str,
        members: &[&str],
        event_length: Option<usize>,
        event_deadline: Option<NaiveDate>,
    ) -> Result<EventId> {
        self.users.check_username(admin)?;
        self.users.check_logged_in(admin)?;
        for member in members {
            self.users.check_username(member)?;
        }
        validate_title(title)?;
        if let Some(length) = event_length {
            validate_length(length)?;
        }
        let now = self.clock.now();
        if let Some(deadline) = event_deadline {
            validate_deadline(deadline, now.date(), now.date())?;
        }

        let id = self.next_event_id.fetch_add(1, Ordering::Relaxed);
        let mut event = Event::new(id, title, admin, now);
        if let Some(length) = event_length {
            event.set_length(length)?;
        }
        if let Some(deadline) = event_deadline {
            event.set_deadline(deadline, now.date())?;
        }
        for member in members {
            event.add_member(member);
        }

        self.users.join(admin, id);
        for member in members {
            self.users.join(member, id);
        }
        self.events.insert(id, Arc::new(Mutex::new(event)));

        info!(event_id = id, admin, members = members.len(), "created event");
        Ok(id)
    }

    /// Add `invitee` to the event. Inviting an existing member is a no-op.
    pub fn invite_user(&self, admin: &str, invitee: &str, event_id: EventId) -> Result<()> {
        self.with_admin_event(admin, event_id, |event| {
            self.users.check_username(invitee)?;
            if event.add_member(invitee) {
                self.users.join(invitee, event_id);
                info!(event_id, invitee, "invited user");
            }
            Ok(())
        })
    }

    /// Remove `member` and its availability grid from the event.
    pub fn remove_user(&self, admin: &str, member: &str, event_id: EventId) -> Result<()> {
        self.with_admin_event(admin, event_id, |event| {
            check_is_member(event, member)?;
            if member == admin {
                return Err(MeetError::input("Admin cannot remove themself"));
            }
            event.remove_member(member);
            self.users.leave(member, event_id);
            info!(event_id, member, "removed user");
            Ok(())
        })
    }

    /// Leave the event. The admin cannot leave.
    pub fn leave_event(&self, username: &str, event_id: EventId) -> Result<()> {
        self.with_member_event(username, event_id, |event| {
            if event.admin() == username {
                return Err(MeetError::input("Admin cannot leave event"));
            }
            event.remove_member(username);
            self.users.leave(username, event_id);
            info!(event_id, username, "user left event");
            Ok(())
        })
    }

    /// Set the meeting length, in slots.
    pub fn edit_event_length(&self, admin: &str, new_length: usize, event_id: EventId) -> Result<()> {
        self.with_admin_event(admin, event_id, |event| {
            event.set_length(new_length)?;
            debug!(event_id, new_length, "edited event length");
            Ok(())
        })
    }

    pub fn edit_event_deadline(&self, admin: &str, new_date: NaiveDate, event_id: EventId) -> Result<()> {
        let today = self.clock.today();
        self.with_admin_event(admin, event_id, |event| {
            event.set_deadline(new_date, today)?;
            debug!(event_id, %new_date, "edited event deadline");
            Ok(())
        })
    }

    /// Restrict meetings to `[min_time, max_time)` each day. `None` leaves a bound open.
    pub fn edit_event_window(
        &self,
        admin: &str,
        event_id: EventId,
        min_time: Option<NaiveTime>,
        max_time: Option<NaiveTime>,
    ) -> Result<()> {
        self.with_admin_event(admin, event_id, |event| {
            let window = DailyWindow::new(min_time, max_time)?;
            event.set_window(window);
            debug!(event_id, ?min_time, ?max_time, "edited daily window");
            Ok(())
        })
    }

    // ── Availability ────────────────────────────────────────────────────────

    /// Mark `[start, end)` on every `weekday` of the horizon.
    pub fn edit_availability_weekly(
        &self,
        username: &str,
        event_id: EventId,
        value: bool,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<()> {
        self.with_member_event(username, event_id, |event| {
            event.apply_weekly(username, value, weekday, start, end)?;
            debug!(event_id, username, value, %weekday, %start, %end, "weekly availability edit");
            Ok(())
        })
    }

    /// Mark the one-off range `[start, end)`.
    pub fn edit_availability_special(
        &self,
        username: &str,
        event_id: EventId,
        value: bool,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<()> {
        self.with_member_event(username, event_id, |event| {
            event.apply_special(username, value, start, end)?;
            debug!(event_id, username, value, %start, %end, "special availability edit");
            Ok(())
        })
    }

    /// Mark all of `date`.
    pub fn edit_availability_daily(
        &self,
        username: &str,
        event_id: EventId,
        value: bool,
        date: NaiveDate,
    ) -> Result<()> {
        self.with_member_event(username, event_id, |event| {
            event.apply_daily(username, value, date)?;
            debug!(event_id, username, value, %date, "daily availability edit");
            Ok(())
        })
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn event_details(&self, username: &str, event_id: EventId) -> Result<EventDetails> {
        self.with_member_event(username, event_id, |event| Ok(event.details()))
    }

    /// Per-slot count of available members.
    pub fn aggregate_availability(&self, username: &str, event_id: EventId) -> Result<CountGrid> {
        self.with_member_event(username, event_id, |event| event.count_grid())
    }

    /// The best meeting windows with their scores, best first.
    pub fn find_best_candidates(&self, username: &str, event_id: EventId) -> Result<Vec<Candidate>> {
        let now = self.clock.now();
        self.with_member_event(username, event_id, |event| {
            let counts = event.count_grid()?;
            let constraints = event.search_constraints(now, &self.config)?;
            debug!(event_id, ?constraints, cutoff = self.config.cutoff, "searching best times");
            Ok(best_candidates(
                &counts,
                &constraints,
                self.config.cutoff,
                event.create_time().date(),
            ))
        })
    }

    /// Up to `cutoff` meeting start times, best first.
    pub fn find_best_times(&self, username: &str, event_id: EventId) -> Result<Vec<NaiveDateTime>> {
        let candidates = self.find_best_candidates(username, event_id)?;
        Ok(candidates.into_iter().map(|c| c.start).collect())
    }
}
