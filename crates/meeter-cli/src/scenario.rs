//! JSON scenario files replayed against a fresh [`Planner`].
//!
//! A scenario registers its users, creates one event at the scenario's `now`
//! and applies the listed availability edits in order:
//!
//! ```json
//! {
//!   "now": "2026-03-16T09:00:00",
//!   "users": ["ann", "ben"],
//!   "event": { "admin": "ann", "title": "Planning", "members": ["ben"], "length": 6 },
//!   "edits": [
//!     { "kind": "daily", "user": "ann", "date": "2026-03-18" },
//!     { "kind": "special", "user": "ben", "start": "2026-03-18T14:00:00", "end": "2026-03-18T20:30:00" },
//!     { "kind": "weekly", "user": "ben", "weekday": "Fri", "start": "09:00:00", "end": "12:00:00" }
//!   ]
//! }
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use meeter_engine::{Clock, EventId, FixedClock, Planner, SearchConfig, SystemClock};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Instant the event is created and searched at; the host clock if omitted.
    #[serde(default)]
    pub now: Option<NaiveDateTime>,
    #[serde(default)]
    pub config: SearchConfig,
    pub users: Vec<String>,
    pub event: EventSpec,
    #[serde(default)]
    pub edits: Vec<Edit>,
}

#[derive(Debug, Deserialize)]
pub struct EventSpec {
    pub admin: String,
    pub title: String,
    #[serde(default)]
    pub members: Vec<String>,
    /// Meeting length in slots.
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub min_time: Option<NaiveTime>,
    #[serde(default)]
    pub max_time: Option<NaiveTime>,
}

fn available() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    Weekly {
        user: String,
        #[serde(default = "available")]
        available: bool,
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    },
    Special {
        user: String,
        #[serde(default = "available")]
        available: bool,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    Daily {
        user: String,
        #[serde(default = "available")]
        available: bool,
        date: NaiveDate,
    },
}

impl Scenario {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scenario JSON")
    }

    /// Build a planner, create the event and apply every edit.
    pub fn replay(&self, config: SearchConfig) -> Result<(Planner, EventId)> {
        let clock: Arc<dyn Clock> = match self.now {
            Some(now) => Arc::new(FixedClock(now)),
            None => Arc::new(SystemClock),
        };
        let planner = Planner::with_clock(config, clock);

        for user in &self.users {
            planner
                .register(user)
                .with_context(|| format!("Failed to register user '{user}'"))?;
        }

        let spec = &self.event;
        let members: Vec<&str> = spec.members.iter().map(String::as_str).collect();
        let event_id = planner
            .create_event(&spec.admin, &spec.title, &members, spec.length, spec.deadline)
            .context("Failed to create event")?;
        if spec.min_time.is_some() || spec.max_time.is_some() {
            planner
                .edit_event_window(&spec.admin, event_id, spec.min_time, spec.max_time)
                .context("Failed to set daily window")?;
        }

        for (index, edit) in self.edits.iter().enumerate() {
            apply(&planner, event_id, edit)
                .with_context(|| format!("Edit #{} was rejected", index + 1))?;
        }

        Ok((planner, event_id))
    }
}

fn apply(planner: &Planner, event_id: EventId, edit: &Edit) -> meeter_engine::error::Result<()> {
    match edit {
        Edit::Weekly {
            user,
            available,
            weekday,
            start,
            end,
        } => planner.edit_availability_weekly(user, event_id, *available, *weekday, *start, *end),
        Edit::Special {
            user,
            available,
            start,
            end,
        } => planner.edit_availability_special(user, event_id, *available, *start, *end),
        Edit::Daily {
            user,
            available,
            date,
        } => planner.edit_availability_daily(user, event_id, *available, *date),
    }
}
