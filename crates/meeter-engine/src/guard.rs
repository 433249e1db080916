//! User directory and the guard checks run before every operation.
//!
//! Guards fail with a named error and never mutate anything. Unknown users,
//! unknown events and non-members are input errors; missing sessions and
//! missing admin rights are authorization errors.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{MeetError, Result};
use crate::event::{Event, EventId, SharedEvent};

/// Session and membership bookkeeping for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub logged_in: bool,
    /// Events the user belongs to, most recently joined last.
    pub joined_event_ids: Vec<EventId>,
}

/// All registered users.
#[derive(Debug, Default)]
pub struct Directory {
    users: DashMap<String, UserRecord>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logged-in user.
    pub fn register(&self, username: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(MeetError::input("Username must not be empty"));
        }
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(MeetError::input("Username already taken")),
            Entry::Vacant(slot) => {
                slot.insert(UserRecord {
                    logged_in: true,
                    joined_event_ids: Vec::new(),
                });
                Ok(())
            }
        }
    }

    pub fn set_logged_in(&self, username: &str, logged_in: bool) -> Result<()> {
        let mut record = self
            .users
            .get_mut(username)
            .ok_or_else(|| MeetError::input("User does not exist"))?;
        if record.logged_in == logged_in {
            let state = if logged_in { "in" } else { "out" };
            return Err(MeetError::auth(format!("User already logged {state}")));
        }
        record.logged_in = logged_in;
        Ok(())
    }

    pub fn record(&self, username: &str) -> Option<UserRecord> {
        self.users.get(username).map(|r| r.value().clone())
    }

    /// Record that `username` joined `event_id`. Unknown users are ignored.
    pub fn join(&self, username: &str, event_id: EventId) {
        if let Some(mut record) = self.users.get_mut(username) {
            if !record.joined_event_ids.contains(&event_id) {
                record.joined_event_ids.push(event_id);
            }
        }
    }

    /// Record that `username` left `event_id`.
    pub fn leave(&self, username: &str, event_id: EventId) {
        if let Some(mut record) = self.users.get_mut(username) {
            record.joined_event_ids.retain(|id| *id != event_id);
        }
    }

    pub fn check_username(&self, username: &str) -> Result<()> {
        if !self.users.contains_key(username) {
            return Err(MeetError::input("User does not exist"));
        }
        Ok(())
    }

    pub fn check_logged_in(&self, username: &str) -> Result<()> {
        match self.users.get(username) {
            Some(record) if record.logged_in => Ok(()),
            Some(_) => Err(MeetError::auth("User not logged in")),
            None => Err(MeetError::input("User does not exist")),
        }
    }
}

/// Look up an event, returning its shared handle.
pub fn check_event_id(events: &DashMap<EventId, SharedEvent>, event_id: EventId) -> Result<SharedEvent> {
    events
        .get(&event_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| MeetError::input("Event does not exist"))
}

pub fn check_is_member(event: &Event, username: &str) -> Result<()> {
    if !event.is_member(username) {
        return Err(MeetError::input("User not in event"));
    }
    Ok(())
}

pub fn check_is_admin(event: &Event, username: &str) -> Result<()> {
    if event.admin() != username {
        return Err(MeetError::auth("User has no permission"));
    }
    Ok(())
}
