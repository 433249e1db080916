//! # meeter-engine
//!
//! Availability grids and best-meeting-time search for group events.
//!
//! Every event member records availability on a half-hour grid covering the
//! [`DAYS`] days after the event was created. A search tallies all members'
//! grids and slides a meeting-length window over the tally to rank candidate
//! start times.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use meeter_engine::{FixedClock, Planner, SearchConfig};
//!
//! let now = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let planner = Planner::with_clock(SearchConfig::default(), Arc::new(FixedClock(now)));
//! planner.register("alice").unwrap();
//! let event_id = planner.create_event("alice", "Standup", &[], Some(2), None).unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
//! planner.edit_availability_daily("alice", event_id, true, day).unwrap();
//!
//! let best = planner.find_best_times("alice", event_id).unwrap();
//! assert_eq!(best[0], day.and_hms_opt(0, 0, 0).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: per-member `TimeGrid` and slot/day addressing
//! - [`store`]: `AvailabilityStore`, one grid per member
//! - [`aggregate`]: member grids → per-slot `CountGrid`
//! - [`search`]: constrained sliding-window top-K search
//! - [`event`]: event records and availability edits
//! - [`guard`]: user directory and guard checks
//! - [`planner`]: `Planner`, the store every operation runs against
//! - [`clock`]: injectable "now"
//! - [`error`]: Error types

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod event;
pub mod grid;
pub mod guard;
pub mod planner;
pub mod search;
pub mod store;

pub use aggregate::{aggregate, CountGrid};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorKind, MeetError};
pub use event::{DailyWindow, EventDetails, EventId};
pub use grid::{TimeGrid, DAYS, SLOTS_PER_DAY};
pub use planner::Planner;
pub use search::{best_candidates, best_windows, Candidate, SearchConfig, SearchConstraints};
pub use store::AvailabilityStore;
