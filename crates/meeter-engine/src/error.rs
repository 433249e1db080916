//! Error types for meeter-engine operations.

use thiserror::Error;

/// The two failure categories callers can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Session or role failure: not logged in, not the admin.
    Auth,
    /// Bad argument: unknown user or event, malformed interval, horizon violation.
    InvalidInput,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeetError {
    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A grid write addressed cells outside the `DAYS` x `SLOTS_PER_DAY` horizon.
    #[error("Out of range: day {day}, slots {slot_start}..{slot_end}")]
    OutOfRange {
        day: usize,
        slot_start: usize,
        slot_end: usize,
    },

    #[error("Cannot aggregate an empty set of grids")]
    NoGrids,
}

impl MeetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeetError::Auth(_) => ErrorKind::Auth,
            MeetError::InvalidInput(_) | MeetError::OutOfRange { .. } | MeetError::NoGrids => {
                ErrorKind::InvalidInput
            }
        }
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        MeetError::Auth(message.into())
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        MeetError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MeetError>;
