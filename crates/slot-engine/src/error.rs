//! Error types for slot-engine operations.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid busy interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid working window for {weekday:?}: {start} is not before {end}")]
    InvalidWindow {
        weekday: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    },
}

pub type Result<T> = std::result::Result<T, SlotError>;
