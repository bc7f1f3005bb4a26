//! Busy intervals reported by the calendar backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// An attendee listed on a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    pub display_name: Option<String>,
}

impl Participant {
    pub fn new(email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            email: email.into(),
            display_name,
        }
    }
}

/// The person a booked slot is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name, or the address when the attendee has none.
    pub name: String,
    pub address: String,
}

/// One occupied period, with the event metadata needed to attribute it.
#[derive(Debug, Clone, PartialEq)]
pub struct BusyInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    attendees: Vec<Participant>,
    description: Option<String>,
}

impl BusyInterval {
    /// # Errors
    /// Returns `SlotError::InvalidInterval` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidInterval { start, end });
        }
        Ok(Self {
            start,
            end,
            attendees: Vec::new(),
            description: None,
        })
    }

    pub fn with_attendees(mut self, attendees: Vec<Participant>) -> Self {
        self.attendees = attendees;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn attendees(&self) -> &[Participant] {
        &self.attendees
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Half-open overlap with `[start, end)`. Touching ranges do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// The first attendee that is not the clinic's own calendar.
    pub fn contact(&self, own_address: &str) -> Option<Contact> {
        self.attendees
            .iter()
            .find(|p| p.email != own_address)
            .map(|p| Contact {
                name: p
                    .display_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| p.email.clone()),
                address: p.email.clone(),
            })
    }

    /// The booking-form answer that follows `marker` in the description.
    pub fn note(&self, marker: &str) -> String {
        self.description
            .as_deref()
            .map(|d| extract_note(d, marker))
            .unwrap_or_default()
    }
}

/// Take the first line of text after `marker`.
///
/// Leading whitespace and colons are stripped, so both `"marker: answer"` and
/// `"marker\n\nanswer"` yield `"answer"`. Returns an empty string when the
/// marker is missing or nothing follows it.
pub fn extract_note(description: &str, marker: &str) -> String {
    if marker.is_empty() {
        return String::new();
    }
    let Some((_, rest)) = description.split_once(marker) else {
        return String::new();
    };
    rest.trim()
        .lines()
        .next()
        .map(|line| line.trim_start_matches(':').trim().to_string())
        .unwrap_or_default()
}
