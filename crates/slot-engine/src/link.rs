//! Action references attached to slots, and their rendering to URLs.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Google Calendar's day view, scrolled to the given hour.
pub const GOOGLE_DAY_VIEW: &str =
    "https://calendar.google.com/calendar/u/0/r/day/{year}/{month}/{day}?pli=1#main_7|{hour}";

/// Where a slot's link points. Kept structured until presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionRef {
    /// The public booking page.
    Booking,
    /// The backend's own day view for `date`, at `hour` (0-23, local).
    CalendarDay { date: NaiveDate, hour: u32 },
}

impl ActionRef {
    pub fn href(&self, booking_link: &str, template: &DeepLinkTemplate) -> String {
        match self {
            ActionRef::Booking => booking_link.to_string(),
            ActionRef::CalendarDay { date, hour } => template.render(*date, *hour),
        }
    }
}

/// A URL with `{year}`, `{month}`, `{day}` and `{hour}` placeholders.
///
/// Month, day and hour are zero-padded to two digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeepLinkTemplate(String);

impl DeepLinkTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, date: NaiveDate, hour: u32) -> String {
        self.0
            .replace("{year}", &date.year().to_string())
            .replace("{month}", &format!("{:02}", date.month()))
            .replace("{day}", &format!("{:02}", date.day()))
            .replace("{hour}", &format!("{:02}", hour))
    }
}

impl Default for DeepLinkTemplate {
    fn default() -> Self {
        Self::new(GOOGLE_DAY_VIEW)
    }
}
