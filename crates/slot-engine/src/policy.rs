//! Weekday opening hours.
//!
//! A [`WeekPolicy`] maps each weekday to an optional [`WorkingWindow`]. Weekdays
//! without an entry are closed and produce no slots.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// The open part of a day, as local times-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a window from `"HH:MM"` (or `"HH:MM:SS"`) strings.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidTime` if either string is not a time of day.
    /// A window whose start is not before its end is accepted here; it simply
    /// yields no slots.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_time(start)?, parse_time(end)?))
    }

    /// A window is open only when it has a positive length.
    pub fn is_open(&self) -> bool {
        self.start < self.end
    }
}

/// Parse a local time-of-day such as `"09:00"` or `"09:00:30"`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| SlotError::InvalidTime(s.to_string()))
}

/// Weekday → working window table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekPolicy {
    // Indexed by `Weekday::num_days_from_monday`.
    windows: [Option<WorkingWindow>; 7],
}

impl WeekPolicy {
    /// A policy with every day closed.
    pub fn closed() -> Self {
        Self::default()
    }

    /// The clinic's regular hours: Wednesday afternoon and evening, Friday,
    /// and Saturday morning.
    pub fn clinic_default() -> Self {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Self::closed()
            .with_window(Weekday::Wed, WorkingWindow::new(hm(15, 0), hm(20, 0)))
            .with_window(Weekday::Fri, WorkingWindow::new(hm(8, 0), hm(19, 0)))
            .with_window(Weekday::Sat, WorkingWindow::new(hm(8, 0), hm(12, 0)))
    }

    pub fn with_window(mut self, weekday: Weekday, window: WorkingWindow) -> Self {
        self.set(weekday, Some(window));
        self
    }

    /// Set or clear (`None`) the window for a weekday.
    pub fn set(&mut self, weekday: Weekday, window: Option<WorkingWindow>) {
        self.windows[weekday.num_days_from_monday() as usize] = window;
    }

    /// The configured window for a weekday, whether or not it is well formed.
    pub fn window_for_weekday(&self, weekday: Weekday) -> Option<WorkingWindow> {
        self.windows[weekday.num_days_from_monday() as usize]
    }

    pub fn window_for(&self, date: NaiveDate) -> Option<WorkingWindow> {
        self.window_for_weekday(date.weekday())
    }

    /// True when the weekday has a well-formed window.
    pub fn is_open(&self, weekday: Weekday) -> bool {
        self.window_for_weekday(weekday).is_some_and(|w| w.is_open())
    }

    /// Reject configured windows whose start is not before their end.
    ///
    /// The engine tolerates such windows (they yield nothing), but a
    /// configuration containing one is almost certainly a typo.
    pub fn validate(&self) -> Result<()> {
        for (weekday, window) in self.iter() {
            if !window.is_open() {
                return Err(SlotError::InvalidWindow {
                    weekday,
                    start: window.start,
                    end: window.end,
                });
            }
        }
        Ok(())
    }

    /// Configured `(weekday, window)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, WorkingWindow)> + '_ {
        self.windows
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.map(|w| (weekday_from_index(i), w)))
    }
}

fn weekday_from_index(i: usize) -> Weekday {
    match i {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
