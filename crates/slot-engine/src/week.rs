//! Rolling one-week view over the open days of the policy.

use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::BusyInterval;
use crate::policy::WorkingWindow;
use crate::slots::{Slot, SlotEngine};

/// Number of days covered by a weekly view, today included.
pub const HORIZON_DAYS: u64 = 7;

/// The slots of one open day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// Parse an IANA timezone name.
///
/// # Errors
/// Returns `SlotError::InvalidTimezone` for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Today's date in the named timezone.
pub fn today_in(timezone: &str) -> Result<NaiveDate> {
    let tz = parse_timezone(timezone)?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

impl SlotEngine {
    /// Open dates in `[today, today + 7 days)` with their windows, in order.
    ///
    /// These are the dates a caller has to fetch busy intervals for. A date
    /// whose window has no usable bounds (see [`SlotEngine::window_bounds`])
    /// is left out like a closed day.
    pub fn open_days(&self, today: NaiveDate) -> Vec<(NaiveDate, WorkingWindow)> {
        (0..HORIZON_DAYS)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter_map(|date| {
                self.config()
                    .policy
                    .window_for(date)
                    .filter(|w| self.window_bounds(date, w).is_some())
                    .map(|w| (date, w))
            })
            .collect()
    }

    /// Schedule for a single open day.
    pub fn day_schedule(
        &self,
        date: NaiveDate,
        window: &WorkingWindow,
        busy: &[BusyInterval],
    ) -> DaySchedule {
        DaySchedule {
            date,
            slots: self.compute_slots(date, window, busy),
        }
    }

    /// Schedules for every open day of the week starting `today`.
    ///
    /// `busy` may span the whole week; each day only sees the intervals that
    /// overlap its own window, in their original order. Closed days, and days
    /// whose window falls on a clock change, are left out rather than reported
    /// empty.
    pub fn weekly_schedule(&self, today: NaiveDate, busy: &[BusyInterval]) -> Vec<DaySchedule> {
        self.open_days(today)
            .into_iter()
            .filter_map(|(date, window)| {
                let (start, end) = self.window_bounds(date, &window)?;
                let day_busy: Vec<BusyInterval> = busy
                    .iter()
                    .filter(|b| b.overlaps(start, end))
                    .cloned()
                    .collect();
                Some(self.day_schedule(date, &window, &day_busy))
            })
            .collect()
    }
}
