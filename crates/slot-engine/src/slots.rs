//! Partition a working window into labeled fixed-length slots.
//!
//! The window is cut into `slot_minutes` pieces starting at its opening time.
//! Each piece is checked against the busy intervals in the order they were
//! fetched; the first overlapping interval decides the label. Runs of free
//! pieces are then collapsed into single wider slots.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::interval::{BusyInterval, Contact};
use crate::link::ActionRef;
use crate::policy::{WeekPolicy, WorkingWindow};

/// Length of one slot when nothing else is configured.
pub const DEFAULT_SLOT_MINUTES: u32 = 15;

/// The booking-form question whose answer is shown as a slot's note.
pub const DEFAULT_NOTE_MARKER: &str =
    "Please share anything that will help prepare me for your appointment.:";

/// Engine settings. Everything a deployment variant differs in lives here.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timezone the working windows are expressed in.
    pub timezone: Tz,
    pub policy: WeekPolicy,
    pub slot_minutes: u32,
    /// Collapse consecutive free slots into one.
    pub merge_free_runs: bool,
    /// The calendar's own address, never reported as a contact.
    pub clinic_address: String,
    pub note_marker: String,
}

impl EngineConfig {
    pub fn new(timezone: Tz, clinic_address: impl Into<String>) -> Self {
        Self {
            timezone,
            policy: WeekPolicy::clinic_default(),
            slot_minutes: DEFAULT_SLOT_MINUTES,
            merge_free_runs: true,
            clinic_address: clinic_address.into(),
            note_marker: DEFAULT_NOTE_MARKER.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: WeekPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// What occupies a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    /// Occupied, but no attendee other than the clinic itself.
    Booked,
    BookedWithContact { contact: Contact, note: String },
}

/// One labeled piece of the working day, in local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(flatten)]
    pub status: SlotStatus,
    pub action: ActionRef,
}

impl Slot {
    pub fn is_free(&self) -> bool {
        self.status == SlotStatus::Free
    }
}

/// Stateless slot calculator. Cheap to share between requests.
#[derive(Debug, Clone)]
pub struct SlotEngine {
    config: EngineConfig,
}

impl SlotEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Absolute bounds of `window` on `date`.
    ///
    /// Returns `None` for a window that is not open, when one of its local
    /// times does not exist on that date (a DST gap), or when the clocks go
    /// back inside it so that local times repeat. Ambiguous boundaries resolve
    /// to the earlier instant.
    pub fn window_bounds(
        &self,
        date: NaiveDate,
        window: &WorkingWindow,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if !window.is_open() {
            return None;
        }
        let tz = self.config.timezone;
        let start = tz.from_local_datetime(&date.and_time(window.start)).earliest()?;
        let end = tz.from_local_datetime(&date.and_time(window.end)).earliest()?;
        let (start, end) = (start.with_timezone(&Utc), end.with_timezone(&Utc));

        // Longer than its wall-clock length: some local times occur twice and
        // slot times would run backwards.
        let wall_clock = window.end.signed_duration_since(window.start);
        (start < end && end.signed_duration_since(start) <= wall_clock).then_some((start, end))
    }

    /// Slots for `date` under the configured weekday policy.
    ///
    /// Closed days yield an empty list without looking at `busy`.
    pub fn slots_for_date(&self, date: NaiveDate, busy: &[BusyInterval]) -> Vec<Slot> {
        match self.config.policy.window_for(date) {
            Some(window) => self.compute_slots(date, &window, busy),
            None => Vec::new(),
        }
    }

    /// Label every full slot of `window` on `date`.
    ///
    /// `busy` should already be limited to intervals touching the window. A
    /// trailing piece shorter than one slot is dropped. A window that is not
    /// open yields an empty list.
    pub fn compute_slots(
        &self,
        date: NaiveDate,
        window: &WorkingWindow,
        busy: &[BusyInterval],
    ) -> Vec<Slot> {
        if self.config.slot_minutes == 0 {
            return Vec::new();
        }
        let Some((window_start, window_end)) = self.window_bounds(date, window) else {
            return Vec::new();
        };

        let tz = self.config.timezone;
        let step = Duration::minutes(i64::from(self.config.slot_minutes));
        let mut slots = Vec::new();
        let mut cursor = window_start;

        while cursor + step <= window_end {
            let slot_end = cursor + step;
            let local_start = cursor.with_timezone(&tz);

            // First match wins, even when several intervals overlap the slot.
            let (status, action) = match busy.iter().find(|b| b.overlaps(cursor, slot_end)) {
                None => (SlotStatus::Free, ActionRef::Booking),
                Some(b) => {
                    let status = match b.contact(&self.config.clinic_address) {
                        Some(contact) => SlotStatus::BookedWithContact {
                            contact,
                            note: b.note(&self.config.note_marker),
                        },
                        None => SlotStatus::Booked,
                    };
                    let action = ActionRef::CalendarDay {
                        date,
                        hour: local_start.hour(),
                    };
                    (status, action)
                }
            };

            slots.push(Slot {
                start: local_start.time(),
                end: slot_end.with_timezone(&tz).time(),
                status,
                action,
            });
            cursor = slot_end;
        }

        if self.config.merge_free_runs {
            merge_free_slots(slots)
        } else {
            slots
        }
    }
}

/// Collapse each run of touching free slots into one slot spanning the run.
///
/// Booked slots are never merged and separate runs. Applying this to its own
/// output changes nothing.
pub fn merge_free_slots(slots: Vec<Slot>) -> Vec<Slot> {
    let mut merged: Vec<Slot> = Vec::with_capacity(slots.len());
    for slot in slots {
        if let Some(last) = merged.last_mut() {
            if last.is_free() && slot.is_free() && last.end == slot.start {
                last.end = slot.end;
                continue;
            }
        }
        merged.push(slot);
    }
    merged
}
