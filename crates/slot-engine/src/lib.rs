//! # slot-engine
//!
//! Clinic availability as a list of labeled appointment slots.
//!
//! Given a weekday opening-hours policy and the busy intervals fetched from a
//! calendar backend, the engine cuts each open day into fixed 15-minute slots,
//! labels each slot free or booked (attributing bookings to the attendee when
//! there is one), and collapses runs of free slots. Everything here is pure:
//! fetching, rendering and delivery belong to the caller.
//!
//! ## Modules
//!
//! - [`policy`] — weekday → working window table
//! - [`interval`] — busy intervals and contact/note extraction
//! - [`slots`] — the slot engine and the free-run merge pass
//! - [`week`] — rolling seven-day aggregation
//! - [`link`] — booking and calendar deep-link references
//! - [`summary`] — text summary for the messaging bot
//! - [`error`] — error types

pub mod error;
pub mod interval;
pub mod link;
pub mod policy;
pub mod slots;
pub mod summary;
pub mod week;

pub use error::SlotError;
pub use interval::{BusyInterval, Contact, Participant};
pub use link::{ActionRef, DeepLinkTemplate};
pub use policy::{WeekPolicy, WorkingWindow};
pub use slots::{merge_free_slots, EngineConfig, Slot, SlotEngine, SlotStatus};
pub use summary::render_summary;
pub use week::{parse_timezone, today_in, DaySchedule};
