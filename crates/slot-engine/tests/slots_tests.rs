//! Tests for slot computation and the free-run merge pass.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use slot_engine::slots::{merge_free_slots, EngineConfig, Slot, SlotEngine, SlotStatus};
use slot_engine::{ActionRef, BusyInterval, Participant, WeekPolicy, WorkingWindow};

const CLINIC: &str = "clinic@group.calendar.google.com";
const MARKER: &str = "Please share anything that will help prepare me for your appointment.:";

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Friday 13 March 2026.
fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 13).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn window(start: (u32, u32), end: (u32, u32)) -> WorkingWindow {
    WorkingWindow::new(t(start.0, start.1), t(end.0, end.1))
}

fn engine() -> SlotEngine {
    SlotEngine::new(EngineConfig::new(chrono_tz::UTC, CLINIC))
}

fn unmerged_engine() -> SlotEngine {
    let mut config = EngineConfig::new(chrono_tz::UTC, CLINIC);
    config.merge_free_runs = false;
    SlotEngine::new(config)
}

fn busy(start: (u32, u32), end: (u32, u32)) -> BusyInterval {
    BusyInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 13, start.0, start.1, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 13, end.0, end.1, 0).unwrap(),
    )
    .unwrap()
}

fn with_client(b: BusyInterval) -> BusyInterval {
    b.with_attendees(vec![
        Participant::new(CLINIC, None),
        Participant::new("jo@example.com", Some("Jo Patient".to_string())),
    ])
    .with_description(format!("Booked online\n{MARKER}\nLower back stiffness\n"))
}

fn spans(slots: &[Slot]) -> Vec<(NaiveTime, NaiveTime)> {
    slots.iter().map(|s| (s.start, s.end)).collect()
}

// ── Free windows ────────────────────────────────────────────────────────────

#[test]
fn empty_calendar_gives_one_free_slot_for_whole_window() {
    let slots = engine().compute_slots(friday(), &window((9, 0), (17, 0)), &[]);

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, t(9, 0));
    assert_eq!(slots[0].end, t(17, 0));
    assert_eq!(slots[0].status, SlotStatus::Free);
    assert_eq!(slots[0].action, ActionRef::Booking);
}

#[test]
fn partial_trailing_slot_is_dropped() {
    let slots = unmerged_engine().compute_slots(friday(), &window((9, 0), (9, 47)), &[]);

    assert_eq!(
        spans(&slots),
        vec![(t(9, 0), t(9, 15)), (t(9, 15), t(9, 30)), (t(9, 30), t(9, 45))]
    );

    let merged = engine().compute_slots(friday(), &window((9, 0), (9, 47)), &[]);
    assert_eq!(spans(&merged), vec![(t(9, 0), t(9, 45))]);
}

#[test]
fn window_shorter_than_one_slot_yields_nothing() {
    let slots = engine().compute_slots(friday(), &window((9, 0), (9, 10)), &[]);
    assert!(slots.is_empty());
}

#[test]
fn unmerged_engine_emits_every_quarter_hour() {
    let slots = unmerged_engine().compute_slots(friday(), &window((9, 0), (10, 0)), &[]);
    assert_eq!(slots.len(), 4);
    assert!(slots.iter().all(Slot::is_free));
}

// ── Booked slots ────────────────────────────────────────────────────────────

#[test]
fn booking_with_client_splits_free_time() {
    let intervals = vec![with_client(busy((9, 15), (9, 30)))];
    let slots = engine().compute_slots(friday(), &window((9, 0), (10, 0)), &intervals);

    assert_eq!(
        spans(&slots),
        vec![(t(9, 0), t(9, 15)), (t(9, 15), t(9, 30)), (t(9, 30), t(10, 0))]
    );
    assert!(slots[0].is_free());
    assert!(slots[2].is_free());

    match &slots[1].status {
        SlotStatus::BookedWithContact { contact, note } => {
            assert_eq!(contact.name, "Jo Patient");
            assert_eq!(contact.address, "jo@example.com");
            assert_eq!(note, "Lower back stiffness");
        }
        other => panic!("expected a booking with contact, got {other:?}"),
    }
    assert_eq!(
        slots[1].action,
        ActionRef::CalendarDay {
            date: friday(),
            hour: 9
        }
    );
}

#[test]
fn adjacent_bookings_are_not_merged() {
    let intervals = vec![busy((9, 0), (9, 15)), busy((9, 15), (9, 30))];
    let slots = engine().compute_slots(friday(), &window((9, 0), (9, 45)), &intervals);

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].status, SlotStatus::Booked);
    assert_eq!(slots[1].status, SlotStatus::Booked);
    assert_eq!((slots[2].start, slots[2].end), (t(9, 30), t(9, 45)));
    assert!(slots[2].is_free());
}

#[test]
fn one_long_booking_labels_every_slot_it_covers() {
    let intervals = vec![busy((10, 0), (11, 0))];
    let slots = engine().compute_slots(friday(), &window((9, 0), (12, 0)), &intervals);

    assert_eq!(slots.len(), 6);
    assert!(slots[0].is_free());
    assert!(slots[1..5].iter().all(|s| s.status == SlotStatus::Booked));
    assert_eq!(
        slots[4].action,
        ActionRef::CalendarDay {
            date: friday(),
            hour: 10
        }
    );
    assert!(slots[5].is_free());
}

#[test]
fn partial_overlap_books_the_slot() {
    // 09:20-09:25 only grazes the 09:15 slot.
    let intervals = vec![busy((9, 20), (9, 25))];
    let slots = unmerged_engine().compute_slots(friday(), &window((9, 0), (9, 45)), &intervals);

    assert!(slots[0].is_free());
    assert_eq!(slots[1].status, SlotStatus::Booked);
    assert!(slots[2].is_free());
}

#[test]
fn booking_touching_slot_edge_leaves_it_free() {
    let intervals = vec![busy((8, 0), (9, 0)), busy((10, 0), (11, 0))];
    let slots = engine().compute_slots(friday(), &window((9, 0), (10, 0)), &intervals);

    assert_eq!(slots.len(), 1);
    assert!(slots[0].is_free());
}

#[test]
fn first_overlapping_interval_wins() {
    let anonymous = busy((9, 0), (10, 0));
    let client = with_client(busy((9, 0), (9, 15)));

    let slots = engine().compute_slots(
        friday(),
        &window((9, 0), (9, 15)),
        &[anonymous.clone(), client.clone()],
    );
    assert_eq!(slots[0].status, SlotStatus::Booked);

    let slots = engine().compute_slots(friday(), &window((9, 0), (9, 15)), &[client, anonymous]);
    assert!(matches!(
        slots[0].status,
        SlotStatus::BookedWithContact { .. }
    ));
}

#[test]
fn booking_without_note_marker_has_empty_note() {
    let b = busy((9, 0), (9, 15))
        .with_attendees(vec![Participant::new("sam@example.com", None)])
        .with_description("Follow-up");
    let slots = engine().compute_slots(friday(), &window((9, 0), (9, 15)), &[b]);

    assert_eq!(
        slots[0].status,
        SlotStatus::BookedWithContact {
            contact: slot_engine::Contact {
                name: "sam@example.com".to_string(),
                address: "sam@example.com".to_string(),
            },
            note: String::new(),
        }
    );
}

// ── Malformed and closed days ───────────────────────────────────────────────

#[test]
fn inverted_window_yields_nothing() {
    let intervals = vec![busy((9, 0), (10, 0))];
    assert!(engine()
        .compute_slots(friday(), &window((17, 0), (9, 0)), &intervals)
        .is_empty());
    assert!(engine()
        .compute_slots(friday(), &window((9, 0), (9, 0)), &intervals)
        .is_empty());
}

#[test]
fn closed_weekday_yields_nothing_regardless_of_bookings() {
    let monday = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let b = BusyInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
    )
    .unwrap();

    assert!(engine().slots_for_date(monday, &[b]).is_empty());
    assert!(engine().slots_for_date(monday, &[]).is_empty());
}

#[test]
fn slots_for_date_uses_policy_window() {
    let policy = WeekPolicy::closed().with_window(chrono::Weekday::Fri, window((10, 0), (11, 0)));
    let engine = SlotEngine::new(EngineConfig::new(chrono_tz::UTC, CLINIC).with_policy(policy));

    let slots = engine.slots_for_date(friday(), &[]);
    assert_eq!(spans(&slots), vec![(t(10, 0), t(11, 0))]);
}

#[test]
fn zero_slot_length_yields_nothing() {
    let mut config = EngineConfig::new(chrono_tz::UTC, CLINIC);
    config.slot_minutes = 0;
    let slots = SlotEngine::new(config).compute_slots(friday(), &window((9, 0), (10, 0)), &[]);
    assert!(slots.is_empty());
}

// ── Timezones ───────────────────────────────────────────────────────────────

#[test]
fn window_is_local_to_configured_timezone() {
    // London is on BST (UTC+1) in July: 09:00 local is 08:00 UTC.
    let date = NaiveDate::from_ymd_opt(2026, 7, 10).unwrap();
    let engine = SlotEngine::new(EngineConfig::new(chrono_tz::Europe::London, CLINIC));
    let b = BusyInterval::new(
        Utc.with_ymd_and_hms(2026, 7, 10, 8, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 7, 10, 8, 45, 0).unwrap(),
    )
    .unwrap();

    let slots = engine.compute_slots(date, &window((9, 0), (10, 0)), &[b]);

    assert_eq!(
        spans(&slots),
        vec![(t(9, 0), t(9, 30)), (t(9, 30), t(9, 45)), (t(9, 45), t(10, 0))]
    );
    assert_eq!(slots[1].status, SlotStatus::Booked);
    assert_eq!(slots[1].action, ActionRef::CalendarDay { date, hour: 9 });
}

#[test]
fn window_bounds_are_utc_instants() {
    let date = NaiveDate::from_ymd_opt(2026, 7, 10).unwrap();
    let engine = SlotEngine::new(EngineConfig::new(chrono_tz::Europe::London, CLINIC));

    let (start, end) = engine
        .window_bounds(date, &window((8, 0), (19, 0)))
        .unwrap();
    assert_eq!(start, Utc.with_ymd_and_hms(2026, 7, 10, 7, 0, 0).unwrap());
    assert_eq!(end, Utc.with_ymd_and_hms(2026, 7, 10, 18, 0, 0).unwrap());

    assert!(engine
        .window_bounds(date, &window((19, 0), (8, 0)))
        .is_none());
}

#[test]
fn window_in_dst_gap_yields_nothing() {
    // 01:00-02:00 does not exist in London on 29 March 2026.
    let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
    let engine = SlotEngine::new(EngineConfig::new(chrono_tz::Europe::London, CLINIC));
    assert!(engine
        .compute_slots(date, &window((1, 15), (3, 0)), &[])
        .is_empty());
}

#[test]
fn window_across_clock_change_back_yields_nothing() {
    // 01:00-02:00 happens twice in London on 25 October 2026.
    let date = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
    let engine = SlotEngine::new(EngineConfig::new(chrono_tz::Europe::London, CLINIC));
    let booking = BusyInterval::new(
        Utc.with_ymd_and_hms(2026, 10, 25, 0, 45, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 10, 25, 1, 0, 0).unwrap(),
    )
    .unwrap();

    assert!(engine.window_bounds(date, &window((0, 0), (3, 0))).is_none());
    assert!(engine
        .compute_slots(date, &window((0, 0), (3, 0)), &[booking])
        .is_empty());
    // Starting inside the repeated hour is just as ambiguous.
    assert!(engine
        .compute_slots(date, &window((1, 30), (3, 0)), &[])
        .is_empty());
}

#[test]
fn window_on_clock_change_day_outside_repeated_hour_is_ordered() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
    let engine = SlotEngine::new(EngineConfig::new(chrono_tz::Europe::London, CLINIC));
    let booking = BusyInterval::new(
        Utc.with_ymd_and_hms(2026, 10, 25, 9, 15, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 10, 25, 9, 30, 0).unwrap(),
    )
    .unwrap();

    let slots = engine.compute_slots(date, &window((9, 0), (10, 0)), &[booking]);
    assert_eq!(
        spans(&slots),
        vec![(t(9, 0), t(9, 15)), (t(9, 15), t(9, 30)), (t(9, 30), t(10, 0))]
    );
    assert!(slots.iter().all(|s| s.start < s.end));
}

// ── Merge pass ──────────────────────────────────────────────────────────────

#[test]
fn merge_is_idempotent() {
    let intervals = vec![busy((10, 0), (10, 30)), with_client(busy((12, 0), (12, 15)))];
    let slots = engine().compute_slots(friday(), &window((9, 0), (13, 0)), &intervals);
    assert_eq!(merge_free_slots(slots.clone()), slots);
}

#[test]
fn merge_collapses_runs_between_bookings() {
    let intervals = vec![busy((10, 0), (10, 15))];
    let raw = unmerged_engine().compute_slots(friday(), &window((9, 0), (11, 0)), &intervals);
    assert_eq!(raw.len(), 8);

    let merged = merge_free_slots(raw);
    assert_eq!(
        spans(&merged),
        vec![(t(9, 0), t(10, 0)), (t(10, 0), t(10, 15)), (t(10, 15), t(11, 0))]
    );
    assert!(merged[0].is_free() && merged[2].is_free());
    assert_eq!(merged[0].action, ActionRef::Booking);
}

#[test]
fn merge_leaves_gapped_free_slots_apart() {
    let free = |a: (u32, u32), b: (u32, u32)| Slot {
        start: t(a.0, a.1),
        end: t(b.0, b.1),
        status: SlotStatus::Free,
        action: ActionRef::Booking,
    };
    let slots = vec![free((9, 0), (9, 15)), free((9, 30), (9, 45))];
    assert_eq!(merge_free_slots(slots.clone()), slots);
}
