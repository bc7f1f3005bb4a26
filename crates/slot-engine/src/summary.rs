//! Plain-text weekly summary for the messaging bot.
//!
//! The text uses the bot's HTML parse mode for the booking links.

use crate::week::DaySchedule;

pub const SUMMARY_HEADER: &str = "🗓 Available Free Slots This Week:";
pub const NO_AVAILABILITY: &str = "No free slots left this week.";

/// Render the free slots of `schedules`, one block per day that has any.
pub fn render_summary(schedules: &[DaySchedule], booking_link: &str) -> String {
    let mut message = format!("{SUMMARY_HEADER}\n\n");
    let mut any_free = false;

    for day in schedules {
        let mut free = day.slots.iter().filter(|s| s.is_free()).peekable();
        if free.peek().is_none() {
            continue;
        }
        any_free = true;

        message.push_str(&format!("{}\n", day.date.format("%A, %d %b")));
        for slot in free {
            message.push_str(&format!(
                "  {} - {} ✅ → <a href='{}'>Book this</a>\n",
                slot.start.format("%H:%M"),
                slot.end.format("%H:%M"),
                booking_link
            ));
        }
        message.push('\n');
    }

    if !any_free {
        message.push_str(NO_AVAILABILITY);
        message.push('\n');
    }

    message
}
