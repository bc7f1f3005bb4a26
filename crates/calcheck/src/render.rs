//! Presentation of weekly schedules: view models, HTML page, plain text.

use serde::Serialize;
use slot_engine::{DaySchedule, DeepLinkTemplate, Slot, SlotStatus};
use tera::{Context, Tera};

use crate::error::Result;

const WEEK_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
</head>
<body>
  <h1>{{ title }}</h1>
  <hr>
  {% for day in days %}
  <section>
    <h3>{{ day.date }}</h3>
    <ul>
      {% for slot in day.slots %}
      <li style="color: {% if slot.free %}green{% else %}red{% endif %};">
        <a href="{{ slot.href }}" target="_blank">{{ slot.start }} - {{ slot.end }}</a>
        : {% if slot.contact %}<a href="mailto:{{ slot.contact.address }}">{{ slot.contact.name }}</a>
        <details><summary>More details</summary><small>{{ slot.note }}</small></details>
        {% else %}{{ slot.label }}{% endif %}
      </li>
      {% endfor %}
    </ul>
  </section>
  {% endfor %}
  {% if not has_days %}<p>No opening hours this week.</p>{% endif %}
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactView {
    pub name: String,
    pub address: String,
}

/// One slot, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub start: String,
    pub end: String,
    pub free: bool,
    /// "Free", "Booked", or the contact's name.
    pub label: String,
    pub contact: Option<ContactView>,
    pub note: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    /// e.g. "Friday, 13 Mar".
    pub date: String,
    /// ISO date, for machine consumers.
    pub iso_date: String,
    pub slots: Vec<SlotView>,
}

fn slot_view(slot: &Slot, booking_link: &str, deep_link: &DeepLinkTemplate) -> SlotView {
    let (label, contact, note) = match &slot.status {
        SlotStatus::Free => ("Free".to_string(), None, String::new()),
        SlotStatus::Booked => ("Booked".to_string(), None, String::new()),
        SlotStatus::BookedWithContact { contact, note } => (
            contact.name.clone(),
            Some(ContactView {
                name: contact.name.clone(),
                address: contact.address.clone(),
            }),
            note.clone(),
        ),
    };
    SlotView {
        start: slot.start.format("%H:%M").to_string(),
        end: slot.end.format("%H:%M").to_string(),
        free: slot.is_free(),
        label,
        contact,
        note,
        href: slot.action.href(booking_link, deep_link),
    }
}

pub fn week_view(
    schedules: &[DaySchedule],
    booking_link: &str,
    deep_link: &DeepLinkTemplate,
) -> Vec<DayView> {
    schedules
        .iter()
        .map(|day| DayView {
            date: day.date.format("%A, %d %b").to_string(),
            iso_date: day.date.format("%Y-%m-%d").to_string(),
            slots: day
                .slots
                .iter()
                .map(|s| slot_view(s, booking_link, deep_link))
                .collect(),
        })
        .collect()
}

/// Plain-text rendering for the terminal.
pub fn week_text(days: &[DayView]) -> String {
    let mut out = String::new();
    for day in days {
        out.push_str(&day.date);
        out.push('\n');
        for slot in &day.slots {
            let detail = match &slot.contact {
                Some(contact) if slot.note.is_empty() => {
                    format!("{} <{}>", contact.name, contact.address)
                }
                Some(contact) => format!("{} <{}> ({})", contact.name, contact.address, slot.note),
                None => slot.label.clone(),
            };
            out.push_str(&format!("  {} - {}  {}\n", slot.start, slot.end, detail));
        }
    }
    out
}

/// HTML page renderer. Values are auto-escaped.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("week.html", WEEK_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render_week(&self, title: &str, days: &[DayView]) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("days", days);
        context.insert("has_days", &!days.is_empty());
        Ok(self.tera.render("week.html", &context)?)
    }
}
