//! Google Calendar events API client.
//!
//! Lists the events of one calendar and turns them into busy intervals. The
//! access token is supplied by configuration; obtaining it is out of scope.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use slot_engine::{BusyInterval, Participant};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Response structure for listing events.
#[derive(Debug, Deserialize)]
pub struct ListEventsResponse {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// Calendar event as returned by the Google API.
#[derive(Debug, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub status: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default)]
    pub attendees: Vec<EventAttendee>,
    pub description: Option<String>,
}

/// Either a timed instant or, for all-day events, a bare date.
#[derive(Debug, Deserialize)]
pub struct EventDateTime {
    pub date: Option<String>,
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventAttendee {
    pub email: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

impl EventDateTime {
    /// All-day dates resolve to local midnight in `tz`.
    fn resolve(&self, tz: Tz) -> Option<DateTime<Utc>> {
        if let Some(dt) = &self.date_time {
            return DateTime::parse_from_rfc3339(dt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
        }
        let date = NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()?;
        tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl CalendarEvent {
    /// Convert to a busy interval, or `None` for cancelled or unusable events.
    pub fn into_busy(self, tz: Tz) -> Option<BusyInterval> {
        if self.status.as_deref() == Some("cancelled") {
            return None;
        }
        let (Some(start), Some(end)) = (self.start.resolve(tz), self.end.resolve(tz)) else {
            warn!(event_id = %self.id, "event_with_unparseable_times_skipped");
            return None;
        };
        let interval = match BusyInterval::new(start, end) {
            Ok(interval) => interval,
            Err(err) => {
                warn!(event_id = %self.id, error = %err, "event_with_invalid_range_skipped");
                return None;
            }
        };

        let attendees = self
            .attendees
            .into_iter()
            .filter_map(|a| a.email.map(|email| Participant::new(email, a.display_name)))
            .collect();
        let interval = interval.with_attendees(attendees);
        Some(match self.description {
            Some(description) => interval.with_description(description),
            None => interval,
        })
    }
}

/// Busy intervals from events, keeping the API's order.
pub fn events_to_busy(events: Vec<CalendarEvent>, tz: Tz) -> Vec<BusyInterval> {
    events.into_iter().filter_map(|e| e.into_busy(tz)).collect()
}

/// Parse a saved events-list document (the API's JSON response body).
pub fn parse_events(json: &str, tz: Tz) -> Result<Vec<BusyInterval>> {
    let response: ListEventsResponse = serde_json::from_str(json)?;
    Ok(events_to_busy(response.items, tz))
}

/// Client for a single calendar.
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    client: Client,
    api_base: String,
    calendar_id: String,
    access_token: SecretString,
    timezone: Tz,
}

impl GoogleCalendar {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        calendar_id: impl Into<String>,
        access_token: SecretString,
        timezone: Tz,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            calendar_id: calendar_id.into(),
            access_token,
            timezone,
        }
    }

    fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| AppError::Config(format!("invalid google.api_base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("google.api_base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    /// Busy intervals overlapping `[time_min, time_max)`, ordered by start.
    pub async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>> {
        let url = self.events_url()?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            debug!(calendar_id = %self.calendar_id, %time_min, %time_max, "fetching events from calendar API");
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(self.access_token.expose_secret())
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Calendar(format!("{status}: {body}")));
            }

            let page: ListEventsResponse = response
                .json()
                .await
                .map_err(|e| AppError::Calendar(format!("malformed events response: {e}")))?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events_to_busy(events, self.timezone))
    }
}
