//! Glue between the slot engine and the outside world.
//!
//! Fetches one day of events per open day, runs the engine, and hands the
//! result to the page renderer or the bot.

use chrono::{NaiveDate, Utc};
use reqwest::Client;
use slot_engine::{render_summary, BusyInterval, DaySchedule, SlotEngine};
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::google::GoogleCalendar;
use crate::render::{week_view, DayView, PageRenderer};
use crate::telegram::TelegramBot;

pub struct AvailabilityService {
    config: Config,
    engine: SlotEngine,
    calendar: Option<GoogleCalendar>,
    telegram: Option<TelegramBot>,
    renderer: PageRenderer,
}

impl AvailabilityService {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let calendar = match (&config.google.access_token, config.google.calendar_id.is_empty()) {
            (Some(token), false) => Some(GoogleCalendar::new(
                client.clone(),
                config.google.api_base.clone(),
                config.google.calendar_id.clone(),
                token.clone(),
                config.timezone(),
            )),
            _ => None,
        };
        let telegram = config.telegram.as_ref().map(|t| {
            TelegramBot::new(
                client.clone(),
                t.api_base.clone(),
                t.bot_token.clone(),
                t.chat_id.clone(),
            )
        });

        Ok(Self {
            engine: SlotEngine::new(config.engine.clone()),
            renderer: PageRenderer::new()?,
            config,
            calendar,
            telegram,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Today in the clinic's timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.timezone()).date_naive()
    }

    pub fn has_telegram(&self) -> bool {
        self.telegram.is_some()
    }

    /// Fetch each open day's events from the calendar and compute its slots.
    pub async fn fetch_week(&self, today: NaiveDate) -> Result<Vec<DaySchedule>> {
        let calendar = self.calendar.as_ref().ok_or_else(|| {
            AppError::Config(
                "google.calendar_id and GOOGLE_ACCESS_TOKEN must be set to read the calendar"
                    .to_string(),
            )
        })?;

        let mut schedules = Vec::new();
        for (date, window) in self.engine.open_days(today) {
            let Some((start, end)) = self.engine.window_bounds(date, &window) else {
                continue;
            };
            let busy = calendar.list_busy(start, end).await?;
            info!(%date, events = busy.len(), "day_fetched");
            schedules.push(self.engine.day_schedule(date, &window, &busy));
        }
        Ok(schedules)
    }

    /// Compute the week from already-fetched intervals.
    pub fn week_from(&self, today: NaiveDate, busy: &[BusyInterval]) -> Vec<DaySchedule> {
        self.engine.weekly_schedule(today, busy)
    }

    pub fn views(&self, schedules: &[DaySchedule]) -> Vec<DayView> {
        week_view(schedules, &self.config.booking_link, &self.config.deep_link)
    }

    pub fn page(&self, schedules: &[DaySchedule]) -> Result<String> {
        self.renderer
            .render_week(&self.config.title, &self.views(schedules))
    }

    pub fn summary(&self, schedules: &[DaySchedule]) -> String {
        render_summary(schedules, &self.config.booking_link)
    }

    /// Send the summary through the bot.
    pub async fn send_summary(&self, text: &str) -> Result<()> {
        let bot = self.telegram.as_ref().ok_or_else(|| {
            AppError::Unavailable(
                "TELEGRAM_BOT_TOKEN and TELEGRAM_USER_ID are not configured".to_string(),
            )
        })?;
        bot.send_message(text).await
    }
}
