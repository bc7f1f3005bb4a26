//! Configuration: a TOML file plus secrets from the environment.
//!
//! Every setting has a default, so the file is optional. Tokens and the
//! trigger secret only come from the environment (or a `.env` file):
//!
//! - `GOOGLE_ACCESS_TOKEN`
//! - `TELEGRAM_BOT_TOKEN`, `TELEGRAM_USER_ID`
//! - `TRIGGER_SECRET`

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::Weekday;
use chrono_tz::Tz;
use secrecy::SecretString;
use serde::Deserialize;
use slot_engine::slots::{DEFAULT_NOTE_MARKER, DEFAULT_SLOT_MINUTES};
use slot_engine::{parse_timezone, DeepLinkTemplate, EngineConfig, WeekPolicy, WorkingWindow};
use tracing::info;

use crate::error::{AppError, Result};

pub const DEFAULT_TIMEZONE: &str = "Europe/London";
pub const DEFAULT_BOOKING_LINK: &str = "https://calendly.com/ch-sports-rehab/session";
pub const DEFAULT_BIND: &str = "0.0.0.0:8081";
pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

// ── File format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    timezone: String,
    booking_link: String,
    deep_link_template: String,
    note_marker: String,
    slot_minutes: u32,
    merge_free_runs: bool,
    bind: String,
    request_timeout_secs: u64,
    title: String,
    /// Weekday name → window. Absent means the clinic's regular hours.
    hours: Option<BTreeMap<String, FileWindow>>,
    google: FileGoogle,
    telegram: FileTelegram,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            booking_link: DEFAULT_BOOKING_LINK.to_string(),
            deep_link_template: DeepLinkTemplate::default().as_str().to_string(),
            note_marker: DEFAULT_NOTE_MARKER.to_string(),
            slot_minutes: DEFAULT_SLOT_MINUTES,
            merge_free_runs: true,
            bind: DEFAULT_BIND.to_string(),
            request_timeout_secs: 10,
            title: "CH Sports Rehab – Appointment Availability".to_string(),
            hours: None,
            google: FileGoogle::default(),
            telegram: FileTelegram::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileWindow {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileGoogle {
    calendar_id: String,
    api_base: String,
}

impl Default for FileGoogle {
    fn default() -> Self {
        Self {
            calendar_id: String::new(),
            api_base: GOOGLE_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileTelegram {
    api_base: String,
}

impl Default for FileTelegram {
    fn default() -> Self {
        Self {
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }
}

// ── Resolved configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub calendar_id: String,
    pub api_base: String,
    pub access_token: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: SecretString,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub booking_link: String,
    pub deep_link: DeepLinkTemplate,
    pub bind: String,
    pub request_timeout: Duration,
    /// Page heading.
    pub title: String,
    pub google: GoogleConfig,
    /// Present only when both the bot token and the chat id are set.
    pub telegram: Option<TelegramConfig>,
    pub trigger_secret: Option<SecretString>,
}

impl Config {
    /// Load `path` if it exists, otherwise start from defaults, then apply the
    /// process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let text = if path.exists() {
            std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("cannot read {}: {}", path.display(), e))
            })?
        } else {
            info!(path = %path.display(), "config_file_missing_using_defaults");
            String::new()
        };
        Self::from_toml(&text, |key| std::env::var(key).ok())
    }

    /// Build a configuration from TOML text and an environment lookup.
    pub fn from_toml(text: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file: FileConfig =
            toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))?;

        let timezone: Tz = parse_timezone(&file.timezone)?;
        if file.slot_minutes == 0 {
            return Err(AppError::Config("slot_minutes must be positive".to_string()));
        }

        let policy = match &file.hours {
            Some(hours) => parse_hours(hours)?,
            None => WeekPolicy::clinic_default(),
        };
        policy.validate()?;

        let mut engine = EngineConfig::new(timezone, file.google.calendar_id.clone())
            .with_policy(policy);
        engine.slot_minutes = file.slot_minutes;
        engine.merge_free_runs = file.merge_free_runs;
        engine.note_marker = file.note_marker;

        let secret = |key: &str| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretString::new(v.into()))
        };
        let plain = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let telegram = match (secret("TELEGRAM_BOT_TOKEN"), plain("TELEGRAM_USER_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                api_base: file.telegram.api_base,
                bot_token,
                chat_id,
            }),
            _ => None,
        };

        Ok(Self {
            engine,
            booking_link: file.booking_link,
            deep_link: DeepLinkTemplate::new(file.deep_link_template),
            bind: file.bind,
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            title: file.title,
            google: GoogleConfig {
                calendar_id: file.google.calendar_id,
                api_base: file.google.api_base,
                access_token: secret("GOOGLE_ACCESS_TOKEN"),
            },
            telegram,
            trigger_secret: secret("TRIGGER_SECRET"),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.engine.timezone
    }
}

fn parse_hours(hours: &BTreeMap<String, FileWindow>) -> Result<WeekPolicy> {
    let mut policy = WeekPolicy::closed();
    for (name, window) in hours {
        let weekday: Weekday = name
            .parse()
            .map_err(|_| AppError::Config(format!("unknown weekday in [hours]: {name}")))?;
        policy.set(weekday, Some(WorkingWindow::parse(&window.start, &window.end)?));
    }
    Ok(policy)
}
