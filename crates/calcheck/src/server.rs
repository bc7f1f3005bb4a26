//! HTTP surface: availability page, JSON week, Telegram trigger, health check.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::render::DayView;
use crate::service::AvailabilityService;

#[derive(Clone)]
pub struct AppState {
    service: Arc<AvailabilityService>,
    /// Fixed "today", for reproducible pages. `None` follows the clock.
    today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(service: AvailabilityService) -> Self {
        Self {
            service: Arc::new(service),
            today: None,
        }
    }

    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn service(&self) -> &AvailabilityService {
        &self.service
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| self.service.today())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/week", get(week_json))
        .route("/trigger/{secret}", get(trigger))
        .route("/health", get(health))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let schedules = state.service.fetch_week(state.today()).await?;
    Ok(Html(state.service.page(&schedules)?))
}

async fn week_json(State(state): State<AppState>) -> Result<Json<Vec<DayView>>> {
    let schedules = state.service.fetch_week(state.today()).await?;
    Ok(Json(state.service.views(&schedules)))
}

async fn trigger(
    State(state): State<AppState>,
    Path(secret): Path<String>,
) -> Result<&'static str> {
    let expected = state
        .service
        .config()
        .trigger_secret
        .as_ref()
        .ok_or(AppError::Forbidden)?;
    if !constant_time_eq(expected.expose_secret().as_bytes(), secret.as_bytes()) {
        return Err(AppError::Forbidden);
    }
    if !state.service.has_telegram() {
        return Err(AppError::Unavailable(
            "Telegram is not configured".to_string(),
        ));
    }

    let schedules = state.service.fetch_week(state.today()).await?;
    state
        .service
        .send_summary(&state.service.summary(&schedules))
        .await?;
    info!("summary_sent_via_trigger");
    Ok("Telegram update sent.")
}

async fn health() -> &'static str {
    "OK"
}

/// Compare secrets without an early exit on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Send this week's summary once at startup, when Telegram is configured.
///
/// Failures are logged, not fatal.
pub async fn startup_summary(state: &AppState) {
    let service = state.service();
    if !service.has_telegram() {
        info!("telegram_not_configured_skipping_startup_summary");
        return;
    }
    let result: Result<()> = async {
        let schedules = service.fetch_week(state.today()).await?;
        let text = service.summary(&schedules);
        print!("{text}");
        service.send_summary(&text).await
    }
    .await;
    match result {
        Ok(()) => info!("startup_summary_sent"),
        Err(err) => warn!(error = %err, "startup_summary_failed"),
    }
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot_listen_for_ctrl_c");
        std::future::pending::<()>().await;
    }
    info!("shutting_down");
}
