use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AdminState;
use crate::monitor::MonitorId;
use crate::probe::ProbeOutcome;
use crate::runs::{RecordError, RunStats};
use crate::scheduler::SchedulerStatus;

pub const DEFAULT_RUNS_LIMIT: usize = 50;
pub const MAX_RUNS_LIMIT: usize = 1000;
/// Stats cover this many days of history.
pub const STATS_WINDOW_DAYS: i64 = 30;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct RunsResponse {
    pub monitor_id: MonitorId,
    pub runs: Vec<ProbeOutcome>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub monitor_id: MonitorId,
    pub window_days: i64,
    #[serde(flatten)]
    pub stats: RunStats,
}

/// Run-store failures surface as 500 with a JSON body.
pub struct ApiError(RecordError);

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Admin request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_scheduler_status(State(state): State<AdminState>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}

pub async fn get_runs(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<RunsResponse>, ApiError> {
    let monitor_id = MonitorId::new(id);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RUNS_LIMIT)
        .clamp(1, MAX_RUNS_LIMIT);
    let runs = state.recorder.recent(&monitor_id, limit).await?;

    Ok(Json(RunsResponse { monitor_id, runs }))
}

pub async fn get_stats(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let monitor_id = MonitorId::new(id);
    let cutoff = Utc::now() - Duration::days(STATS_WINDOW_DAYS);
    let window: Vec<ProbeOutcome> = state
        .recorder
        .recent(&monitor_id, usize::MAX)
        .await?
        .into_iter()
        .take_while(|run| run.timestamp >= cutoff)
        .collect();

    Ok(Json(StatsResponse {
        monitor_id,
        window_days: STATS_WINDOW_DAYS,
        stats: RunStats::from_recent(&window),
    }))
}

pub async fn run_check(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Json<ProbeOutcome> {
    let outcome = state.scheduler.run_check_now(&MonitorId::new(id)).await;
    Json(outcome)
}
