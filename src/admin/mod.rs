//! Operator API.
//!
//! # Routes
//! ```text
//! GET  /admin/status              build version
//! GET  /scheduler/status          running flag + live schedules
//! GET  /monitors/{id}/runs        recent outcomes, newest first (?limit=)
//! GET  /monitors/{id}/stats       uptime summary over the stats window
//! POST /monitors/{id}/check       run one check now and return the outcome
//! ```
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::runs::RunRecorder;
use crate::scheduler::Scheduler;

/// Manual checks may take up to the probe timeout, so this sits above it.
const ADMIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AdminState {
    pub scheduler: Arc<Scheduler>,
    pub recorder: Arc<dyn RunRecorder>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(scheduler: Arc<Scheduler>, recorder: Arc<dyn RunRecorder>, api_key: &str) -> Self {
        Self {
            scheduler,
            recorder,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/scheduler/status", get(get_scheduler_status))
        .route("/monitors/{id}/runs", get(get_runs))
        .route("/monitors/{id}/stats", get(get_stats))
        .route("/monitors/{id}/check", post(run_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(TimeoutLayer::new(ADMIN_REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
