use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::announce::Announcement;
use crate::config::{BaseInfo, NodeConfig};
use crate::context::BaseContext;
use crate::inbound::AcceptedAnnouncementStore;
use crate::utils::now_i64;

pub const SERVICE_NAME: &str = "starbase";

/// State shared by every handler.
pub struct ApiState {
    pub ctx: Arc<BaseContext>,
    pub accepted: Arc<AcceptedAnnouncementStore>,
    pub started_at: i64,
    pub active_jobs: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    uptime: i64,
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    base_info: BaseInfo,
    services: BTreeMap<String, String>,
    public_key: String,
    announcement_targets: usize,
    active_jobs: Vec<String>,
}

async fn health_handler(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let now = now_i64();
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime: now.saturating_sub(state.started_at),
        timestamp: now,
    })
}

// Served verbatim: the config carries no key material, and this is an
// operator-facing read-only surface.
async fn config_handler(State(state): State<Arc<ApiState>>) -> Json<NodeConfig> {
    Json(state.ctx.config.clone())
}

async fn status_handler(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        base_info: state.ctx.config.base_info.clone(),
        services: state.ctx.resolved_services(),
        public_key: state.ctx.key_pair.public_key(),
        announcement_targets: state.ctx.config.networking.announce_to_base.len(),
        active_jobs: state.active_jobs.clone(),
    })
}

/// Inbound announcement endpoint: gate on config, then structural
/// validation, then signature verification, then persist.
async fn announce_handler(
    State(state): State<Arc<ApiState>>,
    body: String,
) -> (StatusCode, Json<JsonValue>) {
    if !state.ctx.config.networking.listen_for_announcements {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Announcements not accepted" })),
        );
    }

    let announcement = match Announcement::from_json(&body) {
        Ok(announcement) => announcement,
        Err(err) => {
            debug!("rejected announcement: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            );
        }
    };

    if let Err(err) = announcement.verify() {
        warn!(
            "announcement from `{}` failed verification",
            announcement.base_info.name
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        );
    }

    match state.accepted.append(&announcement).await {
        Ok(received_at) => (
            StatusCode::OK,
            Json(json!({ "status": "accepted", "timestamp": received_at })),
        ),
        Err(err) => {
            warn!(
                "could not persist announcement from `{}`: {err}",
                announcement.base_info.name
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to persist announcement" })),
            )
        }
    }
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config", get(config_handler))
        .route("/status", get(status_handler))
        .route("/announce", post(announce_handler))
        .with_state(state)
}
