use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::clients::CreateOutcome;

#[derive(Debug, Serialize)]
struct ActionStatus {
    status: &'static str,
}

fn status(code: StatusCode, status: &'static str) -> Response {
    (code, Json(ActionStatus { status })).into_response()
}

fn bad_gateway(method: &str, e: Box<dyn std::error::Error + Send + Sync>) -> Response {
    tracing::error!("backend {} call failed: {}", method, e);
    (StatusCode::BAD_GATEWAY, format!("backend error: {}", e)).into_response()
}

// --- Read mirrors ---

pub async fn handle_list_clusters(State(state): State<AppState>) -> Response {
    match state.rpc.list().await {
        Ok(clusters) => Json(clusters).into_response(),
        Err(e) => bad_gateway("list", e),
    }
}

pub async fn handle_get_cluster(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.rpc.detail(&id).await {
        Ok(cluster) => Json(cluster).into_response(),
        Err(e) => bad_gateway("detail", e),
    }
}

// --- Actions ---

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    #[serde(default)]
    pub name: String,
}

/// An empty name never reaches the backend.
pub fn normalized_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    if name.is_empty() { None } else { Some(name) }
}

pub async fn handle_create_cluster(
    State(state): State<AppState>,
    Json(body): Json<CreateBody>,
) -> Response {
    let name = match normalized_name(&body.name) {
        Some(n) => n,
        None => return status(StatusCode::BAD_REQUEST, "empty"),
    };

    match state.rpc.create(name).await {
        Ok(CreateOutcome::Created) => status(StatusCode::OK, "created"),
        Ok(CreateOutcome::LimitExceeded) => status(StatusCode::OK, "limit"),
        Err(e) => bad_gateway("create", e),
    }
}

pub async fn handle_delete_cluster(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.rpc.delete(&id).await {
        Ok(()) => status(StatusCode::OK, "deleted"),
        Err(e) => bad_gateway("delete", e),
    }
}

pub async fn handle_kill_node(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> Response {
    match state.rpc.drop_node(&image_id).await {
        Ok(()) => status(StatusCode::OK, "killed"),
        Err(e) => bad_gateway("drop", e),
    }
}

pub async fn handle_healthz() -> &'static str {
    "ok\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected_before_any_rpc() {
        assert_eq!(normalized_name(""), None);
        assert_eq!(normalized_name("   "), None);
        assert_eq!(normalized_name("mycluster"), Some("mycluster"));
        assert_eq!(normalized_name("  mycluster "), Some("mycluster"));
    }
}
