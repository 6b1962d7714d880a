use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::AppState;
use crate::config::Config;
use crate::helpers::{format_mb, human_time};
use crate::models::store::{Cluster, NodeRecord, OPERATIONS};
use crate::models::views::*;

// --- Cluster list ---

#[derive(Template)]
#[template(path = "clusters.html")]
struct ClustersTemplate {
    title: String,
    cluster_name: String,
    backend: BackendView,
    clusters: Vec<ClusterEntryView>,
}

#[derive(Template)]
#[template(path = "cluster_list.html")]
struct ClusterListTemplate {
    clusters: Vec<ClusterEntryView>,
}

pub async fn handle_clusters(State(state): State<AppState>) -> Response {
    let clusters = match state.rpc.list().await {
        Ok(c) => c,
        Err(e) => return bad_gateway("list", e),
    };

    let tmpl = ClustersTemplate {
        title: "Clusters".to_string(),
        cluster_name: state.config.cluster_name.clone(),
        backend: build_backend_view(&state),
        clusters: clusters.iter().map(build_entry).collect(),
    };

    render_template(&tmpl)
}

/// Refresh target for the page script: just the list markup, re-fetched
/// after a successful create instead of reloading the whole page.
pub async fn handle_cluster_list_fragment(State(state): State<AppState>) -> Response {
    let clusters = match state.rpc.list().await {
        Ok(c) => c,
        Err(e) => return bad_gateway("list", e),
    };

    let tmpl = ClusterListTemplate {
        clusters: clusters.iter().map(build_entry).collect(),
    };

    render_template(&tmpl)
}

// --- Pair detail ---

#[derive(Deserialize)]
pub struct DetailQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Template)]
#[template(path = "detail.html")]
struct DetailTemplate {
    title: String,
    cluster_name: String,
    backend: BackendView,
    panel: PairPanel,
}

#[derive(Template)]
#[template(path = "pair_panel.html")]
struct PairPanelTemplate {
    panel: PairPanel,
}

struct PairPanel {
    id: String,
    pair_name: String,
    first: NodeStatusView,
    second: NodeStatusView,
    replication: ReplicationView,
    memory: MemoryView,
    gauges: Vec<GaugeView>,
    chart_json: String,
}

pub async fn handle_detail(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let id = match query.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return (StatusCode::BAD_REQUEST, "missing id").into_response(),
    };

    let cluster = match state.rpc.detail(&id).await {
        Ok(c) => c,
        Err(e) => return bad_gateway("detail", e),
    };

    let panel = match build_pair_panel(&state.config, &cluster) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let tmpl = DetailTemplate {
        title: format!("Pair: {}", cluster.name),
        cluster_name: state.config.cluster_name.clone(),
        backend: build_backend_view(&state),
        panel,
    };

    render_template(&tmpl)
}

/// Refresh target after a node kill: the pair panel only, charts re-drawn
/// by the page script from the embedded series JSON.
pub async fn handle_pair_fragment(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> Response {
    let id = match query.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return (StatusCode::BAD_REQUEST, "missing id").into_response(),
    };

    let cluster = match state.rpc.detail(&id).await {
        Ok(c) => c,
        Err(e) => return bad_gateway("detail", e),
    };

    match build_pair_panel(&state.config, &cluster) {
        Ok(panel) => render_template(&PairPanelTemplate { panel }),
        Err(resp) => resp,
    }
}

// --- View Builders ---

fn build_entry(cluster: &Cluster) -> ClusterEntryView {
    ClusterEntryView {
        id: cluster.id.clone(),
        name: cluster.name.clone(),
    }
}

fn build_node_status(cfg: &Config, label: &str, node: &NodeRecord) -> NodeStatusView {
    let operational = node.alive == cfg.tokens.alive;
    NodeStatusView {
        label: label.to_string(),
        ip: node.ip.clone(),
        image_id: node.image_id.clone(),
        operational,
        status: if operational { "Operational" } else { "down" }.to_string(),
        status_class: if operational { "badge-ok" } else { "badge-error" }.to_string(),
        row_class: if operational {
            String::new()
        } else {
            "replica-fails".to_string()
        },
    }
}

fn build_memory_view(node: &NodeRecord) -> MemoryView {
    let summary = format_mb(node.used, node.size);
    if node.size == 0 {
        return MemoryView {
            summary,
            ..Default::default()
        };
    }

    let pct = |v: u64| 100.0 * v as f64 / node.size as f64;
    let used = pct(node.used);
    let arena_size = pct(node.arena_size);
    let arena_used = pct(node.arena_used);

    MemoryView {
        free: 100.0 - used,
        index_system: used - arena_size,
        arena_free: arena_size - arena_used,
        tuples: arena_used,
        summary,
    }
}

fn build_gauges(node: &NodeRecord) -> Vec<GaugeView> {
    OPERATIONS
        .iter()
        .map(|op| GaugeView {
            op: op.to_string(),
            css: format!("rps-{}", op.to_lowercase()),
            rps: node.stats.get(*op).map(|s| s.rps).unwrap_or(0.0),
        })
        .collect()
}

fn build_replication(cfg: &Config, first: &NodeRecord, second: &NodeRecord) -> ReplicationView {
    let ok = &cfg.tokens.replication_ok;
    let healthy = first.replication == *ok && second.replication == *ok;
    ReplicationView {
        status: if healthy { ok.clone() } else { "error".to_string() },
        status_class: if healthy { "badge-ok" } else { "badge-error" }.to_string(),
        row_class: if healthy {
            "replica-works"
        } else {
            "replica-fails"
        }
        .to_string(),
    }
}

fn build_pair_panel(cfg: &Config, cluster: &Cluster) -> Result<PairPanel, Response> {
    let memory = build_memory_view(&cluster.pair.first);
    let gauges = build_gauges(&cluster.pair.first);

    let chart_json = match serde_json::to_string(&ChartPayload {
        memory: &memory,
        gauges: &gauges,
        rps_max: cfg.gauges.rps_max,
    }) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("chart payload serialization failed: {}", e);
            return Err(
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
            );
        }
    };

    Ok(PairPanel {
        id: cluster.id.clone(),
        pair_name: cluster.name.clone(),
        first: build_node_status(cfg, "first", &cluster.pair.first),
        second: build_node_status(cfg, "second", &cluster.pair.second),
        replication: build_replication(cfg, &cluster.pair.first, &cluster.pair.second),
        memory,
        gauges,
        chart_json,
    })
}

fn build_backend_view(state: &AppState) -> BackendView {
    BackendView {
        healthy: state.rpc.is_healthy(),
        last_checked: human_time(state.rpc.last_checked()),
    }
}

fn render_template(tmpl: &impl Template) -> Response {
    match tmpl.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn bad_gateway(method: &str, e: Box<dyn std::error::Error + Send + Sync>) -> Response {
    tracing::error!("backend {} call failed: {}", method, e);
    (StatusCode::BAD_GATEWAY, format!("backend error: {}", e)).into_response()
}
