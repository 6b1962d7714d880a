pub mod api;
pub mod ui;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Dashboard UI
        .route("/ui/", get(ui::handle_clusters))
        .route("/ui/detail", get(ui::handle_detail))
        // Refresh fragments (re-render one entity, never the whole page)
        .route("/ui/fragment/clusters", get(ui::handle_cluster_list_fragment))
        .route("/ui/fragment/pair", get(ui::handle_pair_fragment))
        // JSON API
        .route(
            "/api/clusters",
            get(api::handle_list_clusters).post(api::handle_create_cluster),
        )
        .route(
            "/api/clusters/{id}",
            get(api::handle_get_cluster).delete(api::handle_delete_cluster),
        )
        .route("/api/nodes/{image_id}/kill", post(api::handle_kill_node))
        // Health
        .route("/healthz", get(api::handle_healthz))
        // Static files
        .nest_service("/ui/static", ServeDir::new("static"))
        // Root redirect
        .route(
            "/",
            get(|| async { axum::response::Redirect::to("/ui/") }),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
