use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::static_dir;
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let static_assets = ServeDir::new(static_dir())
        .precompressed_br()
        .precompressed_gzip();

    let app = Router::new()
        .route("/api/health", get(routes::api::health))
        .route("/api/metrics", get(routes::api::metrics))
        .route("/api/config", get(routes::api::get_config))
        .route("/api/areas", get(routes::api::get_areas))
        .route("/api/areas/{area_id}", get(routes::api::get_area))
        .route(
            "/api/areas/{area_id}/stats",
            get(routes::api::get_area_stats),
        )
        .route(
            "/api/areas/{area_id}/tooltip",
            get(routes::api::get_area_tooltip),
        )
        .route("/api/filters", get(routes::api::get_filters))
        .route(
            "/api/filter",
            get(routes::api::get_filter).put(routes::api::put_filter),
        )
        .route("/api/reload", post(routes::api::post_reload))
        .route("/api/events", get(routes::sse::map_events));

    app.layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .fallback_service(static_assets)
        .with_state(state)
}
