use std::fmt::Write as _;
use std::sync::Arc;

use areamap_shared::{
    AreaId, AreaStats, EnrichedArea, FilterOption, HoverController, MapEvent, PointerLocation,
    Statistic, Tooltip,
};
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{MAP_CENTER_LAT, MAP_CENTER_LNG, MAP_STYLE, MAP_ZOOM};
use crate::services::data_loader::{self, LoadOutcome};
use crate::state::{AppState, ObservabilitySnapshot};
use crate::surface::ApiSurface;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (area_count, user_count, generation, statistic) = {
        let map = state.map.read().await;
        (
            map.enriched().len(),
            map.enriched().joined_user_count(),
            map.generation(),
            map.statistic(),
        )
    };
    let last_loaded_at = state
        .last_loaded_at
        .read()
        .await
        .as_ref()
        .map(|at| at.to_rfc3339());
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "areas": area_count,
        "users": user_count,
        "generation": generation,
        "statistic": statistic,
        "loading": state.is_loading(),
        "last_loaded_at": last_loaded_at,
        "observability": {
            "reloads_total": observability.reloads_total,
            "area_fetch_failures_total": observability.area_fetch_failures_total,
            "user_fetch_failures_total": observability.user_fetch_failures_total,
            "tooltip_requests_total": observability.tooltip_requests_total,
            "filter_changes_total": observability.filter_changes_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let (area_count, user_count) = {
        let map = state.map.read().await;
        (map.enriched().len(), map.enriched().joined_user_count())
    };
    let body = render_prometheus_metrics(
        area_count,
        user_count,
        state.is_loading(),
        state.observability.snapshot(),
    );

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    area_count: usize,
    user_count: usize,
    loading: bool,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    write_metric(
        &mut body,
        "areamap_areas",
        "gauge",
        "Areas in the current join.",
        area_count as u64,
    );
    write_metric(
        &mut body,
        "areamap_joined_users",
        "gauge",
        "Users attached to an area in the current join.",
        user_count as u64,
    );
    write_metric(
        &mut body,
        "areamap_loading",
        "gauge",
        "Whether a reload is in flight (1 or 0).",
        u64::from(loading),
    );
    write_metric(
        &mut body,
        "areamap_reloads_total",
        "counter",
        "Total reloads started.",
        observability.reloads_total,
    );
    write_metric(
        &mut body,
        "areamap_area_fetch_failures_total",
        "counter",
        "Total failed fetches of the areas endpoint.",
        observability.area_fetch_failures_total,
    );
    write_metric(
        &mut body,
        "areamap_user_fetch_failures_total",
        "counter",
        "Total failed fetches of the users endpoint.",
        observability.user_fetch_failures_total,
    );
    write_metric(
        &mut body,
        "areamap_tooltip_requests_total",
        "counter",
        "Total tooltip requests.",
        observability.tooltip_requests_total,
    );
    write_metric(
        &mut body,
        "areamap_filter_changes_total",
        "counter",
        "Total changes of the active statistic.",
        observability.filter_changes_total,
    );
    body
}

fn write_metric(body: &mut String, name: &str, kind: &str, help: &str, value: u64) {
    let _ = writeln!(body, "# HELP {name} {help}");
    let _ = writeln!(body, "# TYPE {name} {kind}");
    let _ = writeln!(body, "{name} {value}");
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapConfig {
    pub access_token: Option<String>,
    pub style: String,
    pub center: [f64; 2],
    pub zoom: f64,
}

pub async fn get_config(State(state): State<AppState>) -> Json<MapConfig> {
    Json(MapConfig {
        access_token: state.map_access_token.clone(),
        style: MAP_STYLE.to_string(),
        center: [MAP_CENTER_LNG, MAP_CENTER_LAT],
        zoom: MAP_ZOOM,
    })
}

/// Serve the pre-serialized layer collection for the current join.
pub async fn get_areas(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (etag, json) = {
        let layers = state.layers.read().await;
        (layers.etag.clone(), Arc::clone(&layers.json))
    };

    if if_none_match_matches(&headers, &etag) {
        return not_modified_response("no-cache", Some(etag.as_str()));
    }

    json_bytes_response((*json).clone(), "no-cache", Some(etag.as_str()))
}

pub async fn get_area(
    State(state): State<AppState>,
    Path(area_id): Path<AreaId>,
) -> Result<Json<EnrichedArea>, StatusCode> {
    let map = state.map.read().await;
    map.enriched()
        .get(area_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AreaStatsResponse {
    pub area_id: AreaId,
    pub name: String,
    #[serde(flatten)]
    pub stats: AreaStats,
}

pub async fn get_area_stats(
    State(state): State<AppState>,
    Path(area_id): Path<AreaId>,
) -> Result<Json<AreaStatsResponse>, StatusCode> {
    let map = state.map.read().await;
    let enriched = map.enriched().get(area_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(AreaStatsResponse {
        area_id,
        name: enriched.area.name.clone(),
        stats: AreaStats::compute(&enriched.users),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct TooltipQuery {
    #[serde(default)]
    pub statistic: Option<String>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
}

/// Hover text for an area. Uses the active statistic unless one is given.
pub async fn get_area_tooltip(
    State(state): State<AppState>,
    Path(area_id): Path<AreaId>,
    Query(query): Query<TooltipQuery>,
) -> Result<Json<Tooltip>, StatusCode> {
    state.observability.record_tooltip_request();
    let requested = query
        .statistic
        .as_deref()
        .map(parse_statistic)
        .transpose()?;
    let location = PointerLocation {
        lng: query.lng.unwrap_or_default(),
        lat: query.lat.unwrap_or_default(),
    };

    let map = state.map.read().await;
    let tooltip = match requested {
        Some(statistic) => HoverController::tooltip_for(&map, area_id, statistic, location),
        None => {
            let mut surface = ApiSurface::default();
            HoverController::area_enter(&map, area_id, location, &mut surface);
            surface.take_tooltip()
        }
    };
    tooltip.map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_filters(State(state): State<AppState>) -> Json<Vec<FilterOption>> {
    let active = state.map.read().await.statistic();
    Json(Statistic::options(active))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterBody {
    pub statistic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterResponse {
    pub statistic: Statistic,
    pub label: String,
}

impl From<Statistic> for FilterResponse {
    fn from(statistic: Statistic) -> Self {
        Self {
            statistic,
            label: statistic.label().to_string(),
        }
    }
}

pub async fn get_filter(State(state): State<AppState>) -> Json<FilterResponse> {
    let active = state.map.read().await.statistic();
    Json(FilterResponse::from(active))
}

/// Switch the active statistic. Never refetches or rejoins.
pub async fn put_filter(
    State(state): State<AppState>,
    Json(body): Json<FilterBody>,
) -> Result<Json<FilterResponse>, StatusCode> {
    let statistic = parse_statistic(&body.statistic)?;
    let changed = state.map.write().await.set_statistic(statistic);

    if changed {
        state.observability.record_filter_change();
        info!(%statistic, "active statistic changed");
        let _ = state.event_tx.send(MapEvent::FilterChanged {
            statistic,
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    Ok(Json(FilterResponse::from(statistic)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub generation: u64,
    pub area_count: usize,
    pub user_count: usize,
    pub areas_failed: bool,
    pub users_failed: bool,
}

impl From<LoadOutcome> for ReloadResponse {
    fn from(outcome: LoadOutcome) -> Self {
        Self {
            generation: outcome.generation,
            area_count: outcome.area_count,
            user_count: outcome.user_count,
            areas_failed: outcome.areas_failed,
            users_failed: outcome.users_failed,
        }
    }
}

pub async fn post_reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, StatusCode> {
    data_loader::reload(&state)
        .await
        .map(|outcome| Json(ReloadResponse::from(outcome)))
        .ok_or(StatusCode::CONFLICT)
}

fn parse_statistic(raw: &str) -> Result<Statistic, StatusCode> {
    raw.parse::<Statistic>()
        .map_err(|_| StatusCode::BAD_REQUEST)
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/geo+json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}
