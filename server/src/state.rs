use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use areamap_shared::{MapEvent, MapState};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use tracing::warn;

use crate::config::{
    areas_url, map_access_token, sse_broadcast_buffer, upstream_connect_timeout,
    upstream_http_timeout, users_url,
};

/// Where the two collections are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub areas_url: String,
    pub users_url: String,
}

impl Upstream {
    pub fn from_env() -> Self {
        Self {
            areas_url: areas_url(),
            users_url: users_url(),
        }
    }
}

/// Area layers serialized once per join generation.
#[derive(Debug, Clone)]
pub struct CachedLayers {
    pub generation: u64,
    pub json: Arc<Bytes>,
    pub etag: String,
}

impl CachedLayers {
    pub fn new(generation: u64, json: Bytes) -> Self {
        // Generation restarts at 0 on boot; the body checksum keeps tags
        // from an earlier process from matching different content.
        let etag = format!("\"areas-{generation}-{:08x}\"", crc32fast::hash(&json));
        Self {
            generation,
            json: Arc::new(json),
            etag,
        }
    }
}

impl Default for CachedLayers {
    fn default() -> Self {
        Self::new(
            0,
            Bytes::from_static(br#"{"type":"FeatureCollection","features":[]}"#),
        )
    }
}

#[derive(Clone)]
pub struct AppState {
    pub map: Arc<RwLock<MapState>>,
    pub layers: Arc<RwLock<CachedLayers>>,
    /// True while a reload has fetches in flight.
    pub loading: Arc<AtomicBool>,
    pub last_loaded_at: Arc<RwLock<Option<DateTime<Utc>>>>,
    pub event_tx: broadcast::Sender<MapEvent>,
    pub http_client: reqwest::Client,
    pub upstream: Upstream,
    pub map_access_token: Option<String>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    reloads_total: AtomicU64,
    area_fetch_failures_total: AtomicU64,
    user_fetch_failures_total: AtomicU64,
    tooltip_requests_total: AtomicU64,
    filter_changes_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservabilitySnapshot {
    pub reloads_total: u64,
    pub area_fetch_failures_total: u64,
    pub user_fetch_failures_total: u64,
    pub tooltip_requests_total: u64,
    pub filter_changes_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            reloads_total: self.reloads_total.load(Ordering::Relaxed),
            area_fetch_failures_total: self.area_fetch_failures_total.load(Ordering::Relaxed),
            user_fetch_failures_total: self.user_fetch_failures_total.load(Ordering::Relaxed),
            tooltip_requests_total: self.tooltip_requests_total.load(Ordering::Relaxed),
            filter_changes_total: self.filter_changes_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_reload(&self) {
        self.reloads_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_area_fetch_failure(&self) {
        self.area_fetch_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_user_fetch_failure(&self) {
        self.user_fetch_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tooltip_request(&self) {
        self.tooltip_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filter_change(&self) {
        self.filter_changes_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_upstream(Upstream::from_env())
    }

    pub fn with_upstream(upstream: Upstream) -> Self {
        let (event_tx, _) = broadcast::channel(sse_broadcast_buffer());
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("areamap/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });
        Self {
            map: Arc::new(RwLock::new(MapState::new())),
            layers: Arc::new(RwLock::new(CachedLayers::default())),
            loading: Arc::new(AtomicBool::new(false)),
            last_loaded_at: Arc::new(RwLock::new(None)),
            event_tx,
            http_client,
            upstream,
            map_access_token: map_access_token(),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::CachedLayers;

    #[test]
    fn layer_etag_tracks_content_within_a_generation() {
        let empty = CachedLayers::default();
        let loaded = CachedLayers::new(
            0,
            Bytes::from_static(br#"{"type":"FeatureCollection","features":[{"id":1}]}"#),
        );
        let reloaded = CachedLayers::new(
            0,
            Bytes::from_static(br#"{"type":"FeatureCollection","features":[{"id":1}]}"#),
        );

        assert!(empty.etag.starts_with("\"areas-0-"));
        assert_ne!(empty.etag, loaded.etag);
        assert_eq!(loaded.etag, reloaded.etag);
    }
}
