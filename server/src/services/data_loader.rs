use std::sync::atomic::{AtomicBool, Ordering};

use areamap_shared::join::unmatched_user_count;
use areamap_shared::{HoverController, MapEvent};
use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use crate::config::reload_interval;
use crate::services::fetcher::{fetch_areas, fetch_users};
use crate::state::{AppState, CachedLayers};
use crate::surface::ApiSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub generation: u64,
    pub area_count: usize,
    pub user_count: usize,
    pub areas_failed: bool,
    pub users_failed: bool,
}

pub async fn run(state: AppState) {
    let Some(period) = reload_interval() else {
        reload(&state).await;
        return;
    };

    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        reload(&state).await;
    }
}

/// Fetch both collections and rebuild the join. Returns `None` if another
/// reload is already running.
pub async fn reload(state: &AppState) -> Option<LoadOutcome> {
    let Some(_loading) = LoadingGuard::acquire(&state.loading) else {
        info!("reload already in progress; skipping");
        return None;
    };
    Some(load_and_join(state).await)
}

/// Holds the loading flag for one reload. Dropping it clears the flag, so a
/// reload cancelled mid-fetch (client hung up on `POST /api/reload`) does not
/// block later ones.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

async fn load_and_join(state: &AppState) -> LoadOutcome {
    state.observability.record_reload();

    // The join waits for both fetches, whichever order they finish in.
    let (areas, users) = tokio::join!(
        fetch_areas(&state.http_client, &state.upstream.areas_url),
        fetch_users(&state.http_client, &state.upstream.users_url),
    );

    let areas = match areas {
        Ok(areas) => {
            info!(count = areas.len(), "loaded areas");
            Some(areas)
        }
        Err(e) => {
            state.observability.record_area_fetch_failure();
            warn!(error = %e, url = %state.upstream.areas_url, "failed to fetch areas");
            None
        }
    };
    let users = match users {
        Ok(users) => {
            info!(count = users.len(), "loaded users");
            Some(users)
        }
        Err(e) => {
            state.observability.record_user_fetch_failure();
            warn!(error = %e, url = %state.upstream.users_url, "failed to fetch users");
            None
        }
    };
    let areas_failed = areas.is_none();
    let users_failed = users.is_none();

    let (outcome, layers_json) = {
        let mut map = state.map.write().await;
        map.apply_load(areas, users);

        let unmatched = unmatched_user_count(map.areas(), map.users());
        if unmatched > 0 {
            info!(unmatched, "dropped users without a matching area");
        }

        let mut surface = ApiSurface::default();
        HoverController::render(&map, &mut surface);

        let outcome = LoadOutcome {
            generation: map.generation(),
            area_count: map.enriched().len(),
            user_count: map.enriched().joined_user_count(),
            areas_failed,
            users_failed,
        };
        (outcome, surface.feature_collection_json())
    };

    match layers_json {
        Ok(json) => {
            *state.layers.write().await = CachedLayers::new(outcome.generation, Bytes::from(json));
        }
        Err(e) => {
            warn!(error = %e, "failed to serialize area layers; keeping previous payload");
        }
    }
    *state.last_loaded_at.write().await = Some(Utc::now());

    info!(
        generation = outcome.generation,
        areas = outcome.area_count,
        users = outcome.user_count,
        "area join rebuilt"
    );

    let _ = state.event_tx.send(MapEvent::DataReloaded {
        generation: outcome.generation,
        area_count: outcome.area_count,
        user_count: outcome.user_count,
        areas_failed,
        users_failed,
        timestamp: Utc::now().to_rfc3339(),
    });

    outcome
}
