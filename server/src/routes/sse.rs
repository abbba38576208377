use std::convert::Infallible;
use std::time::Duration;

use areamap_shared::MapEvent;
use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use chrono::Utc;
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::warn;

use crate::config::SSE_KEEPALIVE_SECS;
use crate::state::AppState;

pub async fn map_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        // Subscribe before building the snapshot so nothing slips in between.
        let rx = state.event_tx.subscribe();
        let mut stream = BroadcastStream::new(rx);

        if let Some(event) = sse_event(&snapshot_event(&state).await) {
            yield Ok(event);
        }

        while let Some(result) = stream.next().await {
            match result {
                Ok(event) => {
                    if let Some(event) = sse_event(&event) {
                        yield Ok(event);
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(
                        skipped_events = skipped,
                        "SSE client lagged behind broadcast buffer; replaying snapshot"
                    );
                    if let Some(event) = sse_event(&snapshot_event(&state).await) {
                        yield Ok(event);
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEPALIVE_SECS))
            .text("keep-alive"),
    )
}

async fn snapshot_event(state: &AppState) -> MapEvent {
    let map = state.map.read().await;
    MapEvent::Snapshot {
        generation: map.generation(),
        statistic: map.statistic(),
        area_count: map.enriched().len(),
        user_count: map.enriched().joined_user_count(),
        loading: state.is_loading(),
        timestamp: Utc::now().to_rfc3339(),
    }
}

fn sse_event(event: &MapEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(Event::default().event(event.name()).data(payload)),
        Err(e) => {
            warn!(error = %e, event = event.name(), "failed to serialize SSE event; dropping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use areamap_shared::{MapEvent, Statistic};

    use super::{snapshot_event, sse_event};
    use crate::state::{AppState, Upstream};

    fn offline_state() -> AppState {
        AppState::with_upstream(Upstream {
            areas_url: "http://127.0.0.1:9/areas".to_string(),
            users_url: "http://127.0.0.1:9/users".to_string(),
        })
    }

    #[tokio::test]
    async fn snapshot_reflects_active_statistic() {
        let state = offline_state();
        state.map.write().await.set_statistic(Statistic::Match);

        match snapshot_event(&state).await {
            MapEvent::Snapshot {
                statistic,
                area_count,
                generation,
                loading,
                ..
            } => {
                assert_eq!(statistic, Statistic::Match);
                assert_eq!(area_count, 0);
                assert_eq!(generation, 0);
                assert!(!loading);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_opens_with_snapshot_event() {
        let state = offline_state();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });

        let mut response = reqwest::Client::new()
            .get(format!("http://{addr}/api/events"))
            .send()
            .await
            .expect("events request")
            .error_for_status()
            .expect("events status");
        let chunk = response
            .chunk()
            .await
            .expect("read first chunk")
            .expect("stream should yield a chunk");
        let text = String::from_utf8_lossy(&chunk);
        assert!(text.contains("event: snapshot"));
        assert!(text.contains("\"type\":\"Snapshot\""));

        handle.abort();
        let _ = handle.await;
    }

    #[test]
    fn sse_event_serializes_filter_changes() {
        let event = MapEvent::FilterChanged {
            statistic: Statistic::Age,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
        };
        assert!(sse_event(&event).is_some());
    }
}
