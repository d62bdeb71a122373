// Internal HTTP routes called by the head service, not by game clients.

use crate::domain::entities::PlayerId;
use crate::domain::world::{Event, MatchPhase, RosterEntry};
use crate::interface_adapters::clients::results::ResultsClient;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::net::client::spawn_room_serializer;
use crate::interface_adapters::protocol::team_from_str;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RoomError, RoomHandle, RoomRegistry, WorldSnapshot};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

// How long a finished room lingers so clients can read the end screen.
const ROOM_LINGER: Duration = Duration::from_secs(30);

#[derive(Debug, serde::Deserialize)]
pub struct RoomInitRequest {
    // Room id provided by the matchmaking service.
    room_id: String,
    // Fixed roster for the match; connections bind to these slots.
    roster: Vec<RosterSlotDto>,
}

#[derive(Debug, serde::Deserialize)]
pub struct RosterSlotDto {
    user_id: u64,
    name: String,
    team: String,
    #[serde(default)]
    is_bot: bool,
}

#[derive(Debug, serde::Serialize)]
struct RoomInitResponse {
    // The room id that was created.
    room_id: String,
}

pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RoomInitRequest>,
) -> impl IntoResponse {
    let room_id = payload.room_id.trim().to_string();
    if room_id.is_empty() {
        // Return a JSON error even for head-only routes to keep responses
        // consistent.
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "room_id is required".to_string(),
            }),
        )
            .into_response();
    }

    let mut roster = Vec::with_capacity(payload.roster.len());
    for slot in payload.roster {
        let Some(team) = team_from_str(&slot.team) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("unknown team '{}'", slot.team),
                }),
            )
                .into_response();
        };
        roster.push(RosterEntry {
            id: PlayerId(slot.user_id),
            name: slot.name,
            team,
            is_bot: slot.is_bot,
        });
    }

    match state.room_registry.create_room(room_id.clone(), roster).await {
        Ok(room) => {
            // Create the serializer so clients can subscribe immediately.
            spawn_room_serializer(&room);
            // Watch for match end so finished rooms report and clean up.
            spawn_match_end_watcher(
                state.room_registry.clone(),
                state.results_client.clone(),
                room,
            );
            (StatusCode::CREATED, Json(RoomInitResponse { room_id })).into_response()
        }
        Err(RoomError::AlreadyExists) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "room already exists".to_string(),
            }),
        )
            .into_response(),
        Err(RoomError::EmptyRoster) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "roster needs at least one human player".to_string(),
            }),
        )
            .into_response(),
    }
}

/// Waits for the room's GameEnd, reports the result once, then removes the
/// room after a linger so connected clients see the final state.
pub fn spawn_match_end_watcher(
    registry: Arc<RoomRegistry>,
    results: Arc<ResultsClient>,
    room: RoomHandle,
) {
    tokio::spawn(async move {
        let mut event_rx = room.event_tx.subscribe();
        loop {
            match event_rx.recv().await {
                Ok(Event::GameEnd { winner, .. }) => {
                    // The end-tick snapshot publishes after the event; wait
                    // for it so the report reflects the settled state.
                    let final_snapshot =
                        await_final_snapshot(room.snapshot_tx.subscribe()).await;
                    results
                        .report(&room.room_id, winner, &final_snapshot)
                        .await;

                    tokio::time::sleep(ROOM_LINGER).await;
                    info!(room_id = %room.room_id, "removing finished room");
                    registry.remove_room(&room.room_id).await;
                    break;
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, room_id = %room.room_id, "end watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Waits until the snapshot watch publishes a state from the ended match.
/// Falls back to the last observed snapshot if the channel closes first.
async fn await_final_snapshot(
    mut snapshot_rx: watch::Receiver<Arc<WorldSnapshot>>,
) -> Arc<WorldSnapshot> {
    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        if snapshot.phase == MatchPhase::Ended {
            return snapshot;
        }
        if snapshot_rx.changed().await.is_err() {
            return snapshot;
        }
    }
}
