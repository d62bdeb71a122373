use crate::domain::entities::{PlayerId, Team};
use crate::domain::world::Command;
use crate::interface_adapters::clients::auth::{AuthClient, VerifyTokenError};
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{self, ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::types::WorldSnapshot;
use crate::use_cases::{RoomHandle, TeamFeed};

use axum::{
    Error, Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    CommandsClosed,
    SnapshotsClosed,
    EventsClosed,
    PhaseClosed,
    JoinRequired,
    JoinTimeout,
    AuthVerify,
    NotInRoster,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct RoomQuery {
    // The room id the client wants to join.
    #[serde(default)]
    room_id: Option<String>,
}

/// Serializes each published snapshot once per team and fans the shared
/// bytes out to that team's connections.
pub async fn snapshot_serializer(
    mut snapshot_rx: watch::Receiver<Arc<WorldSnapshot>>,
    radiant: TeamFeed,
    dire: TeamFeed,
) {
    loop {
        if snapshot_rx.changed().await.is_err() {
            warn!("snapshot channel closed; serializer exiting");
            break;
        }
        let snapshot = snapshot_rx.borrow_and_update().clone();

        for (team, feed) in [(Team::Radiant, &radiant), (Team::Dire, &dire)] {
            let msg = protocol::snapshot_message(&snapshot, team);
            let txt = match serde_json::to_string(&msg) {
                Ok(txt) => txt,
                Err(e) => {
                    error!(error = ?e, "failed to serialize snapshot");
                    continue;
                }
            };

            // Convert once and share the same UTF-8 bytes across the team.
            let bytes = Utf8Bytes::from(txt);
            // Store the latest bytes for lag recovery.
            let _ = feed.latest_tx.send(bytes.clone());
            let _ = feed.bytes_tx.send(bytes);
        }
    }
}

pub fn spawn_room_serializer(room: &RoomHandle) {
    tokio::spawn(snapshot_serializer(
        room.snapshot_tx.subscribe(),
        room.feed(Team::Radiant).clone(),
        room.feed(Team::Dire).clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomQuery>,
) -> impl IntoResponse {
    let Some(room_id) = query.room_id.filter(|id| !id.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "room_id is required".to_string(),
            }),
        )
            .into_response();
    };

    let room = match state.room_registry.get_room(&room_id).await {
        Some(room) => room,
        None => {
            // Keep not-found responses consistent with the JSON error schema.
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "room not found".to_string(),
                }),
            )
                .into_response();
        }
    };

    let auth_client = state.auth_client.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, room, auth_client))
}

async fn handle_socket(mut socket: WebSocket, room: RoomHandle, auth_client: Arc<AuthClient>) {
    // Separate connection id for correlating logs before/after a player_id exists.
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
    let _enter = span.enter();

    let mut ctx = match bootstrap_connection(&mut socket, &room, auth_client).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "bootstrap failed".into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    span.record("player_id", ctx.player_id.0);
    info!(
        player_id = ctx.player_id.0,
        session_id = %ctx.session_id,
        display_name = %ctx.display_name,
        room_id = %ctx.room.room_id,
        "client connected"
    );

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub session_id: String,
    pub display_name: String,
    // Room handle for channel access and connection ownership cleanup.
    pub room: RoomHandle,
    // Token used to verify ownership of the player connection slot.
    pub conn_token: u64,
    // Fires when a newer connection takes the slot over.
    pub conn_replaced: Arc<Notify>,
    pub command_tx: mpsc::Sender<Command>,
    pub snapshot_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    pub snapshot_latest_rx: watch::Receiver<Utf8Bytes>,
    pub event_rx: broadcast::Receiver<crate::domain::world::Event>,
    pub phase_rx: watch::Receiver<crate::domain::world::MatchPhase>,
    // Count lag recovery snapshots sent to this client.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_command_full_log: Instant,
    pub last_snapshot_lag_log: Instant,
    pub last_invalid_msg_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

#[derive(Debug)]
struct JoinHandshake {
    player_id: PlayerId,
    session_id: String,
    display_name: String,
    bytes_in: u64,
    msgs_in: u64,
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_SESSION_TOKEN_LEN: usize = 4096;
const MAX_CHAT_LEN: usize = 256;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

async fn bootstrap_connection(
    socket: &mut WebSocket,
    room: &RoomHandle,
    auth_client: Arc<AuthClient>,
) -> Result<ConnCtx, NetError> {
    // Subscribe to events before any await so nothing published during the
    // handshake is missed.
    let event_rx = room.event_tx.subscribe();
    let phase_rx = room.phase_tx.subscribe();

    // Authenticate the very first meaningful client message before assigning
    // a roster slot.
    let join = match timeout(
        JOIN_HANDSHAKE_TIMEOUT,
        read_join_handshake(socket, auth_client.as_ref()),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };
    let player_id = join.player_id;

    // Connections bind to a roster slot fixed at room creation; anyone else
    // is turned away.
    let Some(entry) = room.roster_entry(player_id) else {
        let _ = send_close_with_reason(socket, close_code::POLICY, "not in match roster").await;
        return Err(NetError::NotInRoster);
    };
    let team = entry.team;

    // Track this connection with a unique token so newer connections can
    // replace it (reconnects, duplicate tabs).
    let (conn_token, conn_replaced) = room.register_or_replace_connection(player_id).await;

    let feed = room.feed(team);
    let snapshot_bytes_rx = feed.bytes_tx.subscribe();
    let snapshot_latest_rx = feed.latest_tx.subscribe();

    let identity_msg = ServerMessage::Identity {
        player_id: player_id.0.to_string(),
        team: team.as_str(),
    };
    if let Err(err) = send_message(socket, &identity_msg).await {
        // Ensure the slot is freed if we fail the handshake early.
        room.unregister_connection(player_id, conn_token).await;
        return Err(err);
    }

    let phase = *phase_rx.borrow();
    let phase_msg = ServerMessage::Phase {
        phase: phase.as_str(),
    };
    if let Err(err) = send_message(socket, &phase_msg).await {
        room.unregister_connection(player_id, conn_token).await;
        return Err(err);
    }

    // Seed the client with the latest snapshot so it renders before the next
    // tick arrives.
    let latest = snapshot_latest_rx.borrow().clone();
    if !latest.is_empty() {
        if let Err(err) = socket
            .send(Message::Text(latest))
            .await
            .map_err(NetError::Ws)
        {
            room.unregister_connection(player_id, conn_token).await;
            return Err(err);
        }
    }

    // Mark the player connected; the world resumes a paused match on its own.
    if room
        .command_tx
        .send(Command::Connected { player: player_id })
        .await
        .is_err()
    {
        room.unregister_connection(player_id, conn_token).await;
        return Err(NetError::CommandsClosed);
    }

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        session_id: join.session_id,
        display_name: join.display_name,
        room: room.clone(),
        conn_token,
        conn_replaced,
        command_tx: room.command_tx.clone(),
        snapshot_bytes_rx,
        snapshot_latest_rx,
        event_rx,
        phase_rx,
        lag_recovery_count: 0,

        msgs_in: join.msgs_in,
        msgs_out: 0,
        bytes_in: join.bytes_in,
        bytes_out: 0,

        invalid_json: 0,

        last_command_full_log: now,
        last_snapshot_lag_log: now,
        last_invalid_msg_log: now,

        close_frame: None,
    })
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn read_join_handshake(
    socket: &mut WebSocket,
    auth_client: &AuthClient,
) -> Result<JoinHandshake, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        let message = incoming.map_err(NetError::Ws)?;
        match message {
            Message::Text(text) => {
                let bytes_in = text.len() as u64;
                let payload = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => payload,
                    Ok(_) => {
                        let _ = send_close_with_reason(socket, close_code::POLICY, "join required")
                            .await;
                        return Err(NetError::JoinRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        return Err(NetError::JoinRequired);
                    }
                };

                let session_token = payload.session_token.trim();
                if session_token.is_empty() || session_token.len() > MAX_SESSION_TOKEN_LEN {
                    let _ =
                        send_close_with_reason(socket, close_code::POLICY, "invalid session token")
                            .await;
                    return Err(NetError::AuthVerify);
                }

                let identity = match auth_client.verify_token(session_token).await {
                    Ok(identity) => identity,
                    Err(VerifyTokenError::InvalidToken) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid session token",
                        )
                        .await;
                        return Err(NetError::AuthVerify);
                    }
                    Err(VerifyTokenError::SessionExpired) => {
                        let _ =
                            send_close_with_reason(socket, close_code::POLICY, "session expired")
                                .await;
                        return Err(NetError::AuthVerify);
                    }
                    Err(VerifyTokenError::UpstreamUnavailable) => {
                        let _ =
                            send_close_with_reason(socket, close_code::ERROR, "auth unavailable")
                                .await;
                        return Err(NetError::AuthVerify);
                    }
                };
                // Token expiry is enforced only at join to avoid mid-match
                // disconnects.
                let _token_expires_at = identity.expires_at;

                return Ok(JoinHandshake {
                    player_id: PlayerId(identity.user_id),
                    session_id: identity.session_id,
                    display_name: identity.display_name,
                    bytes_in,
                    msgs_in: 1,
                });
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Reject values the simulation must never see: non-finite coordinates and
/// oversized chat payloads (the latter are truncated, not dropped).
fn sanitize_command(command: Command) -> Option<Command> {
    match command {
        Command::Move { player, point } => {
            (point.x.is_finite() && point.z.is_finite()).then_some(Command::Move { player, point })
        }
        Command::Ping { player, kind, point } => (point.x.is_finite() && point.z.is_finite())
            .then_some(Command::Ping { player, kind, point }),
        Command::UseAbility {
            player,
            slot,
            target_unit,
            target_point,
        } => {
            if let Some(p) = target_point {
                if !p.x.is_finite() || !p.z.is_finite() {
                    return None;
                }
            }
            Some(Command::UseAbility {
                player,
                slot,
                target_unit,
                target_point,
            })
        }
        Command::Chat {
            player,
            mut content,
            team_only,
        } => {
            if content.trim().is_empty() {
                return None;
            }
            if content.len() > MAX_CHAT_LEN {
                let mut end = MAX_CHAT_LEN;
                while !content.is_char_boundary(end) {
                    end -= 1;
                }
                content.truncate(end);
            }
            Some(Command::Chat {
                player,
                content,
                team_only,
            })
        }
        other => Some(other),
    }
}

fn enqueue_command(
    player_id: PlayerId,
    command_tx: &mpsc::Sender<Command>,
    command: Command,
    last_command_full_log: &mut Instant,
    last_invalid_msg_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    let Some(command) = sanitize_command(command) else {
        if should_log(last_invalid_msg_log) {
            warn!(player_id = player_id.0, "invalid command values; dropping");
        }
        return Ok(LoopControl::Continue);
    };

    match command_tx.try_send(command) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_)) => {
            if should_log(last_command_full_log) {
                warn!(player_id = player_id.0, "command channel full; dropping");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::CommandsClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        room,
        conn_token,
        conn_replaced,
        command_tx,
        snapshot_bytes_rx,
        snapshot_latest_rx,
        event_rx,
        phase_rx,
        lag_recovery_count,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_command_full_log,
        last_snapshot_lag_log,
        last_invalid_msg_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming message from the client.
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    command_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_command_full_log,
                    last_invalid_msg_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing per-team snapshot.
            snapshot_msg = snapshot_bytes_rx.recv() => {
                match snapshot_msg {
                    Ok(bytes) => match forward_snapshot_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_snapshot_lag_log) {
                            warn!(missed = n, "snapshots lagged; resyncing from latest");
                        }

                        // Resync strategy: send the latest serialized snapshot.
                        let latest = snapshot_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            let bytes_len = latest.len();
                            // Track how often we need to recover from lag.
                            *lag_recovery_count += 1;
                            let outcome =
                                forward_snapshot_bytes(latest, socket, msgs_out, bytes_out).await;

                            if should_log(last_snapshot_lag_log) {
                                debug!(
                                    player_id = player_id.0,
                                    bytes = bytes_len,
                                    count = *lag_recovery_count,
                                    "sent lag recovery snapshot"
                                );
                            }

                            match outcome {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::SnapshotsClosed);
                        true
                    }
                }
            }

            // Outgoing match event, routed per viewer.
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        match protocol::event_message(&event, player_id) {
                            Some(msg) => match send_message(socket, &msg).await {
                                Ok(bytes) => {
                                    *msgs_out += 1;
                                    *bytes_out += bytes as u64;
                                    false
                                }
                                Err(err) => {
                                    warn!(error = ?err, "failed to send event");
                                    true
                                }
                            },
                            None => false,
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Dropped events are tolerable; the snapshot stream
                        // carries the authoritative state.
                        warn!(missed = n, "event stream lagged");
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::EventsClosed);
                        true
                    }
                }
            }

            // Outgoing phase change.
            changed_phase = phase_rx.changed() => {
                match changed_phase {
                    Ok(()) => {
                        let phase = *phase_rx.borrow_and_update();
                        let msg = ServerMessage::Phase { phase: phase.as_str() };
                        match send_message(socket, &msg).await {
                            Ok(bytes) => {
                                *msgs_out += 1;
                                *bytes_out += bytes as u64;
                                false
                            }
                            Err(err) => {
                                warn!(error = ?err, "failed to send phase change");
                                true
                            }
                        }
                    }
                    Err(_) => {
                        warn!(player_id = player_id.0, "phase channel closed; disconnecting");
                        fatal = Some(NetError::PhaseClosed);
                        true
                    }
                }
            }

            // Connection replacement signal for duplicate player ids.
            _ = conn_replaced.notified() => {
                // Ask the client to close; a newer connection took ownership.
                *close_frame = Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "connection replaced".into(),
                });
                info!(player_id = player_id.0, "connection replaced by newer session");
                true
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        player_id,
        room,
        *conn_token,
        command_tx,
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
        *lag_recovery_count,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal {
        Err(err)
    } else {
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    player_id: PlayerId,
    command_tx: &mpsc::Sender<Command>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_command_full_log: &mut Instant,
    last_invalid_msg_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(_)) => {
                        // Ignore repeated Join packets after bootstrap to keep
                        // the session stable.
                        if should_log(last_invalid_msg_log) {
                            warn!(player_id = player_id.0, "duplicate join ignored");
                        }
                        Ok(LoopControl::Continue)
                    }
                    Ok(msg) => match msg.into_command(player_id) {
                        Some(command) => enqueue_command(
                            player_id,
                            command_tx,
                            command,
                            last_command_full_log,
                            last_invalid_msg_log,
                        ),
                        None => {
                            if should_log(last_invalid_msg_log) {
                                warn!(player_id = player_id.0, "unresolvable command target");
                            }
                            Ok(LoopControl::Continue)
                        }
                    },
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_msg_log) {
                            warn!(
                                player_id = player_id.0,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id = player_id.0, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id = player_id.0, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_snapshot_bytes(
    snapshot_msg: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = snapshot_msg.len();
    match socket
        .send(Message::Text(snapshot_msg))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect will follow immediately.
            warn!(error = ?err, "failed to send snapshot");
            LoopControl::Disconnect
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn disconnect_cleanup(
    player_id: PlayerId,
    room: &RoomHandle,
    conn_token: u64,
    command_tx: &mpsc::Sender<Command>,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,
) -> Result<(), NetError> {
    // Only the current slot owner marks the player disconnected; a replaced
    // connection must not undo the replacement's Connected.
    let owned = room.unregister_connection(player_id, conn_token).await;
    if owned {
        command_tx
            .send(Command::Disconnected { player: player_id })
            .await
            .map_err(|_| NetError::CommandsClosed)?;
    }

    debug!(
        player_id = player_id.0,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        lag_recovery_count,
        "connection stats"
    );
    info!(player_id = player_id.0, "client disconnected");
    Ok(())
}
