// Room orchestration: one room per match, each owning a world task and the
// channel fan-out connections subscribe to.

use crate::use_cases::game::match_task;
use crate::use_cases::types::WorldSnapshot;
use crate::domain::content::ContentDb;
use crate::domain::entities::{PlayerId, Team};
use crate::domain::world::{Command, Event, MatchPhase, RosterEntry, World};
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch, Notify, RwLock};

/// Shared configuration for spawning room worlds.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Capacity for inbound player commands.
    pub command_channel_capacity: usize,
    /// Capacity for broadcast events and serialized snapshots.
    pub broadcast_capacity: usize,
    /// Fixed tick interval for the match loop.
    pub tick_interval: Duration,
}

/// Errors returned by room registry operations.
#[derive(Debug)]
pub enum RoomError {
    /// Room already exists and cannot be re-created.
    AlreadyExists,
    /// A roster must contain at least one human slot.
    EmptyRoster,
}

/// Serialized snapshot fan-out for one team's view of the match.
#[derive(Clone)]
pub struct TeamFeed {
    /// Broadcast sender for serialized per-tick snapshots.
    pub bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized snapshot, used to resync
    /// lagged receivers.
    pub latest_tx: watch::Sender<Utf8Bytes>,
}

/// Per-room channels and roster access.
#[derive(Clone)]
pub struct RoomHandle {
    /// Identifier clients use to target this room.
    pub room_id: Arc<str>,
    /// Slots fixed at creation; connections bind to one of these.
    pub roster: Arc<Vec<RosterEntry>>,
    /// Sender for commands into the room's match task.
    pub command_tx: mpsc::Sender<Command>,
    /// Broadcast sender for match events.
    pub event_tx: broadcast::Sender<Event>,
    /// Watch sender holding the latest raw snapshot.
    pub snapshot_tx: watch::Sender<Arc<WorldSnapshot>>,
    /// Watch sender for match phase changes.
    pub phase_tx: watch::Sender<MatchPhase>,
    radiant_feed: TeamFeed,
    dire_feed: TeamFeed,
    /// Signals the match task (and per-room helpers) to stop.
    pub shutdown: Arc<Notify>,
    connections: Arc<RwLock<HashMap<PlayerId, ConnEntry>>>,
    next_conn: Arc<std::sync::atomic::AtomicU64>,
}

struct ConnEntry {
    token: u64,
    replaced: Arc<Notify>,
}

impl RoomHandle {
    pub fn feed(&self, team: Team) -> &TeamFeed {
        match team {
            Team::Radiant => &self.radiant_feed,
            Team::Dire => &self.dire_feed,
        }
    }

    pub fn roster_entry(&self, player: PlayerId) -> Option<&RosterEntry> {
        self.roster.iter().find(|e| e.id == player)
    }

    /// Claim the connection slot for `player`, kicking any previous socket.
    ///
    /// Returns the new connection's ownership token and the notify that fires
    /// if a later connection takes the slot over.
    pub async fn register_or_replace_connection(&self, player: PlayerId) -> (u64, Arc<Notify>) {
        let token = self
            .next_conn
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let replaced = Arc::new(Notify::new());
        let mut conns = self.connections.write().await;
        if let Some(old) = conns.insert(
            player,
            ConnEntry {
                token,
                replaced: replaced.clone(),
            },
        ) {
            old.replaced.notify_waiters();
        }
        (token, replaced)
    }

    /// Release the slot, but only if `token` still owns it. Returns whether
    /// this connection was the current one.
    pub async fn unregister_connection(&self, player: PlayerId, token: u64) -> bool {
        let mut conns = self.connections.write().await;
        match conns.get(&player) {
            Some(entry) if entry.token == token => {
                conns.remove(&player);
                true
            }
            _ => false,
        }
    }
}

/// Thread-safe registry for active rooms.
pub struct RoomRegistry {
    settings: RoomSettings,
    content: Arc<ContentDb>,
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new(settings: RoomSettings, content: Arc<ContentDb>) -> Self {
        Self {
            settings,
            content,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a new room and spawns its match task.
    pub async fn create_room(
        &self,
        room_id: String,
        roster: Vec<RosterEntry>,
    ) -> Result<RoomHandle, RoomError> {
        if !roster.iter().any(|e| !e.is_bot) {
            return Err(RoomError::EmptyRoster);
        }
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists);
        }

        // Channel wiring for the room's match loop.
        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.settings.command_channel_capacity);
        let (event_tx, _event_rx) = broadcast::channel::<Event>(self.settings.broadcast_capacity);
        let initial = Arc::new(WorldSnapshot::capture(&World::new(
            self.content.clone(),
            roster.clone(),
        )));
        let (snapshot_tx, _snapshot_rx) = watch::channel(initial);
        let (phase_tx, _phase_rx) = watch::channel(MatchPhase::Waiting);
        let radiant_feed = team_feed(self.settings.broadcast_capacity);
        let dire_feed = team_feed(self.settings.broadcast_capacity);
        let shutdown = Arc::new(Notify::new());

        // Spawn the authoritative match loop for this room.
        tokio::spawn(match_task(
            command_rx,
            event_tx.clone(),
            snapshot_tx.clone(),
            phase_tx.clone(),
            self.content.clone(),
            roster.clone(),
            self.settings.tick_interval,
            shutdown.clone(),
        ));

        let room = RoomHandle {
            room_id: Arc::from(room_id.clone()),
            roster: Arc::new(roster),
            command_tx,
            event_tx,
            snapshot_tx,
            phase_tx,
            radiant_feed,
            dire_feed,
            shutdown,
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_conn: Arc::new(std::sync::atomic::AtomicU64::new(1)),
        };

        rooms.insert(room_id, room.clone());
        Ok(room)
    }

    /// Returns a room handle for the provided id, if it exists.
    pub async fn get_room(&self, room_id: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }

    /// Drops the room and stops its match task.
    pub async fn remove_room(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.remove(room_id) {
            room.shutdown.notify_waiters();
        }
    }
}

fn team_feed(capacity: usize) -> TeamFeed {
    let (bytes_tx, _bytes_rx) = broadcast::channel::<Utf8Bytes>(capacity);
    let (latest_tx, _latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    TeamFeed {
        bytes_tx,
        latest_tx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RoomSettings {
        RoomSettings {
            command_channel_capacity: 16,
            broadcast_capacity: 16,
            tick_interval: Duration::from_millis(50),
        }
    }

    fn roster() -> Vec<RosterEntry> {
        vec![RosterEntry {
            id: PlayerId(7),
            name: "tester".into(),
            team: Team::Radiant,
            is_bot: false,
        }]
    }

    #[tokio::test]
    async fn duplicate_room_ids_are_rejected() {
        let registry = RoomRegistry::new(settings(), Arc::new(ContentDb::builtin()));
        registry
            .create_room("match-1".into(), roster())
            .await
            .unwrap();
        let err = registry.create_room("match-1".into(), roster()).await;
        assert!(matches!(err, Err(RoomError::AlreadyExists)));
    }

    #[tokio::test]
    async fn all_bot_rosters_are_rejected() {
        let registry = RoomRegistry::new(settings(), Arc::new(ContentDb::builtin()));
        let err = registry
            .create_room(
                "match-1".into(),
                vec![RosterEntry {
                    id: PlayerId(1),
                    name: "bot".into(),
                    team: Team::Dire,
                    is_bot: true,
                }],
            )
            .await;
        assert!(matches!(err, Err(RoomError::EmptyRoster)));
    }

    #[tokio::test]
    async fn a_second_connection_replaces_the_first() {
        let registry = RoomRegistry::new(settings(), Arc::new(ContentDb::builtin()));
        let room = registry
            .create_room("match-1".into(), roster())
            .await
            .unwrap();

        let (first_token, first_replaced) =
            room.register_or_replace_connection(PlayerId(7)).await;
        let mut replaced = std::pin::pin!(first_replaced.notified());
        replaced.as_mut().enable();
        let (second_token, _second_replaced) =
            room.register_or_replace_connection(PlayerId(7)).await;
        replaced.await;

        assert_ne!(first_token, second_token);
        // The old socket's cleanup must not evict the new owner.
        assert!(!room.unregister_connection(PlayerId(7), first_token).await);
        assert!(room.unregister_connection(PlayerId(7), second_token).await);
    }
}
