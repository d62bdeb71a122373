// Wire protocol DTOs and conversions for public match server messages.
// Internal service-to-service DTOs should live outside this module.

use crate::domain::content::{HeroId, ItemId};
use crate::domain::entities::{
    CreepId, MonsterId, PlayerId, ScoreLine, Team, TowerId, UnitRef,
};
use crate::domain::math::Vec2;
use crate::domain::world::{Command, Event, FinalStanding};
use crate::use_cases::types::{
    AbilitySnapshot, BuffSnapshot, CampSnapshot, CreepSnapshot, ItemStackSnapshot,
    MonsterSnapshot, PlayerSnapshot, TowerSnapshot, WorldSnapshot,
};
use serde::{Deserialize, Serialize};

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake message carrying the session token.
    Join(JoinPayload),
    // Everything below is only accepted after a successful Join.
    SelectHero { hero: u32 },
    LockHero,
    Move { x: f32, z: f32 },
    Attack { target: UnitRefDto },
    Stop,
    UseAbility {
        slot: usize,
        #[serde(default)]
        target: Option<UnitRefDto>,
        #[serde(default)]
        point: Option<PointDto>,
    },
    BuyItem { item: u32 },
    SellItem { slot: usize },
    Chat {
        content: String,
        #[serde(default)]
        team_only: bool,
    },
    Ping {
        kind: String,
        x: f32,
        z: f32,
    },
}

/// Payload for the Join handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub session_token: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PointDto {
    pub x: f32,
    pub z: f32,
}

impl From<PointDto> for Vec2 {
    fn from(p: PointDto) -> Self {
        Vec2::new(p.x, p.z)
    }
}

/// Typed unit handle on the wire; `kind` selects the id namespace.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnitRefDto {
    pub kind: String,
    pub id: u64,
}

impl UnitRefDto {
    pub fn resolve(&self) -> Option<UnitRef> {
        match self.kind.as_str() {
            "player" => Some(UnitRef::Player(PlayerId(self.id))),
            "tower" => Some(UnitRef::Tower(TowerId(self.id as u32))),
            "creep" => Some(UnitRef::Creep(CreepId(self.id as u32))),
            "monster" => Some(UnitRef::Monster(MonsterId(self.id as u32))),
            _ => None,
        }
    }
}

pub fn unit_ref_dto(unit: UnitRef) -> UnitRefDto {
    match unit {
        UnitRef::Player(id) => UnitRefDto {
            kind: "player".into(),
            id: id.0,
        },
        UnitRef::Tower(id) => UnitRefDto {
            kind: "tower".into(),
            id: id.0 as u64,
        },
        UnitRef::Creep(id) => UnitRefDto {
            kind: "creep".into(),
            id: id.0 as u64,
        },
        UnitRef::Monster(id) => UnitRefDto {
            kind: "monster".into(),
            id: id.0 as u64,
        },
    }
}

pub fn team_from_str(value: &str) -> Option<Team> {
    match value {
        "radiant" => Some(Team::Radiant),
        "dire" => Some(Team::Dire),
        _ => None,
    }
}

impl ClientMessage {
    /// Bind a parsed post-join message to its verified sender. Join returns
    /// None; the handshake path consumes it before this is called.
    pub fn into_command(self, player: PlayerId) -> Option<Command> {
        match self {
            ClientMessage::Join(_) => None,
            ClientMessage::SelectHero { hero } => Some(Command::SelectHero {
                player,
                hero: HeroId(hero),
            }),
            ClientMessage::LockHero => Some(Command::LockHero { player }),
            ClientMessage::Move { x, z } => Some(Command::Move {
                player,
                point: Vec2::new(x, z),
            }),
            ClientMessage::Attack { target } => target
                .resolve()
                .map(|target| Command::Attack { player, target }),
            ClientMessage::Stop => Some(Command::Stop { player }),
            ClientMessage::UseAbility { slot, target, point } => Some(Command::UseAbility {
                player,
                slot,
                target_unit: target.and_then(|t| t.resolve()),
                target_point: point.map(Vec2::from),
            }),
            ClientMessage::BuyItem { item } => Some(Command::BuyItem {
                player,
                item: ItemId(item),
            }),
            ClientMessage::SellItem { slot } => Some(Command::SellItem { player, slot }),
            ClientMessage::Chat { content, team_only } => Some(Command::Chat {
                player,
                content,
                team_only,
            }),
            ClientMessage::Ping { kind, x, z } => Some(Command::Ping {
                player,
                kind,
                point: Vec2::new(x, z),
            }),
        }
    }
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { player_id: String, team: &'static str },
    // Match phase transitions (hero select, playing, paused, ended).
    Phase { phase: &'static str },
    // Per-team view of the world for a given tick.
    Snapshot(SnapshotDto),
    HeroUnavailable { hero: u32 },
    GameStart,
    GameEnd {
        winner: &'static str,
        kills_radiant: u32,
        kills_dire: u32,
        duration: f32,
        standings: Vec<FinalStandingDto>,
    },
    PlayerDisconnected { player_id: String, grace: f32 },
    PlayerAbandoned { player_id: String },
    AbilityError { reason: &'static str },
    ShopError { reason: &'static str },
    ItemBought { item: u32, slot: usize },
    ItemSold { item: u32, gold: u32 },
}

/// Convert a match event into the message a specific viewer should get.
/// Returns None when the event is not for this viewer (personal errors and
/// purchases go only to their owner) or is carried by another channel.
pub fn event_message(event: &Event, viewer: PlayerId) -> Option<ServerMessage> {
    match event {
        // Phase changes ride the phase watch channel instead.
        Event::PhaseChanged(_) => None,
        Event::HeroUnavailable { player, hero } => {
            (*player == viewer).then(|| ServerMessage::HeroUnavailable { hero: hero.0 })
        }
        Event::GameStart => Some(ServerMessage::GameStart),
        Event::GameEnd {
            winner,
            kills_radiant,
            kills_dire,
            duration,
            standings,
        } => Some(ServerMessage::GameEnd {
            winner: winner.as_str(),
            kills_radiant: *kills_radiant,
            kills_dire: *kills_dire,
            duration: *duration,
            standings: standings.iter().map(FinalStandingDto::from).collect(),
        }),
        Event::PlayerDisconnected { player, grace } => Some(ServerMessage::PlayerDisconnected {
            player_id: player.0.to_string(),
            grace: *grace,
        }),
        Event::PlayerAbandoned { player } => Some(ServerMessage::PlayerAbandoned {
            player_id: player.0.to_string(),
        }),
        Event::AbilityError { player, reason } => (*player == viewer).then(|| {
            ServerMessage::AbilityError {
                reason: reason.message(),
            }
        }),
        Event::ShopError { player, reason } => (*player == viewer).then(|| {
            ServerMessage::ShopError {
                reason: reason.message(),
            }
        }),
        Event::ItemBought { player, item, slot } => (*player == viewer).then(|| {
            ServerMessage::ItemBought {
                item: item.0,
                slot: *slot,
            }
        }),
        Event::ItemSold { player, item, gold } => (*player == viewer).then(|| {
            ServerMessage::ItemSold {
                item: item.0,
                gold: *gold,
            }
        }),
    }
}

/// Per-team snapshot sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub tick: u64,
    pub phase: &'static str,
    pub clock: f32,
    pub kills_radiant: u32,
    pub kills_dire: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<&'static str>,
    pub players: Vec<PlayerDto>,
    pub towers: Vec<TowerDto>,
    pub creeps: Vec<CreepDto>,
    pub camps: Vec<CampDto>,
    pub monsters: Vec<MonsterDto>,
    pub messages: Vec<ChatDto>,
    pub pings: Vec<PingDto>,
}

/// Build one team's view: enemy units the team has no vision of are omitted,
/// towers are landmarks and always included, chat respects the team-only
/// flag, pings never cross teams.
pub fn snapshot_message(snapshot: &WorldSnapshot, team: Team) -> ServerMessage {
    ServerMessage::Snapshot(SnapshotDto {
        tick: snapshot.tick,
        phase: snapshot.phase.as_str(),
        clock: snapshot.clock,
        kills_radiant: snapshot.kills_radiant,
        kills_dire: snapshot.kills_dire,
        winner: snapshot.winner.map(Team::as_str),
        players: snapshot
            .players
            .iter()
            .filter(|p| p.team == team || p.visible_to.seen_by(team))
            .map(PlayerDto::from)
            .collect(),
        towers: snapshot.towers.iter().map(TowerDto::from).collect(),
        creeps: snapshot
            .creeps
            .iter()
            .filter(|c| c.team == team || c.visible_to.seen_by(team))
            .map(CreepDto::from)
            .collect(),
        camps: snapshot.camps.iter().map(CampDto::from).collect(),
        monsters: snapshot
            .monsters
            .iter()
            .filter(|m| m.visible_to.seen_by(team))
            .map(MonsterDto::from)
            .collect(),
        messages: snapshot
            .messages
            .iter()
            .filter(|m| !m.team_only || m.team == team)
            .map(|m| ChatDto {
                sender_id: m.sender.0.to_string(),
                sender_name: m.sender_name.clone(),
                team: m.team.as_str(),
                team_only: m.team_only,
                content: m.content.clone(),
            })
            .collect(),
        pings: snapshot
            .pings
            .iter()
            .filter(|p| p.team == team)
            .map(|p| PingDto {
                sender_id: p.sender.0.to_string(),
                kind: p.kind.clone(),
                x: p.pos.x,
                z: p.pos.z,
            })
            .collect(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
    pub team: &'static str,
    pub is_bot: bool,
    pub connected: bool,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<u32>,
    pub level: u32,
    pub xp: u32,
    pub gold: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub x: f32,
    pub z: f32,
    pub rot: f32,
    pub alive: bool,
    pub respawn_timer: f32,
    pub abilities: Vec<AbilityDto>,
    pub inventory: Vec<Option<ItemStackDto>>,
    pub buffs: Vec<BuffDto>,
    pub score: ScoreDto,
}

impl From<&PlayerSnapshot> for PlayerDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: p.id.0.to_string(),
            name: p.name.clone(),
            team: p.team.as_str(),
            is_bot: p.is_bot,
            connected: p.connected,
            ready: p.ready,
            hero: p.hero.map(|h| h.0),
            level: p.level,
            xp: p.xp,
            gold: p.gold,
            health: p.health,
            max_health: p.max_health,
            mana: p.mana,
            max_mana: p.max_mana,
            x: p.pos.x,
            z: p.pos.z,
            rot: p.rot,
            alive: p.alive,
            respawn_timer: p.respawn_timer,
            abilities: p.abilities.iter().map(AbilityDto::from).collect(),
            inventory: p
                .inventory
                .iter()
                .map(|slot| slot.map(ItemStackDto::from))
                .collect(),
            buffs: p.buffs.iter().map(BuffDto::from).collect(),
            score: ScoreDto::from(&p.score),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AbilityDto {
    pub ability: u32,
    pub level: u8,
    pub cooldown: f32,
}

impl From<&AbilitySnapshot> for AbilityDto {
    fn from(a: &AbilitySnapshot) -> Self {
        Self {
            ability: a.ability.0,
            level: a.level,
            cooldown: a.cooldown,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ItemStackDto {
    pub item: u32,
    pub count: u32,
}

impl From<ItemStackSnapshot> for ItemStackDto {
    fn from(s: ItemStackSnapshot) -> Self {
        Self {
            item: s.item.0,
            count: s.count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuffDto {
    pub kind: &'static str,
    pub remaining: f32,
    pub stacks: u32,
}

impl From<&BuffSnapshot> for BuffDto {
    fn from(b: &BuffSnapshot) -> Self {
        Self {
            kind: b.kind,
            remaining: b.remaining,
            stacks: b.stacks,
        }
    }
}

/// One roster slot's final stat line, sent with the game-end message.
#[derive(Debug, Clone, Serialize)]
pub struct FinalStandingDto {
    pub player_id: String,
    pub name: String,
    pub team: &'static str,
    pub is_bot: bool,
    pub score: ScoreDto,
}

impl From<&FinalStanding> for FinalStandingDto {
    fn from(s: &FinalStanding) -> Self {
        Self {
            player_id: s.player.0.to_string(),
            name: s.name.clone(),
            team: s.team.as_str(),
            is_bot: s.is_bot,
            score: ScoreDto::from(&s.score),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreDto {
    pub kills: u32,
    pub deaths: u32,
    pub creep_kills: u32,
    pub gold_earned: u32,
    pub damage_dealt: u64,
}

impl From<&ScoreLine> for ScoreDto {
    fn from(s: &ScoreLine) -> Self {
        Self {
            kills: s.kills,
            deaths: s.deaths,
            creep_kills: s.creep_kills,
            gold_earned: s.gold_earned,
            damage_dealt: s.damage_dealt,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TowerDto {
    pub id: u64,
    pub team: &'static str,
    pub lane: &'static str,
    pub tier: u8,
    pub x: f32,
    pub z: f32,
    pub health: i32,
    pub max_health: i32,
    pub under_attack: bool,
    pub alive: bool,
}

impl From<&TowerSnapshot> for TowerDto {
    fn from(t: &TowerSnapshot) -> Self {
        Self {
            id: t.id.0 as u64,
            team: t.team.as_str(),
            lane: t.lane.as_str(),
            tier: t.tier,
            x: t.pos.x,
            z: t.pos.z,
            health: t.health,
            max_health: t.max_health,
            under_attack: t.under_attack,
            alive: t.alive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreepDto {
    pub id: u64,
    pub team: &'static str,
    pub kind: &'static str,
    pub lane: &'static str,
    pub x: f32,
    pub z: f32,
    pub rot: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl From<&CreepSnapshot> for CreepDto {
    fn from(c: &CreepSnapshot) -> Self {
        Self {
            id: c.id.0 as u64,
            team: c.team.as_str(),
            kind: c.kind.as_str(),
            lane: c.lane.as_str(),
            x: c.pos.x,
            z: c.pos.z,
            rot: c.rot,
            health: c.health,
            max_health: c.max_health,
            alive: c.alive,
        }
    }
}

// Camps are map landmarks like towers; only their cleared flag changes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CampDto {
    pub id: u64,
    pub tier: u8,
    pub x: f32,
    pub z: f32,
    pub cleared: bool,
}

impl From<&CampSnapshot> for CampDto {
    fn from(c: &CampSnapshot) -> Self {
        Self {
            id: c.id.0 as u64,
            tier: c.tier,
            x: c.pos.x,
            z: c.pos.z,
            cleared: c.cleared,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonsterDto {
    pub id: u64,
    pub kind: &'static str,
    pub x: f32,
    pub z: f32,
    pub rot: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl From<&MonsterSnapshot> for MonsterDto {
    fn from(m: &MonsterSnapshot) -> Self {
        Self {
            id: m.id.0 as u64,
            kind: m.kind.as_str(),
            x: m.pos.x,
            z: m.pos.z,
            rot: m.rot,
            health: m.health,
            max_health: m.max_health,
            alive: m.alive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDto {
    pub sender_id: String,
    pub sender_name: String,
    pub team: &'static str,
    pub team_only: bool,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingDto {
    pub sender_id: String,
    pub kind: String,
    pub x: f32,
    pub z: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Visibility;
    use crate::domain::world::MatchPhase;
    use crate::use_cases::types::{CreepSnapshot, PlayerSnapshot, WorldSnapshot};
    use crate::domain::entities::{CreepKind, Lane};

    fn base_snapshot() -> WorldSnapshot {
        WorldSnapshot {
            tick: 42,
            phase: MatchPhase::Playing,
            clock: 12.5,
            kills_radiant: 1,
            kills_dire: 0,
            winner: None,
            players: Vec::new(),
            towers: Vec::new(),
            creeps: Vec::new(),
            camps: Vec::new(),
            monsters: Vec::new(),
            messages: Vec::new(),
            pings: Vec::new(),
        }
    }

    fn player(id: u64, team: Team, visible_to_enemy: bool) -> PlayerSnapshot {
        let mut visible_to = Visibility::all();
        visible_to.set(team.enemy(), visible_to_enemy);
        PlayerSnapshot {
            id: PlayerId(id),
            name: format!("p{id}"),
            team,
            is_bot: false,
            connected: true,
            ready: true,
            hero: None,
            level: 1,
            xp: 0,
            gold: 0,
            health: 100,
            max_health: 100,
            mana: 50,
            max_mana: 50,
            pos: Vec2::ZERO,
            rot: 0.0,
            alive: true,
            respawn_timer: 0.0,
            abilities: Vec::new(),
            inventory: Vec::new(),
            buffs: Vec::new(),
            score: ScoreLine::default(),
            visible_to,
        }
    }

    #[test]
    fn commands_parse_with_adjacent_tagging() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"Move","data":{"x":100.0,"z":250.5}}"#).unwrap();
        let command = msg.into_command(PlayerId(9)).unwrap();
        assert!(matches!(
            command,
            Command::Move { player: PlayerId(9), point } if point.x == 100.0 && point.z == 250.5
        ));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"LockHero"}"#).unwrap();
        assert!(matches!(
            msg.into_command(PlayerId(9)),
            Some(Command::LockHero { .. })
        ));
    }

    #[test]
    fn unknown_target_kind_is_dropped() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"Attack","data":{"target":{"kind":"ward","id":3}}}"#,
        )
        .unwrap();
        assert!(msg.into_command(PlayerId(1)).is_none());
    }

    #[test]
    fn snapshot_hides_enemies_without_vision() {
        let mut snapshot = base_snapshot();
        snapshot.players.push(player(1, Team::Radiant, false));
        snapshot.players.push(player(2, Team::Dire, false));
        let mut hidden_creep = Visibility::all();
        hidden_creep.set(Team::Radiant, false);
        snapshot.creeps.push(CreepSnapshot {
            id: CreepId(5),
            team: Team::Dire,
            kind: CreepKind::Melee,
            lane: Lane::Mid,
            pos: Vec2::ZERO,
            rot: 0.0,
            health: 100,
            max_health: 100,
            alive: true,
            visible_to: hidden_creep,
        });

        let ServerMessage::Snapshot(dto) = snapshot_message(&snapshot, Team::Radiant) else {
            panic!("expected snapshot");
        };
        // Own hero always present, hidden enemy hero and creep omitted.
        assert_eq!(dto.players.len(), 1);
        assert_eq!(dto.players[0].id, "1");
        assert!(dto.creeps.is_empty());
    }

    #[test]
    fn team_chat_does_not_cross_teams() {
        let mut snapshot = base_snapshot();
        snapshot.messages.push(crate::use_cases::types::ChatSnapshot {
            sender: PlayerId(1),
            sender_name: "p1".into(),
            team: Team::Radiant,
            team_only: true,
            content: "gank mid".into(),
        });

        let ServerMessage::Snapshot(radiant) = snapshot_message(&snapshot, Team::Radiant) else {
            panic!("expected snapshot");
        };
        let ServerMessage::Snapshot(dire) = snapshot_message(&snapshot, Team::Dire) else {
            panic!("expected snapshot");
        };
        assert_eq!(radiant.messages.len(), 1);
        assert!(dire.messages.is_empty());
    }

    #[test]
    fn personal_events_reach_only_their_owner() {
        let event = Event::ItemBought {
            player: PlayerId(1),
            item: ItemId(10),
            slot: 2,
        };
        assert!(event_message(&event, PlayerId(1)).is_some());
        assert!(event_message(&event, PlayerId(2)).is_none());

        let event = Event::GameStart;
        assert!(event_message(&event, PlayerId(2)).is_some());
    }

    #[test]
    fn game_end_carries_scores_duration_and_standings() {
        let score = ScoreLine {
            kills: 3,
            gold_earned: 2400,
            ..Default::default()
        };
        let event = Event::GameEnd {
            winner: Team::Dire,
            kills_radiant: 2,
            kills_dire: 15,
            duration: 843.5,
            standings: vec![FinalStanding {
                player: PlayerId(7),
                name: "p7".into(),
                team: Team::Dire,
                is_bot: false,
                score,
            }],
        };

        // Every connected client gets the same end-of-match payload.
        let msg = event_message(&event, PlayerId(99)).expect("game end is global");
        let ServerMessage::GameEnd {
            winner,
            kills_radiant,
            kills_dire,
            duration,
            standings,
        } = msg
        else {
            panic!("expected game end");
        };
        assert_eq!(winner, "dire");
        assert_eq!(kills_radiant, 2);
        assert_eq!(kills_dire, 15);
        assert_eq!(duration, 843.5);
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].player_id, "7");
        assert_eq!(standings[0].score.kills, 3);
        assert_eq!(standings[0].score.gold_earned, 2400);
    }
}
