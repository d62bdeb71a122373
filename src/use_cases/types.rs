// Use-case level view of the world: a plain snapshot captured at a tick
// boundary. The wire format lives in the interface adapters; nothing here
// knows about serde.

use crate::domain::buffs::AppliedBuff;
use crate::domain::content::{AbilityId, HeroId, ItemId};
use crate::domain::entities::{
    CampId, CreepId, CreepKind, Lane, MonsterId, MonsterKind, PlayerId, ScoreLine, Team,
    TowerId, Visibility,
};
use crate::domain::math::Vec2;
use crate::domain::world::{MatchPhase, World};

#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    /// Seconds of playing time; frozen while paused.
    pub clock: f32,
    pub kills_radiant: u32,
    pub kills_dire: u32,
    pub winner: Option<Team>,
    pub players: Vec<PlayerSnapshot>,
    pub towers: Vec<TowerSnapshot>,
    pub creeps: Vec<CreepSnapshot>,
    pub camps: Vec<CampSnapshot>,
    pub monsters: Vec<MonsterSnapshot>,
    pub messages: Vec<ChatSnapshot>,
    pub pings: Vec<PingSnapshot>,
}

#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub is_bot: bool,
    pub connected: bool,
    pub ready: bool,
    pub hero: Option<HeroId>,
    pub level: u32,
    pub xp: u32,
    pub gold: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub pos: Vec2,
    pub rot: f32,
    pub alive: bool,
    pub respawn_timer: f32,
    pub abilities: Vec<AbilitySnapshot>,
    pub inventory: Vec<Option<ItemStackSnapshot>>,
    pub buffs: Vec<BuffSnapshot>,
    pub score: ScoreLine,
    pub visible_to: Visibility,
}

#[derive(Debug, Clone, Copy)]
pub struct AbilitySnapshot {
    pub ability: AbilityId,
    pub level: u8,
    pub cooldown: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemStackSnapshot {
    pub item: ItemId,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct BuffSnapshot {
    pub kind: &'static str,
    pub remaining: f32,
    pub stacks: u32,
}

impl BuffSnapshot {
    fn from_applied(b: &AppliedBuff) -> Self {
        Self {
            kind: b.kind.as_str(),
            remaining: b.remaining,
            stacks: b.stacks,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TowerSnapshot {
    pub id: TowerId,
    pub team: Team,
    pub lane: Lane,
    pub tier: u8,
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub under_attack: bool,
    pub alive: bool,
}

#[derive(Debug, Clone)]
pub struct CreepSnapshot {
    pub id: CreepId,
    pub team: Team,
    pub kind: CreepKind,
    pub lane: Lane,
    pub pos: Vec2,
    pub rot: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub visible_to: Visibility,
}

#[derive(Debug, Clone, Copy)]
pub struct CampSnapshot {
    pub id: CampId,
    pub tier: u8,
    pub pos: Vec2,
    pub cleared: bool,
    pub respawn_in: f32,
}

#[derive(Debug, Clone)]
pub struct MonsterSnapshot {
    pub id: MonsterId,
    pub kind: MonsterKind,
    pub pos: Vec2,
    pub rot: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub visible_to: Visibility,
}

#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    pub sender: PlayerId,
    pub sender_name: String,
    pub team: Team,
    pub team_only: bool,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PingSnapshot {
    pub sender: PlayerId,
    pub team: Team,
    pub kind: String,
    pub pos: Vec2,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        let store = &world.store;
        Self {
            tick: world.tick,
            phase: world.phase,
            clock: world.clock,
            kills_radiant: world.scores.radiant,
            kills_dire: world.scores.dire,
            winner: world.winner,
            players: store
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    name: p.name.clone(),
                    team: p.team,
                    is_bot: p.is_bot,
                    connected: p.connected,
                    ready: p.ready,
                    hero: p.hero,
                    level: p.level,
                    xp: p.xp,
                    gold: p.gold,
                    health: p.health,
                    max_health: p.max_health,
                    mana: p.mana,
                    max_mana: p.max_mana,
                    pos: p.pos,
                    rot: p.rot,
                    alive: p.alive,
                    respawn_timer: p.respawn_timer,
                    abilities: p
                        .abilities
                        .iter()
                        .map(|a| AbilitySnapshot {
                            ability: a.ability,
                            level: a.level,
                            cooldown: a.cooldown,
                        })
                        .collect(),
                    inventory: p
                        .inventory
                        .iter()
                        .map(|slot| {
                            slot.map(|s| ItemStackSnapshot {
                                item: s.item,
                                count: s.count,
                            })
                        })
                        .collect(),
                    buffs: p.buffs.iter().map(BuffSnapshot::from_applied).collect(),
                    score: p.score,
                    visible_to: p.visible_to,
                })
                .collect(),
            towers: store
                .towers
                .iter()
                .map(|t| TowerSnapshot {
                    id: t.id,
                    team: t.team,
                    lane: t.lane,
                    tier: t.tier,
                    pos: t.pos,
                    health: t.health,
                    max_health: t.max_health,
                    under_attack: t.under_attack,
                    alive: t.alive,
                })
                .collect(),
            creeps: store
                .creeps
                .iter()
                .map(|c| CreepSnapshot {
                    id: c.id,
                    team: c.team,
                    kind: c.kind,
                    lane: c.lane,
                    pos: c.pos,
                    rot: c.rot,
                    health: c.health,
                    max_health: c.max_health,
                    alive: c.alive,
                    visible_to: c.visible_to,
                })
                .collect(),
            camps: store
                .camps
                .iter()
                .map(|c| CampSnapshot {
                    id: c.id,
                    tier: c.tier,
                    pos: c.pos,
                    cleared: c.cleared,
                    respawn_in: c.respawn_in,
                })
                .collect(),
            monsters: store
                .monsters
                .iter()
                .map(|m| MonsterSnapshot {
                    id: m.id,
                    kind: m.kind,
                    pos: m.pos,
                    rot: m.rot,
                    health: m.health,
                    max_health: m.max_health,
                    alive: m.alive,
                    visible_to: m.visible_to,
                })
                .collect(),
            messages: store
                .messages
                .iter()
                .map(|m| ChatSnapshot {
                    sender: m.sender,
                    sender_name: m.sender_name.clone(),
                    team: m.team,
                    team_only: m.team_only,
                    content: m.content.clone(),
                })
                .collect(),
            pings: store
                .pings
                .iter()
                .map(|p| PingSnapshot {
                    sender: p.sender,
                    team: p.team,
                    kind: p.kind.clone(),
                    pos: p.pos,
                })
                .collect(),
        }
    }
}
