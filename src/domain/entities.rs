// Canonical simulation entities. These are the authoritative records the tick
// pipeline mutates in place; everything the transport layer sees is derived
// from them at tick boundaries.

use super::buffs::AppliedBuff;
use super::content::{AbilityId, HeroId, ItemId};
use super::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TowerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreepId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CampId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonsterId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Radiant,
    Dire,
}

impl Team {
    pub fn enemy(self) -> Team {
        match self {
            Team::Radiant => Team::Dire,
            Team::Dire => Team::Radiant,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Radiant => "radiant",
            Team::Dire => "dire",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Top,
    Mid,
    Bot,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Top, Lane::Mid, Lane::Bot];

    pub fn index(self) -> usize {
        match self {
            Lane::Top => 0,
            Lane::Mid => 1,
            Lane::Bot => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lane::Top => "top",
            Lane::Mid => "mid",
            Lane::Bot => "bot",
        }
    }
}

/// Handle to any attackable unit. Handles are validated against the store at
/// use; a dangling reference is a no-op, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitRef {
    Player(PlayerId),
    Tower(TowerId),
    Creep(CreepId),
    Monster(MonsterId),
}

/// Per-team visibility flags recomputed by the vision system.
#[derive(Debug, Clone, Copy)]
pub struct Visibility {
    pub radiant: bool,
    pub dire: bool,
}

impl Visibility {
    pub fn all() -> Self {
        Self {
            radiant: true,
            dire: true,
        }
    }

    pub fn seen_by(&self, team: Team) -> bool {
        match team {
            Team::Radiant => self.radiant,
            Team::Dire => self.dire,
        }
    }

    pub fn set(&mut self, team: Team, visible: bool) {
        match team {
            Team::Radiant => self.radiant = visible,
            Team::Dire => self.dire = visible,
        }
    }
}

/// Base combat numbers; buffs and items layer on top of these at read time.
#[derive(Debug, Clone, Copy)]
pub struct CombatStats {
    pub attack_damage: i32,
    /// Attacks per second before buff modifiers.
    pub attack_speed: f32,
    pub attack_range: f32,
    pub armor: i32,
    pub magic_resist: i32,
    pub move_speed: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct AbilitySlot {
    pub ability: AbilityId,
    /// 0 = not learned yet.
    pub level: u8,
    /// Seconds until the slot is castable again.
    pub cooldown: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

pub const INVENTORY_SLOTS: usize = 6;

/// Aggregates reported in `game_end` and handed to the result sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreLine {
    pub kills: u32,
    pub deaths: u32,
    pub creep_kills: u32,
    pub gold_earned: u32,
    pub damage_dealt: u64,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub is_bot: bool,
    pub connected: bool,
    /// Locked in during hero select.
    pub ready: bool,
    pub hero: Option<HeroId>,

    pub level: u32,
    pub xp: u32,
    pub gold: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub spell_power: i32,

    pub pos: Vec2,
    pub rot: f32,
    pub move_target: Option<Vec2>,
    /// Remaining waypoints toward the latest move order.
    pub path: Vec<Vec2>,

    pub stats: CombatStats,
    pub attack_cooldown: f32,
    pub target: Option<UnitRef>,

    pub abilities: Vec<AbilitySlot>,
    pub inventory: [Option<ItemStack>; INVENTORY_SLOTS],
    pub buffs: Vec<AppliedBuff>,

    pub vision_range: f32,
    pub visible_to: Visibility,

    pub alive: bool,
    pub respawn_timer: f32,
    /// Seconds left before a disconnected player counts as abandoned.
    pub disconnect_grace: Option<f32>,

    pub score: ScoreLine,
}

impl Player {
    /// Roster-time constructor; combat fields are filled in when the match
    /// enters the playing phase and the hero is known.
    pub fn from_roster(id: PlayerId, name: String, team: Team, is_bot: bool) -> Self {
        Self {
            id,
            name,
            team,
            is_bot,
            connected: is_bot,
            ready: false,
            hero: None,
            level: 1,
            xp: 0,
            gold: 0,
            health: 0,
            max_health: 0,
            mana: 0,
            max_mana: 0,
            spell_power: 0,
            pos: Vec2::ZERO,
            rot: 0.0,
            move_target: None,
            path: Vec::new(),
            stats: CombatStats {
                attack_damage: 0,
                attack_speed: 1.0,
                attack_range: 0.0,
                armor: 0,
                magic_resist: 0,
                move_speed: 0.0,
            },
            attack_cooldown: 0.0,
            target: None,
            abilities: Vec::new(),
            inventory: [None; INVENTORY_SLOTS],
            buffs: Vec::new(),
            vision_range: 0.0,
            visible_to: Visibility::all(),
            alive: false,
            respawn_timer: 0.0,
            disconnect_grace: None,
            score: ScoreLine::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tower {
    pub id: TowerId,
    pub team: Team,
    pub lane: Lane,
    /// 1..=4; losing every tier-4 tower loses the match.
    pub tier: u8,
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub stats: CombatStats,
    pub attack_cooldown: f32,
    pub target: Option<UnitRef>,
    pub under_attack: bool,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreepKind {
    Melee,
    Ranged,
    Siege,
}

impl CreepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CreepKind::Melee => "melee",
            CreepKind::Ranged => "ranged",
            CreepKind::Siege => "siege",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Creep {
    pub id: CreepId,
    pub team: Team,
    pub kind: CreepKind,
    pub lane: Lane,
    pub pos: Vec2,
    pub rot: f32,
    pub move_target: Option<Vec2>,
    pub waypoint_index: usize,
    pub health: i32,
    pub max_health: i32,
    pub stats: CombatStats,
    pub attack_cooldown: f32,
    pub gold_bounty: u32,
    pub xp_bounty: u32,
    pub target: Option<UnitRef>,
    pub buffs: Vec<AppliedBuff>,
    pub visible_to: Visibility,
    pub alive: bool,
    /// Tick at which the corpse leaves the store.
    pub despawn_at: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct JungleCamp {
    pub id: CampId,
    /// 1 = easy, 2 = hard.
    pub tier: u8,
    /// Side of the map the camp sits on; neutral camps have none.
    pub affinity: Option<Team>,
    pub pos: Vec2,
    pub cleared: bool,
    pub respawn_in: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterKind {
    Wolf,
    Golem,
    Ancient,
}

impl MonsterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MonsterKind::Wolf => "wolf",
            MonsterKind::Golem => "golem",
            MonsterKind::Ancient => "ancient",
        }
    }
}

#[derive(Debug, Clone)]
pub struct JungleMonster {
    pub id: MonsterId,
    pub camp: CampId,
    pub kind: MonsterKind,
    pub pos: Vec2,
    pub rot: f32,
    pub spawn_anchor: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub stats: CombatStats,
    pub attack_cooldown: f32,
    pub gold_bounty: u32,
    pub xp_bounty: u32,
    pub aggro_target: Option<PlayerId>,
    pub resetting: bool,
    pub buffs: Vec<AppliedBuff>,
    pub visible_to: Visibility,
    pub alive: bool,
    pub despawn_at: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: PlayerId,
    pub sender_name: String,
    pub team: Team,
    pub team_only: bool,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct MapPing {
    pub sender: PlayerId,
    pub team: Team,
    pub kind: String,
    pub pos: Vec2,
    /// Match-clock second past which the ping is dropped.
    pub expires_at: f32,
}
