// Canonical entity collections with typed lookup.
//
// Iteration order within a collection is insertion order. Dead creeps and
// monsters are not removed immediately: `sweep` drops them once their
// tick-counted linger expires, so combat resolution in the death tick still
// sees the corpse.

use super::buffs::{self, BuffKind};
use super::entities::{
    CampId, ChatMessage, Creep, CreepId, JungleCamp, JungleMonster, MapPing, MonsterId, Player,
    PlayerId, Team, Tower, TowerId, UnitRef,
};
use super::math::Vec2;
use std::collections::{HashMap, VecDeque};

/// Read-only view of any unit, used by targeting and damage resolution so
/// they do not need to branch on concrete collections.
#[derive(Debug, Clone, Copy)]
pub struct UnitView {
    pub pos: Vec2,
    /// Monsters are neutral and carry no team.
    pub team: Option<Team>,
    pub alive: bool,
    pub health: i32,
    pub untargetable: bool,
    pub invulnerable: bool,
}

#[derive(Debug, Default)]
pub struct EntityStore {
    pub players: Vec<Player>,
    pub towers: Vec<Tower>,
    pub creeps: Vec<Creep>,
    pub camps: Vec<JungleCamp>,
    pub monsters: Vec<JungleMonster>,

    pub messages: VecDeque<ChatMessage>,
    pub pings: VecDeque<MapPing>,

    player_index: HashMap<PlayerId, usize>,
    next_tower: u32,
    next_creep: u32,
    next_camp: u32,
    next_monster: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Players are created once from the roster and never removed while the
    // room lives, so the index stays valid across the whole match.

    pub fn add_player(&mut self, player: Player) {
        self.player_index.insert(player.id, self.players.len());
        self.players.push(player);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.player_index.get(&id).map(|&i| &self.players[i])
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        match self.player_index.get(&id) {
            Some(&i) => self.players.get_mut(i),
            None => None,
        }
    }

    pub fn add_tower(&mut self, mut build: impl FnMut(TowerId) -> Tower) -> TowerId {
        let id = TowerId(self.next_tower);
        self.next_tower += 1;
        self.towers.push(build(id));
        id
    }

    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.iter().find(|t| t.id == id)
    }

    pub fn tower_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|t| t.id == id)
    }

    pub fn add_creep(&mut self, mut build: impl FnMut(CreepId) -> Creep) -> CreepId {
        let id = CreepId(self.next_creep);
        self.next_creep += 1;
        self.creeps.push(build(id));
        id
    }

    pub fn creep(&self, id: CreepId) -> Option<&Creep> {
        self.creeps.iter().find(|c| c.id == id)
    }

    pub fn creep_mut(&mut self, id: CreepId) -> Option<&mut Creep> {
        self.creeps.iter_mut().find(|c| c.id == id)
    }

    pub fn add_camp(&mut self, mut build: impl FnMut(CampId) -> JungleCamp) -> CampId {
        let id = CampId(self.next_camp);
        self.next_camp += 1;
        self.camps.push(build(id));
        id
    }

    pub fn camp_mut(&mut self, id: CampId) -> Option<&mut JungleCamp> {
        self.camps.iter_mut().find(|c| c.id == id)
    }

    pub fn add_monster(&mut self, mut build: impl FnMut(MonsterId) -> JungleMonster) -> MonsterId {
        let id = MonsterId(self.next_monster);
        self.next_monster += 1;
        self.monsters.push(build(id));
        id
    }

    pub fn monster(&self, id: MonsterId) -> Option<&JungleMonster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut JungleMonster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    /// Resolve any unit handle into a flat view; None when the handle is
    /// stale.
    pub fn view(&self, unit: UnitRef) -> Option<UnitView> {
        match unit {
            UnitRef::Player(id) => self.player(id).map(|p| UnitView {
                pos: p.pos,
                team: Some(p.team),
                alive: p.alive,
                health: p.health,
                untargetable: buffs::has_buff(&p.buffs, BuffKind::Untargetable),
                invulnerable: buffs::has_buff(&p.buffs, BuffKind::Invulnerable),
            }),
            UnitRef::Tower(id) => self.tower(id).map(|t| UnitView {
                pos: t.pos,
                team: Some(t.team),
                alive: t.alive,
                health: t.health,
                untargetable: false,
                invulnerable: false,
            }),
            UnitRef::Creep(id) => self.creep(id).map(|c| UnitView {
                pos: c.pos,
                team: Some(c.team),
                alive: c.alive,
                health: c.health,
                untargetable: false,
                invulnerable: buffs::has_buff(&c.buffs, BuffKind::Invulnerable),
            }),
            UnitRef::Monster(id) => self.monster(id).map(|m| UnitView {
                pos: m.pos,
                team: None,
                alive: m.alive,
                health: m.health,
                untargetable: false,
                invulnerable: buffs::has_buff(&m.buffs, BuffKind::Invulnerable),
            }),
        }
    }

    pub fn push_message(&mut self, msg: ChatMessage, cap: usize) {
        self.messages.push_back(msg);
        while self.messages.len() > cap {
            self.messages.pop_front();
        }
    }

    pub fn push_ping(&mut self, ping: MapPing, cap: usize) {
        self.pings.push_back(ping);
        while self.pings.len() > cap {
            self.pings.pop_front();
        }
    }

    /// Drop expired pings and corpses whose linger has elapsed.
    pub fn sweep(&mut self, tick: u64, clock: f32) {
        self.creeps
            .retain(|c| c.despawn_at.is_none_or(|at| at > tick));
        self.monsters
            .retain(|m| m.despawn_at.is_none_or(|at| at > tick));
        self.pings.retain(|p| p.expires_at > clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CreepKind, Lane, Visibility};
    use crate::domain::entities::CombatStats;

    fn test_creep(id: CreepId) -> Creep {
        Creep {
            id,
            team: Team::Radiant,
            kind: CreepKind::Melee,
            lane: Lane::Mid,
            pos: Vec2::ZERO,
            rot: 0.0,
            move_target: None,
            waypoint_index: 0,
            health: 100,
            max_health: 100,
            stats: CombatStats {
                attack_damage: 10,
                attack_speed: 1.0,
                attack_range: 100.0,
                armor: 0,
                magic_resist: 0,
                move_speed: 260.0,
            },
            attack_cooldown: 0.0,
            gold_bounty: 20,
            xp_bounty: 20,
            target: None,
            buffs: Vec::new(),
            visible_to: Visibility::all(),
            alive: true,
            despawn_at: None,
        }
    }

    #[test]
    fn creep_removal_waits_for_the_linger_tick() {
        let mut store = EntityStore::new();
        let id = store.add_creep(test_creep);
        store.creep_mut(id).unwrap().despawn_at = Some(20);

        store.sweep(19, 0.0);
        assert!(store.creep(id).is_some());
        store.sweep(20, 0.0);
        assert!(store.creep(id).is_none());
    }

    #[test]
    fn creep_ids_are_unique_across_spawns() {
        let mut store = EntityStore::new();
        let a = store.add_creep(test_creep);
        let b = store.add_creep(test_creep);
        assert_ne!(a, b);
    }

    #[test]
    fn stale_handle_resolves_to_none() {
        let store = EntityStore::new();
        assert!(store.view(UnitRef::Creep(CreepId(99))).is_none());
    }
}
