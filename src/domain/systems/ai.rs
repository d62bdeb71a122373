// Server-side controllers for non-player units: tower target selection, lane
// creep aggro, and jungle monster leashing. Runs before combat each tick so
// the targets it picks are acted on in the same tick.

use crate::domain::content::ContentDb;
use crate::domain::entities::{PlayerId, Team, UnitRef};
use crate::domain::math::Vec2;
use crate::domain::store::EntityStore;

pub fn run(store: &mut EntityStore, content: &ContentDb) {
    towers(store);
    creeps(store, content);
    monsters(store, content);
}

/// Towers hold their target while it stays valid and in range, preferring
/// creeps over heroes when acquiring a new one.
fn towers(store: &mut EntityStore) {
    for i in 0..store.towers.len() {
        let t = &store.towers[i];
        if !t.alive {
            continue;
        }
        if let Some(current) = t.target {
            if target_valid(store, current, t.team, t.pos, t.stats.attack_range) {
                continue;
            }
        }

        let team = t.team;
        let pos = t.pos;
        let range = t.stats.attack_range;
        let picked = nearest_enemy_creep(store, team, pos, range)
            .or_else(|| nearest_enemy_hero(store, team, pos, range));
        store.towers[i].target = picked;
    }
}

/// Lane creeps fight whatever is closest inside their aggro radius, with
/// enemy creeps outranking towers outranking heroes. With nothing in range
/// they march their lane waypoints.
fn creeps(store: &mut EntityStore, content: &ContentDb) {
    let aggro = content.rules.creep_aggro_radius;
    for i in 0..store.creeps.len() {
        let c = &store.creeps[i];
        if !c.alive {
            continue;
        }
        if let Some(current) = c.target {
            if target_valid(store, current, c.team, c.pos, aggro) {
                continue;
            }
        }

        let team = c.team;
        let pos = c.pos;
        let picked = nearest_enemy_creep(store, team, pos, aggro)
            .or_else(|| nearest_enemy_tower(store, team, pos, aggro))
            .or_else(|| nearest_enemy_hero(store, team, pos, aggro));

        let c = &mut store.creeps[i];
        c.target = picked;
        if picked.is_none() && c.move_target.is_none() {
            let lane_points = content.map.lane(c.lane).for_team(c.team);
            if let Some(&wp) = lane_points.get(c.waypoint_index) {
                c.move_target = Some(wp);
            }
        }
    }
}

/// Jungle monsters aggro a nearby hero, leash back to their spawn anchor when
/// dragged too far, and heal to full on arriving home.
fn monsters(store: &mut EntityStore, content: &ContentDb) {
    let rules = &content.rules;
    for i in 0..store.monsters.len() {
        let m = &store.monsters[i];
        if !m.alive {
            continue;
        }

        if m.resetting {
            if m.pos.distance(m.spawn_anchor) <= rules.player_arrival_threshold {
                let m = &mut store.monsters[i];
                m.resetting = false;
                m.health = m.max_health;
                m.buffs.clear();
            }
            continue;
        }

        // Drop aggro on dead or vanished targets; leash when the target is
        // dragged past the leash radius measured from the spawn anchor.
        if let Some(target) = m.aggro_target {
            let anchor = m.spawn_anchor;
            let target_pos = store.player(target).filter(|p| p.alive).map(|p| p.pos);
            match target_pos {
                Some(tp) => {
                    if tp.distance(anchor) > rules.monster_leash_radius {
                        let m = &mut store.monsters[i];
                        m.resetting = true;
                        m.aggro_target = None;
                    }
                    continue;
                }
                None => store.monsters[i].aggro_target = None,
            }
        }

        let pos = store.monsters[i].pos;
        store.monsters[i].aggro_target =
            nearest_player(store, pos, rules.monster_aggro_radius, None);
    }
}

fn target_valid(store: &EntityStore, target: UnitRef, my_team: Team, pos: Vec2, range: f32) -> bool {
    match store.view(target) {
        Some(v) => {
            v.alive && !v.untargetable && v.team != Some(my_team) && pos.distance(v.pos) <= range
        }
        None => false,
    }
}

fn nearest_enemy_creep(store: &EntityStore, team: Team, pos: Vec2, range: f32) -> Option<UnitRef> {
    store
        .creeps
        .iter()
        .filter(|c| c.alive && c.team != team && pos.distance(c.pos) <= range)
        .min_by(|a, b| pos.distance(a.pos).total_cmp(&pos.distance(b.pos)))
        .map(|c| UnitRef::Creep(c.id))
}

fn nearest_enemy_tower(store: &EntityStore, team: Team, pos: Vec2, range: f32) -> Option<UnitRef> {
    store
        .towers
        .iter()
        .filter(|t| t.alive && t.team != team && pos.distance(t.pos) <= range)
        .min_by(|a, b| pos.distance(a.pos).total_cmp(&pos.distance(b.pos)))
        .map(|t| UnitRef::Tower(t.id))
}

fn nearest_enemy_hero(store: &EntityStore, team: Team, pos: Vec2, range: f32) -> Option<UnitRef> {
    store
        .players
        .iter()
        .filter(|p| {
            p.alive
                && p.team != team
                && pos.distance(p.pos) <= range
                && store
                    .view(UnitRef::Player(p.id))
                    .is_some_and(|v| !v.untargetable)
        })
        .min_by(|a, b| pos.distance(a.pos).total_cmp(&pos.distance(b.pos)))
        .map(|p| UnitRef::Player(p.id))
}

fn nearest_player(
    store: &EntityStore,
    pos: Vec2,
    range: f32,
    team: Option<Team>,
) -> Option<PlayerId> {
    store
        .players
        .iter()
        .filter(|p| p.alive && team.is_none_or(|t| p.team == t) && pos.distance(p.pos) <= range)
        .min_by(|a, b| pos.distance(a.pos).total_cmp(&pos.distance(b.pos)))
        .map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Creep, CreepId, CreepKind, Lane, Player, Team};

    fn hero_at(id: u64, team: Team, pos: Vec2) -> Player {
        let content = ContentDb::builtin();
        let def = &content.heroes[0];
        let mut p = Player::from_roster(PlayerId(id), format!("p{id}"), team, false);
        p.stats = def.stats;
        p.max_health = def.health;
        p.health = def.health;
        p.alive = true;
        p.pos = pos;
        p
    }

    fn creep_at(store: &mut EntityStore, content: &ContentDb, team: Team, pos: Vec2) -> CreepId {
        let base = content.map.creep_stats(CreepKind::Melee);
        store.add_creep(|id| Creep {
            id,
            team,
            kind: CreepKind::Melee,
            lane: Lane::Mid,
            pos,
            rot: 0.0,
            move_target: None,
            waypoint_index: 0,
            health: base.health,
            max_health: base.health,
            stats: base.combat(),
            attack_cooldown: 0.0,
            gold_bounty: base.gold_bounty,
            xp_bounty: base.xp_bounty,
            target: None,
            buffs: Vec::new(),
            visible_to: crate::domain::entities::Visibility::all(),
            alive: true,
            despawn_at: None,
        })
    }

    #[test]
    fn tower_prefers_creep_over_hero() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let spawn = &content.map.towers[0];
        store.add_tower(|id| crate::domain::entities::Tower {
            id,
            team: Team::Radiant,
            lane: spawn.lane,
            tier: spawn.tier,
            pos: Vec2::new(1000.0, 1000.0),
            health: content.map.tower_health,
            max_health: content.map.tower_health,
            stats: content.map.tower_combat_stats(),
            attack_cooldown: 0.0,
            target: None,
            under_attack: false,
            alive: true,
        });
        // Hero closer than the creep; the creep still wins.
        store.add_player(hero_at(1, Team::Dire, Vec2::new(1050.0, 1000.0)));
        let creep = creep_at(&mut store, &content, Team::Dire, Vec2::new(1200.0, 1000.0));

        run(&mut store, &content);
        assert_eq!(store.towers[0].target, Some(UnitRef::Creep(creep)));
    }

    #[test]
    fn creep_with_no_enemies_marches_its_lane() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let first_wp = content.map.lane(Lane::Mid).for_team(Team::Radiant)[0];
        creep_at(&mut store, &content, Team::Radiant, Vec2::new(200.0, 200.0));

        run(&mut store, &content);
        assert_eq!(store.creeps[0].target, None);
        assert_eq!(store.creeps[0].move_target, Some(first_wp));
    }

    #[test]
    fn creep_aggros_enemy_creep_inside_radius() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        creep_at(&mut store, &content, Team::Radiant, Vec2::new(1000.0, 1000.0));
        let enemy = creep_at(&mut store, &content, Team::Dire, Vec2::new(1150.0, 1000.0));
        // Enemy hero also in radius but outranked.
        store.add_player(hero_at(1, Team::Dire, Vec2::new(1100.0, 1000.0)));

        run(&mut store, &content);
        assert_eq!(store.creeps[0].target, Some(UnitRef::Creep(enemy)));
    }

    #[test]
    fn leashed_monster_resets_and_heals_at_home() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let camp = &content.map.camps[0];
        let monster = &camp.monsters[0];
        let base = content.map.monster_stats(monster.kind);
        let camp_id = store.add_camp(|id| crate::domain::entities::JungleCamp {
            id,
            tier: camp.tier,
            affinity: camp.affinity,
            pos: camp.pos,
            cleared: false,
            respawn_in: 0.0,
        });
        let anchor = Vec2::new(1000.0, 1000.0);
        store.add_monster(|id| crate::domain::entities::JungleMonster {
            id,
            camp: camp_id,
            kind: monster.kind,
            pos: anchor.add(Vec2::new(100.0, 0.0)),
            rot: 0.0,
            spawn_anchor: anchor,
            health: base.health / 2,
            max_health: base.health,
            stats: base.combat(),
            attack_cooldown: 0.0,
            gold_bounty: base.gold_bounty,
            xp_bounty: base.xp_bounty,
            aggro_target: Some(PlayerId(9)),
            resetting: false,
            buffs: Vec::new(),
            visible_to: crate::domain::entities::Visibility::all(),
            alive: true,
            despawn_at: None,
        });
        // The target kites just past the leash radius while the monster is
        // still near home; the reset must trigger on the next pass.
        let leash = content.rules.monster_leash_radius;
        store.add_player(hero_at(9, Team::Dire, anchor.add(Vec2::new(leash + 100.0, 0.0))));

        run(&mut store, &content);
        assert!(store.monsters[0].resetting);
        assert_eq!(store.monsters[0].aggro_target, None);

        // Arrive home and recover.
        store.monsters[0].pos = anchor;
        run(&mut store, &content);
        assert!(!store.monsters[0].resetting);
        assert_eq!(store.monsters[0].health, store.monsters[0].max_health);
    }

    #[test]
    fn monster_keeps_chasing_a_target_inside_the_leash() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let camp = &content.map.camps[0];
        let monster = &camp.monsters[0];
        let base = content.map.monster_stats(monster.kind);
        let camp_id = store.add_camp(|id| crate::domain::entities::JungleCamp {
            id,
            tier: camp.tier,
            affinity: camp.affinity,
            pos: camp.pos,
            cleared: false,
            respawn_in: 0.0,
        });
        let anchor = Vec2::new(1000.0, 1000.0);
        store.add_monster(|id| crate::domain::entities::JungleMonster {
            id,
            camp: camp_id,
            kind: monster.kind,
            pos: anchor.add(Vec2::new(100.0, 0.0)),
            rot: 0.0,
            spawn_anchor: anchor,
            health: base.health,
            max_health: base.health,
            stats: base.combat(),
            attack_cooldown: 0.0,
            gold_bounty: base.gold_bounty,
            xp_bounty: base.xp_bounty,
            aggro_target: Some(PlayerId(9)),
            resetting: false,
            buffs: Vec::new(),
            visible_to: crate::domain::entities::Visibility::all(),
            alive: true,
            despawn_at: None,
        });
        let leash = content.rules.monster_leash_radius;
        store.add_player(hero_at(9, Team::Dire, anchor.add(Vec2::new(leash - 100.0, 0.0))));

        run(&mut store, &content);
        assert!(!store.monsters[0].resetting);
        assert_eq!(store.monsters[0].aggro_target, Some(PlayerId(9)));
    }

    #[test]
    fn idle_monster_aggros_a_nearby_hero() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let camp = &content.map.camps[0];
        let monster = &camp.monsters[0];
        let base = content.map.monster_stats(monster.kind);
        let camp_id = store.add_camp(|id| crate::domain::entities::JungleCamp {
            id,
            tier: camp.tier,
            affinity: camp.affinity,
            pos: camp.pos,
            cleared: false,
            respawn_in: 0.0,
        });
        let anchor = Vec2::new(1000.0, 1000.0);
        store.add_monster(|id| crate::domain::entities::JungleMonster {
            id,
            camp: camp_id,
            kind: monster.kind,
            pos: anchor,
            rot: 0.0,
            spawn_anchor: anchor,
            health: base.health,
            max_health: base.health,
            stats: base.combat(),
            attack_cooldown: 0.0,
            gold_bounty: base.gold_bounty,
            xp_bounty: base.xp_bounty,
            aggro_target: None,
            resetting: false,
            buffs: Vec::new(),
            visible_to: crate::domain::entities::Visibility::all(),
            alive: true,
            despawn_at: None,
        });
        store.add_player(hero_at(1, Team::Radiant, anchor.add(Vec2::new(100.0, 0.0))));

        run(&mut store, &content);
        assert_eq!(store.monsters[0].aggro_target, Some(PlayerId(1)));
    }
}
