// Autoattack resolution and the shared damage/kill pipeline.
//
// Every source of damage (autoattacks, abilities, DoT buffs, towers) funnels
// through `deal_damage` so armor reduction, clamping, kill crediting, and
// rewards behave identically everywhere.

use crate::domain::buffs::{self, DamageType};
use crate::domain::content::{ContentDb, HeroDef, MatchRules};
use crate::domain::entities::{Player, PlayerId, Team, UnitRef};
use crate::domain::store::EntityStore;
use tracing::debug;

pub const MAX_LEVEL: u32 = 18;

/// `floor(amount * 100 / (100 + armor))`; the same shape covers magic resist.
pub fn reduce(amount: i32, resistance: i32) -> i32 {
    amount * 100 / (100 + resistance.max(0))
}

/// Mutable team kill counters; the kill-threshold win condition reads these.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamScores {
    pub radiant: u32,
    pub dire: u32,
}

impl TeamScores {
    pub fn of(&self, team: Team) -> u32 {
        match team {
            Team::Radiant => self.radiant,
            Team::Dire => self.dire,
        }
    }

    fn add(&mut self, team: Team) {
        match team {
            Team::Radiant => self.radiant += 1,
            Team::Dire => self.dire += 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DamageOutcome {
    pub dealt: i32,
    pub killed: bool,
}

/// Apply `raw` damage of `damage_type` from `attacker` to `victim`.
///
/// Invulnerable or already-dead victims absorb everything. Lethal damage
/// runs victim-class kill handling and attacker rewards.
pub fn deal_damage(
    store: &mut EntityStore,
    content: &ContentDb,
    scores: &mut TeamScores,
    tick: u64,
    attacker: Option<UnitRef>,
    victim: UnitRef,
    raw: i32,
    damage_type: DamageType,
) -> DamageOutcome {
    let none = DamageOutcome {
        dealt: 0,
        killed: false,
    };
    let Some(view) = store.view(victim) else {
        return none;
    };
    if !view.alive || view.invulnerable || raw <= 0 {
        return none;
    }

    let rules = &content.rules;
    let mut killed = false;
    let dealt;

    match victim {
        UnitRef::Player(id) => {
            let Some(p) = store.player_mut(id) else {
                return none;
            };
            let resistance = match damage_type {
                DamageType::Physical => p.stats.armor + buffs::bonus_armor(&p.buffs),
                DamageType::Magical => p.stats.magic_resist + buffs::bonus_magic_resist(&p.buffs),
            };
            dealt = reduce(raw, resistance).min(p.health);
            p.health = (p.health - dealt).clamp(0, p.max_health);
            if p.health == 0 {
                killed = true;
                let level = p.level;
                p.alive = false;
                p.respawn_timer = rules.respawn_base + rules.respawn_per_level * level as f32;
                p.target = None;
                p.move_target = None;
                p.path.clear();
                p.buffs.clear();
                p.score.deaths += 1;
                let victim_team = p.team;
                debug!(victim = id.0, "hero died");
                scores.add(victim_team.enemy());
            }
        }
        UnitRef::Tower(id) => {
            let Some(t) = store.tower_mut(id) else {
                return none;
            };
            // Towers only take physical reduction; nothing magical targets
            // them in content, but keep the formula uniform.
            let resistance = match damage_type {
                DamageType::Physical => t.stats.armor,
                DamageType::Magical => 0,
            };
            dealt = reduce(raw, resistance).min(t.health);
            t.health = (t.health - dealt).clamp(0, t.max_health);
            t.under_attack = true;
            if t.health == 0 {
                killed = true;
                t.alive = false;
                t.target = None;
                debug!(tower = id.0, team = t.team.as_str(), tier = t.tier, "tower destroyed");
            }
        }
        UnitRef::Creep(id) => {
            let Some(c) = store.creep_mut(id) else {
                return none;
            };
            // Creeps carry no magic resist stat; magical damage is unreduced.
            let resistance = match damage_type {
                DamageType::Physical => c.stats.armor,
                DamageType::Magical => 0,
            };
            dealt = reduce(raw, resistance).min(c.health);
            c.health = (c.health - dealt).clamp(0, c.max_health);
            if c.health == 0 {
                killed = true;
                c.alive = false;
                c.target = None;
                c.move_target = None;
                c.despawn_at = Some(tick + rules.corpse_linger_ticks);
            }
        }
        UnitRef::Monster(id) => {
            let Some(m) = store.monster_mut(id) else {
                return none;
            };
            let resistance = match damage_type {
                DamageType::Physical => m.stats.armor,
                DamageType::Magical => 0,
            };
            dealt = reduce(raw, resistance).min(m.health);
            m.health = (m.health - dealt).clamp(0, m.max_health);
            if m.health == 0 {
                killed = true;
                m.alive = false;
                m.aggro_target = None;
                m.resetting = false;
                m.despawn_at = Some(tick + rules.corpse_linger_ticks);
                let camp_id = m.camp;
                mark_camp_if_cleared(store, content, camp_id);
            }
        }
    }

    if let Some(UnitRef::Player(attacker_id)) = attacker {
        credit_attacker(store, content, attacker_id, victim, dealt, killed);
    }

    DamageOutcome { dealt, killed }
}

fn mark_camp_if_cleared(
    store: &mut EntityStore,
    content: &ContentDb,
    camp_id: crate::domain::entities::CampId,
) {
    let all_dead = store
        .monsters
        .iter()
        .filter(|m| m.camp == camp_id)
        .all(|m| !m.alive);
    if all_dead {
        if let Some(camp) = store.camp_mut(camp_id) {
            camp.cleared = true;
            camp.respawn_in = content.rules.camp_respawn;
        }
    }
}

/// Damage statistics and, on kill, victim-class gold/experience. Tower
/// bounties pay out to the killer's whole team; everything else goes to the
/// attacker alone.
fn credit_attacker(
    store: &mut EntityStore,
    content: &ContentDb,
    attacker: PlayerId,
    victim: UnitRef,
    dealt: i32,
    killed: bool,
) {
    let rules = &content.rules;

    if let Some(p) = store.player_mut(attacker) {
        p.score.damage_dealt += dealt.max(0) as u64;
    }
    if !killed {
        return;
    }

    if let UnitRef::Tower(_) = victim {
        let Some(team) = store.player(attacker).map(|p| p.team) else {
            return;
        };
        let teammates: Vec<PlayerId> = store
            .players
            .iter()
            .filter(|p| p.team == team)
            .map(|p| p.id)
            .collect();
        for id in teammates {
            let hero = store
                .player(id)
                .and_then(|p| p.hero)
                .and_then(|h| content.hero(h).cloned());
            if let Some(p) = store.player_mut(id) {
                p.gold += rules.tower_kill_gold;
                p.score.gold_earned += rules.tower_kill_gold;
                if let Some(def) = hero {
                    award_xp(p, rules.tower_kill_xp, &def, rules);
                }
            }
        }
        return;
    }

    let (gold, xp, creep_kill, hero_kill) = match victim {
        UnitRef::Player(_) => (rules.hero_kill_gold, rules.hero_kill_xp, false, true),
        UnitRef::Creep(id) => match store.creep(id) {
            Some(c) => (c.gold_bounty, c.xp_bounty, true, false),
            None => (0, 0, false, false),
        },
        UnitRef::Monster(id) => match store.monster(id) {
            Some(m) => (m.gold_bounty, m.xp_bounty, true, false),
            None => (0, 0, false, false),
        },
        UnitRef::Tower(_) => (0, 0, false, false),
    };

    let hero = store
        .player(attacker)
        .and_then(|p| p.hero)
        .and_then(|h| content.hero(h).cloned());
    let Some(p) = store.player_mut(attacker) else {
        return;
    };
    p.gold += gold;
    p.score.gold_earned += gold;
    if hero_kill {
        p.score.kills += 1;
    }
    if creep_kill {
        p.score.creep_kills += 1;
    }
    if let Some(def) = hero {
        award_xp(p, xp, &def, rules);
    }
}

/// Grant experience and resolve any level-ups, applying per-level growth and
/// topping up current health/mana by the gained maximum.
pub fn award_xp(p: &mut Player, amount: u32, def: &HeroDef, rules: &MatchRules) {
    p.xp += amount;
    while p.level < MAX_LEVEL && p.xp >= rules.xp_to_level(p.level) {
        p.xp -= rules.xp_to_level(p.level);
        p.level += 1;
        p.max_health += def.health_per_level;
        p.health = (p.health + def.health_per_level).min(p.max_health);
        p.max_mana += def.mana_per_level;
        p.mana = (p.mana + def.mana_per_level).min(p.max_mana);
        p.stats.attack_damage += def.attack_damage_per_level;
        p.stats.armor += def.armor_per_level;
        p.stats.magic_resist += def.magic_resist_per_level;
        p.spell_power += def.spell_power_per_level;
        sync_ability_levels(p);
    }
}

/// Ability levels derive from hero level: basic slots rank up every third
/// level (capped at 4), the fourth slot unlocks at 6 and ranks every sixth.
pub fn sync_ability_levels(p: &mut Player) {
    let level = p.level;
    for (slot, ab) in p.abilities.iter_mut().enumerate() {
        ab.level = if slot == 3 {
            (level / 6).min(4) as u8
        } else {
            ((level + 2) / 3).min(4) as u8
        };
    }
}

/// One tick of autoattack resolution for every attacker class. AI targeting
/// has already run; this consumes `target` fields.
pub fn run(
    store: &mut EntityStore,
    content: &ContentDb,
    scores: &mut TeamScores,
    tick: u64,
    dt: f32,
) {
    let rules = &content.rules;

    // Cooldowns tick down for everyone, attacking or not.
    for p in store.players.iter_mut() {
        p.attack_cooldown = (p.attack_cooldown - dt).max(0.0);
    }
    for t in store.towers.iter_mut() {
        t.attack_cooldown = (t.attack_cooldown - dt).max(0.0);
    }
    for c in store.creeps.iter_mut() {
        c.attack_cooldown = (c.attack_cooldown - dt).max(0.0);
    }
    for m in store.monsters.iter_mut() {
        m.attack_cooldown = (m.attack_cooldown - dt).max(0.0);
    }

    // Players: chase or strike their ordered target.
    for i in 0..store.players.len() {
        let p = &store.players[i];
        if !p.alive {
            continue;
        }
        let Some(victim) = p.target else {
            continue;
        };
        let me = UnitRef::Player(p.id);
        let Some(view) = store.view(victim) else {
            store.players[i].target = None;
            continue;
        };
        if !view.alive || view.untargetable || view.team == Some(p.team) {
            store.players[i].target = None;
            continue;
        }

        let range = p.stats.attack_range;
        let dist = p.pos.distance(view.pos);
        if dist > range {
            // Move to a point `range - chase_buffer` from the victim.
            let stop_at = (range - rules.chase_buffer).max(0.0);
            let dir = view.pos.direction_to(p.pos);
            let chase = view.pos.add(dir.scale(stop_at));
            let p = &mut store.players[i];
            p.move_target = Some(chase);
            p.path.clear();
            continue;
        }

        let blocked = buffs::attacking_blocked(&p.buffs);
        let ready = p.attack_cooldown <= 0.0;
        let damage = p.stats.attack_damage;
        let attack_speed = p.stats.attack_speed * buffs::attack_speed_multiplier(&p.buffs);
        {
            let p = &mut store.players[i];
            p.move_target = None;
            p.path.clear();
            p.rot = p.pos.yaw_to(view.pos);
        }
        if blocked || !ready {
            continue;
        }
        store.players[i].attack_cooldown = 1.0 / attack_speed.max(0.01);
        deal_damage(
            store,
            content,
            scores,
            tick,
            Some(me),
            victim,
            damage,
            DamageType::Physical,
        );
    }

    // Towers: never move, attack when the AI-chosen target is in range.
    for i in 0..store.towers.len() {
        let t = &store.towers[i];
        if !t.alive {
            continue;
        }
        let Some(victim) = t.target else {
            store.towers[i].under_attack = false;
            continue;
        };
        let me = UnitRef::Tower(t.id);
        let Some(view) = store.view(victim) else {
            store.towers[i].target = None;
            continue;
        };
        if !view.alive || view.untargetable || t.pos.distance(view.pos) > t.stats.attack_range {
            store.towers[i].target = None;
            continue;
        }
        if t.attack_cooldown > 0.0 {
            continue;
        }
        let damage = t.stats.attack_damage;
        let attack_speed = t.stats.attack_speed;
        store.towers[i].attack_cooldown = 1.0 / attack_speed;
        deal_damage(
            store,
            content,
            scores,
            tick,
            Some(me),
            victim,
            damage,
            DamageType::Physical,
        );
    }

    // Lane creeps.
    for i in 0..store.creeps.len() {
        let c = &store.creeps[i];
        if !c.alive {
            continue;
        }
        let Some(victim) = c.target else {
            continue;
        };
        let me = UnitRef::Creep(c.id);
        let Some(view) = store.view(victim) else {
            store.creeps[i].target = None;
            continue;
        };
        if !view.alive || view.team == Some(c.team) {
            store.creeps[i].target = None;
            continue;
        }

        let range = c.stats.attack_range;
        let dist = c.pos.distance(view.pos);
        if dist > range {
            let stop_at = (range - rules.chase_buffer).max(0.0);
            let dir = view.pos.direction_to(c.pos);
            store.creeps[i].move_target = Some(view.pos.add(dir.scale(stop_at)));
            continue;
        }

        let blocked = buffs::attacking_blocked(&c.buffs);
        let ready = c.attack_cooldown <= 0.0;
        let damage = c.stats.attack_damage;
        let attack_speed = c.stats.attack_speed;
        {
            let c = &mut store.creeps[i];
            c.move_target = None;
            c.rot = c.pos.yaw_to(view.pos);
        }
        if blocked || !ready {
            continue;
        }
        store.creeps[i].attack_cooldown = 1.0 / attack_speed;
        deal_damage(
            store,
            content,
            scores,
            tick,
            Some(me),
            victim,
            damage,
            DamageType::Physical,
        );
    }

    // Jungle monsters attack their aggro target; movement already chased.
    for i in 0..store.monsters.len() {
        let m = &store.monsters[i];
        if !m.alive || m.resetting {
            continue;
        }
        let Some(target) = m.aggro_target else {
            continue;
        };
        let me = UnitRef::Monster(m.id);
        let victim = UnitRef::Player(target);
        let Some(view) = store.view(victim) else {
            store.monsters[i].aggro_target = None;
            continue;
        };
        if !view.alive || m.pos.distance(view.pos) > m.stats.attack_range {
            continue;
        }
        if buffs::attacking_blocked(&m.buffs) || m.attack_cooldown > 0.0 {
            continue;
        }
        let damage = m.stats.attack_damage;
        let attack_speed = m.stats.attack_speed;
        {
            let m = &mut store.monsters[i];
            m.rot = m.pos.yaw_to(view.pos);
            m.attack_cooldown = 1.0 / attack_speed;
        }
        deal_damage(
            store,
            content,
            scores,
            tick,
            Some(me),
            victim,
            damage,
            DamageType::Physical,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::buffs::{BuffDef, BuffKind, apply_buff};
    use crate::domain::entities::{Player, PlayerId};
    use crate::domain::math::Vec2;

    fn hero_player(id: u64, team: Team, pos: Vec2) -> Player {
        let content = ContentDb::builtin();
        let def = &content.heroes[0];
        let mut p = Player::from_roster(PlayerId(id), format!("p{id}"), team, false);
        p.hero = Some(def.id);
        p.stats = def.stats;
        p.max_health = def.health;
        p.health = def.health;
        p.max_mana = def.mana;
        p.mana = def.mana;
        p.alive = true;
        p.pos = pos;
        p
    }

    #[test]
    fn zero_armor_takes_full_damage() {
        assert_eq!(reduce(50, 0), 50);
    }

    #[test]
    fn hundred_armor_halves_damage() {
        assert_eq!(reduce(50, 100), 25);
    }

    #[test]
    fn more_armor_means_strictly_less_damage() {
        let mut last = reduce(200, 0);
        for armor in [10, 25, 50, 100, 200] {
            let d = reduce(200, armor);
            assert!(d < last);
            last = d;
        }
    }

    #[test]
    fn autoattack_applies_exact_reduced_damage() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();

        let mut attacker = hero_player(1, Team::Radiant, Vec2::new(500.0, 500.0));
        attacker.stats.attack_damage = 50;
        attacker.target = Some(UnitRef::Player(PlayerId(2)));
        store.add_player(attacker);

        let mut victim = hero_player(2, Team::Dire, Vec2::new(560.0, 500.0));
        victim.stats.armor = 0;
        victim.max_health = 1000;
        victim.health = 1000;
        store.add_player(victim);

        run(&mut store, &content, &mut scores, 1, content.rules.tick_interval);
        assert_eq!(store.player(PlayerId(2)).unwrap().health, 950);
    }

    #[test]
    fn invulnerable_target_absorbs_everything() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();

        let mut victim = hero_player(2, Team::Dire, Vec2::ZERO);
        apply_buff(
            &mut victim.buffs,
            &BuffDef::new(BuffKind::Invulnerable, 5.0, 0.0),
            None,
        );
        let before = victim.health;
        store.add_player(victim);

        let out = deal_damage(
            &mut store,
            &content,
            &mut scores,
            1,
            None,
            UnitRef::Player(PlayerId(2)),
            500,
            DamageType::Physical,
        );
        assert_eq!(out.dealt, 0);
        assert_eq!(store.player(PlayerId(2)).unwrap().health, before);
    }

    #[test]
    fn hero_kill_awards_gold_and_score() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();

        store.add_player(hero_player(1, Team::Radiant, Vec2::ZERO));
        let mut victim = hero_player(2, Team::Dire, Vec2::ZERO);
        victim.health = 10;
        victim.stats.armor = 0;
        store.add_player(victim);

        let gold_before = store.player(PlayerId(1)).unwrap().gold;
        let out = deal_damage(
            &mut store,
            &content,
            &mut scores,
            1,
            Some(UnitRef::Player(PlayerId(1))),
            UnitRef::Player(PlayerId(2)),
            100,
            DamageType::Physical,
        );
        assert!(out.killed);
        assert_eq!(scores.radiant, 1);
        let killer = store.player(PlayerId(1)).unwrap();
        assert_eq!(killer.gold, gold_before + content.rules.hero_kill_gold);
        assert_eq!(killer.score.kills, 1);
        let victim = store.player(PlayerId(2)).unwrap();
        assert!(!victim.alive);
        assert!(victim.respawn_timer > 0.0);
    }

    #[test]
    fn tower_kill_pays_the_whole_team() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();

        store.add_player(hero_player(1, Team::Radiant, Vec2::new(500.0, 500.0)));
        // Teammate far away, uninvolved in the kill.
        store.add_player(hero_player(2, Team::Radiant, Vec2::new(3000.0, 3000.0)));
        store.add_player(hero_player(3, Team::Dire, Vec2::ZERO));

        store.add_tower(|id| crate::domain::entities::Tower {
            id,
            team: Team::Dire,
            lane: crate::domain::entities::Lane::Mid,
            tier: 1,
            pos: Vec2::new(600.0, 500.0),
            health: 10,
            max_health: content.map.tower_health,
            stats: content.map.tower_combat_stats(),
            attack_cooldown: 0.0,
            target: None,
            under_attack: false,
            alive: true,
        });

        let killer_before = store.player(PlayerId(1)).unwrap().gold;
        let mate_before = store.player(PlayerId(2)).unwrap().gold;
        let enemy_before = store.player(PlayerId(3)).unwrap().gold;
        let tower = UnitRef::Tower(store.towers[0].id);
        let out = deal_damage(
            &mut store,
            &content,
            &mut scores,
            1,
            Some(UnitRef::Player(PlayerId(1))),
            tower,
            5000,
            DamageType::Physical,
        );
        assert!(out.killed);

        let bounty = content.rules.tower_kill_gold;
        assert_eq!(store.player(PlayerId(1)).unwrap().gold, killer_before + bounty);
        assert_eq!(store.player(PlayerId(2)).unwrap().gold, mate_before + bounty);
        assert_eq!(store.player(PlayerId(3)).unwrap().gold, enemy_before);
    }

    #[test]
    fn out_of_range_target_sets_chase_point() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();

        let mut attacker = hero_player(1, Team::Radiant, Vec2::new(500.0, 500.0));
        attacker.target = Some(UnitRef::Player(PlayerId(2)));
        store.add_player(attacker);
        store.add_player(hero_player(2, Team::Dire, Vec2::new(1500.0, 500.0)));

        run(&mut store, &content, &mut scores, 1, content.rules.tick_interval);
        let attacker = store.player(PlayerId(1)).unwrap();
        let chase = attacker.move_target.expect("chase point set");
        let expected = attacker.stats.attack_range - content.rules.chase_buffer;
        assert!((chase.distance(Vec2::new(1500.0, 500.0)) - expected).abs() < 0.01);
    }

    #[test]
    fn level_up_applies_growth_and_tops_up() {
        let content = ContentDb::builtin();
        let def = &content.heroes[0];
        let mut p = hero_player(1, Team::Radiant, Vec2::ZERO);
        p.abilities = def
            .abilities
            .iter()
            .map(|&a| crate::domain::entities::AbilitySlot {
                ability: a,
                level: 0,
                cooldown: 0.0,
            })
            .collect();
        let hp_before = p.max_health;

        award_xp(&mut p, content.rules.xp_to_level(1), def, &content.rules);
        assert_eq!(p.level, 2);
        assert_eq!(p.max_health, hp_before + def.health_per_level);
        assert_eq!(p.abilities[0].level, 1);
        assert_eq!(p.abilities[3].level, 0);
    }
}
