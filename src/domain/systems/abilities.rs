// Ability casting: gate checks, the four targeting protocols, damage scaling
// and side-effect buffs. Casts resolve synchronously on command arrival; the
// only per-tick work is cooldown decay (driven by the world).

use super::combat::{self, TeamScores};
use crate::domain::buffs::{self, BuffDef};
use crate::domain::content::{AbilityDef, ContentDb, TargetProtocol};
use crate::domain::entities::{PlayerId, Team, UnitRef};
use crate::domain::math::Vec2;
use crate::domain::store::EntityStore;
use tracing::debug;

/// Cast gate failures reported back to the issuing session. `Invalid` covers
/// stale/malformed references which are silently dropped per the error
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastError {
    NotLearned,
    OnCooldown,
    InsufficientMana,
    OutOfRange,
    Silenced,
    Invalid,
}

impl CastError {
    pub fn message(self) -> &'static str {
        match self {
            CastError::NotLearned => "ability not learned",
            CastError::OnCooldown => "ability on cooldown",
            CastError::InsufficientMana => "insufficient mana",
            CastError::OutOfRange => "target out of range",
            CastError::Silenced => "silenced",
            CastError::Invalid => "invalid target",
        }
    }
}

pub fn cast(
    store: &mut EntityStore,
    content: &ContentDb,
    scores: &mut TeamScores,
    tick: u64,
    caster: PlayerId,
    slot: usize,
    target_unit: Option<UnitRef>,
    target_point: Option<Vec2>,
) -> Result<(), CastError> {
    // Gate checks against the caster's current state.
    let (def, level, team, pos, attack_damage, spell_power) = {
        let Some(p) = store.player(caster) else {
            return Err(CastError::Invalid);
        };
        if !p.alive {
            return Err(CastError::Invalid);
        }
        let Some(ability_slot) = p.abilities.get(slot) else {
            return Err(CastError::NotLearned);
        };
        if ability_slot.level == 0 {
            return Err(CastError::NotLearned);
        }
        if ability_slot.cooldown > 0.0 {
            return Err(CastError::OnCooldown);
        }
        let Some(def) = content.ability(ability_slot.ability) else {
            return Err(CastError::Invalid);
        };
        (
            def.clone(),
            ability_slot.level,
            p.team,
            p.pos,
            p.stats.attack_damage,
            p.spell_power,
        )
    };

    let cost = def.cost_at(level);
    if store.player(caster).is_some_and(|p| p.mana < cost) {
        return Err(CastError::InsufficientMana);
    }
    // Crowd control is the last gate; an unlearned or unready slot reports
    // its own error even while silenced.
    if store
        .player(caster)
        .is_some_and(|p| buffs::casting_blocked(&p.buffs))
    {
        return Err(CastError::Silenced);
    }

    let damage = def.damage_at(level)
        + (attack_damage as f32 * def.ad_ratio) as i32
        + (spell_power as f32 * def.ap_ratio * 100.0) as i32;
    let me = UnitRef::Player(caster);

    match def.protocol {
        TargetProtocol::SelfCast => {
            if let Some(buff) = &def.applies {
                apply_buff_to(store, me, buff, Some(me));
            }
        }
        TargetProtocol::Unit => {
            let Some(victim) = target_unit else {
                return Err(CastError::Invalid);
            };
            let Some(view) = store.view(victim) else {
                return Err(CastError::Invalid);
            };
            // Monsters are neutral-targetable; anything else must be enemy.
            if !view.alive || view.team == Some(team) {
                return Err(CastError::Invalid);
            }
            if pos.distance(view.pos) > def.range {
                return Err(CastError::OutOfRange);
            }
            let out = combat::deal_damage(
                store,
                content,
                scores,
                tick,
                Some(me),
                victim,
                damage,
                def.damage_type,
            );
            if let Some(buff) = &def.applies {
                if !out.killed {
                    apply_buff_to(store, victim, buff, Some(me));
                }
            }
            aggro_monster_if_hit(store, victim, caster);
        }
        TargetProtocol::PointArea { radius } => {
            let Some(point) = target_point else {
                return Err(CastError::Invalid);
            };
            if pos.distance(point) > def.range {
                return Err(CastError::OutOfRange);
            }
            let victims = units_within(store, team, point, radius);
            for victim in victims {
                let out = combat::deal_damage(
                    store,
                    content,
                    scores,
                    tick,
                    Some(me),
                    victim,
                    damage,
                    def.damage_type,
                );
                if let Some(buff) = &def.applies {
                    if !out.killed {
                        apply_buff_to(store, victim, buff, Some(me));
                    }
                }
                aggro_monster_if_hit(store, victim, caster);
            }
        }
        TargetProtocol::Dash => {
            let Some(point) = target_point else {
                return Err(CastError::Invalid);
            };
            let dist = pos.distance(point);
            if dist <= f32::EPSILON {
                return Err(CastError::Invalid);
            }
            let travel = dist.min(def.range);
            let dir = pos.direction_to(point);
            let landing = content.map.bounds.clamp(pos.add(dir.scale(travel)));
            {
                let Some(p) = store.player_mut(caster) else {
                    return Err(CastError::Invalid);
                };
                p.pos = landing;
                p.rot = pos.yaw_to(point);
                p.move_target = None;
                p.path.clear();
            }
            // Damage lands around the arrival position, not along the path.
            let victims = units_within(store, team, landing, content.rules.dash_hit_radius);
            for victim in victims {
                let out = combat::deal_damage(
                    store,
                    content,
                    scores,
                    tick,
                    Some(me),
                    victim,
                    damage,
                    def.damage_type,
                );
                if let Some(buff) = &def.applies {
                    if !out.killed {
                        apply_buff_to(store, victim, buff, Some(me));
                    }
                }
                aggro_monster_if_hit(store, victim, caster);
            }
        }
    }

    // All gates passed and effects applied: pay the cost, start the cooldown.
    if let Some(p) = store.player_mut(caster) {
        p.mana = (p.mana - cost).max(0);
        if let Some(ability_slot) = p.abilities.get_mut(slot) {
            ability_slot.cooldown = def.cooldown_at(level);
        }
    }
    debug!(caster = caster.0, ability = def.name, "ability cast");
    Ok(())
}

/// Per-tick cooldown recovery for every player's ability slots. The world
/// calls this only while the match is running, so cooldowns freeze during a
/// pause.
pub fn tick_cooldowns(store: &mut EntityStore, dt: f32) {
    for p in store.players.iter_mut() {
        for slot in p.abilities.iter_mut() {
            slot.cooldown = (slot.cooldown - dt).max(0.0);
        }
    }
}

/// Living enemy players, enemy creeps, and all monsters within `radius` of
/// `point`. Untargetable units are skipped like any other targeting path.
fn units_within(store: &EntityStore, team: Team, point: Vec2, radius: f32) -> Vec<UnitRef> {
    let mut out = Vec::new();
    for p in &store.players {
        if p.alive
            && p.team != team
            && !buffs::has_buff(&p.buffs, buffs::BuffKind::Untargetable)
            && p.pos.distance(point) <= radius
        {
            out.push(UnitRef::Player(p.id));
        }
    }
    for c in &store.creeps {
        if c.alive && c.team != team && c.pos.distance(point) <= radius {
            out.push(UnitRef::Creep(c.id));
        }
    }
    for m in &store.monsters {
        if m.alive && m.pos.distance(point) <= radius {
            out.push(UnitRef::Monster(m.id));
        }
    }
    out
}

fn apply_buff_to(store: &mut EntityStore, unit: UnitRef, def: &BuffDef, source: Option<UnitRef>) {
    match unit {
        UnitRef::Player(id) => {
            if let Some(p) = store.player_mut(id) {
                buffs::apply_buff(&mut p.buffs, def, source);
            }
        }
        UnitRef::Creep(id) => {
            if let Some(c) = store.creep_mut(id) {
                buffs::apply_buff(&mut c.buffs, def, source);
            }
        }
        UnitRef::Monster(id) => {
            if let Some(m) = store.monster_mut(id) {
                buffs::apply_buff(&mut m.buffs, def, source);
            }
        }
        // Towers are immune to buffs.
        UnitRef::Tower(_) => {}
    }
}

/// Monsters damaged by abilities turn on the caster unless already busy.
fn aggro_monster_if_hit(store: &mut EntityStore, victim: UnitRef, caster: PlayerId) {
    if let UnitRef::Monster(id) = victim {
        if let Some(m) = store.monster_mut(id) {
            if m.alive && !m.resetting && m.aggro_target.is_none() {
                m.aggro_target = Some(caster);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::buffs::BuffKind;
    use crate::domain::content::abilities::{FIREBALL, FROST_NOVA, SLASH};
    use crate::domain::entities::{AbilitySlot, Player};

    fn caster_with(content: &ContentDb, abilities: &[crate::domain::content::AbilityId]) -> Player {
        let def = &content.heroes[1];
        let mut p = Player::from_roster(PlayerId(1), "caster".into(), Team::Radiant, false);
        p.hero = Some(def.id);
        p.stats = def.stats;
        p.max_health = def.health;
        p.health = def.health;
        p.max_mana = def.mana;
        p.mana = def.mana;
        p.spell_power = def.spell_power;
        p.alive = true;
        p.pos = Vec2::new(500.0, 500.0);
        p.abilities = abilities
            .iter()
            .map(|&a| AbilitySlot {
                ability: a,
                level: 1,
                cooldown: 0.0,
            })
            .collect();
        p
    }

    fn enemy_at(id: u64, pos: Vec2, health: i32) -> Player {
        let content = ContentDb::builtin();
        let def = &content.heroes[0];
        let mut p = Player::from_roster(PlayerId(id), format!("e{id}"), Team::Dire, false);
        p.hero = Some(def.id);
        p.stats = def.stats;
        p.stats.armor = 0;
        p.stats.magic_resist = 0;
        p.max_health = health;
        p.health = health;
        p.alive = true;
        p.pos = pos;
        p
    }

    #[test]
    fn unlearned_slot_is_rejected() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        let mut caster = caster_with(&content, &[SLASH]);
        caster.abilities[0].level = 0;
        store.add_player(caster);

        let err = cast(&mut store, &content, &mut scores, 1, PlayerId(1), 0, None, None);
        assert_eq!(err, Err(CastError::NotLearned));
    }

    #[test]
    fn insufficient_mana_is_rejected_without_state_change() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        let mut caster = caster_with(&content, &[FIREBALL]);
        caster.mana = 0;
        store.add_player(caster);
        store.add_player(enemy_at(2, Vec2::new(600.0, 500.0), 500));

        let err = cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            Some(UnitRef::Player(PlayerId(2))),
            None,
        );
        assert_eq!(err, Err(CastError::InsufficientMana));
        assert_eq!(store.player(PlayerId(2)).unwrap().health, 500);
    }

    #[test]
    fn unit_cast_deals_scaled_damage_and_starts_cooldown() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        let caster = caster_with(&content, &[FIREBALL]);
        let spell_power = caster.spell_power;
        let mana_before = caster.mana;
        store.add_player(caster);
        store.add_player(enemy_at(2, Vec2::new(700.0, 500.0), 5000));

        cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            Some(UnitRef::Player(PlayerId(2))),
            None,
        )
        .expect("cast succeeds");

        let def = content.ability(FIREBALL).unwrap();
        let expected = def.damage_at(1) + (spell_power as f32 * def.ap_ratio * 100.0) as i32;
        assert_eq!(store.player(PlayerId(2)).unwrap().health, 5000 - expected);

        let caster = store.player(PlayerId(1)).unwrap();
        assert_eq!(caster.mana, mana_before - def.cost_at(1));
        assert!(caster.abilities[0].cooldown > 0.0);
    }

    #[test]
    fn cooldown_elapses_after_its_duration() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        store.add_player(caster_with(&content, &[FIREBALL]));
        store.add_player(enemy_at(2, Vec2::new(700.0, 500.0), 5000));

        cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            Some(UnitRef::Player(PlayerId(2))),
            None,
        )
        .expect("cast succeeds");

        let def = content.ability(FIREBALL).unwrap();
        let duration = def.cooldown_at(1);
        let dt = content.rules.tick_interval;
        let steps = (duration / dt).ceil() as u32 + 1;
        for _ in 0..steps {
            tick_cooldowns(&mut store, dt);
        }
        assert_eq!(store.player(PlayerId(1)).unwrap().abilities[0].cooldown, 0.0);

        // Ready again: a second cast goes through.
        cast(
            &mut store,
            &content,
            &mut scores,
            2,
            PlayerId(1),
            0,
            Some(UnitRef::Player(PlayerId(2))),
            None,
        )
        .expect("recast succeeds");
    }

    #[test]
    fn silence_blocks_a_learned_ready_cast() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        let mut caster = caster_with(&content, &[SLASH]);
        buffs::apply_buff(
            &mut caster.buffs,
            &crate::domain::buffs::BuffDef::new(BuffKind::Silence, 5.0, 0.0),
            None,
        );
        store.add_player(caster);
        store.add_player(enemy_at(2, Vec2::new(600.0, 500.0), 500));

        let err = cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            Some(UnitRef::Player(PlayerId(2))),
            None,
        );
        assert_eq!(err, Err(CastError::Silenced));
    }

    #[test]
    fn silenced_unlearned_slot_still_reports_not_learned() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        let mut caster = caster_with(&content, &[SLASH]);
        caster.abilities[0].level = 0;
        buffs::apply_buff(
            &mut caster.buffs,
            &crate::domain::buffs::BuffDef::new(BuffKind::Silence, 5.0, 0.0),
            None,
        );
        store.add_player(caster);

        let err = cast(&mut store, &content, &mut scores, 1, PlayerId(1), 0, None, None);
        assert_eq!(err, Err(CastError::NotLearned));
    }

    #[test]
    fn out_of_range_unit_cast_is_rejected() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        store.add_player(caster_with(&content, &[SLASH]));
        store.add_player(enemy_at(2, Vec2::new(2000.0, 500.0), 500));

        let err = cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            Some(UnitRef::Player(PlayerId(2))),
            None,
        );
        assert_eq!(err, Err(CastError::OutOfRange));
    }

    #[test]
    fn point_area_hits_everything_in_radius_and_slows() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        store.add_player(caster_with(&content, &[FROST_NOVA]));
        store.add_player(enemy_at(2, Vec2::new(900.0, 500.0), 5000));
        store.add_player(enemy_at(3, Vec2::new(1000.0, 500.0), 5000));
        // Far outside the nova radius.
        store.add_player(enemy_at(4, Vec2::new(1600.0, 500.0), 5000));

        cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            None,
            Some(Vec2::new(950.0, 500.0)),
        )
        .expect("cast succeeds");

        assert!(store.player(PlayerId(2)).unwrap().health < 5000);
        assert!(store.player(PlayerId(3)).unwrap().health < 5000);
        assert_eq!(store.player(PlayerId(4)).unwrap().health, 5000);
        assert!(buffs::has_buff(
            &store.player(PlayerId(2)).unwrap().buffs,
            BuffKind::Slow
        ));
    }

    #[test]
    fn dash_relocates_then_hits_around_landing() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scores = TeamScores::default();
        let mut caster = caster_with(&content, &[crate::domain::content::abilities::BLINK_STRIKE]);
        caster.pos = Vec2::new(500.0, 500.0);
        store.add_player(caster);
        store.add_player(enemy_at(2, Vec2::new(1050.0, 500.0), 5000));

        cast(
            &mut store,
            &content,
            &mut scores,
            1,
            PlayerId(1),
            0,
            None,
            Some(Vec2::new(1100.0, 500.0)),
        )
        .expect("cast succeeds");

        let caster = store.player(PlayerId(1)).unwrap();
        // Range 500 caps the travel.
        assert!((caster.pos.x - 1000.0).abs() < 0.01);
        // Enemy sits within the landing hit radius and takes damage.
        assert!(store.player(PlayerId(2)).unwrap().health < 5000);
    }
}
