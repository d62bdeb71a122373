// Movement integration: target seeking, waypoint advancement, and collision
// resolution against obstacles and other units.
//
// Collision fallback chain: full move, X-only slide, Z-only slide,
// penetration push-back, stay put. Rotation always faces the intended
// direction of travel, not the collision-adjusted one.

use crate::domain::buffs::{self, BuffKind};
use crate::domain::content::ContentDb;
use crate::domain::entities::UnitRef;
use crate::domain::math::{self, Vec2};
use crate::domain::store::EntityStore;

/// Unit circle snapshot taken at the start of the movement pass.
#[derive(Debug, Clone, Copy)]
struct Collider {
    unit: UnitRef,
    pos: Vec2,
    radius: f32,
}

pub fn run(store: &mut EntityStore, content: &ContentDb, dt: f32) {
    let rules = &content.rules;
    let colliders = collect_colliders(store, content);

    // Players.
    for i in 0..store.players.len() {
        let p = &store.players[i];
        if !p.alive || buffs::movement_blocked(&p.buffs) {
            continue;
        }
        let Some(target) = p.move_target else {
            continue;
        };

        if p.pos.distance(target) <= rules.player_arrival_threshold {
            let p = &mut store.players[i];
            if p.path.is_empty() {
                p.move_target = None;
            } else {
                p.move_target = Some(p.path.remove(0));
            }
            continue;
        }

        let speed = p.stats.move_speed * buffs::move_speed_multiplier(&p.buffs);
        let dir = p.pos.direction_to(target);
        let candidate = content.map.bounds.clamp(p.pos.add(dir.scale(speed * dt)));
        let phase = buffs::has_buff(&p.buffs, BuffKind::Phase);
        let me = UnitRef::Player(p.id);
        let from = p.pos;
        let resolved = resolve(
            content,
            &colliders,
            me,
            from,
            candidate,
            rules.player_radius,
            phase,
        );

        let p = &mut store.players[i];
        p.rot = from.yaw_to(target);
        p.pos = resolved;
    }

    // Lane creeps follow their waypoint list unless AI gave them a combat
    // move target.
    for i in 0..store.creeps.len() {
        let c = &store.creeps[i];
        if !c.alive || buffs::movement_blocked(&c.buffs) {
            continue;
        }
        let Some(target) = c.move_target else {
            continue;
        };

        if c.pos.distance(target) <= rules.creep_arrival_threshold {
            let lane_points = content.map.lane(c.lane).for_team(c.team);
            let c = &mut store.creeps[i];
            // Advance only when the arrival was a lane waypoint; combat
            // targets are re-issued by the AI every tick.
            if c.waypoint_index + 1 < lane_points.len()
                && target == lane_points[c.waypoint_index]
            {
                c.waypoint_index += 1;
                c.move_target = Some(lane_points[c.waypoint_index]);
            } else {
                c.move_target = None;
            }
            continue;
        }

        let speed = c.stats.move_speed * buffs::move_speed_multiplier(&c.buffs);
        let dir = c.pos.direction_to(target);
        let candidate = content.map.bounds.clamp(c.pos.add(dir.scale(speed * dt)));
        let phase = buffs::has_buff(&c.buffs, BuffKind::Phase);
        let me = UnitRef::Creep(c.id);
        let from = c.pos;
        let resolved = resolve(
            content,
            &colliders,
            me,
            from,
            candidate,
            rules.creep_radius,
            phase,
        );

        let c = &mut store.creeps[i];
        c.rot = from.yaw_to(target);
        c.pos = resolved;
    }

    // Jungle monsters; resetting monsters run home at a speed multiplier.
    for i in 0..store.monsters.len() {
        let m = &store.monsters[i];
        if !m.alive || buffs::movement_blocked(&m.buffs) {
            continue;
        }
        let target = if m.resetting {
            m.spawn_anchor
        } else {
            match m.aggro_target.and_then(|id| store.player(id)) {
                Some(p) => p.pos,
                None => continue,
            }
        };

        if m.pos.distance(target) <= rules.player_arrival_threshold {
            continue;
        }

        let mut speed = m.stats.move_speed * buffs::move_speed_multiplier(&m.buffs);
        if m.resetting {
            speed *= rules.monster_reset_speed_mult;
        }
        let dir = m.pos.direction_to(target);
        let candidate = content.map.bounds.clamp(m.pos.add(dir.scale(speed * dt)));
        let phase = buffs::has_buff(&m.buffs, BuffKind::Phase);
        let me = UnitRef::Monster(m.id);
        let from = m.pos;
        let resolved = resolve(
            content,
            &colliders,
            me,
            from,
            candidate,
            rules.monster_radius,
            phase,
        );

        let m = &mut store.monsters[i];
        m.rot = from.yaw_to(target);
        m.pos = resolved;
    }
}

fn collect_colliders(store: &EntityStore, content: &ContentDb) -> Vec<Collider> {
    let rules = &content.rules;
    let mut out = Vec::with_capacity(
        store.players.len() + store.creeps.len() + store.monsters.len() + store.towers.len(),
    );
    for p in store.players.iter().filter(|p| p.alive) {
        out.push(Collider {
            unit: UnitRef::Player(p.id),
            pos: p.pos,
            radius: rules.player_radius,
        });
    }
    for c in store.creeps.iter().filter(|c| c.alive) {
        out.push(Collider {
            unit: UnitRef::Creep(c.id),
            pos: c.pos,
            radius: rules.creep_radius,
        });
    }
    for m in store.monsters.iter().filter(|m| m.alive) {
        out.push(Collider {
            unit: UnitRef::Monster(m.id),
            pos: m.pos,
            radius: rules.monster_radius,
        });
    }
    for t in store.towers.iter().filter(|t| t.alive) {
        out.push(Collider {
            unit: UnitRef::Tower(t.id),
            pos: t.pos,
            radius: rules.tower_radius,
        });
    }
    out
}

fn position_clear(
    content: &ContentDb,
    colliders: &[Collider],
    me: UnitRef,
    pos: Vec2,
    radius: f32,
    phase: bool,
) -> bool {
    if math::blocked_by_obstacles(&content.map.obstacles, pos, radius) {
        return false;
    }
    if phase {
        return true;
    }
    !colliders
        .iter()
        .any(|c| c.unit != me && math::units_overlap(pos, radius, c.pos, c.radius))
}

/// Collision-resolved final position for a candidate move.
fn resolve(
    content: &ContentDb,
    colliders: &[Collider],
    me: UnitRef,
    from: Vec2,
    candidate: Vec2,
    radius: f32,
    phase: bool,
) -> Vec2 {
    if position_clear(content, colliders, me, candidate, radius, phase) {
        return candidate;
    }

    // Axis-aligned slides.
    let x_only = Vec2::new(candidate.x, from.z);
    if position_clear(content, colliders, me, x_only, radius, phase) {
        return x_only;
    }
    let z_only = Vec2::new(from.x, candidate.z);
    if position_clear(content, colliders, me, z_only, radius, phase) {
        return z_only;
    }

    // Push out of the first penetrated unit, then re-check.
    if !phase {
        if let Some(hit) = colliders
            .iter()
            .find(|c| c.unit != me && math::units_overlap(candidate, radius, c.pos, c.radius))
        {
            let pushed = content
                .map
                .bounds
                .clamp(math::push_out(candidate, radius, hit.pos, hit.radius));
            if position_clear(content, colliders, me, pushed, radius, phase) {
                return pushed;
            }
        }
    }

    from
}
