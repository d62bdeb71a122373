// Fog-of-war bookkeeping. Visibility is recomputed on an interval rather
// than every tick; the snapshot filter reads the cached flags in between.
//
// Providers are alive friendly units: heroes at their hero vision range,
// towers and lane creeps at fixed structure/creep ranges. Towers are
// landmarks and stay visible to both teams permanently.

use crate::domain::content::ContentDb;
use crate::domain::entities::Team;
use crate::domain::math::Vec2;
use crate::domain::store::EntityStore;

struct Provider {
    pos: Vec2,
    range: f32,
}

pub fn run(store: &mut EntityStore, content: &ContentDb) {
    let radiant = providers(store, content, Team::Radiant);
    let dire = providers(store, content, Team::Dire);

    for p in store.players.iter_mut() {
        p.visible_to.set(p.team, true);
        let enemy = match p.team {
            Team::Radiant => &dire,
            Team::Dire => &radiant,
        };
        p.visible_to.set(p.team.enemy(), p.alive && covered(enemy, p.pos));
    }

    for c in store.creeps.iter_mut() {
        c.visible_to.set(c.team, true);
        let enemy = match c.team {
            Team::Radiant => &dire,
            Team::Dire => &radiant,
        };
        c.visible_to.set(c.team.enemy(), c.alive && covered(enemy, c.pos));
    }

    // Neutral monsters are revealed to each team independently.
    for m in store.monsters.iter_mut() {
        m.visible_to.set(Team::Radiant, covered(&radiant, m.pos));
        m.visible_to.set(Team::Dire, covered(&dire, m.pos));
    }
}

fn providers(store: &EntityStore, content: &ContentDb, team: Team) -> Vec<Provider> {
    let rules = &content.rules;
    let mut out = Vec::new();
    for p in store.players.iter().filter(|p| p.alive && p.team == team) {
        out.push(Provider {
            pos: p.pos,
            range: p.vision_range,
        });
    }
    for t in store.towers.iter().filter(|t| t.alive && t.team == team) {
        out.push(Provider {
            pos: t.pos,
            range: rules.tower_vision_range,
        });
    }
    for c in store.creeps.iter().filter(|c| c.alive && c.team == team) {
        out.push(Provider {
            pos: c.pos,
            range: rules.creep_vision_range,
        });
    }
    out
}

fn covered(providers: &[Provider], pos: Vec2) -> bool {
    providers.iter().any(|p| p.pos.distance(pos) <= p.range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Player, PlayerId};

    fn hero_at(id: u64, team: Team, pos: Vec2, vision: f32) -> Player {
        let mut p = Player::from_roster(PlayerId(id), format!("p{id}"), team, false);
        p.alive = true;
        p.pos = pos;
        p.vision_range = vision;
        p
    }

    #[test]
    fn enemy_outside_all_provider_ranges_is_hidden() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        store.add_player(hero_at(1, Team::Radiant, Vec2::new(1500.0, 1500.0), 800.0));
        store.add_player(hero_at(2, Team::Dire, Vec2::new(1500.0, 2500.0), 800.0));

        run(&mut store, &content);
        let dire = store.player(PlayerId(2)).unwrap();
        assert!(!dire.visible_to.seen_by(Team::Radiant));
        assert!(dire.visible_to.seen_by(Team::Dire));
    }

    #[test]
    fn enemy_inside_hero_vision_is_revealed() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        store.add_player(hero_at(1, Team::Radiant, Vec2::new(1500.0, 1500.0), 800.0));
        store.add_player(hero_at(2, Team::Dire, Vec2::new(1500.0, 2000.0), 800.0));

        run(&mut store, &content);
        assert!(store.player(PlayerId(2)).unwrap().visible_to.seen_by(Team::Radiant));
    }

    #[test]
    fn dead_heroes_grant_no_vision() {
        let content = ContentDb::builtin();
        let mut store = EntityStore::new();
        let mut scout = hero_at(1, Team::Radiant, Vec2::new(1500.0, 1500.0), 800.0);
        scout.alive = false;
        store.add_player(scout);
        store.add_player(hero_at(2, Team::Dire, Vec2::new(1500.0, 1600.0), 0.0));

        run(&mut store, &content);
        assert!(!store.player(PlayerId(2)).unwrap().visible_to.seen_by(Team::Radiant));
    }
}
