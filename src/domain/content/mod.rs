// Static content tables: heroes, abilities, items, map layout, match rules.
//
// Everything here is resolved into strongly typed definitions once at load
// and injected into the world as read-only data. The simulation never
// mutates content.

pub mod abilities;
pub mod heroes;
pub mod items;
pub mod map;

pub use abilities::{AbilityDef, AbilityId, TargetProtocol};
pub use heroes::{HeroDef, HeroId};
pub use items::{ItemDef, ItemId, StatBlock};
pub use map::{CampSpawn, LaneWaypoints, MapConfig, MonsterSpawn, TowerSpawn};

/// Gameplay tuning that is not tied to a specific hero/item/map element.
#[derive(Debug, Clone)]
pub struct MatchRules {
    pub tick_interval: f32,
    pub kill_threshold: u32,
    pub time_limit: f32,

    pub hero_select_seconds: f32,
    pub bot_pick_delay: f32,
    pub disconnect_grace: f32,

    pub starting_gold: u32,
    pub passive_gold_per_sec: u32,

    pub wave_interval: f32,
    /// Every nth wave carries a siege creep.
    pub siege_wave_every: u32,
    pub camp_respawn: f32,

    pub respawn_base: f32,
    pub respawn_per_level: f32,

    /// Gold/xp for a hero takedown.
    pub hero_kill_gold: u32,
    pub hero_kill_xp: u32,
    pub tower_kill_gold: u32,
    pub tower_kill_xp: u32,

    pub player_arrival_threshold: f32,
    pub creep_arrival_threshold: f32,
    pub chase_buffer: f32,
    pub dash_hit_radius: f32,

    pub player_radius: f32,
    pub creep_radius: f32,
    pub monster_radius: f32,
    pub tower_radius: f32,

    pub creep_aggro_radius: f32,
    pub monster_aggro_radius: f32,
    pub monster_leash_radius: f32,
    pub monster_reset_speed_mult: f32,

    pub tower_vision_range: f32,
    pub creep_vision_range: f32,
    pub vision_interval_ticks: u64,

    /// Ticks a dead creep/monster lingers before physical removal.
    pub corpse_linger_ticks: u64,

    pub chat_ring: usize,
    pub ping_ring: usize,
    pub ping_ttl: f32,
}

impl MatchRules {
    /// Experience required to advance past `level`.
    pub fn xp_to_level(&self, level: u32) -> u32 {
        100 * level
    }
}

/// The full read-only content bundle a world runs against.
#[derive(Debug, Clone)]
pub struct ContentDb {
    pub heroes: Vec<HeroDef>,
    pub abilities: Vec<AbilityDef>,
    pub items: Vec<ItemDef>,
    pub map: MapConfig,
    pub rules: MatchRules,
}

impl ContentDb {
    /// The built-in content set. Stands in for externally authored tables;
    /// rooms receive it as an `Arc<ContentDb>` and share it across matches.
    pub fn builtin() -> ContentDb {
        ContentDb {
            heroes: heroes::builtin_heroes(),
            abilities: abilities::builtin_abilities(),
            items: items::builtin_items(),
            map: map::builtin_map(),
            rules: MatchRules {
                tick_interval: 0.05,
                kill_threshold: 30,
                time_limit: 1800.0,
                hero_select_seconds: 60.0,
                bot_pick_delay: 3.0,
                disconnect_grace: 60.0,
                starting_gold: 600,
                passive_gold_per_sec: 1,
                wave_interval: 30.0,
                siege_wave_every: 3,
                camp_respawn: 60.0,
                respawn_base: 10.0,
                respawn_per_level: 2.0,
                hero_kill_gold: 300,
                hero_kill_xp: 120,
                tower_kill_gold: 250,
                tower_kill_xp: 150,
                player_arrival_threshold: 5.0,
                creep_arrival_threshold: 50.0,
                chase_buffer: 10.0,
                dash_hit_radius: 150.0,
                player_radius: 16.0,
                creep_radius: 12.0,
                monster_radius: 16.0,
                tower_radius: 48.0,
                creep_aggro_radius: 300.0,
                monster_aggro_radius: 250.0,
                monster_leash_radius: 500.0,
                monster_reset_speed_mult: 2.0,
                tower_vision_range: 900.0,
                creep_vision_range: 750.0,
                vision_interval_ticks: 10,
                corpse_linger_ticks: 20,
                chat_ring: 50,
                ping_ring: 10,
                ping_ttl: 8.0,
            },
        }
    }

    pub fn hero(&self, id: HeroId) -> Option<&HeroDef> {
        self.heroes.iter().find(|h| h.id == id)
    }

    pub fn ability(&self, id: AbilityId) -> Option<&AbilityDef> {
        self.abilities.iter().find(|a| a.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.iter().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_hero_abilities_resolve() {
        let db = ContentDb::builtin();
        for hero in &db.heroes {
            for slot in hero.abilities {
                assert!(db.ability(slot).is_some(), "{} has a dangling ability", hero.name);
            }
        }
    }

    #[test]
    fn builtin_item_components_resolve_and_cost_less() {
        let db = ContentDb::builtin();
        for item in &db.items {
            let component_cost: u32 = item
                .builds_from
                .iter()
                .map(|c| db.item(*c).expect("component exists").cost)
                .sum();
            assert!(component_cost <= item.cost, "{} components exceed cost", item.name);
        }
    }

    #[test]
    fn builtin_towers_cover_all_tiers_for_both_teams() {
        let db = ContentDb::builtin();
        for team in [crate::domain::entities::Team::Radiant, crate::domain::entities::Team::Dire] {
            let tier4 = db.map.towers.iter().filter(|t| t.team == team && t.tier == 4).count();
            assert_eq!(tier4, 4);
        }
    }
}
