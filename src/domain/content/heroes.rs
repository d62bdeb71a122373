// Hero definitions: base stats, per-level growth, and ability loadouts.

use super::abilities::{
    AbilityId, BATTLE_SHOUT, BLINK_STRIKE, BULL_CHARGE, FIREBALL, FLAME_WAVE, FROST_NOVA, SLASH,
    SPRINT, STONE_SKIN, VENOM_BLADES,
};
use crate::domain::entities::CombatStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeroId(pub u32);

#[derive(Debug, Clone)]
pub struct HeroDef {
    pub id: HeroId,
    pub name: &'static str,
    pub health: i32,
    pub health_per_level: i32,
    pub mana: i32,
    pub mana_per_level: i32,
    pub stats: CombatStats,
    pub attack_damage_per_level: i32,
    pub armor_per_level: i32,
    pub magic_resist_per_level: i32,
    pub spell_power: i32,
    pub spell_power_per_level: i32,
    pub vision_range: f32,
    pub abilities: [AbilityId; 4],
}

pub fn builtin_heroes() -> Vec<HeroDef> {
    vec![
        HeroDef {
            id: HeroId(0),
            name: "Bruntar",
            health: 650,
            health_per_level: 90,
            mana: 260,
            mana_per_level: 30,
            stats: CombatStats {
                attack_damage: 62,
                attack_speed: 0.75,
                attack_range: 150.0,
                armor: 32,
                magic_resist: 28,
                move_speed: 300.0,
            },
            attack_damage_per_level: 4,
            armor_per_level: 3,
            magic_resist_per_level: 2,
            spell_power: 0,
            spell_power_per_level: 0,
            vision_range: 1200.0,
            abilities: [SLASH, BATTLE_SHOUT, STONE_SKIN, BULL_CHARGE],
        },
        HeroDef {
            id: HeroId(1),
            name: "Lyra",
            health: 480,
            health_per_level: 60,
            mana: 420,
            mana_per_level: 55,
            stats: CombatStats {
                attack_damage: 48,
                attack_speed: 0.68,
                attack_range: 500.0,
                armor: 18,
                magic_resist: 30,
                move_speed: 290.0,
            },
            attack_damage_per_level: 3,
            armor_per_level: 2,
            magic_resist_per_level: 2,
            spell_power: 4,
            spell_power_per_level: 1,
            vision_range: 1200.0,
            abilities: [FIREBALL, FROST_NOVA, SPRINT, FLAME_WAVE],
        },
        HeroDef {
            id: HeroId(2),
            name: "Vex",
            health: 540,
            health_per_level: 70,
            mana: 300,
            mana_per_level: 35,
            stats: CombatStats {
                attack_damage: 66,
                attack_speed: 0.85,
                attack_range: 150.0,
                armor: 24,
                magic_resist: 26,
                move_speed: 320.0,
            },
            attack_damage_per_level: 5,
            armor_per_level: 2,
            magic_resist_per_level: 2,
            spell_power: 0,
            spell_power_per_level: 0,
            vision_range: 1200.0,
            abilities: [SLASH, VENOM_BLADES, SPRINT, BLINK_STRIKE],
        },
        HeroDef {
            id: HeroId(3),
            name: "Torm",
            health: 720,
            health_per_level: 100,
            mana: 240,
            mana_per_level: 25,
            stats: CombatStats {
                attack_damage: 55,
                attack_speed: 0.7,
                attack_range: 150.0,
                armor: 38,
                magic_resist: 34,
                move_speed: 285.0,
            },
            attack_damage_per_level: 3,
            armor_per_level: 4,
            magic_resist_per_level: 3,
            spell_power: 0,
            spell_power_per_level: 0,
            vision_range: 1200.0,
            abilities: [STONE_SKIN, SLASH, BATTLE_SHOUT, BULL_CHARGE],
        },
        HeroDef {
            id: HeroId(4),
            name: "Sylva",
            health: 500,
            health_per_level: 65,
            mana: 310,
            mana_per_level: 40,
            stats: CombatStats {
                attack_damage: 58,
                attack_speed: 0.9,
                attack_range: 550.0,
                armor: 20,
                magic_resist: 24,
                move_speed: 305.0,
            },
            attack_damage_per_level: 4,
            armor_per_level: 2,
            magic_resist_per_level: 2,
            spell_power: 0,
            spell_power_per_level: 0,
            vision_range: 1300.0,
            abilities: [VENOM_BLADES, SPRINT, BATTLE_SHOUT, FROST_NOVA],
        },
        HeroDef {
            id: HeroId(5),
            name: "Mordren",
            health: 520,
            health_per_level: 68,
            mana: 400,
            mana_per_level: 50,
            stats: CombatStats {
                attack_damage: 50,
                attack_speed: 0.66,
                attack_range: 480.0,
                armor: 19,
                magic_resist: 32,
                move_speed: 290.0,
            },
            attack_damage_per_level: 3,
            armor_per_level: 2,
            magic_resist_per_level: 3,
            spell_power: 5,
            spell_power_per_level: 1,
            vision_range: 1200.0,
            abilities: [FIREBALL, VENOM_BLADES, STONE_SKIN, FLAME_WAVE],
        },
    ]
}
