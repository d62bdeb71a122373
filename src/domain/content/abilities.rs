// Ability definitions. Each ability resolves to one of four targeting
// protocols at load time; the cast path never inspects loose data.

use crate::domain::buffs::{BuffDef, BuffKind, DamageType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbilityId(pub u32);

#[derive(Debug, Clone, Copy)]
pub enum TargetProtocol {
    /// No target; applies the declared buff to the caster.
    SelfCast,
    /// Single living enemy unit within range.
    Unit,
    /// Ground point within range; hits everything in `radius` around it.
    PointArea { radius: f32 },
    /// Relocate toward a point, then hit around the landing position.
    Dash,
}

/// Per-level tables are indexed by `level - 1`; all abilities cap at 4.
pub const MAX_ABILITY_LEVEL: u8 = 4;

#[derive(Debug, Clone)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: &'static str,
    pub protocol: TargetProtocol,
    pub damage_type: DamageType,
    pub base_damage: [i32; 4],
    pub mana_cost: [i32; 4],
    pub cooldown: [f32; 4],
    pub range: f32,
    /// Attack damage scaling.
    pub ad_ratio: f32,
    /// Spell power scaling (applied as `spell_power * ap_ratio * 100`).
    pub ap_ratio: f32,
    /// Buff applied to hit enemies, or to the caster for SelfCast.
    pub applies: Option<BuffDef>,
}

impl AbilityDef {
    pub fn damage_at(&self, level: u8) -> i32 {
        self.base_damage[usize::from(level.clamp(1, MAX_ABILITY_LEVEL)) - 1]
    }

    pub fn cost_at(&self, level: u8) -> i32 {
        self.mana_cost[usize::from(level.clamp(1, MAX_ABILITY_LEVEL)) - 1]
    }

    pub fn cooldown_at(&self, level: u8) -> f32 {
        self.cooldown[usize::from(level.clamp(1, MAX_ABILITY_LEVEL)) - 1]
    }
}

pub const SLASH: AbilityId = AbilityId(0);
pub const FIREBALL: AbilityId = AbilityId(1);
pub const FROST_NOVA: AbilityId = AbilityId(2);
pub const BLINK_STRIKE: AbilityId = AbilityId(3);
pub const BATTLE_SHOUT: AbilityId = AbilityId(4);
pub const STONE_SKIN: AbilityId = AbilityId(5);
pub const VENOM_BLADES: AbilityId = AbilityId(6);
pub const FLAME_WAVE: AbilityId = AbilityId(7);
pub const BULL_CHARGE: AbilityId = AbilityId(8);
pub const SPRINT: AbilityId = AbilityId(9);

pub fn builtin_abilities() -> Vec<AbilityDef> {
    vec![
        AbilityDef {
            id: SLASH,
            name: "Slash",
            protocol: TargetProtocol::Unit,
            damage_type: DamageType::Physical,
            base_damage: [60, 110, 160, 210],
            mana_cost: [30, 35, 40, 45],
            cooldown: [8.0, 7.0, 6.0, 5.0],
            range: 200.0,
            ad_ratio: 0.8,
            ap_ratio: 0.0,
            applies: None,
        },
        AbilityDef {
            id: FIREBALL,
            name: "Fireball",
            protocol: TargetProtocol::Unit,
            damage_type: DamageType::Magical,
            base_damage: [80, 140, 200, 260],
            mana_cost: [50, 60, 70, 80],
            cooldown: [9.0, 8.5, 8.0, 7.5],
            range: 600.0,
            ad_ratio: 0.0,
            ap_ratio: 0.6,
            applies: None,
        },
        AbilityDef {
            id: FROST_NOVA,
            name: "Frost Nova",
            protocol: TargetProtocol::PointArea { radius: 250.0 },
            damage_type: DamageType::Magical,
            base_damage: [70, 120, 170, 220],
            mana_cost: [70, 80, 90, 100],
            cooldown: [12.0, 11.0, 10.0, 9.0],
            range: 700.0,
            ad_ratio: 0.0,
            ap_ratio: 0.5,
            applies: Some(BuffDef::new(BuffKind::Slow, 2.0, 0.3)),
        },
        AbilityDef {
            id: BLINK_STRIKE,
            name: "Blink Strike",
            protocol: TargetProtocol::Dash,
            damage_type: DamageType::Physical,
            base_damage: [50, 100, 150, 200],
            mana_cost: [60, 65, 70, 75],
            cooldown: [14.0, 12.0, 10.0, 8.0],
            range: 500.0,
            ad_ratio: 1.0,
            ap_ratio: 0.0,
            applies: None,
        },
        AbilityDef {
            id: BATTLE_SHOUT,
            name: "Battle Shout",
            protocol: TargetProtocol::SelfCast,
            damage_type: DamageType::Physical,
            base_damage: [0, 0, 0, 0],
            mana_cost: [40, 45, 50, 55],
            cooldown: [16.0, 15.0, 14.0, 13.0],
            range: 0.0,
            ad_ratio: 0.0,
            ap_ratio: 0.0,
            applies: Some(BuffDef::new(BuffKind::AttackSpeedUp, 6.0, 0.4)),
        },
        AbilityDef {
            id: STONE_SKIN,
            name: "Stone Skin",
            protocol: TargetProtocol::SelfCast,
            damage_type: DamageType::Physical,
            base_damage: [0, 0, 0, 0],
            mana_cost: [45, 50, 55, 60],
            cooldown: [18.0, 17.0, 16.0, 15.0],
            range: 0.0,
            ad_ratio: 0.0,
            ap_ratio: 0.0,
            applies: Some(BuffDef::new(BuffKind::ArmorUp, 5.0, 30.0)),
        },
        AbilityDef {
            id: VENOM_BLADES,
            name: "Venom Blades",
            protocol: TargetProtocol::Unit,
            damage_type: DamageType::Physical,
            base_damage: [40, 80, 120, 160],
            mana_cost: [35, 40, 45, 50],
            cooldown: [7.0, 6.5, 6.0, 5.5],
            range: 200.0,
            ad_ratio: 0.5,
            ap_ratio: 0.0,
            applies: Some(BuffDef::new(BuffKind::Poison, 4.0, 8.0).stacking(5)),
        },
        AbilityDef {
            id: FLAME_WAVE,
            name: "Flame Wave",
            protocol: TargetProtocol::PointArea { radius: 300.0 },
            damage_type: DamageType::Magical,
            base_damage: [90, 160, 230, 300],
            mana_cost: [80, 95, 110, 125],
            cooldown: [20.0, 18.0, 16.0, 14.0],
            range: 800.0,
            ad_ratio: 0.0,
            ap_ratio: 0.8,
            applies: Some(BuffDef::new(BuffKind::Burn, 3.0, 12.0)),
        },
        AbilityDef {
            id: BULL_CHARGE,
            name: "Bull Charge",
            protocol: TargetProtocol::Dash,
            damage_type: DamageType::Physical,
            base_damage: [70, 120, 170, 220],
            mana_cost: [55, 60, 65, 70],
            cooldown: [15.0, 13.0, 11.0, 9.0],
            range: 450.0,
            ad_ratio: 0.6,
            ap_ratio: 0.0,
            applies: Some(BuffDef::new(BuffKind::Stun, 1.0, 0.0)),
        },
        AbilityDef {
            id: SPRINT,
            name: "Sprint",
            protocol: TargetProtocol::SelfCast,
            damage_type: DamageType::Physical,
            base_damage: [0, 0, 0, 0],
            mana_cost: [30, 30, 30, 30],
            cooldown: [14.0, 13.0, 12.0, 11.0],
            range: 0.0,
            ad_ratio: 0.0,
            ap_ratio: 0.0,
            applies: Some(BuffDef::new(BuffKind::Haste, 4.0, 0.3)),
        },
    ]
}
