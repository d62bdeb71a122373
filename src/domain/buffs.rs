// Buff/debuff engine: definitions, the applied-buff list on a unit, duration
// ticking, periodic damage/healing, and effective-stat aggregation.
//
// A unit never carries two entries for the same buff kind; stacking is a
// counter on the single entry. Re-application follows the definition's
// refresh rule.

use super::entities::UnitRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageType {
    Physical,
    Magical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuffKind {
    Stun,
    Root,
    Silence,
    Disarm,
    Slow,
    Haste,
    AttackSpeedUp,
    ArmorUp,
    MagicResistUp,
    /// Physical damage over time.
    Poison,
    /// Magical damage over time.
    Burn,
    /// Heal over time.
    Regeneration,
    Invulnerable,
    Untargetable,
    /// Passes through other units (no unit-vs-unit collision).
    Phase,
}

impl BuffKind {
    /// Periodic damage type, when the kind is a DoT.
    pub fn dot_damage_type(self) -> Option<DamageType> {
        match self {
            BuffKind::Poison => Some(DamageType::Physical),
            BuffKind::Burn => Some(DamageType::Magical),
            _ => None,
        }
    }

    pub fn is_hot(self) -> bool {
        matches!(self, BuffKind::Regeneration)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuffKind::Stun => "stun",
            BuffKind::Root => "root",
            BuffKind::Silence => "silence",
            BuffKind::Disarm => "disarm",
            BuffKind::Slow => "slow",
            BuffKind::Haste => "haste",
            BuffKind::AttackSpeedUp => "attack_speed_up",
            BuffKind::ArmorUp => "armor_up",
            BuffKind::MagicResistUp => "magic_resist_up",
            BuffKind::Poison => "poison",
            BuffKind::Burn => "burn",
            BuffKind::Regeneration => "regeneration",
            BuffKind::Invulnerable => "invulnerable",
            BuffKind::Untargetable => "untargetable",
            BuffKind::Phase => "phase",
        }
    }
}

/// How a re-applied buff combines with the existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRule {
    /// Remaining duration resets to the new application's duration.
    Refresh,
    /// The larger of the remaining and new duration wins.
    KeepLonger,
}

/// Static description of one buff, carried by ability/item content.
#[derive(Debug, Clone, Copy)]
pub struct BuffDef {
    pub kind: BuffKind,
    pub duration: f32,
    /// Magnitude: stat modifier fraction, or damage/heal per tick-interval.
    pub value: f32,
    pub stackable: bool,
    pub max_stacks: u32,
    pub refresh: RefreshRule,
}

impl BuffDef {
    pub fn new(kind: BuffKind, duration: f32, value: f32) -> Self {
        Self {
            kind,
            duration,
            value,
            stackable: false,
            max_stacks: 1,
            refresh: RefreshRule::Refresh,
        }
    }

    pub fn stacking(mut self, max_stacks: u32) -> Self {
        self.stackable = true;
        self.max_stacks = max_stacks;
        self
    }

    pub fn keep_longer(mut self) -> Self {
        self.refresh = RefreshRule::KeepLonger;
        self
    }
}

/// One buff instance attached to a unit.
#[derive(Debug, Clone)]
pub struct AppliedBuff {
    pub kind: BuffKind,
    pub source: Option<UnitRef>,
    pub remaining: f32,
    pub value: f32,
    pub stacks: u32,
}

/// Periodic damage/heal produced by one tick of a DoT/HoT buff. Applied by
/// the combat system so kill attribution runs through the normal path.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicEffect {
    pub source: Option<UnitRef>,
    pub damage_type: Option<DamageType>,
    /// Positive amounts damage, the heal flag flips the direction.
    pub amount: f32,
    pub heal: bool,
}

/// Apply `def` onto a buff list, merging with an existing entry of the same
/// kind per the stacking/refresh rules.
pub fn apply_buff(buffs: &mut Vec<AppliedBuff>, def: &BuffDef, source: Option<UnitRef>) {
    if let Some(existing) = buffs.iter_mut().find(|b| b.kind == def.kind) {
        if def.stackable && existing.stacks < def.max_stacks {
            existing.stacks += 1;
        }
        existing.value = def.value;
        existing.source = source;
        existing.remaining = match def.refresh {
            RefreshRule::Refresh => def.duration,
            RefreshRule::KeepLonger => existing.remaining.max(def.duration),
        };
        return;
    }
    buffs.push(AppliedBuff {
        kind: def.kind,
        source,
        remaining: def.duration,
        value: def.value,
        stacks: 1,
    });
}

/// Advance every buff on one unit by `dt` seconds.
///
/// Returns the periodic effects due this tick; expired entries are removed
/// only after their final effect has been collected.
pub fn tick_buffs(buffs: &mut Vec<AppliedBuff>, dt: f32, tick_interval: f32) -> Vec<PeriodicEffect> {
    let mut effects = Vec::new();
    for buff in buffs.iter_mut() {
        buff.remaining -= dt;

        if let Some(damage_type) = buff.kind.dot_damage_type() {
            effects.push(PeriodicEffect {
                source: buff.source,
                damage_type: Some(damage_type),
                amount: buff.value * buff.stacks as f32 * dt / tick_interval,
                heal: false,
            });
        } else if buff.kind.is_hot() {
            effects.push(PeriodicEffect {
                source: buff.source,
                damage_type: None,
                amount: buff.value * buff.stacks as f32 * dt / tick_interval,
                heal: true,
            });
        }
    }
    buffs.retain(|b| b.remaining > 0.0);
    effects
}

pub fn has_buff(buffs: &[AppliedBuff], kind: BuffKind) -> bool {
    buffs.iter().any(|b| b.kind == kind)
}

// Crowd-control gates. Silence is checked at cast time, not per tick.

pub fn movement_blocked(buffs: &[AppliedBuff]) -> bool {
    has_buff(buffs, BuffKind::Stun) || has_buff(buffs, BuffKind::Root)
}

pub fn attacking_blocked(buffs: &[AppliedBuff]) -> bool {
    has_buff(buffs, BuffKind::Stun) || has_buff(buffs, BuffKind::Disarm)
}

pub fn casting_blocked(buffs: &[AppliedBuff]) -> bool {
    has_buff(buffs, BuffKind::Stun) || has_buff(buffs, BuffKind::Silence)
}

/// Multiplicative move speed modifier from Slow/Haste entries.
pub fn move_speed_multiplier(buffs: &[AppliedBuff]) -> f32 {
    let mut mult = 1.0;
    for b in buffs {
        match b.kind {
            BuffKind::Slow => mult *= (1.0 - b.value * b.stacks as f32).max(0.0),
            BuffKind::Haste => mult *= 1.0 + b.value * b.stacks as f32,
            _ => {}
        }
    }
    mult
}

/// Multiplicative attack speed modifier.
pub fn attack_speed_multiplier(buffs: &[AppliedBuff]) -> f32 {
    let mut mult = 1.0;
    for b in buffs {
        if b.kind == BuffKind::AttackSpeedUp {
            mult *= 1.0 + b.value * b.stacks as f32;
        }
    }
    mult
}

/// Additive bonus armor.
pub fn bonus_armor(buffs: &[AppliedBuff]) -> i32 {
    buffs
        .iter()
        .filter(|b| b.kind == BuffKind::ArmorUp)
        .map(|b| (b.value * b.stacks as f32) as i32)
        .sum()
}

/// Additive bonus magic resist.
pub fn bonus_magic_resist(buffs: &[AppliedBuff]) -> i32 {
    buffs
        .iter()
        .filter(|b| b.kind == BuffKind::MagicResistUp)
        .map(|b| (b.value * b.stacks as f32) as i32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reapply_refreshes_duration_without_second_entry() {
        let def = BuffDef::new(BuffKind::Slow, 3.0, 0.3);
        let mut buffs = Vec::new();
        apply_buff(&mut buffs, &def, None);
        buffs[0].remaining = 0.5;
        apply_buff(&mut buffs, &def, None);
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].remaining, 3.0);
    }

    #[test]
    fn keep_longer_retains_the_larger_remaining() {
        let def = BuffDef::new(BuffKind::ArmorUp, 2.0, 20.0).keep_longer();
        let mut buffs = Vec::new();
        apply_buff(&mut buffs, &def, None);
        buffs[0].remaining = 5.0;
        apply_buff(&mut buffs, &def, None);
        assert_eq!(buffs[0].remaining, 5.0);
    }

    #[test]
    fn stacks_cap_at_max() {
        let def = BuffDef::new(BuffKind::Poison, 4.0, 10.0).stacking(3);
        let mut buffs = Vec::new();
        for _ in 0..5 {
            apply_buff(&mut buffs, &def, None);
        }
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].stacks, 3);
    }

    #[test]
    fn dot_emits_final_tick_before_expiry() {
        let def = BuffDef::new(BuffKind::Burn, 0.05, 10.0);
        let mut buffs = Vec::new();
        apply_buff(&mut buffs, &def, None);
        let effects = tick_buffs(&mut buffs, 0.05, 0.05);
        assert_eq!(effects.len(), 1);
        assert!((effects[0].amount - 10.0).abs() < 1e-3);
        assert!(buffs.is_empty());
    }

    #[test]
    fn slow_and_haste_combine_multiplicatively() {
        let mut buffs = Vec::new();
        apply_buff(&mut buffs, &BuffDef::new(BuffKind::Slow, 2.0, 0.5), None);
        apply_buff(&mut buffs, &BuffDef::new(BuffKind::Haste, 2.0, 0.2), None);
        let mult = move_speed_multiplier(&buffs);
        assert!((mult - 0.6).abs() < 1e-5);
    }

    #[test]
    fn cc_gates() {
        let mut buffs = Vec::new();
        apply_buff(&mut buffs, &BuffDef::new(BuffKind::Stun, 1.0, 0.0), None);
        assert!(movement_blocked(&buffs));
        assert!(attacking_blocked(&buffs));
        assert!(casting_blocked(&buffs));

        buffs.clear();
        apply_buff(&mut buffs, &BuffDef::new(BuffKind::Root, 1.0, 0.0), None);
        assert!(movement_blocked(&buffs));
        assert!(!attacking_blocked(&buffs));
        assert!(!casting_blocked(&buffs));
    }
}
