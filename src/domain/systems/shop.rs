// Item economy: buying (stacking, build-from component credit) and selling.

use crate::domain::content::{ContentDb, ItemId, StatBlock};
use crate::domain::entities::{INVENTORY_SLOTS, ItemStack, Player, PlayerId};
use crate::domain::store::EntityStore;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopError {
    UnknownItem,
    NotEnoughGold,
    InventoryFull,
    EmptySlot,
}

impl ShopError {
    pub fn message(self) -> &'static str {
        match self {
            ShopError::UnknownItem => "unknown item",
            ShopError::NotEnoughGold => "not enough gold",
            ShopError::InventoryFull => "inventory full",
            ShopError::EmptySlot => "nothing to sell in that slot",
        }
    }
}

/// Buy `item` for `player`; returns the occupied inventory slot.
pub fn buy(
    store: &mut EntityStore,
    content: &ContentDb,
    player: PlayerId,
    item: ItemId,
) -> Result<usize, ShopError> {
    let def = content.item(item).ok_or(ShopError::UnknownItem)?.clone();
    let p = store.player_mut(player).ok_or(ShopError::UnknownItem)?;

    // Stackable items merge into an existing under-capacity stack at full
    // price and never consume components.
    if let Some(limit) = def.stack_limit {
        if let Some(slot) = p
            .inventory
            .iter()
            .position(|s| s.is_some_and(|s| s.item == item && s.count < limit))
        {
            if p.gold < def.cost {
                return Err(ShopError::NotEnoughGold);
            }
            p.gold -= def.cost;
            if let Some(stack) = &mut p.inventory[slot] {
                stack.count += 1;
            }
            apply_stats(p, &def.stats, 1);
            debug!(player = player.0, item = def.name, slot, "item stacked");
            return Ok(slot);
        }
    }

    // Owned build-from components are consumed and credited against the
    // price; the charge never drops below zero.
    let mut consumed: Vec<usize> = Vec::new();
    let mut credit: u32 = 0;
    for component in &def.builds_from {
        if let Some(slot) = component_slot(p, *component, &consumed) {
            consumed.push(slot);
            if let Some(cdef) = content.item(*component) {
                credit += cdef.cost;
            }
        }
    }
    let price = def.cost.saturating_sub(credit);
    if p.gold < price {
        return Err(ShopError::NotEnoughGold);
    }

    // Consumed component slots count as free for the placement check.
    let free = p.inventory.iter().filter(|s| s.is_none()).count() + consumed.len();
    if free == 0 {
        return Err(ShopError::InventoryFull);
    }

    for &slot in &consumed {
        if let Some(stack) = p.inventory[slot].take() {
            if let Some(cdef) = content.item(stack.item) {
                apply_stats(p, &cdef.stats, -1);
            }
        }
    }
    let slot = p
        .inventory
        .iter()
        .position(|s| s.is_none())
        .unwrap_or(INVENTORY_SLOTS - 1);

    p.gold -= price;
    p.inventory[slot] = Some(ItemStack { item, count: 1 });
    apply_stats(p, &def.stats, 1);
    debug!(player = player.0, item = def.name, slot, price, "item bought");
    Ok(slot)
}

fn component_slot(p: &Player, component: ItemId, consumed: &[usize]) -> Option<usize> {
    p.inventory.iter().enumerate().position(|(i, s)| {
        !consumed.contains(&i) && s.is_some_and(|s| s.item == component && s.count == 1)
    })
}

/// Sell one unit from `slot`; returns the item and the gold credited.
pub fn sell(
    store: &mut EntityStore,
    content: &ContentDb,
    player: PlayerId,
    slot: usize,
) -> Result<(ItemId, u32), ShopError> {
    let p = store.player_mut(player).ok_or(ShopError::EmptySlot)?;
    let Some(stack) = p.inventory.get(slot).copied().flatten() else {
        return Err(ShopError::EmptySlot);
    };
    let def = content.item(stack.item).ok_or(ShopError::UnknownItem)?.clone();

    if stack.count > 1 {
        if let Some(s) = &mut p.inventory[slot] {
            s.count -= 1;
        }
    } else {
        p.inventory[slot] = None;
    }
    p.gold += def.sell_value;
    apply_stats(p, &def.stats, -1);
    debug!(player = player.0, item = def.name, slot, "item sold");
    Ok((stack.item, def.sell_value))
}

/// Apply (or reverse, sign = -1) an item's flat stat deltas. Current
/// health/mana top up with gained maximums and clamp when they shrink.
fn apply_stats(p: &mut Player, stats: &StatBlock, sign: i32) {
    p.max_health += stats.health * sign;
    p.health = (p.health + stats.health * sign).clamp(1, p.max_health.max(1));
    p.max_mana += stats.mana * sign;
    p.mana = (p.mana + stats.mana * sign).clamp(0, p.max_mana.max(0));
    p.stats.attack_damage += stats.attack_damage * sign;
    p.stats.attack_speed += stats.attack_speed * sign as f32;
    p.stats.armor += stats.armor * sign;
    p.stats.magic_resist += stats.magic_resist * sign;
    p.stats.move_speed += stats.move_speed * sign as f32;
    p.spell_power += stats.spell_power * sign;
}
