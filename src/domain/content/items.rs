// Item definitions: cost, sell value, stat deltas, stacking and build-from
// rules. Sell value is 70% of cost, rounded down.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u32);

/// Flat stat bonuses applied on acquisition and reversed on sale.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatBlock {
    pub health: i32,
    pub mana: i32,
    pub attack_damage: i32,
    /// Additive attacks-per-second fraction, e.g. 0.1 = +10%.
    pub attack_speed: f32,
    pub armor: i32,
    pub magic_resist: i32,
    pub move_speed: f32,
    pub spell_power: i32,
}

#[derive(Debug, Clone)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: &'static str,
    pub cost: u32,
    pub sell_value: u32,
    pub stats: StatBlock,
    /// Stackable consumables share one slot up to this count.
    pub stack_limit: Option<u32>,
    /// Components consumed (and credited) when buying this item.
    pub builds_from: Vec<ItemId>,
}

pub const HEALTH_POTION: ItemId = ItemId(0);
pub const LONG_SWORD: ItemId = ItemId(1);
pub const CHAINMAIL: ItemId = ItemId(2);
pub const NULL_CLOAK: ItemId = ItemId(3);
pub const BOOTS: ItemId = ItemId(4);
pub const RUBY_CRYSTAL: ItemId = ItemId(5);
pub const SAPPHIRE_CRYSTAL: ItemId = ItemId(6);
pub const BROADSWORD: ItemId = ItemId(7);
pub const GIANTS_BELT: ItemId = ItemId(8);
pub const FURY_BLADE: ItemId = ItemId(9);

fn item(
    id: ItemId,
    name: &'static str,
    cost: u32,
    stats: StatBlock,
    stack_limit: Option<u32>,
    builds_from: Vec<ItemId>,
) -> ItemDef {
    ItemDef {
        id,
        name,
        cost,
        sell_value: cost * 7 / 10,
        stats,
        stack_limit,
        builds_from,
    }
}

pub fn builtin_items() -> Vec<ItemDef> {
    vec![
        item(
            HEALTH_POTION,
            "Health Potion",
            50,
            StatBlock::default(),
            Some(5),
            vec![],
        ),
        item(
            LONG_SWORD,
            "Long Sword",
            400,
            StatBlock {
                attack_damage: 10,
                ..Default::default()
            },
            None,
            vec![],
        ),
        item(
            CHAINMAIL,
            "Chainmail",
            450,
            StatBlock {
                armor: 15,
                ..Default::default()
            },
            None,
            vec![],
        ),
        item(
            NULL_CLOAK,
            "Null Cloak",
            450,
            StatBlock {
                magic_resist: 15,
                ..Default::default()
            },
            None,
            vec![],
        ),
        item(
            BOOTS,
            "Boots of Speed",
            350,
            StatBlock {
                move_speed: 25.0,
                ..Default::default()
            },
            None,
            vec![],
        ),
        item(
            RUBY_CRYSTAL,
            "Ruby Crystal",
            475,
            StatBlock {
                health: 150,
                ..Default::default()
            },
            None,
            vec![],
        ),
        item(
            SAPPHIRE_CRYSTAL,
            "Sapphire Crystal",
            400,
            StatBlock {
                mana: 200,
                ..Default::default()
            },
            None,
            vec![],
        ),
        item(
            BROADSWORD,
            "Broadsword",
            900,
            StatBlock {
                attack_damage: 25,
                ..Default::default()
            },
            None,
            vec![LONG_SWORD],
        ),
        item(
            GIANTS_BELT,
            "Giant's Belt",
            1000,
            StatBlock {
                health: 350,
                ..Default::default()
            },
            None,
            vec![RUBY_CRYSTAL],
        ),
        item(
            FURY_BLADE,
            "Fury Blade",
            1700,
            StatBlock {
                attack_damage: 45,
                attack_speed: 0.15,
                ..Default::default()
            },
            None,
            vec![BROADSWORD, LONG_SWORD],
        ),
    ]
}
