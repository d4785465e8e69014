//! Raw materials and crafted items.
//!
//! Both catalogs are closed enumerations with stable snake_case identifiers.
//! Raw materials carry a unit purchase cost; crafted items only exist as the
//! output of a furnace firing.
//!
//! ```
//! use keystone_logic::materials::{Material, CraftedItem};
//!
//! assert_eq!(Material::from_id("limestone"), Some(Material::Limestone));
//! assert_eq!(CraftedItem::Mortar.id(), "mortar");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exact multiset of raw materials: material → count.
pub type Ingredients = BTreeMap<Material, u32>;

/// Raw resource kinds gathered by exploration or bought in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Limestone,
    Water,
    Sand,
    Clay,
    VolcanicAsh,
    Timber,
    IronOre,
}

impl Material {
    /// All raw materials in declaration order.
    pub const ALL: [Material; 7] = [
        Material::Limestone,
        Material::Water,
        Material::Sand,
        Material::Clay,
        Material::VolcanicAsh,
        Material::Timber,
        Material::IronOre,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Material::Limestone => "limestone",
            Material::Water => "water",
            Material::Sand => "sand",
            Material::Clay => "clay",
            Material::VolcanicAsh => "volcanic_ash",
            Material::Timber => "timber",
            Material::IronOre => "iron_ore",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Material::Limestone => "🪨",
            Material::Water => "💧",
            Material::Sand => "⏳",
            Material::Clay => "🟫",
            Material::VolcanicAsh => "🌋",
            Material::Timber => "🪵",
            Material::IronOre => "⛏️",
        }
    }

    /// Shop price for a single unit.
    pub fn cost(self) -> u64 {
        match self {
            Material::Water => 1,
            Material::Sand => 2,
            Material::Clay => 2,
            Material::Limestone => 3,
            Material::Timber => 4,
            Material::VolcanicAsh => 5,
            Material::IronOre => 8,
        }
    }

    pub fn from_id(id: &str) -> Option<Material> {
        Material::ALL.into_iter().find(|m| m.id() == id)
    }
}

/// Finished goods produced by firing a resolved mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftedItem {
    Mortar,
    Brick,
    Glass,
    RomanConcrete,
    LimePlaster,
    TerracottaTile,
    WroughtIron,
}

impl CraftedItem {
    /// All crafted items in declaration order.
    pub const ALL: [CraftedItem; 7] = [
        CraftedItem::Mortar,
        CraftedItem::Brick,
        CraftedItem::Glass,
        CraftedItem::RomanConcrete,
        CraftedItem::LimePlaster,
        CraftedItem::TerracottaTile,
        CraftedItem::WroughtIron,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CraftedItem::Mortar => "mortar",
            CraftedItem::Brick => "brick",
            CraftedItem::Glass => "glass",
            CraftedItem::RomanConcrete => "roman_concrete",
            CraftedItem::LimePlaster => "lime_plaster",
            CraftedItem::TerracottaTile => "terracotta_tile",
            CraftedItem::WroughtIron => "wrought_iron",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            CraftedItem::Mortar => "🧱",
            CraftedItem::Brick => "🟥",
            CraftedItem::Glass => "🔷",
            CraftedItem::RomanConcrete => "🏛️",
            CraftedItem::LimePlaster => "⬜",
            CraftedItem::TerracottaTile => "🟧",
            CraftedItem::WroughtIron => "⚙️",
        }
    }

    pub fn from_id(id: &str) -> Option<CraftedItem> {
        CraftedItem::ALL.into_iter().find(|c| c.id() == id)
    }
}

/// Total number of material units in a multiset.
pub fn ingredient_units(ingredients: &Ingredients) -> u32 {
    ingredients.values().sum()
}

/// Currency cost of buying every unit in `ingredients` at shop price.
pub fn purchase_cost(ingredients: &Ingredients) -> u64 {
    ingredients
        .iter()
        .map(|(material, &count)| material.cost() * u64::from(count))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_ids_round_trip() {
        for m in Material::ALL {
            assert_eq!(Material::from_id(m.id()), Some(m));
        }
        assert_eq!(Material::from_id("unobtainium"), None);
    }

    #[test]
    fn test_crafted_ids_unique() {
        let mut ids: Vec<_> = CraftedItem::ALL.iter().map(|c| c.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), CraftedItem::ALL.len());
    }

    #[test]
    fn test_every_material_has_positive_cost() {
        assert!(Material::ALL.iter().all(|m| m.cost() > 0));
    }

    #[test]
    fn test_purchase_cost() {
        let order = Ingredients::from([(Material::Limestone, 2), (Material::Water, 1)]);
        assert_eq!(ingredient_units(&order), 3);
        assert_eq!(purchase_cost(&order), 2 * 3 + 1);
    }
}
