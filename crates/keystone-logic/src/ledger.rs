//! Inventory ledger - raw material, crafted item, and currency balances.
//!
//! Every multi-key debit checks all balances before touching any of them,
//! so a failed call leaves the ledger exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::materials::{purchase_cost, CraftedItem, Ingredients, Material};

/// Crafted item → count.
pub type CraftedStock = BTreeMap<CraftedItem, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough {material:?}: need {needed}, have {available}")]
    InsufficientRawMaterials {
        material: Material,
        needed: u32,
        available: u32,
    },
    #[error("not enough {item:?}: need {needed}, have {available}")]
    InsufficientCrafted {
        item: CraftedItem,
        needed: u32,
        available: u32,
    },
    #[error("not enough currency: need {needed}, have {available}")]
    InsufficientCurrency { needed: u64, available: u64 },
}

/// The player's balances. Counts are unsigned so they cannot go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    raw_materials: Ingredients,
    crafted_materials: CraftedStock,
    currency: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded with a starting purse and raw stock.
    pub fn with_starting(currency: u64, raw: &Ingredients) -> Self {
        let mut ledger = Self {
            currency,
            ..Self::default()
        };
        ledger.add_raw_materials(raw);
        ledger
    }

    pub fn raw_materials(&self) -> &Ingredients {
        &self.raw_materials
    }

    pub fn crafted_materials(&self) -> &CraftedStock {
        &self.crafted_materials
    }

    pub fn currency(&self) -> u64 {
        self.currency
    }

    pub fn raw(&self, material: Material) -> u32 {
        self.raw_materials.get(&material).copied().unwrap_or(0)
    }

    pub fn crafted(&self, item: CraftedItem) -> u32 {
        self.crafted_materials.get(&item).copied().unwrap_or(0)
    }

    /// Total raw units across all materials.
    pub fn total_raw_units(&self) -> u64 {
        self.raw_materials.values().map(|&n| u64::from(n)).sum()
    }

    /// Bulk credit, e.g. exploration yields.
    pub fn add_raw_materials(&mut self, materials: &Ingredients) {
        for (&material, &count) in materials {
            if count == 0 {
                continue;
            }
            let slot = self.raw_materials.entry(material).or_insert(0);
            *slot = slot.saturating_add(count);
        }
    }

    /// First material in `materials` the ledger cannot cover, if any.
    pub fn check_raw_materials(&self, materials: &Ingredients) -> Result<(), LedgerError> {
        for (&material, &needed) in materials {
            let available = self.raw(material);
            if available < needed {
                return Err(LedgerError::InsufficientRawMaterials {
                    material,
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Atomic multi-material debit: all or nothing.
    pub fn debit_raw_materials(&mut self, materials: &Ingredients) -> Result<(), LedgerError> {
        self.check_raw_materials(materials)?;
        for (material, &count) in materials {
            if let Some(slot) = self.raw_materials.get_mut(material) {
                *slot -= count;
            }
        }
        self.raw_materials.retain(|_, n| *n > 0);
        Ok(())
    }

    pub fn credit_crafted_item(&mut self, item: CraftedItem, count: u32) {
        if count == 0 {
            return;
        }
        let slot = self.crafted_materials.entry(item).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Atomic multi-item debit of crafted stock.
    pub fn debit_crafted_items(&mut self, items: &CraftedStock) -> Result<(), LedgerError> {
        for (&item, &needed) in items {
            let available = self.crafted(item);
            if available < needed {
                return Err(LedgerError::InsufficientCrafted {
                    item,
                    needed,
                    available,
                });
            }
        }
        for (item, &count) in items {
            if let Some(slot) = self.crafted_materials.get_mut(item) {
                *slot -= count;
            }
        }
        self.crafted_materials.retain(|_, n| *n > 0);
        Ok(())
    }

    pub fn add_currency(&mut self, amount: u64) {
        self.currency = self.currency.saturating_add(amount);
    }

    pub fn spend_currency(&mut self, amount: u64) -> Result<(), LedgerError> {
        if self.currency < amount {
            return Err(LedgerError::InsufficientCurrency {
                needed: amount,
                available: self.currency,
            });
        }
        self.currency -= amount;
        Ok(())
    }

    /// Buy raw materials at shop price. Returns the amount spent.
    pub fn purchase_raw_materials(&mut self, order: &Ingredients) -> Result<u64, LedgerError> {
        let cost = purchase_cost(order);
        self.spend_currency(cost)?;
        self.add_raw_materials(order);
        Ok(cost)
    }
}
