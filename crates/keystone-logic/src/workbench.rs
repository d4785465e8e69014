//! Workbench - four staging slots where raw materials wait to be mixed.
//!
//! Placing a material is non-destructive: the ledger is only debited when
//! the slots are mixed. Staging is still bounded by stock, so the bench
//! never holds more copies of a material than the ledger owns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{Ledger, LedgerError};
use crate::materials::{Ingredients, Material};
use crate::recipes::{Recipe, RecipeCatalog};

/// Number of staging slots on the bench.
pub const WORKBENCH_SLOTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkbenchError {
    #[error("all workbench slots are full")]
    SlotsFull,
    #[error("no {0:?} left to place")]
    OutOfStock(Material),
    #[error("slot {0} does not exist")]
    InvalidSlot(usize),
    #[error("slot {0} is already empty")]
    EmptySlot(usize),
    #[error("the workbench contents do not match any recipe")]
    NoRecipeMatch,
    #[error("not enough {material:?} to mix: need {needed}, have {available}")]
    InsufficientRawMaterials {
        material: Material,
        needed: u32,
        available: u32,
    },
    #[error(transparent)]
    Ledger(LedgerError),
}

/// Output of a successful mix: consumed ingredients plus the recipe they
/// resolved to. Waits for the furnace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedBatch {
    pub ingredients: Ingredients,
    pub recipe: Recipe,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbench {
    slots: [Option<Material>; WORKBENCH_SLOTS],
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Option<Material>; WORKBENCH_SLOTS] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Copies of `material` currently staged.
    pub fn staged(&self, material: Material) -> u32 {
        self.slots.iter().filter(|s| **s == Some(material)).count() as u32
    }

    /// Stock still free to place: ledger count minus what is already staged.
    pub fn available(&self, material: Material, ledger: &Ledger) -> u32 {
        ledger.raw(material).saturating_sub(self.staged(material))
    }

    /// Stage `material` in the first empty slot and return that slot's index.
    pub fn place(&mut self, material: Material, ledger: &Ledger) -> Result<usize, WorkbenchError> {
        if self.available(material, ledger) == 0 {
            return Err(WorkbenchError::OutOfStock(material));
        }
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(WorkbenchError::SlotsFull)?;
        self.slots[index] = Some(material);
        Ok(index)
    }

    /// Clear one slot. The ledger is untouched since placement never debited it.
    pub fn remove(&mut self, slot: usize) -> Result<Material, WorkbenchError> {
        let cell = self
            .slots
            .get_mut(slot)
            .ok_or(WorkbenchError::InvalidSlot(slot))?;
        cell.take().ok_or(WorkbenchError::EmptySlot(slot))
    }

    pub fn clear(&mut self) {
        self.slots = [None; WORKBENCH_SLOTS];
    }

    /// Multiset of filled slots.
    pub fn contents(&self) -> Ingredients {
        let mut ingredients = Ingredients::new();
        for material in self.slots.iter().flatten() {
            *ingredients.entry(*material).or_insert(0) += 1;
        }
        ingredients
    }

    pub fn resolve_recipe<'a>(&self, catalog: &'a RecipeCatalog) -> Option<&'a Recipe> {
        catalog.resolve(&self.contents())
    }

    /// Consume the staged materials from the ledger and clear the bench.
    ///
    /// Fails without mutating anything when the contents resolve to no
    /// recipe or the ledger cannot cover them.
    pub fn mix(
        &mut self,
        ledger: &mut Ledger,
        catalog: &RecipeCatalog,
    ) -> Result<MixedBatch, WorkbenchError> {
        let ingredients = self.contents();
        let recipe = catalog
            .resolve(&ingredients)
            .ok_or(WorkbenchError::NoRecipeMatch)?
            .clone();
        ledger.debit_raw_materials(&ingredients)?;
        self.clear();
        log::info!("Mixed {:?} for {:?}", ingredients, recipe.output);
        Ok(MixedBatch {
            ingredients,
            recipe,
        })
    }
}

impl From<LedgerError> for WorkbenchError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientRawMaterials {
                material,
                needed,
                available,
            } => WorkbenchError::InsufficientRawMaterials {
                material,
                needed,
                available,
            },
            other => WorkbenchError::Ledger(other),
        }
    }
}
