//! Recipe catalog - exact ingredient multisets mapped to fired outputs.
//!
//! A catalog is validated once when it is built. Lookups are unambiguous
//! because two recipes may never share an ingredient multiset, and the
//! shortfall calculation can walk backward from an output because two
//! recipes may never share an output either.
//!
//! ```
//! use keystone_logic::materials::{Ingredients, Material, CraftedItem};
//! use keystone_logic::recipes::RecipeCatalog;
//!
//! let catalog = RecipeCatalog::standard();
//! let mix = Ingredients::from([(Material::Limestone, 2), (Material::Water, 1)]);
//! assert_eq!(catalog.resolve(&mix).map(|r| r.output), Some(CraftedItem::Mortar));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::materials::{ingredient_units, CraftedItem, Ingredients, Material};
use crate::workbench::WORKBENCH_SLOTS;

/// Furnace dial setting.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    #[default]
    Low,
    Medium,
    High,
}

impl Temperature {
    pub const ALL: [Temperature; 3] = [Temperature::Low, Temperature::Medium, Temperature::High];
}

/// Immutable firing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub output: CraftedItem,
    pub ingredients: Ingredients,
    pub required_temperature: Temperature,
    /// Seconds of furnace time.
    pub processing_secs: f64,
}

/// Reasons a recipe table is rejected at load time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("recipe for {0:?} has no ingredients")]
    EmptyIngredients(CraftedItem),
    #[error("recipe for {output:?} lists zero {material:?}")]
    ZeroCount {
        output: CraftedItem,
        material: Material,
    },
    #[error("recipe for {output:?} needs {units} units but the workbench holds {slots}")]
    TooManyIngredients {
        output: CraftedItem,
        units: u32,
        slots: usize,
    },
    #[error("recipe for {output:?} has invalid duration {secs}")]
    InvalidDuration { output: CraftedItem, secs: f64 },
    #[error("recipes for {first:?} and {second:?} share the same ingredients")]
    DuplicateIngredients {
        first: CraftedItem,
        second: CraftedItem,
    },
    #[error("more than one recipe produces {0:?}")]
    DuplicateOutput(CraftedItem),
}

/// Validated recipe table.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Validate and build a catalog. Declaration order is preserved.
    pub fn new(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        for (i, recipe) in recipes.iter().enumerate() {
            validate_recipe(recipe)?;
            for earlier in &recipes[..i] {
                if earlier.output == recipe.output {
                    return Err(CatalogError::DuplicateOutput(recipe.output));
                }
                if earlier.ingredients == recipe.ingredients {
                    return Err(CatalogError::DuplicateIngredients {
                        first: earlier.output,
                        second: recipe.output,
                    });
                }
            }
        }
        log::debug!("Recipe catalog validated with {} recipes", recipes.len());
        Ok(Self { recipes })
    }

    /// Built-in workshop recipes.
    pub fn standard() -> Self {
        Self {
            recipes: standard_recipes(),
        }
    }

    /// Exact-multiset lookup. Placement order never matters here because
    /// [`Ingredients`] is an ordered map.
    pub fn resolve(&self, ingredients: &Ingredients) -> Option<&Recipe> {
        self.recipes.iter().find(|r| &r.ingredients == ingredients)
    }

    /// The recipe whose output is `item`, if any.
    pub fn producing(&self, item: CraftedItem) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.output == item)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

// Deserialization goes through `new` so a saved or hand-written table can
// never bypass validation.
impl<'de> Deserialize<'de> for RecipeCatalog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            recipes: Vec<Recipe>,
        }
        let raw = Raw::deserialize(deserializer)?;
        RecipeCatalog::new(raw.recipes).map_err(serde::de::Error::custom)
    }
}

fn validate_recipe(recipe: &Recipe) -> Result<(), CatalogError> {
    if recipe.ingredients.is_empty() {
        return Err(CatalogError::EmptyIngredients(recipe.output));
    }
    if let Some((&material, _)) = recipe.ingredients.iter().find(|(_, &n)| n == 0) {
        return Err(CatalogError::ZeroCount {
            output: recipe.output,
            material,
        });
    }
    let units = ingredient_units(&recipe.ingredients);
    if units as usize > WORKBENCH_SLOTS {
        return Err(CatalogError::TooManyIngredients {
            output: recipe.output,
            units,
            slots: WORKBENCH_SLOTS,
        });
    }
    if !recipe.processing_secs.is_finite() || recipe.processing_secs <= 0.0 {
        return Err(CatalogError::InvalidDuration {
            output: recipe.output,
            secs: recipe.processing_secs,
        });
    }
    Ok(())
}

fn recipe(
    output: CraftedItem,
    ingredients: &[(Material, u32)],
    required_temperature: Temperature,
    processing_secs: f64,
) -> Recipe {
    Recipe {
        output,
        ingredients: ingredients.iter().copied().collect(),
        required_temperature,
        processing_secs,
    }
}

fn standard_recipes() -> Vec<Recipe> {
    use CraftedItem::*;
    use Material::*;
    vec![
        recipe(Mortar, &[(Limestone, 2), (Water, 1)], Temperature::Medium, 3.0),
        recipe(Brick, &[(Clay, 2), (Sand, 1)], Temperature::High, 5.0),
        recipe(Glass, &[(Sand, 3), (Limestone, 1)], Temperature::High, 6.0),
        recipe(
            RomanConcrete,
            &[(Limestone, 1), (VolcanicAsh, 2), (Water, 1)],
            Temperature::Medium,
            4.0,
        ),
        recipe(LimePlaster, &[(Limestone, 1), (Water, 2)], Temperature::Low, 2.0),
        recipe(TerracottaTile, &[(Clay, 3), (Water, 1)], Temperature::Medium, 4.0),
        recipe(WroughtIron, &[(IronOre, 2), (Timber, 1)], Temperature::High, 8.0),
    ]
}
