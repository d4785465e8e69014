//! Workshop content loaded from JSON.
//!
//! The built-in files under `data/` are compiled in. Custom content goes
//! through the same parsers and the same validation as the built-ins.

use keystone_logic::buildings::{BuildingRegistry, BuildingSpec, RegistryError};
use keystone_logic::recipes::{CatalogError, Recipe, RecipeCatalog};
use serde::Deserialize;
use thiserror::Error;

// ── Built-in content ────────────────────────────────────────────────────
pub const BUILDINGS_JSON: &str = include_str!("../../../data/buildings.json");
pub const RECIPES_JSON: &str = include_str!("../../../data/recipes.json");

#[derive(Debug, Error)]
pub enum DataError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid recipe catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid building registry: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Deserialize)]
struct RecipeFile {
    recipes: Vec<Recipe>,
}

/// Parse and validate a recipe catalog.
pub fn parse_recipes(json: &str) -> Result<RecipeCatalog, DataError> {
    let file: RecipeFile = serde_json::from_str(json)?;
    let catalog = RecipeCatalog::new(file.recipes)?;
    log::debug!("Loaded {} recipes", catalog.len());
    Ok(catalog)
}

/// Parse and validate a list of building specs.
pub fn parse_buildings(json: &str) -> Result<BuildingRegistry, DataError> {
    let specs: Vec<BuildingSpec> = serde_json::from_str(json)?;
    let registry = BuildingRegistry::new(specs)?;
    log::debug!("Loaded {} buildings", registry.len());
    Ok(registry)
}

pub fn standard_buildings() -> Result<BuildingRegistry, DataError> {
    parse_buildings(BUILDINGS_JSON)
}

pub fn standard_recipes() -> Result<RecipeCatalog, DataError> {
    parse_recipes(RECIPES_JSON)
}
