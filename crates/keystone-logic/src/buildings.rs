//! Building requirement specs: what each historical building needs before
//! construction can begin. Content is authored outside the engine and only
//! read here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::CraftedStock;
use crate::materials::CraftedItem;
use crate::progress::Science;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required_materials: CraftedStock,
    #[serde(default)]
    pub sciences: Vec<Science>,
    /// Building ships a sketching phase that must be completed.
    #[serde(default)]
    pub has_sketch: bool,
    /// Building ships a quiz that must be passed.
    #[serde(default)]
    pub has_quiz: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("building id is empty")]
    EmptyId,
    #[error("building '{0}' is defined twice")]
    DuplicateId(String),
    #[error("building '{building}' requires zero {item:?}")]
    ZeroMaterialCount { building: String, item: CraftedItem },
}

/// Validated set of building specs, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct BuildingRegistry {
    specs: Vec<BuildingSpec>,
}

impl BuildingRegistry {
    pub fn new(specs: Vec<BuildingSpec>) -> Result<Self, RegistryError> {
        for (i, spec) in specs.iter().enumerate() {
            if spec.id.is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if specs[..i].iter().any(|s| s.id == spec.id) {
                return Err(RegistryError::DuplicateId(spec.id.clone()));
            }
            if let Some((&item, _)) = spec.required_materials.iter().find(|(_, &n)| n == 0) {
                return Err(RegistryError::ZeroMaterialCount {
                    building: spec.id.clone(),
                    item,
                });
            }
        }
        Ok(Self { specs })
    }

    pub fn get(&self, id: &str) -> Option<&BuildingSpec> {
        self.specs.iter().find(|s| s.id == id)
    }

    pub fn specs(&self) -> &[BuildingSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str) -> BuildingSpec {
        BuildingSpec {
            id: id.to_string(),
            name: id.to_uppercase(),
            required_materials: CraftedStock::from([(CraftedItem::Mortar, 2)]),
            sciences: vec![Science::Geometry],
            has_sketch: true,
            has_quiz: false,
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = BuildingRegistry::new(vec![spec("aqueduct"), spec("pantheon")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("pantheon").map(|s| s.name.as_str()), Some("PANTHEON"));
        assert!(registry.get("parthenon").is_none());
    }

    #[test]
    fn test_registry_rejects_bad_specs() {
        assert_eq!(
            BuildingRegistry::new(vec![spec("a"), spec("a")]).unwrap_err(),
            RegistryError::DuplicateId("a".into())
        );
        assert_eq!(
            BuildingRegistry::new(vec![spec("")]).unwrap_err(),
            RegistryError::EmptyId
        );
        let mut zero = spec("b");
        zero.required_materials.insert(CraftedItem::Brick, 0);
        assert!(matches!(
            BuildingRegistry::new(vec![zero]),
            Err(RegistryError::ZeroMaterialCount {
                item: CraftedItem::Brick,
                ..
            })
        ));
    }
}
