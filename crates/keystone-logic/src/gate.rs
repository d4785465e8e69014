//! Construction gate: may a building begin construction?
//!
//! A building is clear when every applicable check passes:
//!
//! 1. A badge for each science the building lists
//! 2. The sketch, if the building has sketch content
//! 3. The quiz, if the building has quiz content
//! 4. Enough crafted stock for every required material
//!
//! Every check only asks for "at least", so earning more badges or stock
//! can never close a gate that is already open.
//!
//! When crafted stock is short, [`material_shortfall`] walks the recipe
//! catalog backward to price the raw materials still missing.
//!
//! ```
//! use keystone_logic::buildings::BuildingSpec;
//! use keystone_logic::gate::can_start_building;
//! use keystone_logic::ledger::Ledger;
//! use keystone_logic::progress::BuildingProgress;
//!
//! let spec = BuildingSpec {
//!     id: "shed".into(),
//!     name: "Shed".into(),
//!     required_materials: Default::default(),
//!     sciences: vec![],
//!     has_sketch: false,
//!     has_quiz: false,
//! };
//! assert!(can_start_building(&spec, &BuildingProgress::default(), &Ledger::new()));
//! ```

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingSpec;
use crate::ledger::{CraftedStock, Ledger};
use crate::materials::{purchase_cost, CraftedItem, Ingredients};
use crate::progress::{BuildingProgress, Science};
use crate::recipes::RecipeCatalog;

/// Which checks a building currently fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub missing_badges: Vec<Science>,
    pub sketch_pending: bool,
    pub quiz_pending: bool,
    /// Additional crafted units still needed, per item.
    pub material_deficits: CraftedStock,
}

impl GateReport {
    pub fn is_clear(&self) -> bool {
        self.missing_badges.is_empty()
            && !self.sketch_pending
            && !self.quiz_pending
            && self.material_deficits.is_empty()
    }
}

/// Evaluate every check for one building.
pub fn gate_report(
    spec: &BuildingSpec,
    progress: &BuildingProgress,
    ledger: &Ledger,
) -> GateReport {
    let mut missing_badges: Vec<Science> = Vec::new();
    for &science in &spec.sciences {
        if !progress.has_badge(science) && !missing_badges.contains(&science) {
            missing_badges.push(science);
        }
    }

    GateReport {
        missing_badges,
        sketch_pending: spec.has_sketch && !progress.sketch_completed,
        quiz_pending: spec.has_quiz && !progress.quiz_passed,
        material_deficits: crafted_deficits(spec, ledger),
    }
}

pub fn can_start_building(
    spec: &BuildingSpec,
    progress: &BuildingProgress,
    ledger: &Ledger,
) -> bool {
    gate_report(spec, progress, ledger).is_clear()
}

fn crafted_deficits(spec: &BuildingSpec, ledger: &Ledger) -> CraftedStock {
    spec.required_materials
        .iter()
        .filter_map(|(&item, &needed)| {
            let short = needed.saturating_sub(ledger.crafted(item));
            (short > 0).then_some((item, short))
        })
        .collect()
}

/// Raw materials (and their price) still missing for a building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Additional crafted units needed.
    pub crafted: CraftedStock,
    /// Raw deficit after subtracting stock on hand.
    pub raw: Ingredients,
    /// Shop price of `raw`.
    pub total_cost: u64,
    /// Short items no recipe produces; these cannot be bought.
    pub uncraftable: Vec<CraftedItem>,
}

impl Shortfall {
    pub fn is_empty(&self) -> bool {
        self.crafted.is_empty()
    }

    /// Whether buying the raw deficit would fully cover the building.
    pub fn is_purchasable(&self) -> bool {
        self.uncraftable.is_empty()
    }
}

/// Price out the raw materials still missing to craft a building's
/// outstanding requirements. Counts saturate at `u32::MAX` rather than
/// wrapping, so an oversized requirement prices out as unaffordable.
pub fn material_shortfall(
    spec: &BuildingSpec,
    ledger: &Ledger,
    catalog: &RecipeCatalog,
) -> Shortfall {
    let crafted = crafted_deficits(spec, ledger);
    let mut needed = Ingredients::new();
    let mut uncraftable = Vec::new();

    for (&item, &short) in &crafted {
        let Some(recipe) = catalog.producing(item) else {
            uncraftable.push(item);
            continue;
        };
        for (&material, &per_unit) in &recipe.ingredients {
            let total = needed.entry(material).or_insert(0);
            *total = total.saturating_add(per_unit.saturating_mul(short));
        }
    }

    let raw: Ingredients = needed
        .into_iter()
        .filter_map(|(material, total)| {
            let deficit = total.saturating_sub(ledger.raw(material));
            (deficit > 0).then_some((material, deficit))
        })
        .collect();
    let total_cost = purchase_cost(&raw);

    Shortfall {
        crafted,
        raw,
        total_cost,
        uncraftable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;

    fn aqueduct() -> BuildingSpec {
        BuildingSpec {
            id: "aqueduct".into(),
            name: "Aqueduct".into(),
            required_materials: CraftedStock::from([(CraftedItem::Mortar, 2)]),
            sciences: vec![Science::Hydraulics, Science::Geometry],
            has_sketch: true,
            has_quiz: true,
        }
    }

    fn finished_progress() -> BuildingProgress {
        let mut p = BuildingProgress::default();
        p.earn_badge(Science::Hydraulics);
        p.earn_badge(Science::Geometry);
        p.mark_sketch_complete();
        p.mark_quiz_passed();
        p
    }

    #[test]
    fn test_report_lists_every_failure() {
        let report = gate_report(&aqueduct(), &BuildingProgress::default(), &Ledger::new());
        assert_eq!(
            report.missing_badges,
            vec![Science::Hydraulics, Science::Geometry]
        );
        assert!(report.sketch_pending);
        assert!(report.quiz_pending);
        assert_eq!(report.material_deficits.get(&CraftedItem::Mortar), Some(&2));
        assert!(!report.is_clear());
    }

    #[test]
    fn test_optional_checks_skipped() {
        let mut spec = aqueduct();
        spec.has_sketch = false;
        spec.has_quiz = false;
        spec.sciences.clear();
        spec.required_materials.clear();
        assert!(can_start_building(&spec, &BuildingProgress::default(), &Ledger::new()));
    }

    #[test]
    fn test_gate_opens_with_everything() {
        let mut ledger = Ledger::new();
        ledger.credit_crafted_item(CraftedItem::Mortar, 2);
        assert!(can_start_building(&aqueduct(), &finished_progress(), &ledger));
    }

    #[test]
    fn test_gate_is_monotone() {
        let mut ledger = Ledger::new();
        ledger.credit_crafted_item(CraftedItem::Mortar, 2);
        let mut progress = finished_progress();
        assert!(can_start_building(&aqueduct(), &progress, &ledger));

        ledger.credit_crafted_item(CraftedItem::Mortar, 5);
        ledger.credit_crafted_item(CraftedItem::Glass, 1);
        progress.earn_badge(Science::Astronomy);
        progress.mark_lesson_read();
        assert!(can_start_building(&aqueduct(), &progress, &ledger));
    }

    #[test]
    fn test_shortfall_for_one_more_mortar() {
        let mut ledger = Ledger::new();
        ledger.credit_crafted_item(CraftedItem::Mortar, 1);
        let shortfall = material_shortfall(&aqueduct(), &ledger, &RecipeCatalog::standard());
        assert_eq!(shortfall.crafted, CraftedStock::from([(CraftedItem::Mortar, 1)]));
        assert_eq!(
            shortfall.raw,
            Ingredients::from([(Material::Limestone, 2), (Material::Water, 1)])
        );
        assert_eq!(shortfall.total_cost, 2 * 3 + 1);
        assert!(shortfall.is_purchasable());
    }

    #[test]
    fn test_shortfall_subtracts_raw_on_hand() {
        let mut ledger = Ledger::new();
        ledger.add_raw_materials(&Ingredients::from([
            (Material::Limestone, 3),
            (Material::Water, 5),
        ]));
        let shortfall = material_shortfall(&aqueduct(), &ledger, &RecipeCatalog::standard());
        // Two mortar need 4 limestone and 2 water.
        assert_eq!(shortfall.raw, Ingredients::from([(Material::Limestone, 1)]));
        assert_eq!(shortfall.total_cost, 3);
    }

    #[test]
    fn test_shortfall_flags_uncraftable_items() {
        let catalog = RecipeCatalog::new(vec![]).unwrap();
        let shortfall = material_shortfall(&aqueduct(), &Ledger::new(), &catalog);
        assert_eq!(shortfall.uncraftable, vec![CraftedItem::Mortar]);
        assert!(shortfall.raw.is_empty());
        assert!(!shortfall.is_purchasable());
    }

    #[test]
    fn test_shortfall_saturates_on_huge_requirements() {
        let mut spec = aqueduct();
        spec.required_materials = CraftedStock::from([
            (CraftedItem::Mortar, 3_000_000_000),
            (CraftedItem::LimePlaster, u32::MAX),
        ]);
        let shortfall = material_shortfall(&spec, &Ledger::new(), &RecipeCatalog::standard());
        assert_eq!(shortfall.raw.get(&Material::Limestone), Some(&u32::MAX));
        assert!(shortfall.total_cost >= 3 * u64::from(u32::MAX));
    }

    #[test]
    fn test_no_shortfall_when_stocked() {
        let mut ledger = Ledger::new();
        ledger.credit_crafted_item(CraftedItem::Mortar, 3);
        let shortfall = material_shortfall(&aqueduct(), &ledger, &RecipeCatalog::standard());
        assert!(shortfall.is_empty());
        assert_eq!(shortfall.total_cost, 0);
    }
}
