//! Integration tests for the crafting pipeline.
//!
//! Exercises: Workbench → MixedBatch → Furnace → Ledger → construction gate
//!
//! All tests are pure logic; the clock is a plain number.

use keystone_logic::buildings::BuildingSpec;
use keystone_logic::furnace::{FiringOutcome, Furnace, FurnaceError, FurnaceStatus};
use keystone_logic::gate::{can_start_building, material_shortfall};
use keystone_logic::ledger::{CraftedStock, Ledger};
use keystone_logic::materials::{CraftedItem, Ingredients, Material};
use keystone_logic::progress::{BuildingProgress, Science};
use keystone_logic::recipes::{RecipeCatalog, Temperature};
use keystone_logic::workbench::{Workbench, WorkbenchError};

// ── Helpers ────────────────────────────────────────────────────────────

fn scenario_ledger() -> Ledger {
    Ledger::with_starting(
        0,
        &Ingredients::from([(Material::Limestone, 3), (Material::Water, 2)]),
    )
}

fn stage(bench: &mut Workbench, ledger: &Ledger, materials: &[Material]) {
    for &m in materials {
        bench.place(m, ledger).expect("placement should succeed");
    }
}

/// Mix, load, set the dial, start at t=0 and run to completion.
fn fire(
    bench: &mut Workbench,
    ledger: &mut Ledger,
    catalog: &RecipeCatalog,
    temperature: Temperature,
) -> FiringOutcome {
    let mut furnace = Furnace::new();
    let batch = bench.mix(ledger, catalog).expect("mix should succeed");
    let duration = batch.recipe.processing_secs;
    furnace.load(batch).unwrap();
    furnace.set_temperature(temperature).unwrap();
    furnace.start(0.0).unwrap();
    assert!(furnace.tick(duration * 0.5, ledger).is_none());
    furnace.tick(duration, ledger).expect("job should complete")
}

fn forum_gate() -> BuildingSpec {
    BuildingSpec {
        id: "forum".into(),
        name: "Forum".into(),
        required_materials: CraftedStock::from([(CraftedItem::Mortar, 2)]),
        sciences: vec![Science::Architecture],
        has_sketch: true,
        has_quiz: true,
    }
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn mortar_fired_at_medium() {
    let catalog = RecipeCatalog::standard();
    let mut ledger = scenario_ledger();
    let mut bench = Workbench::new();
    stage(
        &mut bench,
        &ledger,
        &[Material::Limestone, Material::Limestone, Material::Water],
    );

    let outcome = fire(&mut bench, &mut ledger, &catalog, Temperature::Medium);

    assert!(outcome.is_success());
    assert_eq!(ledger.raw(Material::Limestone), 1);
    assert_eq!(ledger.raw(Material::Water), 1);
    assert_eq!(ledger.crafted(CraftedItem::Mortar), 1);
}

#[test]
fn mortar_fired_too_cold_is_lost() {
    let catalog = RecipeCatalog::standard();
    let mut ledger = scenario_ledger();
    let mut bench = Workbench::new();
    stage(
        &mut bench,
        &ledger,
        &[Material::Limestone, Material::Limestone, Material::Water],
    );

    let outcome = fire(&mut bench, &mut ledger, &catalog, Temperature::Low);

    assert!(!outcome.is_success());
    assert_eq!(ledger.crafted(CraftedItem::Mortar), 0);
    assert_eq!(ledger.raw(Material::Limestone), 1);
    assert_eq!(ledger.raw(Material::Water), 1);
}

#[test]
fn unmatched_mix_leaves_ledger_alone() {
    let catalog = RecipeCatalog::standard();
    let mut ledger = Ledger::with_starting(
        0,
        &Ingredients::from([(Material::Sand, 1), (Material::Clay, 1)]),
    );
    let before = ledger.clone();
    let mut bench = Workbench::new();
    stage(&mut bench, &ledger, &[Material::Sand, Material::Clay]);

    assert!(bench.resolve_recipe(&catalog).is_none());
    assert_eq!(
        bench.mix(&mut ledger, &catalog),
        Err(WorkbenchError::NoRecipeMatch)
    );
    assert_eq!(ledger, before);
}

#[test]
fn shortfall_then_craft_opens_gate() {
    let catalog = RecipeCatalog::standard();
    let spec = forum_gate();
    let mut progress = BuildingProgress::default();
    progress.earn_badge(Science::Architecture);
    progress.mark_sketch_complete();
    progress.mark_quiz_passed();

    let mut ledger = Ledger::new();
    ledger.credit_crafted_item(CraftedItem::Mortar, 1);
    assert!(!can_start_building(&spec, &progress, &ledger));

    let shortfall = material_shortfall(&spec, &ledger, &catalog);
    assert_eq!(
        shortfall.raw,
        Ingredients::from([(Material::Limestone, 2), (Material::Water, 1)])
    );
    assert_eq!(shortfall.total_cost, 7);

    // Buy exactly the shortfall, then craft one more mortar.
    ledger.add_currency(shortfall.total_cost);
    ledger.purchase_raw_materials(&shortfall.raw).unwrap();
    assert_eq!(ledger.currency(), 0);

    let mut bench = Workbench::new();
    stage(
        &mut bench,
        &ledger,
        &[Material::Water, Material::Limestone, Material::Limestone],
    );
    fire(&mut bench, &mut ledger, &catalog, Temperature::Medium);

    assert_eq!(ledger.crafted(CraftedItem::Mortar), 2);
    assert!(can_start_building(&spec, &progress, &ledger));
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn raw_materials_are_conserved_across_firings() {
    let catalog = RecipeCatalog::standard();
    let mut ledger = Ledger::with_starting(
        0,
        &Ingredients::from([
            (Material::Limestone, 10),
            (Material::Water, 10),
            (Material::Clay, 6),
            (Material::Sand, 6),
        ]),
    );
    let start_total = ledger.total_raw_units();
    let mut consumed = 0u64;

    let batches: [&[Material]; 4] = [
        &[Material::Limestone, Material::Limestone, Material::Water],
        &[Material::Clay, Material::Clay, Material::Sand],
        &[Material::Limestone, Material::Water, Material::Water],
        &[Material::Sand, Material::Sand, Material::Sand, Material::Limestone],
    ];
    for (i, batch) in batches.iter().enumerate() {
        let mut bench = Workbench::new();
        stage(&mut bench, &ledger, batch);
        consumed += batch.len() as u64;
        // Alternate good and bad dials; conservation holds either way.
        let dial = if i % 2 == 0 {
            bench.resolve_recipe(&catalog).unwrap().required_temperature
        } else {
            Temperature::Low
        };
        fire(&mut bench, &mut ledger, &catalog, dial);
    }

    assert_eq!(start_total - ledger.total_raw_units(), consumed);
}

#[test]
fn second_load_always_rejected() {
    let catalog = RecipeCatalog::standard();
    let mut ledger = Ledger::with_starting(
        0,
        &Ingredients::from([(Material::Limestone, 4), (Material::Water, 2)]),
    );
    let mut bench = Workbench::new();
    stage(
        &mut bench,
        &ledger,
        &[Material::Limestone, Material::Limestone, Material::Water],
    );
    let first = bench.mix(&mut ledger, &catalog).unwrap();
    stage(
        &mut bench,
        &ledger,
        &[Material::Limestone, Material::Limestone, Material::Water],
    );
    let second = bench.mix(&mut ledger, &catalog).unwrap();

    let mut furnace = Furnace::new();
    furnace.load(first).unwrap();
    assert_eq!(
        furnace.load(second.clone()),
        Err(FurnaceError::Busy(FurnaceStatus::Loaded))
    );
    furnace.start(0.0).unwrap();
    assert_eq!(
        furnace.load(second),
        Err(FurnaceError::Busy(FurnaceStatus::Processing))
    );
}
