//! Keystone Headless Workshop Harness
//!
//! Validates workshop content and crafting invariants without any UI.
//! Runs entirely in-process: no rendering, no storage beyond memory.
//!
//! Usage:
//!   cargo run -p keystone-simtest
//!   cargo run -p keystone-simtest -- --verbose

use keystone_core::config::SessionConfig;
use keystone_core::data;
use keystone_core::engine::{SessionError, WorkshopSession};
use keystone_logic::buildings::BuildingSpec;
use keystone_logic::furnace::{FiringOutcome, FurnaceError, FurnaceStatus};
use keystone_logic::gate;
use keystone_logic::ledger::Ledger;
use keystone_logic::materials::{CraftedItem, Ingredients, Material};
use keystone_logic::progress::{BuildingProgress, Science};
use keystone_logic::recipes::{RecipeCatalog, Temperature};
use keystone_logic::workbench::{Workbench, WorkbenchError, WORKBENCH_SLOTS};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SEED: u64 = 42;
const SWEEP_ROUNDS: usize = 500;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Keystone Workshop Harness ===\n");

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut results = Vec::new();

    // 1. Content files
    results.extend(validate_content());

    // 2. Recipe resolution ignores placement order
    results.extend(validate_recipe_determinism(&mut rng));

    // 3. Raw material conservation under random play
    results.extend(validate_conservation(&mut rng));

    // 4. Single furnace job
    results.extend(validate_single_job());

    // 5. Temperature policy
    results.extend(validate_temperature_gate());

    // 6. Gate monotonicity
    results.extend(validate_gate_monotonicity(&mut rng));

    // 7. Reference scenarios
    results.extend(validate_scenarios());

    // 8. Save/load mid-firing
    results.extend(validate_resume());

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    println!();
    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Content ──────────────────────────────────────────────────────────

fn validate_content() -> Vec<TestResult> {
    println!("--- Content ---");
    let mut results = Vec::new();

    let catalog = match data::standard_recipes() {
        Ok(c) => c,
        Err(e) => {
            results.push(check("recipes_parse", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check(
        "recipes_match_builtin",
        catalog.recipes() == RecipeCatalog::standard().recipes(),
        format!("{} recipes in data/recipes.json", catalog.len()),
    ));

    let oversized: Vec<_> = catalog
        .recipes()
        .iter()
        .filter(|r| r.ingredients.values().sum::<u32>() as usize > WORKBENCH_SLOTS)
        .map(|r| r.output.id())
        .collect();
    results.push(check(
        "recipes_fit_workbench",
        oversized.is_empty(),
        if oversized.is_empty() {
            "every recipe fits in four slots".to_string()
        } else {
            format!("oversized: {}", oversized.join(", "))
        },
    ));

    let registry = match data::standard_buildings() {
        Ok(r) => r,
        Err(e) => {
            results.push(check("buildings_parse", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check(
        "buildings_not_empty",
        !registry.is_empty(),
        format!("{} buildings loaded", registry.len()),
    ));

    let uncraftable: Vec<String> = registry
        .specs()
        .iter()
        .flat_map(|spec| {
            spec.required_materials
                .keys()
                .filter(|item| catalog.producing(**item).is_none())
                .map(move |item| format!("{}:{}", spec.id, item.id()))
        })
        .collect();
    results.push(check(
        "buildings_need_craftable_items",
        uncraftable.is_empty(),
        if uncraftable.is_empty() {
            "every required item has a recipe".to_string()
        } else {
            format!("no recipe for {}", uncraftable.join(", "))
        },
    ));

    results
}

// ── 2. Recipe determinism ───────────────────────────────────────────────

fn validate_recipe_determinism(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Recipe Determinism ---");
    let catalog = RecipeCatalog::standard();
    let ledger = Ledger::with_starting(
        0,
        &Material::ALL.iter().map(|m| (*m, 10)).collect::<Ingredients>(),
    );
    let mut mismatches = 0;
    let mut resolved = 0;

    for _ in 0..SWEEP_ROUNDS {
        let count = rng.gen_range(1..=WORKBENCH_SLOTS);
        let mut picks: Vec<Material> = (0..count)
            .map(|_| *Material::ALL.choose(rng).unwrap_or(&Material::Water))
            .collect();
        // Bias half the rounds toward real recipes so both outcomes are covered.
        if rng.gen_bool(0.5) {
            if let Some(recipe) = catalog.recipes().choose(rng) {
                picks = recipe
                    .ingredients
                    .iter()
                    .flat_map(|(m, n)| std::iter::repeat(*m).take(*n as usize))
                    .collect();
            }
        }

        let mut first = None;
        for attempt in 0..4 {
            picks.shuffle(rng);
            let mut bench = Workbench::new();
            for m in &picks {
                let _ = bench.place(*m, &ledger);
            }
            let output = bench.resolve_recipe(&catalog).map(|r| r.output);
            if attempt == 0 {
                first = Some(output);
            } else if first != Some(output) {
                mismatches += 1;
            }
        }
        if matches!(first, Some(Some(_))) {
            resolved += 1;
        }
    }

    vec![check(
        "resolution_order_independent",
        mismatches == 0,
        format!(
            "{} rounds, {} resolved to a recipe, {} order-dependent results",
            SWEEP_ROUNDS, resolved, mismatches
        ),
    )]
}

// ── 3. Conservation ─────────────────────────────────────────────────────

fn validate_conservation(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Conservation ---");
    let config = SessionConfig {
        starting_currency: 0,
        starting_materials: Material::ALL.iter().map(|m| (*m, 40)).collect(),
        time_scale: 1.0,
    };
    let mut session = match WorkshopSession::with_defaults(&config) {
        Ok(s) => s,
        Err(e) => return vec![check("conservation_session", false, format!("{}", e))],
    };

    let start_raw = session.ledger().total_raw_units();
    let mut consumed: u64 = 0;
    let mut mixes = 0;
    let mut fired = 0;
    let mut spoiled = 0;
    let mut unexpected = Vec::new();

    for _ in 0..SWEEP_ROUNDS {
        match rng.gen_range(0..6) {
            0..=2 => {
                let m = *Material::ALL.choose(rng).unwrap_or(&Material::Water);
                let _ = session.place(m);
            }
            3 => {
                let staged = session.workbench().contents();
                match session.mix() {
                    Ok(_) => {
                        mixes += 1;
                        consumed += staged.values().map(|&n| u64::from(n)).sum::<u64>();
                        let dial = *Temperature::ALL.choose(rng).unwrap_or(&Temperature::Low);
                        let _ = session.set_temperature(dial);
                        if let Err(e) = session.start_firing() {
                            unexpected.push(format!("start: {}", e));
                        }
                    }
                    Err(SessionError::Workbench(WorkbenchError::NoRecipeMatch))
                    | Err(SessionError::Furnace(FurnaceError::Busy(_))) => {
                        session.clear_workbench();
                    }
                    Err(e) => unexpected.push(format!("mix: {}", e)),
                }
            }
            _ => match session.update(rng.gen_range(0.5..4.0)) {
                Some(FiringOutcome::Fired { .. }) => fired += 1,
                Some(FiringOutcome::Spoiled { .. }) => spoiled += 1,
                None => {}
            },
        }
    }

    let end_raw = session.ledger().total_raw_units();
    vec![
        check(
            "raw_conservation",
            start_raw - end_raw == consumed,
            format!(
                "start {} end {} consumed by {} mixes {}",
                start_raw, end_raw, mixes, consumed
            ),
        ),
        check(
            "firings_accounted",
            fired + spoiled <= mixes,
            format!("{} fired, {} spoiled of {} mixes", fired, spoiled, mixes),
        ),
        check(
            "no_unexpected_errors",
            unexpected.is_empty(),
            if unexpected.is_empty() {
                "all rejections were expected kinds".to_string()
            } else {
                unexpected.join("; ")
            },
        ),
    ]
}

// ── 4. Single job ───────────────────────────────────────────────────────

fn stage_mortar(session: &mut WorkshopSession) -> Result<(), SessionError> {
    for m in [Material::Limestone, Material::Limestone, Material::Water] {
        session.place(m)?;
    }
    Ok(())
}

fn validate_single_job() -> Vec<TestResult> {
    println!("--- Single Furnace Job ---");
    let config = SessionConfig {
        starting_currency: 0,
        starting_materials: Ingredients::from([(Material::Limestone, 6), (Material::Water, 3)]),
        time_scale: 1.0,
    };
    let mut session = match WorkshopSession::with_defaults(&config) {
        Ok(s) => s,
        Err(e) => return vec![check("single_job_session", false, format!("{}", e))],
    };

    let mut results = Vec::new();
    let first = stage_mortar(&mut session).and_then(|_| session.mix().map(|_| ()));
    results.push(check("first_mix_loads", first.is_ok(), format!("{:?}", first)));

    let _ = stage_mortar(&mut session);
    let while_loaded = session.mix();
    results.push(check(
        "mix_rejected_while_loaded",
        matches!(
            while_loaded,
            Err(SessionError::Furnace(FurnaceError::Busy(FurnaceStatus::Loaded)))
        ),
        format!("{:?}", while_loaded.map_err(|e| e.to_string())),
    ));

    let _ = session.start_firing();
    let while_processing = session.mix();
    results.push(check(
        "mix_rejected_while_processing",
        matches!(
            while_processing,
            Err(SessionError::Furnace(FurnaceError::Busy(FurnaceStatus::Processing)))
        ),
        format!("{:?}", while_processing.map_err(|e| e.to_string())),
    ));
    results.push(check(
        "rejected_mix_kept_stock",
        session.ledger().raw(Material::Limestone) == 4,
        format!("{} limestone left", session.ledger().raw(Material::Limestone)),
    ));
    results
}

// ── 5. Temperature policy ───────────────────────────────────────────────

fn validate_temperature_gate() -> Vec<TestResult> {
    println!("--- Temperature Policy ---");
    let catalog = RecipeCatalog::standard();
    let mut wrong = Vec::new();

    for recipe in catalog.recipes() {
        for dial in Temperature::ALL {
            let config = SessionConfig {
                starting_currency: 0,
                starting_materials: recipe.ingredients.clone(),
                time_scale: 1.0,
            };
            let Ok(mut session) = WorkshopSession::with_defaults(&config) else {
                wrong.push(format!("{}: session", recipe.output.id()));
                continue;
            };
            for (m, n) in &recipe.ingredients {
                for _ in 0..*n {
                    let _ = session.place(*m);
                }
            }
            if session.mix().is_err()
                || session.set_temperature(dial).is_err()
                || session.start_firing().is_err()
            {
                wrong.push(format!("{} at {:?}: setup failed", recipe.output.id(), dial));
                continue;
            }
            session.update(recipe.processing_secs + 1.0);

            let produced = session.ledger().crafted(recipe.output);
            let expected = u32::from(dial == recipe.required_temperature);
            let refunded = session.ledger().total_raw_units();
            if produced != expected || refunded != 0 {
                wrong.push(format!(
                    "{} at {:?}: produced {}, {} raw refunded",
                    recipe.output.id(),
                    dial,
                    produced,
                    refunded
                ));
            }
        }
    }

    vec![check(
        "wrong_temperature_loses_batch",
        wrong.is_empty(),
        if wrong.is_empty() {
            format!(
                "{} recipe × dial combinations behaved",
                catalog.len() * Temperature::ALL.len()
            )
        } else {
            wrong.join("; ")
        },
    )]
}

// ── 6. Gate monotonicity ────────────────────────────────────────────────

fn random_progress(rng: &mut StdRng) -> BuildingProgress {
    let mut progress = BuildingProgress::default();
    for s in Science::ALL {
        if rng.gen_bool(0.7) {
            progress.earn_badge(s);
        }
    }
    if rng.gen_bool(0.7) {
        progress.mark_sketch_complete();
    }
    if rng.gen_bool(0.7) {
        progress.mark_quiz_passed();
    }
    progress
}

fn validate_gate_monotonicity(rng: &mut StdRng) -> Vec<TestResult> {
    println!("--- Gate Monotonicity ---");
    let registry = match data::standard_buildings() {
        Ok(r) => r,
        Err(e) => return vec![check("gate_buildings", false, format!("{}", e))],
    };
    let specs: &[BuildingSpec] = registry.specs();
    let mut open = 0;
    let mut violations = 0;

    for _ in 0..SWEEP_ROUNDS {
        let Some(spec) = specs.choose(rng) else {
            break;
        };
        let mut progress = random_progress(rng);
        let mut ledger = Ledger::new();
        for item in CraftedItem::ALL {
            ledger.credit_crafted_item(item, rng.gen_range(0..4));
        }
        if !gate::can_start_building(spec, &progress, &ledger) {
            continue;
        }
        open += 1;

        // Grow everything and re-check.
        for item in CraftedItem::ALL {
            ledger.credit_crafted_item(item, rng.gen_range(0..3));
        }
        ledger.add_raw_materials(&Ingredients::from([(Material::Sand, 5)]));
        ledger.add_currency(10);
        progress.earn_badge(*Science::ALL.choose(rng).unwrap_or(&Science::Geometry));
        progress.mark_lesson_read();
        if !gate::can_start_building(spec, &progress, &ledger) {
            violations += 1;
        }
    }

    vec![check(
        "gate_monotone",
        violations == 0,
        format!("{} open gates re-checked, {} closed again", open, violations),
    )]
}

// ── 7. Scenarios ────────────────────────────────────────────────────────

fn run_to_completion(session: &mut WorkshopSession) -> Option<FiringOutcome> {
    for _ in 0..10_000 {
        if let Some(outcome) = session.update(1.0 / 60.0) {
            return Some(outcome);
        }
    }
    None
}

fn scenario_session(raw: &[(Material, u32)]) -> Result<WorkshopSession, SessionError> {
    let config = SessionConfig {
        starting_currency: 0,
        starting_materials: raw.iter().copied().collect(),
        time_scale: 1.0,
    };
    WorkshopSession::with_defaults(&config)
}

fn validate_scenarios() -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    // A/B: mortar at the right and the wrong temperature
    for (name, dial, expected) in [
        ("scenario_a_medium", Temperature::Medium, 1),
        ("scenario_b_low", Temperature::Low, 0),
    ] {
        let outcome = scenario_session(&[(Material::Limestone, 3), (Material::Water, 2)])
            .and_then(|mut s| {
                stage_mortar(&mut s)?;
                s.mix()?;
                let after_mix = (
                    s.ledger().raw(Material::Limestone),
                    s.ledger().raw(Material::Water),
                );
                s.set_temperature(dial)?;
                s.start_firing()?;
                run_to_completion(&mut s);
                Ok((
                    after_mix,
                    s.ledger().crafted(CraftedItem::Mortar),
                    s.ledger().raw(Material::Limestone),
                ))
            });
        let passed = matches!(outcome, Ok(((1, 1), crafted, 1)) if crafted == expected);
        results.push(check(
            name,
            passed,
            format!("{:?}", outcome.map_err(|e| e.to_string())),
        ));
    }

    // C: sand + clay has no recipe
    let c = scenario_session(&[(Material::Sand, 1), (Material::Clay, 1)]).and_then(|mut s| {
        s.place(Material::Sand)?;
        s.place(Material::Clay)?;
        let before = s.ledger().clone();
        let resolved = s.resolve_recipe().is_some();
        let mix = s.mix();
        Ok((
            resolved,
            matches!(mix, Err(SessionError::Workbench(WorkbenchError::NoRecipeMatch))),
            s.ledger() == &before,
        ))
    });
    results.push(check(
        "scenario_c_no_recipe",
        matches!(c, Ok((false, true, true))),
        format!("{:?}", c.map_err(|e| e.to_string())),
    ));

    // D: one more mortar closes a two-mortar requirement
    let d = scenario_session(&[]).and_then(|mut s| {
        let spec = BuildingSpec {
            id: "wall".into(),
            name: "Wall".into(),
            required_materials: [(CraftedItem::Mortar, 2)].into_iter().collect(),
            sciences: vec![],
            has_sketch: false,
            has_quiz: false,
        };
        let mut ledger = s.ledger().clone();
        ledger.credit_crafted_item(CraftedItem::Mortar, 1);
        let shortfall = gate::material_shortfall(&spec, &ledger, s.catalog());
        let before = gate::can_start_building(&spec, &BuildingProgress::default(), &ledger);

        s.add_raw_materials(&shortfall.raw);
        stage_mortar(&mut s)?;
        s.mix()?;
        s.set_temperature(Temperature::Medium)?;
        s.start_firing()?;
        run_to_completion(&mut s);
        ledger.credit_crafted_item(CraftedItem::Mortar, s.ledger().crafted(CraftedItem::Mortar));
        let after = gate::can_start_building(&spec, &BuildingProgress::default(), &ledger);
        Ok((shortfall.raw, shortfall.total_cost, before, after))
    });
    let expected_raw = Ingredients::from([(Material::Limestone, 2), (Material::Water, 1)]);
    results.push(check(
        "scenario_d_shortfall",
        matches!(&d, Ok((raw, 7, false, true)) if *raw == expected_raw),
        format!("{:?}", d.map_err(|e| e.to_string())),
    ));

    results
}

// ── 8. Resume ───────────────────────────────────────────────────────────

fn validate_resume() -> Vec<TestResult> {
    println!("--- Save/Load Resume ---");
    let run = || -> Result<(FurnaceStatus, u32), String> {
        let mut session = scenario_session(&[(Material::Limestone, 2), (Material::Water, 1)])
            .map_err(|e| e.to_string())?;
        stage_mortar(&mut session).map_err(|e| e.to_string())?;
        session.mix().map_err(|e| e.to_string())?;
        session
            .set_temperature(Temperature::Medium)
            .map_err(|e| e.to_string())?;
        session.start_firing().map_err(|e| e.to_string())?;
        session.update(1.5);

        let mut buffer = Vec::new();
        session.save(&mut buffer).map_err(|e| e.to_string())?;
        drop(session);

        let mut restored = scenario_session(&[]).map_err(|e| e.to_string())?;
        restored.load(buffer.as_slice()).map_err(|e| e.to_string())?;
        let status = restored.furnace_status();
        run_to_completion(&mut restored);
        restored.update(60.0);
        Ok((status, restored.ledger().crafted(CraftedItem::Mortar)))
    };
    let result = run();
    vec![check(
        "resume_mid_firing",
        matches!(result, Ok((FurnaceStatus::Processing, 1))),
        format!("{:?}", result),
    )]
}
