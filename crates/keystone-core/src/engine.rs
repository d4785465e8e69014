//! Workshop session - main entry point for driving the engine.
//!
//! One [`WorkshopSession`] exists per active player session. It owns every
//! piece of mutable workshop state and is passed by reference to whatever
//! drives it; there is no process-wide instance. Because every command
//! takes `&mut self`, ledger mutations can never interleave.

use std::collections::BTreeSet;

use keystone_logic::buildings::{BuildingRegistry, BuildingSpec};
use keystone_logic::furnace::{FiringOutcome, Furnace, FurnaceError, FurnaceStatus};
use keystone_logic::gate::{self, GateReport, Shortfall};
use keystone_logic::ledger::{Ledger, LedgerError};
use keystone_logic::materials::{CraftedItem, Ingredients, Material};
use keystone_logic::progress::{BuildingId, BuildingProgress, ProgressBook};
use keystone_logic::recipes::{Recipe, RecipeCatalog, Temperature};
use keystone_logic::workbench::{Workbench, WorkbenchError};
use thiserror::Error;

use crate::config::{validate_config, SessionConfig};
use crate::data::{self, DataError};

/// Errors returned by session commands. None of them leave the session in
/// a partially updated state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Workbench(#[from] WorkbenchError),
    #[error(transparent)]
    Furnace(#[from] FurnaceError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
    #[error("unknown building '{0}'")]
    UnknownBuilding(String),
    #[error("building '{building}' cannot start yet")]
    GateClosed {
        building: String,
        report: GateReport,
    },
    #[error("building '{0}' is already under construction")]
    AlreadyStarted(String),
    #[error("no recipe produces {0:?}; it cannot be bought")]
    Uncraftable(Vec<CraftedItem>),
}

/// Main workshop engine.
pub struct WorkshopSession {
    pub(crate) catalog: RecipeCatalog,
    pub(crate) buildings: BuildingRegistry,
    pub(crate) ledger: Ledger,
    pub(crate) workbench: Workbench,
    pub(crate) furnace: Furnace,
    pub(crate) progress: ProgressBook,
    pub(crate) started: BTreeSet<BuildingId>,
    /// Completed firings not yet collected by the UI.
    pub(crate) outcomes: Vec<FiringOutcome>,
    /// Session time in seconds.
    pub(crate) clock: f64,
    pub(crate) time_scale: f64,
}

impl WorkshopSession {
    /// Create a session from explicit content.
    pub fn new(
        config: &SessionConfig,
        catalog: RecipeCatalog,
        buildings: BuildingRegistry,
    ) -> Result<Self, SessionError> {
        let errors = validate_config(config);
        if !errors.is_empty() {
            return Err(SessionError::InvalidConfig(errors.join("; ")));
        }
        log::info!(
            "Workshop session opened: {} recipes, {} buildings, {} currency",
            catalog.len(),
            buildings.len(),
            config.starting_currency
        );
        Ok(Self {
            catalog,
            buildings,
            ledger: Ledger::with_starting(config.starting_currency, &config.starting_materials),
            workbench: Workbench::new(),
            furnace: Furnace::new(),
            progress: ProgressBook::new(),
            started: BTreeSet::new(),
            outcomes: Vec::new(),
            clock: 0.0,
            time_scale: config.time_scale,
        })
    }

    /// Session using the built-in recipes and buildings.
    pub fn with_defaults(config: &SessionConfig) -> Result<Self, SessionError> {
        Self::new(config, RecipeCatalog::standard(), data::standard_buildings()?)
    }

    // ── Read-only views ─────────────────────────────────────────────────

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    pub fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn workbench(&self) -> &Workbench {
        &self.workbench
    }

    pub fn furnace(&self) -> &Furnace {
        &self.furnace
    }

    /// Current session time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set clock multiplier (1.0 = real time). Non-positive values are ignored.
    pub fn set_time_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.time_scale = scale;
        }
    }

    // ── Clock ───────────────────────────────────────────────────────────

    /// Advance the clock by `delta_secs` of wall time and complete the
    /// furnace job if it is due. A late or repeated call never completes a
    /// job twice.
    pub fn update(&mut self, delta_secs: f64) -> Option<FiringOutcome> {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.clock += delta_secs * self.time_scale;
        }
        let outcome = self.furnace.tick(self.clock, &mut self.ledger)?;
        self.outcomes.push(outcome.clone());
        Some(outcome)
    }

    /// Hand completed firings to the UI. Each outcome is returned once.
    pub fn drain_outcomes(&mut self) -> Vec<FiringOutcome> {
        std::mem::take(&mut self.outcomes)
    }

    pub fn pending_outcomes(&self) -> &[FiringOutcome] {
        &self.outcomes
    }

    // ── Workbench ───────────────────────────────────────────────────────

    pub fn place(&mut self, material: Material) -> Result<usize, SessionError> {
        self.workbench.place(material, &self.ledger).map_err(|e| {
            log::warn!("Cannot place {:?}: {}", material, e);
            SessionError::from(e)
        })
    }

    pub fn remove(&mut self, slot: usize) -> Result<Material, SessionError> {
        Ok(self.workbench.remove(slot)?)
    }

    pub fn clear_workbench(&mut self) {
        self.workbench.clear();
    }

    /// Leaving the workbench screen drops whatever is staged.
    pub fn leave_workbench(&mut self) {
        if !self.workbench.is_empty() {
            log::debug!("Workbench cleared on exit");
        }
        self.workbench.clear();
    }

    pub fn resolve_recipe(&self) -> Option<&Recipe> {
        self.workbench.resolve_recipe(&self.catalog)
    }

    /// Consume the staged materials and load them into the furnace.
    ///
    /// Refused with [`FurnaceError::Busy`] before anything is debited if
    /// the furnace is not idle.
    pub fn mix(&mut self) -> Result<CraftedItem, SessionError> {
        let status = self.furnace.status();
        if status != FurnaceStatus::Idle {
            log::warn!("Mix refused: furnace is {:?}", status);
            return Err(FurnaceError::Busy(status).into());
        }
        let batch = self
            .workbench
            .mix(&mut self.ledger, &self.catalog)
            .map_err(|e| {
                log::warn!("Mix failed: {}", e);
                SessionError::from(e)
            })?;
        let output = batch.recipe.output;
        self.furnace.load(batch)?;
        Ok(output)
    }

    // ── Furnace ─────────────────────────────────────────────────────────

    pub fn set_temperature(&mut self, temperature: Temperature) -> Result<(), SessionError> {
        Ok(self.furnace.set_temperature(temperature)?)
    }

    pub fn start_firing(&mut self) -> Result<(), SessionError> {
        Ok(self.furnace.start(self.clock)?)
    }

    /// Discard the loaded batch without refund.
    pub fn cancel_firing(&mut self) -> Result<(), SessionError> {
        self.furnace.cancel()?;
        Ok(())
    }

    pub fn furnace_status(&self) -> FurnaceStatus {
        self.furnace.status()
    }

    pub fn furnace_progress(&self) -> f64 {
        self.furnace.progress(self.clock)
    }

    // ── Ledger ──────────────────────────────────────────────────────────

    pub fn add_raw_materials(&mut self, materials: &Ingredients) {
        self.ledger.add_raw_materials(materials);
    }

    pub fn debit_raw_materials(&mut self, materials: &Ingredients) -> Result<(), SessionError> {
        Ok(self.ledger.debit_raw_materials(materials)?)
    }

    pub fn add_currency(&mut self, amount: u64) {
        self.ledger.add_currency(amount);
    }

    pub fn spend_currency(&mut self, amount: u64) -> Result<(), SessionError> {
        Ok(self.ledger.spend_currency(amount)?)
    }

    /// Buy raw materials at shop price; returns the amount spent.
    pub fn purchase(&mut self, order: &Ingredients) -> Result<u64, SessionError> {
        let spent = self.ledger.purchase_raw_materials(order)?;
        log::info!("Purchased {:?} for {}", order, spent);
        Ok(spent)
    }

    // ── Progress records ────────────────────────────────────────────────

    /// Snapshot of a building's record (defaults if never touched).
    pub fn progress(&self, building: &str) -> BuildingProgress {
        self.progress.get_or_default(building)
    }

    /// Mutable record for lesson, quiz and sketch collaborators.
    pub fn progress_mut(&mut self, building: &str) -> &mut BuildingProgress {
        self.progress.entry(building)
    }

    pub fn progress_book(&self) -> &ProgressBook {
        &self.progress
    }

    // ── Construction gate ───────────────────────────────────────────────

    fn spec(&self, building: &str) -> Result<&BuildingSpec, SessionError> {
        self.buildings
            .get(building)
            .ok_or_else(|| SessionError::UnknownBuilding(building.to_string()))
    }

    pub fn gate_report(&self, building: &str) -> Result<GateReport, SessionError> {
        let spec = self.spec(building)?;
        let progress = self.progress.get_or_default(building);
        Ok(gate::gate_report(spec, &progress, &self.ledger))
    }

    pub fn can_start_building(&self, building: &str) -> Result<bool, SessionError> {
        Ok(self.gate_report(building)?.is_clear())
    }

    pub fn material_shortfall(&self, building: &str) -> Result<Shortfall, SessionError> {
        let spec = self.spec(building)?;
        Ok(gate::material_shortfall(spec, &self.ledger, &self.catalog))
    }

    /// "Buy the rest": purchase the raw deficit for a building in one step.
    pub fn buy_shortfall(&mut self, building: &str) -> Result<Shortfall, SessionError> {
        let shortfall = self.material_shortfall(building)?;
        if !shortfall.is_purchasable() {
            return Err(SessionError::Uncraftable(shortfall.uncraftable));
        }
        self.ledger.purchase_raw_materials(&shortfall.raw)?;
        log::info!(
            "Bought shortfall for '{}': {:?} for {}",
            building,
            shortfall.raw,
            shortfall.total_cost
        );
        Ok(shortfall)
    }

    /// Start construction: consumes the building's crafted materials.
    pub fn begin_construction(&mut self, building: &str) -> Result<(), SessionError> {
        if self.started.contains(building) {
            return Err(SessionError::AlreadyStarted(building.to_string()));
        }
        let report = self.gate_report(building)?;
        if !report.is_clear() {
            log::warn!("Gate closed for '{}': {:?}", building, report);
            return Err(SessionError::GateClosed {
                building: building.to_string(),
                report,
            });
        }
        let required = self.spec(building)?.required_materials.clone();
        self.ledger.debit_crafted_items(&required)?;
        self.started.insert(building.to_string());
        log::info!("Construction started: {}", building);
        Ok(())
    }

    pub fn is_started(&self, building: &str) -> bool {
        self.started.contains(building)
    }

    pub fn started_buildings(&self) -> &BTreeSet<BuildingId> {
        &self.started
    }
}
