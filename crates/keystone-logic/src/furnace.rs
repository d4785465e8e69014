//! Single-slot timed furnace.
//!
//! # State Machine
//!
//! ```text
//! Idle --load--> Loaded --start--> Processing --tick (done)--> Idle
//!                  |
//!                  +--cancel--> Idle
//! ```
//!
//! A job records when it started and how long it runs, so progress is a
//! pure function of the caller's clock. Nothing here owns a timer; whoever
//! drives the session samples its clock and calls [`Furnace::tick`], and
//! completion fires exactly once no matter how often or late that happens.
//!
//! Materials are consumed at mix time. Neither cancelling a loaded batch
//! nor spoiling a firing refunds them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::Ledger;
use crate::materials::{CraftedItem, Ingredients};
use crate::recipes::{Recipe, Temperature};
use crate::workbench::MixedBatch;

/// Data-free view of the furnace state for display and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnaceStatus {
    Idle,
    Loaded,
    Processing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FurnaceError {
    #[error("furnace is busy ({0:?})")]
    Busy(FurnaceStatus),
    #[error("furnace has nothing loaded")]
    NotLoaded,
    #[error("cannot load an empty batch")]
    EmptyBatch,
}

/// An in-flight firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiringJob {
    pub batch: MixedBatch,
    pub temperature: Temperature,
    /// Session clock (seconds) when the job started.
    pub started_at: f64,
    /// Seconds to completion, copied from the recipe.
    pub duration: f64,
}

impl FiringJob {
    /// Fraction complete in `[0, 1]`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn remaining(&self, now: f64) -> f64 {
        (self.started_at + self.duration - now).max(0.0)
    }

    pub fn is_complete(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FurnaceState {
    #[default]
    Idle,
    Loaded {
        batch: MixedBatch,
        temperature: Temperature,
    },
    Processing(FiringJob),
}

impl FurnaceState {
    pub fn status(&self) -> FurnaceStatus {
        match self {
            FurnaceState::Idle => FurnaceStatus::Idle,
            FurnaceState::Loaded { .. } => FurnaceStatus::Loaded,
            FurnaceState::Processing(_) => FurnaceStatus::Processing,
        }
    }
}

/// Whether a completed firing yields its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringVerdict {
    Fired,
    Spoiled,
}

/// Firing policy: a batch only yields its output at the recipe's required
/// temperature. Anything else spoils the batch.
pub fn firing_verdict(recipe: &Recipe, temperature: Temperature) -> FiringVerdict {
    if temperature == recipe.required_temperature {
        FiringVerdict::Fired
    } else {
        FiringVerdict::Spoiled
    }
}

/// Result of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringOutcome {
    /// Output credited to the ledger.
    Fired {
        item: CraftedItem,
        consumed: Ingredients,
    },
    /// Wrong temperature: the inputs are gone and nothing was produced.
    Spoiled {
        output: CraftedItem,
        required: Temperature,
        actual: Temperature,
        consumed: Ingredients,
    },
}

impl FiringOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FiringOutcome::Fired { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Furnace {
    state: FurnaceState,
}

impl Furnace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FurnaceState {
        &self.state
    }

    pub fn status(&self) -> FurnaceStatus {
        self.state.status()
    }

    /// Current dial setting, if a batch is loaded or firing.
    pub fn temperature(&self) -> Option<Temperature> {
        match &self.state {
            FurnaceState::Idle => None,
            FurnaceState::Loaded { temperature, .. } => Some(*temperature),
            FurnaceState::Processing(job) => Some(job.temperature),
        }
    }

    pub fn progress(&self, now: f64) -> f64 {
        match &self.state {
            FurnaceState::Processing(job) => job.progress(now),
            _ => 0.0,
        }
    }

    /// Accept a mixed batch. Only an idle furnace may be loaded.
    pub fn load(&mut self, batch: MixedBatch) -> Result<(), FurnaceError> {
        if self.status() != FurnaceStatus::Idle {
            return Err(FurnaceError::Busy(self.status()));
        }
        if batch.ingredients.is_empty() {
            return Err(FurnaceError::EmptyBatch);
        }
        log::info!("Furnace loaded with mix for {:?}", batch.recipe.output);
        self.state = FurnaceState::Loaded {
            batch,
            temperature: Temperature::default(),
        };
        Ok(())
    }

    /// Turn the dial. Correctness is only judged when the job completes.
    pub fn set_temperature(&mut self, value: Temperature) -> Result<(), FurnaceError> {
        match &mut self.state {
            FurnaceState::Loaded { temperature, .. } => {
                *temperature = value;
                Ok(())
            }
            FurnaceState::Idle => Err(FurnaceError::NotLoaded),
            FurnaceState::Processing(_) => Err(FurnaceError::Busy(FurnaceStatus::Processing)),
        }
    }

    /// Begin firing at session time `now`.
    pub fn start(&mut self, now: f64) -> Result<(), FurnaceError> {
        match std::mem::take(&mut self.state) {
            FurnaceState::Loaded { batch, temperature } => {
                let duration = batch.recipe.processing_secs;
                log::info!(
                    "Firing {:?} at {:?} for {:.1}s",
                    batch.recipe.output,
                    temperature,
                    duration
                );
                self.state = FurnaceState::Processing(FiringJob {
                    batch,
                    temperature,
                    started_at: now,
                    duration,
                });
                Ok(())
            }
            FurnaceState::Idle => Err(FurnaceError::NotLoaded),
            processing @ FurnaceState::Processing(_) => {
                self.state = processing;
                Err(FurnaceError::Busy(FurnaceStatus::Processing))
            }
        }
    }

    /// Discard a loaded batch. Its materials are not refunded, and a job
    /// that has started cannot be cancelled.
    pub fn cancel(&mut self) -> Result<MixedBatch, FurnaceError> {
        match std::mem::take(&mut self.state) {
            FurnaceState::Loaded { batch, .. } => {
                log::info!("Furnace batch for {:?} discarded", batch.recipe.output);
                Ok(batch)
            }
            FurnaceState::Idle => Err(FurnaceError::NotLoaded),
            processing @ FurnaceState::Processing(_) => {
                self.state = processing;
                Err(FurnaceError::Busy(FurnaceStatus::Processing))
            }
        }
    }

    /// Complete the running job if its time is up, crediting the ledger on
    /// success. Returns `None` while nothing has finished.
    pub fn tick(&mut self, now: f64, ledger: &mut Ledger) -> Option<FiringOutcome> {
        match &self.state {
            FurnaceState::Processing(job) if job.is_complete(now) => {}
            _ => return None,
        }
        let FurnaceState::Processing(job) = std::mem::take(&mut self.state) else {
            return None;
        };
        let recipe = &job.batch.recipe;
        let outcome = match firing_verdict(recipe, job.temperature) {
            FiringVerdict::Fired => {
                ledger.credit_crafted_item(recipe.output, 1);
                log::info!("Firing complete: {:?}", recipe.output);
                FiringOutcome::Fired {
                    item: recipe.output,
                    consumed: job.batch.ingredients,
                }
            }
            FiringVerdict::Spoiled => {
                log::warn!(
                    "Firing of {:?} spoiled: needed {:?}, fired at {:?}",
                    recipe.output,
                    recipe.required_temperature,
                    job.temperature
                );
                FiringOutcome::Spoiled {
                    output: recipe.output,
                    required: recipe.required_temperature,
                    actual: job.temperature,
                    consumed: job.batch.ingredients,
                }
            }
        };
        Some(outcome)
    }
}
