//! Keystone Core - Workshop Session Engine
//!
//! Wraps the pure rules in `keystone-logic` into an explicit per-player
//! session: one object owning the ledger, workbench, furnace, progress
//! records and session clock, plus content loading and save/load.
//!
//! # Example
//!
//! ```rust,no_run
//! use keystone_core::prelude::*;
//!
//! let mut session = WorkshopSession::with_defaults(&SessionConfig::default())?;
//!
//! session.place(Material::Limestone)?;
//! session.place(Material::Limestone)?;
//! session.place(Material::Water)?;
//! session.mix()?;
//! session.set_temperature(Temperature::Medium)?;
//! session.start_firing()?;
//!
//! // Drive the clock from the UI frame loop
//! loop {
//!     if let Some(outcome) = session.update(1.0 / 60.0) {
//!         println!("{:?}", outcome);
//!         break;
//!     }
//! }
//! # Ok::<(), keystone_core::engine::SessionError>(())
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod persistence;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::engine::{SessionError, WorkshopSession};
    pub use keystone_logic::furnace::{FiringOutcome, FurnaceStatus};
    pub use keystone_logic::materials::{CraftedItem, Ingredients, Material};
    pub use keystone_logic::recipes::Temperature;
}
