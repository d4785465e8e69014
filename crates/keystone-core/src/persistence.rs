//! Save/Load functionality for persisting a workshop session.
//!
//! Uses bincode for compact binary serialization. Only player state is
//! saved: recipes and buildings are content and come from the session the
//! save is loaded into. The clock is saved alongside any running furnace
//! job, so a firing resumes exactly where it stopped.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use keystone_logic::furnace::{FiringOutcome, Furnace};
use keystone_logic::ledger::Ledger;
use keystone_logic::progress::{BuildingId, ProgressBook};
use keystone_logic::workbench::Workbench;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_TIME_SCALE;
use crate::engine::WorkshopSession;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a session
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Session time in seconds
    pub clock: f64,
    pub time_scale: f64,
    pub ledger: Ledger,
    pub workbench: Workbench,
    pub furnace: Furnace,
    pub progress: ProgressBook,
    pub started: BTreeSet<BuildingId>,
    /// Completed firings the UI has not collected yet
    pub outcomes: Vec<FiringOutcome>,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupt save: {0}")]
    Corrupt(String),
}

/// Write a session to `writer`.
pub fn save_session<W: Write>(writer: W, session: &WorkshopSession) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        clock: session.clock,
        time_scale: session.time_scale,
        ledger: session.ledger.clone(),
        workbench: session.workbench.clone(),
        furnace: session.furnace.clone(),
        progress: session.progress.clone(),
        started: session.started.clone(),
        outcomes: session.outcomes.clone(),
    };
    bincode::serialize_into(writer, &save_data)?;
    log::debug!("Session saved at t={:.1}s", session.clock);
    Ok(())
}

/// Read a save from `reader` into `session`, replacing its player state.
/// The session is untouched if the save cannot be read.
pub fn load_session<R: Read>(reader: R, session: &mut WorkshopSession) -> Result<(), SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    if !save_data.clock.is_finite() || save_data.clock < 0.0 {
        return Err(SaveError::Corrupt(format!(
            "clock must be non-negative, got {}",
            save_data.clock
        )));
    }
    let scale = save_data.time_scale;
    if !scale.is_finite() || scale <= 0.0 || scale > MAX_TIME_SCALE {
        return Err(SaveError::Corrupt(format!(
            "time_scale must be in (0, {}], got {}",
            MAX_TIME_SCALE, scale
        )));
    }

    session.clock = save_data.clock;
    session.time_scale = save_data.time_scale;
    session.ledger = save_data.ledger;
    session.workbench = save_data.workbench;
    session.furnace = save_data.furnace;
    session.progress = save_data.progress;
    session.started = save_data.started;
    session.outcomes = save_data.outcomes;
    log::info!(
        "Session loaded at t={:.1}s, furnace {:?}",
        session.clock,
        session.furnace.status()
    );
    Ok(())
}

impl WorkshopSession {
    /// Save session state to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        save_session(writer, self)
    }

    /// Load session state from a reader
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        load_session(reader, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use keystone_logic::furnace::FurnaceStatus;
    use keystone_logic::materials::{CraftedItem, Material};
    use keystone_logic::progress::Science;
    use keystone_logic::recipes::Temperature;

    fn session() -> WorkshopSession {
        WorkshopSession::with_defaults(&SessionConfig::default()).unwrap()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut original = session();
        original.progress_mut("pantheon").earn_badge(Science::Chemistry);
        original.progress_mut("pantheon").set_bookmark(4);
        original.add_currency(25);
        original.place(Material::Sand).unwrap();

        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();

        let mut restored = session();
        restored.load(buffer.as_slice()).unwrap();

        assert_eq!(restored.ledger(), original.ledger());
        assert_eq!(restored.workbench(), original.workbench());
        assert_eq!(restored.progress("pantheon"), original.progress("pantheon"));
        assert_eq!(restored.clock(), original.clock());
    }

    #[test]
    fn test_running_job_survives_reload() {
        let mut original = session();
        original.place(Material::Limestone).unwrap();
        original.place(Material::Limestone).unwrap();
        original.place(Material::Water).unwrap();
        original.mix().unwrap();
        original.set_temperature(Temperature::Medium).unwrap();
        original.start_firing().unwrap();
        original.update(2.0);

        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();
        // The UI that owned `original` goes away mid-firing.
        drop(original);

        let mut restored = session();
        restored.load(buffer.as_slice()).unwrap();
        assert_eq!(restored.furnace_status(), FurnaceStatus::Processing);
        assert!((restored.furnace_progress() - 2.0 / 3.0).abs() < 1e-9);

        assert!(restored.update(1.0).is_some());
        assert!(restored.update(1.0).is_none());
        assert_eq!(restored.ledger().crafted(CraftedItem::Mortar), 1);
    }

    #[test]
    fn test_version_mismatch() {
        let original = session();
        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();
        // Version is the first field: a little-endian u32.
        buffer[0] = 99;

        let mut restored = session();
        restored.add_currency(7);
        let result = restored.load(buffer.as_slice());
        assert!(matches!(
            result,
            Err(SaveError::VersionMismatch {
                expected: 1,
                found: 99
            })
        ));
        assert_eq!(restored.ledger().currency(), 57);
    }

    #[test]
    fn test_bad_time_scale_rejected() {
        let original = session();
        let mut restored = session();
        let corrupt = [
            (0.0, f64::NAN),
            (0.0, -1.0),
            (f64::INFINITY, 1.0),
            (-5.0, 1.0),
        ];
        for (clock, time_scale) in corrupt {
            let mut save_data = SaveData {
                version: SAVE_VERSION,
                clock,
                time_scale,
                ledger: original.ledger.clone(),
                workbench: original.workbench.clone(),
                furnace: original.furnace.clone(),
                progress: original.progress.clone(),
                started: original.started.clone(),
                outcomes: Vec::new(),
            };
            save_data.ledger.add_currency(1);
            let buffer = bincode::serialize(&save_data).unwrap();

            assert!(matches!(
                restored.load(buffer.as_slice()),
                Err(SaveError::Corrupt(_))
            ));
            assert_eq!(restored.ledger(), original.ledger());
            assert_eq!(restored.time_scale(), 1.0);
        }
    }

    #[test]
    fn test_truncated_save_rejected() {
        let original = session();
        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();
        buffer.truncate(buffer.len() / 2);

        let mut restored = session();
        assert!(matches!(
            restored.load(buffer.as_slice()),
            Err(SaveError::Bincode(_))
        ));
    }
}
