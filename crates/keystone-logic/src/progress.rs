//! Per-building progress records.
//!
//! Lessons, quizzes and sketching update these records; the construction
//! gate only reads them. Setters are idempotent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Stable building identifier, e.g. `"pantheon"`.
pub type BuildingId = String;

/// Science disciplines a lesson can award a badge for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Science {
    Geometry,
    Architecture,
    Engineering,
    Chemistry,
    Physics,
    Hydraulics,
    Acoustics,
    Astronomy,
    Geology,
}

impl Science {
    pub const ALL: [Science; 9] = [
        Science::Geometry,
        Science::Architecture,
        Science::Engineering,
        Science::Chemistry,
        Science::Physics,
        Science::Hydraulics,
        Science::Acoustics,
        Science::Astronomy,
        Science::Geology,
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingProgress {
    pub science_badges_earned: BTreeSet<Science>,
    pub sketch_completed: bool,
    pub quiz_passed: bool,
    pub lesson_read: bool,
    pub lesson_bookmark_index: u32,
}

impl BuildingProgress {
    pub fn earn_badge(&mut self, science: Science) {
        self.science_badges_earned.insert(science);
    }

    pub fn has_badge(&self, science: Science) -> bool {
        self.science_badges_earned.contains(&science)
    }

    pub fn mark_sketch_complete(&mut self) {
        self.sketch_completed = true;
    }

    pub fn mark_quiz_passed(&mut self) {
        self.quiz_passed = true;
    }

    pub fn mark_lesson_read(&mut self) {
        self.lesson_read = true;
    }

    pub fn set_bookmark(&mut self, index: u32) {
        self.lesson_bookmark_index = index;
    }
}

/// All progress records of one player, created on first reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressBook {
    records: BTreeMap<BuildingId, BuildingProgress>,
}

impl ProgressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable record for `id`, created with defaults if missing.
    pub fn entry(&mut self, id: &str) -> &mut BuildingProgress {
        self.records.entry(id.to_string()).or_default()
    }

    /// Read-only lookup that never creates a record.
    pub fn get(&self, id: &str) -> Option<&BuildingProgress> {
        self.records.get(id)
    }

    /// Record for `id`, or the defaults a fresh record would have.
    pub fn get_or_default(&self, id: &str) -> BuildingProgress {
        self.get(id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BuildingId, &BuildingProgress)> {
        self.records.iter()
    }
}
