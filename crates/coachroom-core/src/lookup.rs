//! Seam to the exercise catalog.
//!
//! The catalog itself lives outside the core; scheduling and phrase
//! rendering only need the handful of fields below.

use serde::{Deserialize, Serialize};

/// Catalog metadata for one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseInfo {
    pub id: String,
    pub name: String,
    /// Short technique cues, rotated across hints.
    #[serde(default)]
    pub technique_cues: Vec<String>,
    /// Estimated time a trainee needs for one pass, seconds.
    #[serde(default)]
    pub est_duration_sec: Option<u32>,
    /// Single-limb exercises get double pacing weight.
    #[serde(default)]
    pub unilateral: bool,
}

/// Read-only exercise lookup.
pub trait ExerciseLookup {
    fn info(&self, exercise_id: &str) -> Option<ExerciseInfo>;
}

/// In-memory lookup, mostly for tests and the CLI simulator.
#[derive(Debug, Default)]
pub struct StaticLookup {
    entries: Vec<ExerciseInfo>,
}

impl StaticLookup {
    pub fn new(entries: Vec<ExerciseInfo>) -> Self {
        Self { entries }
    }
}

impl ExerciseLookup for StaticLookup {
    fn info(&self, exercise_id: &str) -> Option<ExerciseInfo> {
        self.entries.iter().find(|e| e.id == exercise_id).cloned()
    }
}
