//! Pacing model: splits a fixed round across its exercises.
//!
//! A round is one continuous work interval, but attention (technique hints,
//! caption focus) rotates through the exercises in it. Windows are weighted
//! by estimated duration, with unilateral exercises counted double, and tile
//! the round exactly: no gaps, no overlap, last window snapped to the round
//! end.

use serde::{Deserialize, Serialize};

/// Minimum seconds any exercise window gets, and the weight floor applied to
/// exercises with no estimate.
pub const MIN_WINDOW_SEC: u32 = 15;

/// Planned exercise within a round, as far as pacing cares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub exercise_id: String,
    #[serde(default)]
    pub est_sec: Option<u32>,
    #[serde(default)]
    pub unilateral: bool,
}

/// One exercise's slice of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingWindow {
    pub exercise_id: String,
    pub start_offset_sec: u32,
    pub duration_sec: u32,
}

impl PacingWindow {
    pub fn end_sec(&self) -> u32 {
        self.start_offset_sec + self.duration_sec
    }
}

/// Tile `round_duration_sec` across `exercises`.
///
/// Returns an empty vec for an empty list or a zero-length round. Windows
/// are rounded to whole seconds, floored at [`MIN_WINDOW_SEC`], and the
/// final window's end is forced to the round duration so the tiling is
/// exact.
pub fn pacing_windows(round_duration_sec: u32, exercises: &[ExercisePlan]) -> Vec<PacingWindow> {
    if round_duration_sec == 0 || exercises.is_empty() {
        return Vec::new();
    }

    let weights: Vec<f64> = exercises
        .iter()
        .map(|e| {
            let base = e.est_sec.unwrap_or(0).max(MIN_WINDOW_SEC) as f64;
            if e.unilateral {
                base * 2.0
            } else {
                base
            }
        })
        .collect();
    let total: f64 = weights.iter().sum();

    let mut windows = Vec::with_capacity(exercises.len());
    let mut cursor: u32 = 0;
    for (i, (plan, weight)) in exercises.iter().zip(&weights).enumerate() {
        let last = i == exercises.len() - 1;
        let duration = if last {
            round_duration_sec.saturating_sub(cursor)
        } else {
            let raw = (round_duration_sec as f64 * weight / total).round() as u32;
            raw.max(MIN_WINDOW_SEC)
                .min(round_duration_sec.saturating_sub(cursor))
        };
        windows.push(PacingWindow {
            exercise_id: plan.exercise_id.clone(),
            start_offset_sec: cursor,
            duration_sec: duration,
        });
        cursor += duration;
    }
    windows
}
