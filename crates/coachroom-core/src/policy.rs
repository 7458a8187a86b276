//! Cue policy: pure predicates gating the optional cue classes.
//!
//! None of these hold state; the per-round "hint fired" flag lives with the
//! player, and the confidence score comes from the session context.

use crate::config::Verbosity;

/// Minimum form-confidence before a technique hint may fire.
pub const CONFIDENCE_THRESHOLD: f32 = 0.70;

/// Technique hints are reserved for the highest verbosity, and never in the
/// first round -- the athlete is still settling in.
pub fn allow_technical_hint(verbosity: Verbosity, round_index: u32) -> bool {
    verbosity == Verbosity::High && round_index >= 1
}

/// Alternate the hint target by round parity so a two-exercise round doesn't
/// coach the same movement every time.
pub fn prefer_second_exercise(round_index: u32) -> bool {
    round_index % 2 == 1
}

/// Guards near-end firing: a cue needs at least `min_sec` of round left.
pub fn has_time_remaining(now_ms: u64, round_end_ms: u64, min_sec: u32) -> bool {
    round_end_ms.saturating_sub(now_ms) >= u64::from(min_sec) * 1000
}

pub fn meets_confidence(confidence: f32) -> bool {
    confidence >= CONFIDENCE_THRESHOLD
}
