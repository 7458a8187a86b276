//! Session configuration surface.
//!
//! All of this is owned externally -- the app decides verbosity, pattern,
//! mode, and durations; the core only reads them. Stored as TOML with
//! per-field defaults so a partial file still loads.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Coaching verbosity. `Silent` suppresses tones and speech entirely;
/// `High` unlocks halfway calls, spoken last-seconds cues, and technique
/// hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent,
    Minimal,
    High,
}

/// How exercises are sequenced within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// One exercise at a time, all sets before moving on.
    Straight,
    /// Two exercises alternated within a round.
    Superset,
    /// Two or three exercises rotated within a round.
    Circuit,
}

/// Workout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fixed work/rest intervals.
    Standard,
    /// As many rounds as possible in the block.
    Amrap,
    /// Every minute on the minute.
    Emom,
}

/// Round/rest timing for block mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    #[serde(default = "default_round_sec")]
    pub round_sec: u32,
    #[serde(default = "default_rest_sec")]
    pub rest_sec: u32,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_sec: default_round_sec(),
            rest_sec: default_rest_sec(),
            rounds: default_rounds(),
        }
    }
}

/// Full coaching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(default = "default_verbosity")]
    pub verbosity: Verbosity,
    #[serde(default = "default_pattern")]
    pub pattern: Pattern,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default = "default_locale")]
    pub locale_id: String,
    #[serde(default)]
    pub round: RoundConfig,
    /// Minimum silence after a tone before speech may start.
    #[serde(default = "default_guard_ms")]
    pub guard_ms: u64,
    /// Voice gain, 0.0..=1.0.
    #[serde(default = "default_voice_volume")]
    pub voice_volume: f32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            verbosity: default_verbosity(),
            pattern: default_pattern(),
            mode: default_mode(),
            locale_id: default_locale(),
            round: RoundConfig::default(),
            guard_ms: default_guard_ms(),
            voice_volume: default_voice_volume(),
        }
    }
}

impl CoachConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }
}

fn default_round_sec() -> u32 {
    180
}
fn default_rest_sec() -> u32 {
    60
}
fn default_rounds() -> u32 {
    3
}
fn default_verbosity() -> Verbosity {
    Verbosity::Minimal
}
fn default_pattern() -> Pattern {
    Pattern::Circuit
}
fn default_mode() -> Mode {
    Mode::Standard
}
fn default_locale() -> String {
    "en".into()
}
fn default_guard_ms() -> u64 {
    250
}
fn default_voice_volume() -> f32 {
    0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_ordering() {
        assert!(Verbosity::Silent < Verbosity::Minimal);
        assert!(Verbosity::Minimal < Verbosity::High);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = CoachConfig::from_toml("verbosity = \"high\"").unwrap();
        assert_eq!(cfg.verbosity, Verbosity::High);
        assert_eq!(cfg.round.round_sec, 180);
        assert_eq!(cfg.guard_ms, 250);
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = CoachConfig::default();
        cfg.round.rounds = 5;
        cfg.verbosity = Verbosity::Silent;
        let text = cfg.to_toml().unwrap();
        let back = CoachConfig::from_toml(&text).unwrap();
        assert_eq!(back.round.rounds, 5);
        assert_eq!(back.verbosity, Verbosity::Silent);
    }
}
