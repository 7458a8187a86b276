//! Per-workout session context and host capabilities.

use std::collections::HashMap;
use std::rc::Rc;

use crate::audio::ToneKind;
use crate::config::{Mode, Pattern, Verbosity};
use crate::lookup::{ExerciseInfo, ExerciseLookup};

/// Haptic feedback flavors a host may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Tap,
    Buzz,
}

/// Read-mostly context for one workout session. Constructed once; the only
/// mutable pieces are the technique-cue rotation indices and the externally
/// supplied form-confidence score.
pub struct SessionContext {
    pub pattern: Pattern,
    pub mode: Mode,
    pub verbosity: Verbosity,
    pub locale_id: String,
    /// Planned load per exercise id, kg.
    pub planned_loads: HashMap<String, f32>,
    lookup: Rc<dyn ExerciseLookup>,
    cue_rotation: HashMap<String, usize>,
    /// Latest form-confidence estimate from the host (vision pipeline or
    /// similar). Defaults to 1.0 when no estimator is attached.
    confidence: f32,
}

impl SessionContext {
    pub fn new(
        pattern: Pattern,
        mode: Mode,
        verbosity: Verbosity,
        locale_id: impl Into<String>,
        lookup: Rc<dyn ExerciseLookup>,
    ) -> Self {
        Self {
            pattern,
            mode,
            verbosity,
            locale_id: locale_id.into(),
            planned_loads: HashMap::new(),
            lookup,
            cue_rotation: HashMap::new(),
            confidence: 1.0,
        }
    }

    pub fn exercise(&self, exercise_id: &str) -> Option<ExerciseInfo> {
        self.lookup.info(exercise_id)
    }

    /// Display name for an exercise, falling back to the raw id when the
    /// catalog has no entry.
    pub fn exercise_name(&self, exercise_id: &str) -> String {
        self.exercise(exercise_id)
            .map(|e| e.name)
            .unwrap_or_else(|| exercise_id.to_string())
    }

    /// Next technique cue for an exercise, rotating through the catalog's
    /// cue list so repeated hints don't repeat the same line.
    pub fn next_cue(&mut self, exercise_id: &str) -> Option<String> {
        let info = self.exercise(exercise_id)?;
        if info.technique_cues.is_empty() {
            return None;
        }
        let idx = self.cue_rotation.entry(exercise_id.to_string()).or_insert(0);
        let cue = info.technique_cues[*idx % info.technique_cues.len()].clone();
        *idx += 1;
        Some(cue)
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn set_confidence(&mut self, confidence: f32) {
        self.confidence = confidence.clamp(0.0, 1.0);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("pattern", &self.pattern)
            .field("mode", &self.mode)
            .field("verbosity", &self.verbosity)
            .field("locale_id", &self.locale_id)
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Optional host callbacks. Every field is a no-op when absent, so a bare
/// session (tests, dry runs) needs no wiring.
#[derive(Default)]
pub struct SessionCaps {
    pub speak: Option<Box<dyn FnMut(&str)>>,
    pub caption: Option<Box<dyn FnMut(&str)>>,
    pub beep: Option<Box<dyn FnMut(ToneKind)>>,
    pub haptic: Option<Box<dyn FnMut(HapticKind)>>,
}

impl SessionCaps {
    pub fn speak(&mut self, text: &str) {
        if let Some(f) = self.speak.as_mut() {
            f(text);
        }
    }

    pub fn caption(&mut self, text: &str) {
        if let Some(f) = self.caption.as_mut() {
            f(text);
        }
    }

    pub fn beep(&mut self, kind: ToneKind) {
        if let Some(f) = self.beep.as_mut() {
            f(kind);
        }
    }

    pub fn haptic(&mut self, kind: HapticKind) {
        if let Some(f) = self.haptic.as_mut() {
            f(kind);
        }
    }
}

impl std::fmt::Debug for SessionCaps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCaps")
            .field("speak", &self.speak.is_some())
            .field("caption", &self.caption.is_some())
            .field("beep", &self.beep.is_some())
            .field("haptic", &self.haptic.is_some())
            .finish()
    }
}
