//! Response selector: best-fit phrase for a coaching moment.
//!
//! Selection order is external store, then the in-process pool, then a fixed
//! generic line -- never an error. Cooldown and usage bookkeeping are part of
//! selection itself: a phrase is marked used before its text is returned, so
//! no line, however high-priority, repeats inside its cooldown window.

use std::cmp::Reverse;

use tracing::{debug, warn};

use crate::phrases::pool::{MemoryPool, PhraseEventType, PhraseItem, PhraseQuery, PhraseStore};
use crate::phrases::template::{render, RenderArgs};

pub struct ResponseSelector {
    store: Option<Box<dyn PhraseStore>>,
    fallback: MemoryPool,
}

impl ResponseSelector {
    /// Selector with only the built-in pool behind it.
    pub fn new() -> Self {
        Self {
            store: None,
            fallback: MemoryPool::builtin(),
        }
    }

    pub fn with_store(store: Box<dyn PhraseStore>) -> Self {
        Self {
            store: Some(store),
            fallback: MemoryPool::builtin(),
        }
    }

    pub fn set_store(&mut self, store: Box<dyn PhraseStore>) {
        self.store = Some(store);
    }

    /// Pick, mark used, and render the best phrase for `query`.
    pub fn select(&mut self, query: &PhraseQuery, args: &RenderArgs, now_ms: u64) -> String {
        if let Some(store) = self.store.as_mut() {
            match store.query(query) {
                Ok(candidates) => {
                    if let Some(best) = pick_best(&candidates, now_ms) {
                        if let Err(e) = store.mark_used(best.id, now_ms) {
                            warn!(id = %best.id, error = %e, "mark_used failed");
                        }
                        return render(&best.template, args);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "phrase store query failed; using fallback pool");
                }
            }
        }

        let candidates = self
            .fallback
            .query(query)
            .unwrap_or_default();
        if let Some(best) = pick_best(&candidates, now_ms) {
            let id = best.id;
            let template = best.template.clone();
            if let Err(e) = self.fallback.mark_used(id, now_ms) {
                warn!(id = %id, error = %e, "fallback mark_used failed");
            }
            return render(&template, args);
        }

        debug!(event_type = ?query.event_type, "no eligible phrase; using generic line");
        render(generic_line(query.event_type), args)
    }
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest priority wins; ties go to the least-recently-used (never-used
/// first). Items still cooling down are out of the running entirely.
fn pick_best(candidates: &[PhraseItem], now_ms: u64) -> Option<PhraseItem> {
    candidates
        .iter()
        .filter(|i| !i.cooling_down(now_ms))
        .max_by_key(|i| (i.priority, Reverse(i.last_used_at_ms.unwrap_or(0))))
        .cloned()
}

/// Synthesized line of last resort, one per event type.
fn generic_line(event_type: PhraseEventType) -> &'static str {
    match event_type {
        PhraseEventType::Preview => "Next up: {exercise}.",
        PhraseEventType::Ready => "Get ready.",
        PhraseEventType::WorkStart => "Go.",
        PhraseEventType::TechHint => "{cue}",
        PhraseEventType::Halfway => "Halfway.",
        PhraseEventType::LastSeconds => "Ten seconds.",
        PhraseEventType::RoundRest => "Rest.",
        PhraseEventType::BlockIntro => "Let's begin.",
        PhraseEventType::WorkoutEnd => "Workout complete.",
    }
}
