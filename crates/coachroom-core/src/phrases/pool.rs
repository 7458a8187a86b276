//! Phrase pool model and the in-process fallback pool.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Mode, Pattern, Verbosity};
use crate::error::PhraseError;

/// Pool key: which coaching moment a phrase serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseEventType {
    Preview,
    Ready,
    WorkStart,
    TechHint,
    Halfway,
    LastSeconds,
    RoundRest,
    BlockIntro,
    WorkoutEnd,
}

/// One candidate coaching line.
///
/// `usage_count` and `last_used_at_ms` are mutated on every successful pick;
/// the core never deletes items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseItem {
    pub id: Uuid,
    pub event_type: PhraseEventType,
    /// `None` matches any pattern.
    #[serde(default)]
    pub pattern: Option<Pattern>,
    /// `None` matches any mode.
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Lowest verbosity that may use this line.
    pub chatter_level: Verbosity,
    pub locale_id: String,
    pub template: String,
    pub priority: i32,
    pub cooldown_sec: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default)]
    pub last_used_at_ms: Option<u64>,
}

fn default_active() -> bool {
    true
}

impl PhraseItem {
    pub fn matches(&self, query: &PhraseQuery) -> bool {
        self.active
            && self.event_type == query.event_type
            && self.pattern.map_or(true, |p| p == query.pattern)
            && self.mode.map_or(true, |m| m == query.mode)
            && self.chatter_level <= query.chatter_level
            && self.locale_id == query.locale_id
    }

    /// Still inside the cooldown window at `now_ms`?
    pub fn cooling_down(&self, now_ms: u64) -> bool {
        match self.last_used_at_ms {
            Some(used) => now_ms.saturating_sub(used) < u64::from(self.cooldown_sec) * 1000,
            None => false,
        }
    }
}

/// Query against a phrase pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseQuery {
    pub event_type: PhraseEventType,
    pub pattern: Pattern,
    pub mode: Mode,
    pub chatter_level: Verbosity,
    pub locale_id: String,
}

/// External phrase-pool storage. Query failures are caught by the selector
/// and treated as "no candidates"; `mark_used` failures are logged only.
pub trait PhraseStore {
    fn query(&mut self, query: &PhraseQuery) -> Result<Vec<PhraseItem>, PhraseError>;
    fn mark_used(&mut self, id: Uuid, now_ms: u64) -> Result<(), PhraseError>;
}

/// In-process pool, used both as the selector's fallback and as a
/// standalone store in tests and the CLI simulator.
#[derive(Debug, Clone, Default)]
pub struct MemoryPool {
    items: Vec<PhraseItem>,
}

impl MemoryPool {
    pub fn new(items: Vec<PhraseItem>) -> Self {
        Self { items }
    }

    /// The built-in English starter pool.
    pub fn builtin() -> Self {
        let mut items = Vec::new();
        let mut add = |event_type, chatter_level, template: &str, priority, cooldown_sec| {
            items.push(PhraseItem {
                id: Uuid::new_v4(),
                event_type,
                pattern: None,
                mode: None,
                chatter_level,
                locale_id: "en".into(),
                template: template.into(),
                priority,
                cooldown_sec,
                active: true,
                usage_count: 0,
                last_used_at_ms: None,
            });
        };
        add(PhraseEventType::Preview, Verbosity::Minimal, "Next up: {exercise}.", 5, 20);
        add(PhraseEventType::Preview, Verbosity::High, "Coming up, {exercise}. Set yourself.", 4, 45);
        add(PhraseEventType::Ready, Verbosity::Minimal, "Get ready for {exercise}.", 5, 20);
        add(PhraseEventType::WorkStart, Verbosity::Minimal, "Go. {exercise}.", 5, 15);
        add(PhraseEventType::WorkStart, Verbosity::High, "Set {set}. {exercise} -- strong start.", 4, 60);
        add(PhraseEventType::TechHint, Verbosity::High, "{cue}", 5, 30);
        add(PhraseEventType::Halfway, Verbosity::High, "Halfway there. {remaining} seconds to go.", 5, 60);
        add(PhraseEventType::LastSeconds, Verbosity::High, "Last ten seconds, finish strong.", 5, 30);
        add(PhraseEventType::RoundRest, Verbosity::Minimal, "Rest. Breathe.", 5, 30);
        add(PhraseEventType::RoundRest, Verbosity::High, "Round {round} done. Shake it out.", 4, 90);
        add(PhraseEventType::BlockIntro, Verbosity::Minimal, "Here we go.", 5, 30);
        add(PhraseEventType::WorkoutEnd, Verbosity::Minimal, "Workout complete. Well done.", 5, 10);
        Self { items }
    }

    pub fn items(&self) -> &[PhraseItem] {
        &self.items
    }

    pub fn push(&mut self, item: PhraseItem) {
        self.items.push(item);
    }
}

impl PhraseStore for MemoryPool {
    fn query(&mut self, query: &PhraseQuery) -> Result<Vec<PhraseItem>, PhraseError> {
        Ok(self
            .items
            .iter()
            .filter(|i| i.matches(query))
            .cloned()
            .collect())
    }

    fn mark_used(&mut self, id: Uuid, now_ms: u64) -> Result<(), PhraseError> {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.usage_count += 1;
                item.last_used_at_ms = Some(now_ms);
                Ok(())
            }
            None => Err(PhraseError::MarkUsedFailed {
                id: id.to_string(),
                message: "no such item".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(event_type: PhraseEventType, chatter: Verbosity) -> PhraseQuery {
        PhraseQuery {
            event_type,
            pattern: Pattern::Circuit,
            mode: Mode::Standard,
            chatter_level: chatter,
            locale_id: "en".into(),
        }
    }

    #[test]
    fn matching_respects_verbosity_floor() {
        let mut pool = MemoryPool::builtin();
        let minimal = pool
            .query(&query(PhraseEventType::Preview, Verbosity::Minimal))
            .unwrap();
        let high = pool
            .query(&query(PhraseEventType::Preview, Verbosity::High))
            .unwrap();
        assert_eq!(minimal.len(), 1);
        assert_eq!(high.len(), 2);
    }

    #[test]
    fn cooldown_window_math() {
        let mut item = MemoryPool::builtin().items()[0].clone();
        assert!(!item.cooling_down(0));
        item.cooldown_sec = 30;
        item.last_used_at_ms = Some(100_000);
        assert!(item.cooling_down(100_000));
        assert!(item.cooling_down(129_999));
        assert!(!item.cooling_down(130_000));
    }

    #[test]
    fn mark_used_updates_usage() {
        let mut pool = MemoryPool::builtin();
        let id = pool.items()[0].id;
        pool.mark_used(id, 42_000).unwrap();
        let item = pool.items().iter().find(|i| i.id == id).unwrap();
        assert_eq!(item.usage_count, 1);
        assert_eq!(item.last_used_at_ms, Some(42_000));
    }

    #[test]
    fn mark_used_unknown_id_errors() {
        let mut pool = MemoryPool::builtin();
        assert!(pool.mark_used(Uuid::new_v4(), 0).is_err());
    }

    #[test]
    fn inactive_items_never_match() {
        let mut pool = MemoryPool::builtin();
        let q = query(PhraseEventType::WorkoutEnd, Verbosity::High);
        let before = pool.query(&q).unwrap().len();
        let mut item = pool.items()[0].clone();
        item.event_type = PhraseEventType::WorkoutEnd;
        item.active = false;
        pool.push(item);
        assert_eq!(pool.query(&q).unwrap().len(), before);
    }
}
