//! # Coachroom Core Library
//!
//! Core business logic for Coachroom, a workout coaching cue coordinator:
//! countdown tones, start/stop chimes, spoken coaching phrases, and captions
//! delivered during a timed session. The CLI binary drives the same library
//! the app embeds.
//!
//! ## Architecture
//!
//! - **Timer queue**: the single concurrency primitive -- a cancellable
//!   delayed action, drained by a caller-driven `tick()` with either a wall
//!   or virtual clock. No internal threads.
//! - **Round scheduler**: canonical multi-phase round timing (pips, go tone,
//!   minute marks, halfway, technique hints, last-seconds, end tone, rest).
//! - **Timeline player**: consumes precompiled step lists or round schedules,
//!   fans events out to subscribers, and routes tones and guarded speech.
//! - **Response selector**: best-fit phrase by priority and cooldown, with an
//!   in-process fallback pool and synthesized generic lines.
//!
//! ## Key Components
//!
//! - [`TimelinePlayer`]: top-level cue driver
//! - [`Event`]: closed tagged set of lifecycle events
//! - [`ToneEngine`] / [`VoiceBus`]: tone synthesis and speech guarding
//! - [`ResponseSelector`]: phrase pool selection

pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod lookup;
pub mod pacing;
pub mod phrases;
pub mod player;
pub mod policy;
pub mod round;
pub mod session;
pub mod timers;

pub use audio::{NullSink, SequenceItem, SpeechSink, ToneEngine, ToneKind, ToneShape, ToneSink, VoiceBus};
pub use config::{CoachConfig, Mode, Pattern, RoundConfig, Verbosity};
pub use error::{AudioError, ConfigError, CoreError, PhraseError, ValidationError};
pub use events::{Event, EventBus};
pub use lookup::{ExerciseInfo, ExerciseLookup, StaticLookup};
pub use pacing::{pacing_windows, ExercisePlan, PacingWindow};
pub use phrases::{MemoryPool, PhraseEventType, PhraseItem, PhraseQuery, PhraseStore, ResponseSelector};
pub use player::{
    steps_from_round_config, BlockPlan, CueAction, StepKind, TimelinePlayer, TimelineStep,
};
pub use round::RoundPlan;
pub use session::{HapticKind, SessionCaps, SessionContext};
pub use timers::{now_ms, CancelHandle, TimerQueue};
