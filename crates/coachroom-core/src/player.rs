//! Timeline player: the top-level cue driver.
//!
//! Consumes either a precompiled step list or the round scheduler, turns
//! both into `(due, action)` entries on one timer queue, and dispatches due
//! actions when the host calls [`TimelinePlayer::tick`]. All tone playback,
//! speech selection, guard deferral, and event fan-out run through the one
//! `dispatch` below, so pause, stop, and cancellation have a single choke
//! point.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::{SpeechSink, ToneEngine, ToneKind, ToneSink, VoiceBus};
use crate::config::{CoachConfig, RoundConfig, Verbosity};
use crate::events::{Event, EventBus};
use crate::pacing::ExercisePlan;
use crate::phrases::{PhraseEventType, PhraseQuery, PhraseStore, RenderArgs, ResponseSelector};
use crate::policy;
use crate::round::{self, RoundPlan};
use crate::session::{HapticKind, SessionCaps, SessionContext};
use crate::timers::{CancelHandle, TimerQueue};

/// A hint check passes only with at least this much work left.
const HINT_MIN_REMAINING_SEC: u32 = 10;
/// WorkoutEnd trails BlockEnd by this much.
const WORKOUT_END_DELAY_MS: u64 = 1000;

/// Everything the player knows how to do at a future instant.
#[derive(Debug, Clone)]
pub enum CueAction {
    Tone(ToneKind),
    Emit(Event),
    /// A guarded speech start that was deferred past a tone transient.
    SpeakLine { line: String },
    /// Last-ten-seconds cue: pip, or a spoken line at highest verbosity.
    LastSeconds { remaining_secs: u32 },
    /// Conditional technique hint; gates are evaluated at fire time.
    HintCheck {
        exercise_id: String,
        round_index: u32,
        round_end_ms: u64,
    },
}

impl From<ToneKind> for CueAction {
    fn from(kind: ToneKind) -> Self {
        CueAction::Tone(kind)
    }
}

/// Step kinds of a precompiled timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Work,
    Rest,
    RoundRest,
    AwaitReady,
    Transition,
    Instruction,
}

/// One precompiled timeline step; offsets are relative to player start, not
/// wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineStep {
    pub step_index: u32,
    pub kind: StepKind,
    pub start_offset_ms: u64,
    pub end_offset_ms: u64,
    #[serde(default)]
    pub exercise_ref: Option<String>,
    #[serde(default)]
    pub duration_sec: Option<u32>,
    #[serde(default)]
    pub set_number: Option<u32>,
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
}

impl TimelineStep {
    fn duration_secs(&self) -> u32 {
        self.duration_sec.unwrap_or_else(|| {
            (self.end_offset_ms.saturating_sub(self.start_offset_ms) / 1000) as u32
        })
    }

    fn exercise_id(&self) -> String {
        self.exercise_ref.clone().unwrap_or_default()
    }
}

/// Fixed step-kind -> event mapping: events for the step's start and end.
fn step_events(step: &TimelineStep) -> (Option<Event>, Option<Event>) {
    match step.kind {
        StepKind::Work => (
            Some(Event::WorkStart {
                exercise_id: step.exercise_id(),
                set_number: step.set_number.unwrap_or(1),
                duration_secs: step.duration_secs(),
            }),
            Some(Event::WorkEnd {
                exercise_id: step.exercise_id(),
                set_number: step.set_number.unwrap_or(1),
            }),
        ),
        StepKind::Rest => (
            Some(Event::RestStart {
                duration_secs: step.duration_secs(),
            }),
            Some(Event::RestEnd),
        ),
        StepKind::RoundRest => (
            Some(Event::RoundRestStart {
                round_index: step.round_number.unwrap_or(0),
                duration_secs: step.duration_secs(),
            }),
            Some(Event::RoundRestEnd {
                round_index: step.round_number.unwrap_or(0),
            }),
        ),
        StepKind::AwaitReady => (
            Some(Event::AwaitReady {
                exercise_id: step.exercise_id(),
            }),
            None,
        ),
        StepKind::Transition => (
            Some(Event::Countdown {
                seconds: step.duration_secs(),
            }),
            None,
        ),
        StepKind::Instruction => (
            Some(Event::WorkPreview {
                exercise_id: step.exercise_id(),
                set_number: step.set_number.unwrap_or(1),
            }),
            None,
        ),
    }
}

/// Compile round timing into a straight work/rest step list, one work step
/// per round with the configured rest between them (no trailing rest). For
/// hosts that drive the player in step mode rather than block mode.
pub fn steps_from_round_config(round: &RoundConfig, exercise_id: &str) -> Vec<TimelineStep> {
    let mut steps = Vec::new();
    let mut offset = 0u64;
    for k in 0..round.rounds {
        let work_end = offset + u64::from(round.round_sec) * 1000;
        steps.push(TimelineStep {
            step_index: steps.len() as u32,
            kind: StepKind::Work,
            start_offset_ms: offset,
            end_offset_ms: work_end,
            exercise_ref: Some(exercise_id.to_string()),
            duration_sec: Some(round.round_sec),
            set_number: Some(k + 1),
            round_number: Some(k),
            label: None,
        });
        offset = work_end;
        if k + 1 < round.rounds && round.rest_sec > 0 {
            let rest_end = offset + u64::from(round.rest_sec) * 1000;
            steps.push(TimelineStep {
                step_index: steps.len() as u32,
                kind: StepKind::Rest,
                start_offset_ms: offset,
                end_offset_ms: rest_end,
                exercise_ref: None,
                duration_sec: Some(round.rest_sec),
                set_number: None,
                round_number: Some(k),
                label: None,
            });
            offset = rest_end;
        }
    }
    steps
}

/// A repeating block of identical rounds.
#[derive(Debug, Clone)]
pub struct BlockPlan {
    pub block_index: u32,
    pub rounds: u32,
    pub round_sec: u32,
    pub exercises: Vec<ExercisePlan>,
}

impl BlockPlan {
    pub fn from_config(config: &CoachConfig, exercises: Vec<ExercisePlan>) -> Self {
        Self {
            block_index: 0,
            rounds: config.round.rounds,
            round_sec: config.round.round_sec,
            exercises,
        }
    }
}

pub struct TimelinePlayer {
    config: CoachConfig,
    ctx: SessionContext,
    caps: SessionCaps,
    bus: EventBus,
    tones: ToneEngine,
    voice: VoiceBus,
    speech: Option<Box<dyn SpeechSink>>,
    selector: ResponseSelector,
    queue: TimerQueue<CueAction>,
    master: CancelHandle,
    paused: bool,
    /// At most one technique hint per round; reset on every WorkStart.
    hint_fired: bool,
}

impl TimelinePlayer {
    pub fn new(ctx: SessionContext, config: CoachConfig) -> Self {
        let mut tones = ToneEngine::new();
        tones.set_verbosity(config.verbosity);
        let mut voice = VoiceBus::new(config.guard_ms);
        voice.set_volume(config.voice_volume);
        Self {
            config,
            ctx,
            caps: SessionCaps::default(),
            bus: EventBus::new(),
            tones,
            voice,
            speech: None,
            selector: ResponseSelector::new(),
            queue: TimerQueue::new(),
            master: CancelHandle::new(),
            paused: false,
            hint_fired: false,
        }
    }

    // ── Wiring ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, handler: impl FnMut(&Event) + 'static) {
        self.bus.subscribe(handler);
    }

    pub fn set_caps(&mut self, caps: SessionCaps) {
        self.caps = caps;
    }

    pub fn set_tone_sink(&mut self, sink: Box<dyn ToneSink>) {
        self.tones.set_sink(sink);
    }

    pub fn set_speech_sink(&mut self, sink: Box<dyn SpeechSink>) {
        self.speech = Some(sink);
    }

    pub fn set_phrase_store(&mut self, store: Box<dyn PhraseStore>) {
        self.selector.set_store(store);
    }

    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.ctx
    }

    /// Effective voice gain at `now_ms`. Hosts mixing their own speech audio
    /// sample this to apply the duck envelope around tones.
    pub fn voice_gain_at(&self, now_ms: u64) -> f32 {
        self.voice.gain_at(now_ms)
    }

    // ── Scheduling ───────────────────────────────────────────────────

    /// Schedule a precompiled step list starting at `start_ms`. The last
    /// step additionally gets BlockEnd at its end and WorkoutEnd a second
    /// later.
    pub fn play_steps(&mut self, steps: &[TimelineStep], start_ms: u64) -> CancelHandle {
        let handle = CancelHandle::new();
        for step in steps {
            let (start_ev, end_ev) = step_events(step);
            if let Some(ev) = start_ev {
                self.queue
                    .schedule_under(start_ms + step.start_offset_ms, CueAction::Emit(ev), &handle);
            }
            if let Some(ev) = end_ev {
                self.queue
                    .schedule_under(start_ms + step.end_offset_ms, CueAction::Emit(ev), &handle);
            }
        }
        if let Some(last) = steps.last() {
            let end = start_ms + last.end_offset_ms;
            self.queue.schedule_under(
                end,
                CueAction::Emit(Event::BlockEnd { block_index: 0 }),
                &handle,
            );
            self.queue.schedule_under(
                end + WORKOUT_END_DELAY_MS,
                CueAction::Emit(Event::WorkoutEnd),
                &handle,
            );
        }
        self.adopt(handle)
    }

    /// Schedule a full block of chained rounds starting at `start_ms`
    /// (first pip exactly at `start_ms`).
    pub fn play_block(&mut self, block: &BlockPlan, start_ms: u64) -> CancelHandle {
        let mut handle = CancelHandle::new();
        self.queue.schedule_under(
            start_ms,
            CueAction::Emit(Event::BlockStart {
                block_index: block.block_index,
            }),
            &handle,
        );

        let mut base = start_ms;
        let mut end_ms = start_ms;
        for k in 0..block.rounds {
            let plan = RoundPlan {
                round_index: k,
                round_sec: block.round_sec,
                exercises: block.exercises.clone(),
            };
            let lead = if k == 0 { 0 } else { round::NEXT_ROUND_PIPS_MS };
            handle.merge(round::schedule_round(
                &mut self.queue,
                self.config.verbosity,
                &plan,
                base,
                lead,
            ));
            end_ms = base + round::end_tone_offset_ms(block.round_sec);
            if k + 1 < block.rounds {
                let next_go =
                    end_ms + round::NEXT_ROUND_PIPS_MS + round::GO_OFFSET_MS;
                self.queue.schedule_under(
                    end_ms + round::ROUND_REST_DELAY_MS,
                    CueAction::Emit(Event::RoundRestStart {
                        round_index: k,
                        duration_secs: ((next_go - end_ms) / 1000) as u32,
                    }),
                    &handle,
                );
                self.queue.schedule_under(
                    next_go,
                    CueAction::Emit(Event::RoundRestEnd { round_index: k }),
                    &handle,
                );
            }
            base = end_ms + round::NEXT_ROUND_PIPS_MS;
        }

        self.queue.schedule_under(
            end_ms + WORKOUT_END_DELAY_MS,
            CueAction::Emit(Event::BlockEnd {
                block_index: block.block_index,
            }),
            &handle,
        );
        self.queue.schedule_under(
            end_ms + 2 * WORKOUT_END_DELAY_MS,
            CueAction::Emit(Event::WorkoutEnd),
            &handle,
        );
        self.adopt(handle)
    }

    /// Keep a cancel path through the player (for `stop`) and hand the same
    /// handle to the caller.
    fn adopt(&mut self, handle: CancelHandle) -> CancelHandle {
        self.master.merge(handle.clone());
        handle
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Pause: due actions are dropped, not rescheduled. Resuming does not
    /// replay anything missed while paused.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Clear every pending timer unconditionally.
    pub fn stop(&mut self) {
        self.master.cancel();
        self.queue.clear();
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.next_due()
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }

    /// Fire everything due at or before `now_ms`. The host calls this
    /// periodically (or steps a virtual clock through `next_due`).
    pub fn tick(&mut self, now_ms: u64) {
        for action in self.queue.due(now_ms) {
            self.dispatch(action, now_ms);
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: CueAction, now_ms: u64) {
        // Consulted immediately before each callback: a paused callback is
        // suppressed entirely.
        if self.paused {
            return;
        }
        match action {
            CueAction::Tone(kind) => self.play_tone(kind, now_ms),
            CueAction::Emit(event) => self.handle_event(event, now_ms),
            CueAction::SpeakLine { line } => self.say(line, now_ms),
            CueAction::LastSeconds { remaining_secs } => {
                if self.config.verbosity == Verbosity::High {
                    let args = RenderArgs {
                        remaining_secs: Some(remaining_secs),
                        ..Default::default()
                    };
                    self.speak_for(PhraseEventType::LastSeconds, args, now_ms);
                } else {
                    self.play_tone(ToneKind::LastSeconds, now_ms);
                }
            }
            CueAction::HintCheck {
                exercise_id,
                round_index,
                round_end_ms,
            } => self.hint_check(exercise_id, round_index, round_end_ms, now_ms),
        }
    }

    fn play_tone(&mut self, kind: ToneKind, now_ms: u64) {
        // Silent suppresses host beeps and haptics along with synthesis.
        if self.config.verbosity == Verbosity::Silent {
            return;
        }
        self.tones.play(kind, now_ms, &mut self.voice);
        self.caps.beep(kind);
        match kind {
            ToneKind::Start => self.caps.haptic(HapticKind::Buzz),
            ToneKind::End => self.caps.haptic(HapticKind::Tap),
            _ => {}
        }
    }

    fn handle_event(&mut self, event: Event, now_ms: u64) {
        self.bus.publish(&event);

        match &event {
            Event::RoundCountdown { .. } | Event::Countdown { .. } => {
                self.play_tone(ToneKind::Countdown, now_ms);
            }
            Event::WorkStart { .. } => {
                self.hint_fired = false;
                self.play_tone(ToneKind::Start, now_ms);
            }
            Event::WorkEnd { .. } => self.play_tone(ToneKind::End, now_ms),
            Event::BlockEnd { .. } => self.play_tone(ToneKind::Confirm, now_ms),
            _ => {}
        }

        if let Some((event_type, min_verbosity, args)) = self.speech_plan(&event) {
            if self.config.verbosity >= min_verbosity && self.config.verbosity != Verbosity::Silent
            {
                self.speak_for(event_type, args, now_ms);
            }
        }
    }

    /// Which pool key (if any) an event speaks through, the verbosity floor
    /// for it, and the render arguments.
    fn speech_plan(&mut self, event: &Event) -> Option<(PhraseEventType, Verbosity, RenderArgs)> {
        match event {
            Event::BlockStart { .. } => Some((
                PhraseEventType::BlockIntro,
                Verbosity::Minimal,
                RenderArgs::default(),
            )),
            Event::AwaitReady { exercise_id } => Some((
                PhraseEventType::Ready,
                Verbosity::Minimal,
                RenderArgs {
                    exercise: Some(self.ctx.exercise_name(exercise_id)),
                    ..Default::default()
                },
            )),
            Event::WorkPreview {
                exercise_id,
                set_number,
            } => Some((
                PhraseEventType::Preview,
                Verbosity::Minimal,
                RenderArgs {
                    exercise: Some(self.ctx.exercise_name(exercise_id)),
                    set_number: Some(*set_number),
                    ..Default::default()
                },
            )),
            Event::WorkStart {
                exercise_id,
                set_number,
                duration_secs,
            } => Some((
                PhraseEventType::WorkStart,
                Verbosity::Minimal,
                RenderArgs {
                    exercise: Some(self.ctx.exercise_name(exercise_id)),
                    set_number: Some(*set_number),
                    remaining_secs: Some(*duration_secs),
                    ..Default::default()
                },
            )),
            Event::TechHint { exercise_id, cue } => Some((
                PhraseEventType::TechHint,
                Verbosity::High,
                RenderArgs {
                    exercise: Some(self.ctx.exercise_name(exercise_id)),
                    cue: Some(cue.clone()),
                    ..Default::default()
                },
            )),
            Event::Halfway { remaining_secs } => Some((
                PhraseEventType::Halfway,
                Verbosity::High,
                RenderArgs {
                    remaining_secs: Some(*remaining_secs),
                    ..Default::default()
                },
            )),
            Event::RoundRestStart {
                round_index,
                duration_secs,
            } => Some((
                PhraseEventType::RoundRest,
                Verbosity::Minimal,
                RenderArgs {
                    round_number: Some(round_index + 1),
                    remaining_secs: Some(*duration_secs),
                    ..Default::default()
                },
            )),
            Event::WorkoutEnd => Some((
                PhraseEventType::WorkoutEnd,
                Verbosity::Minimal,
                RenderArgs::default(),
            )),
            _ => None,
        }
    }

    fn speak_for(&mut self, event_type: PhraseEventType, args: RenderArgs, now_ms: u64) {
        let query = PhraseQuery {
            event_type,
            pattern: self.ctx.pattern,
            mode: self.ctx.mode,
            chatter_level: self.config.verbosity,
            locale_id: self.ctx.locale_id.clone(),
        };
        let line = self.selector.select(&query, &args, now_ms);
        if !line.is_empty() {
            self.say(line, now_ms);
        }
    }

    /// Start speech now, or defer it past the voice bus's guard window.
    fn say(&mut self, line: String, now_ms: u64) {
        if let Some(delay) = self.voice.guard_delay(now_ms) {
            let handle = self
                .queue
                .schedule(now_ms + delay, CueAction::SpeakLine { line });
            self.master.merge(handle);
            return;
        }
        if let Some(sink) = self.speech.as_mut() {
            if let Err(e) = sink.speak(&line) {
                warn!(error = %e, "speech playback failed");
            }
        }
        self.caps.speak(&line);
        self.caps.caption(&line);
    }

    fn hint_check(
        &mut self,
        exercise_id: String,
        round_index: u32,
        round_end_ms: u64,
        now_ms: u64,
    ) {
        if self.hint_fired {
            return;
        }
        if !policy::allow_technical_hint(self.config.verbosity, round_index) {
            return;
        }
        if !policy::meets_confidence(self.ctx.confidence()) {
            return;
        }
        if !policy::has_time_remaining(now_ms, round_end_ms, HINT_MIN_REMAINING_SEC) {
            return;
        }
        let Some(cue) = self.ctx.next_cue(&exercise_id) else {
            return;
        };
        self.hint_fired = true;
        self.handle_event(Event::TechHint { exercise_id, cue }, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, Pattern};
    use crate::lookup::{ExerciseInfo, StaticLookup};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn context(verbosity: Verbosity) -> SessionContext {
        let lookup = Rc::new(StaticLookup::new(vec![ExerciseInfo {
            id: "squat".into(),
            name: "Goblet Squat".into(),
            technique_cues: vec!["chest up".into()],
            est_duration_sec: Some(45),
            unilateral: false,
        }]));
        SessionContext::new(Pattern::Circuit, Mode::Standard, verbosity, "en", lookup)
    }

    fn player(verbosity: Verbosity) -> TimelinePlayer {
        let mut config = CoachConfig::default();
        config.verbosity = verbosity;
        TimelinePlayer::new(context(verbosity), config)
    }

    fn collect_events(player: &mut TimelinePlayer) -> Rc<RefCell<Vec<Event>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        player.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    fn step(index: u32, kind: StepKind, start_ms: u64, end_ms: u64) -> TimelineStep {
        TimelineStep {
            step_index: index,
            kind,
            start_offset_ms: start_ms,
            end_offset_ms: end_ms,
            exercise_ref: Some("squat".into()),
            duration_sec: None,
            set_number: Some(1),
            round_number: Some(0),
            label: None,
        }
    }

    fn run_to_idle(player: &mut TimelinePlayer) {
        while let Some(due) = player.next_due() {
            player.tick(due);
        }
    }

    #[test]
    fn round_config_compiles_to_work_rest_steps() {
        let round = crate::config::RoundConfig {
            round_sec: 30,
            rest_sec: 10,
            rounds: 2,
        };
        let steps = steps_from_round_config(&round, "squat");
        // work / rest / work, no trailing rest.
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].kind, StepKind::Work);
        assert_eq!(steps[1].kind, StepKind::Rest);
        assert_eq!(steps[1].duration_sec, Some(10));
        assert_eq!(steps[2].kind, StepKind::Work);
        assert_eq!(steps[2].start_offset_ms, 40_000);
        assert_eq!(steps[2].end_offset_ms, 70_000);
        assert_eq!(steps[2].set_number, Some(2));
    }

    #[test]
    fn work_step_maps_to_start_and_end_events() {
        let mut p = player(Verbosity::Minimal);
        let seen = collect_events(&mut p);
        p.play_steps(&[step(0, StepKind::Work, 0, 30_000)], 0);
        run_to_idle(&mut p);
        let events = seen.borrow();
        assert!(matches!(events[0], Event::WorkStart { .. }));
        assert!(matches!(events[1], Event::WorkEnd { .. }));
        assert!(matches!(events[2], Event::BlockEnd { .. }));
        assert!(matches!(events[3], Event::WorkoutEnd));
    }

    #[test]
    fn transition_and_instruction_map_to_single_events() {
        let mut p = player(Verbosity::Minimal);
        let seen = collect_events(&mut p);
        p.play_steps(
            &[
                step(0, StepKind::Instruction, 0, 2_000),
                step(1, StepKind::Transition, 2_000, 5_000),
                step(2, StepKind::AwaitReady, 5_000, 6_000),
            ],
            0,
        );
        run_to_idle(&mut p);
        let kinds: Vec<_> = seen.borrow().iter().cloned().collect();
        assert!(matches!(kinds[0], Event::WorkPreview { .. }));
        assert!(matches!(kinds[1], Event::Countdown { seconds: 3 }));
        assert!(matches!(kinds[2], Event::AwaitReady { .. }));
    }

    #[test]
    fn paused_callbacks_are_dropped_not_replayed() {
        let mut p = player(Verbosity::Minimal);
        let seen = collect_events(&mut p);
        p.play_steps(&[step(0, StepKind::Work, 0, 10_000)], 0);
        p.tick(0);
        assert_eq!(seen.borrow().len(), 1); // WorkStart fired.
        p.pause();
        p.tick(10_000); // WorkEnd comes due while paused.
        assert_eq!(seen.borrow().len(), 1);
        p.resume();
        run_to_idle(&mut p);
        // WorkEnd was dropped; only the trailing block/workout end fire.
        let events = seen.borrow();
        assert!(!events.iter().any(|e| matches!(e, Event::WorkEnd { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::WorkoutEnd)));
    }

    #[test]
    fn stop_clears_all_pending_timers() {
        let mut p = player(Verbosity::Minimal);
        let seen = collect_events(&mut p);
        p.play_steps(&[step(0, StepKind::Work, 0, 10_000)], 0);
        p.tick(0);
        p.stop();
        assert_eq!(p.pending(), 0);
        p.tick(60_000);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn speech_after_tone_is_deferred_past_guard() {
        let spoken = Rc::new(RefCell::new(Vec::new()));
        let mut p = player(Verbosity::Minimal);
        let log = Rc::clone(&spoken);
        p.set_caps(SessionCaps {
            speak: Some(Box::new(move |line: &str| log.borrow_mut().push(line.to_string()))),
            ..Default::default()
        });
        p.play_steps(&[step(0, StepKind::Work, 0, 10_000)], 0);
        // WorkStart at t=0 plays the start tone, so its spoken line must
        // wait out the 250ms guard.
        p.tick(0);
        assert!(spoken.borrow().is_empty());
        p.tick(249);
        assert!(spoken.borrow().is_empty());
        p.tick(250);
        assert_eq!(spoken.borrow().len(), 1);
    }

    struct RecordingSpeech(Rc<RefCell<Vec<String>>>);

    impl SpeechSink for RecordingSpeech {
        fn speak(&mut self, text: &str) -> Result<(), crate::error::AudioError> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn speech_sink_receives_spoken_lines() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let mut p = player(Verbosity::Minimal);
        p.set_speech_sink(Box::new(RecordingSpeech(Rc::clone(&lines))));
        p.play_steps(&[step(0, StepKind::Work, 0, 10_000)], 0);
        run_to_idle(&mut p);
        // WorkStart and WorkoutEnd both speak at minimal verbosity.
        assert!(lines.borrow().iter().any(|l| l.contains("Goblet Squat")));
    }

    #[test]
    fn silent_verbosity_drives_no_beeps_or_haptics() {
        let beeps = Rc::new(RefCell::new(Vec::new()));
        let haptics = Rc::new(RefCell::new(Vec::new()));
        let mut p = player(Verbosity::Silent);
        let beep_log = Rc::clone(&beeps);
        let haptic_log = Rc::clone(&haptics);
        p.set_caps(SessionCaps {
            beep: Some(Box::new(move |kind| beep_log.borrow_mut().push(kind))),
            haptic: Some(Box::new(move |kind| haptic_log.borrow_mut().push(kind))),
            ..Default::default()
        });
        p.play_steps(&[step(0, StepKind::Work, 0, 10_000)], 0);
        run_to_idle(&mut p);
        assert!(beeps.borrow().is_empty());
        assert!(haptics.borrow().is_empty());
    }

    #[test]
    fn silent_verbosity_speaks_nothing() {
        let spoken = Rc::new(RefCell::new(Vec::new()));
        let mut p = player(Verbosity::Silent);
        let log = Rc::clone(&spoken);
        p.set_caps(SessionCaps {
            speak: Some(Box::new(move |line: &str| log.borrow_mut().push(line.to_string()))),
            ..Default::default()
        });
        p.play_steps(&[step(0, StepKind::Work, 0, 10_000)], 0);
        run_to_idle(&mut p);
        assert!(spoken.borrow().is_empty());
    }
}
