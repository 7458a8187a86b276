//! Round scheduler: the canonical multi-phase round timing.
//!
//! All offsets are relative to the round's first countdown pip (`base_ms`).
//! With `R = round_sec`:
//!
//! ```text
//! base+0      pip (3)
//! base+1000   pip (2)
//! base+2000   go tone, WorkStart            <- T0
//! T0+60k*1000 minute-mark pips
//! T0+R*500    Halfway (highest verbosity, >=10s from both ends)
//! T0+(R-10)s  last-ten-seconds cue
//! T0+R*1000+1000  end tone, WorkEnd         <- E
//! E+700       RoundRestStart (after the end tone's tail)
//! E+3000/4000 next round's pips; its go tone lands at E+5000
//! ```
//!
//! Optional pre-round preview fires `PREVIEW_LEAD_MS` before the first pip
//! when there is enough lead and verbosity is at least minimal. Technique
//! hint checks are placed at the midpoints of up to two pacing windows; the
//! player's per-round flag keeps at most one from speaking.
//!
//! Everything scheduled here hangs off one cancel handle: cancelling it
//! stops every pending tone and event with no further side effects.

use crate::config::Verbosity;
use crate::events::Event;
use crate::pacing::{pacing_windows, ExercisePlan};
use crate::player::CueAction;
use crate::policy;
use crate::timers::{CancelHandle, TimerQueue};

/// Go tone offset from the first pip.
pub const GO_OFFSET_MS: u64 = 2000;
/// End tone rings this long after the nominal work end.
pub const END_TONE_GRACE_MS: u64 = 1000;
/// RoundRestStart fires this long after the end tone.
pub const ROUND_REST_DELAY_MS: u64 = 700;
/// The next round's pips begin this long after the end tone.
pub const NEXT_ROUND_PIPS_MS: u64 = 3000;
/// Lead needed (and used) for a spoken preview before the first pip.
pub const PREVIEW_LEAD_MS: u64 = 2500;

/// A hint or halfway cue needs at least this much round left.
const MIN_CUE_REMAINING_SEC: u32 = 10;

/// One round of a block: a fixed work interval over one to three exercises.
#[derive(Debug, Clone)]
pub struct RoundPlan {
    pub round_index: u32,
    pub round_sec: u32,
    pub exercises: Vec<ExercisePlan>,
}

impl RoundPlan {
    fn primary_exercise(&self) -> String {
        self.exercises
            .first()
            .map(|e| e.exercise_id.clone())
            .unwrap_or_default()
    }

    fn set_number(&self) -> u32 {
        self.round_index + 1
    }
}

/// Offset of the end tone (and WorkEnd) from the round's first pip.
pub fn end_tone_offset_ms(round_sec: u32) -> u64 {
    GO_OFFSET_MS + u64::from(round_sec) * 1000 + END_TONE_GRACE_MS
}

/// Base offset of the next chained round, relative to this round's base.
pub fn next_round_base_ms(round_sec: u32) -> u64 {
    end_tone_offset_ms(round_sec) + NEXT_ROUND_PIPS_MS
}

/// Schedule one round's cues into `queue`. `lead_ms` is how much quiet time
/// exists before `base_ms`; the preview is skipped when it is too short.
/// Returns the handle covering every entry placed here.
pub fn schedule_round(
    queue: &mut TimerQueue<CueAction>,
    verbosity: Verbosity,
    plan: &RoundPlan,
    base_ms: u64,
    lead_ms: u64,
) -> CancelHandle {
    let handle = CancelHandle::new();
    let round_sec = plan.round_sec;
    let t0 = base_ms + GO_OFFSET_MS;
    let work_end_ms = t0 + u64::from(round_sec) * 1000;
    let end_ms = base_ms + end_tone_offset_ms(round_sec);

    // The preview also needs the clock origin itself to be far enough out;
    // a base inside the lead window would put it at a negative instant.
    if verbosity >= Verbosity::Minimal && lead_ms >= PREVIEW_LEAD_MS {
        if let Some(preview_ms) = base_ms.checked_sub(PREVIEW_LEAD_MS) {
            queue.schedule_under(
                preview_ms,
                CueAction::Emit(Event::WorkPreview {
                    exercise_id: plan.primary_exercise(),
                    set_number: plan.set_number(),
                }),
                &handle,
            );
        }
    }

    for (i, seconds) in [3u32, 2].into_iter().enumerate() {
        queue.schedule_under(
            base_ms + i as u64 * 1000,
            CueAction::Emit(Event::RoundCountdown {
                round_index: plan.round_index,
                seconds,
            }),
            &handle,
        );
    }

    queue.schedule_under(
        t0,
        CueAction::Emit(Event::WorkStart {
            exercise_id: plan.primary_exercise(),
            set_number: plan.set_number(),
            duration_secs: round_sec,
        }),
        &handle,
    );

    // Minute-mark pips, skipping any that fall in the last-ten-seconds zone.
    let mut minute = 60u32;
    while minute + MIN_CUE_REMAINING_SEC < round_sec {
        queue.schedule_under(
            t0 + u64::from(minute) * 1000,
            CueAction::Tone(crate::audio::ToneKind::Confirm),
            &handle,
        );
        minute += 60;
    }

    if verbosity == Verbosity::High {
        let half = round_sec / 2;
        if half >= MIN_CUE_REMAINING_SEC && round_sec - half >= MIN_CUE_REMAINING_SEC {
            queue.schedule_under(
                t0 + u64::from(round_sec) * 500,
                CueAction::Emit(Event::Halfway {
                    remaining_secs: round_sec - half,
                }),
                &handle,
            );
        }
    }

    if policy::allow_technical_hint(verbosity, plan.round_index) {
        let windows = pacing_windows(round_sec, &plan.exercises);
        if !windows.is_empty() {
            let preferred =
                if policy::prefer_second_exercise(plan.round_index) && windows.len() >= 2 {
                    1
                } else {
                    0
                };
            let midpoint = |i: usize| {
                u64::from(windows[i].start_offset_sec) + u64::from(windows[i].duration_sec) / 2
            };
            let mut slots = vec![preferred];
            // Backup slots; only windows after the preferred one, so they
            // cannot preempt it. The player's per-round flag still enforces
            // at most one spoken hint.
            slots.extend((0..windows.len()).filter(|i| *i != preferred && midpoint(*i) > midpoint(preferred)));
            for idx in slots {
                let w = &windows[idx];
                let mid_sec = midpoint(idx);
                queue.schedule_under(
                    t0 + mid_sec * 1000,
                    CueAction::HintCheck {
                        exercise_id: w.exercise_id.clone(),
                        round_index: plan.round_index,
                        round_end_ms: work_end_ms,
                    },
                    &handle,
                );
            }
        }
    }

    if round_sec > MIN_CUE_REMAINING_SEC {
        queue.schedule_under(
            t0 + u64::from(round_sec - 10) * 1000,
            CueAction::LastSeconds { remaining_secs: 10 },
            &handle,
        );
    }

    queue.schedule_under(
        end_ms,
        CueAction::Emit(Event::WorkEnd {
            exercise_id: plan.primary_exercise(),
            set_number: plan.set_number(),
        }),
        &handle,
    );

    handle
}
