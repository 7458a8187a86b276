//! Tone synthesis and the cancellable tone sequencer.
//!
//! Each tone kind maps to one fixed shape: a sine at a set frequency with a
//! linear attack/release envelope and gentle one-pole low-pass filtering to
//! soften the transient. Playback is fire-and-forget; failures are logged
//! and swallowed.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::sink::{NullSink, ToneSink};
use crate::audio::voice::VoiceBus;
use crate::config::Verbosity;
use crate::timers::{CancelHandle, TimerQueue};

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneKind {
    /// Pre-round pip.
    Countdown,
    /// "Go" chime.
    Start,
    /// Last-ten-seconds pip.
    LastSeconds,
    /// End-of-work chime.
    End,
    /// Soft confirmation blip (minute marks, acknowledgements).
    Confirm,
}

/// Fixed synthesis parameters for one tone kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneShape {
    pub freq_hz: f32,
    pub duration_ms: u32,
    pub attack_ms: u32,
    pub release_ms: u32,
    pub gain: f32,
    pub lowpass_hz: f32,
}

impl ToneKind {
    pub fn shape(self) -> ToneShape {
        match self {
            ToneKind::Countdown => ToneShape {
                freq_hz: 660.0,
                duration_ms: 140,
                attack_ms: 8,
                release_ms: 60,
                gain: 0.6,
                lowpass_hz: 2_400.0,
            },
            ToneKind::Start => ToneShape {
                freq_hz: 880.0,
                duration_ms: 320,
                attack_ms: 10,
                release_ms: 140,
                gain: 0.8,
                lowpass_hz: 3_200.0,
            },
            ToneKind::LastSeconds => ToneShape {
                freq_hz: 740.0,
                duration_ms: 180,
                attack_ms: 6,
                release_ms: 80,
                gain: 0.7,
                lowpass_hz: 2_800.0,
            },
            ToneKind::End => ToneShape {
                freq_hz: 440.0,
                duration_ms: 420,
                attack_ms: 12,
                release_ms: 220,
                gain: 0.8,
                lowpass_hz: 2_000.0,
            },
            ToneKind::Confirm => ToneShape {
                freq_hz: 520.0,
                duration_ms: 90,
                attack_ms: 5,
                release_ms: 40,
                gain: 0.4,
                lowpass_hz: 2_200.0,
            },
        }
    }
}

/// Render a shape to mono PCM.
pub fn synthesize(shape: &ToneShape, sample_rate: u32) -> Vec<f32> {
    let total = (shape.duration_ms as u64 * sample_rate as u64 / 1000) as usize;
    let attack = (shape.attack_ms as u64 * sample_rate as u64 / 1000) as usize;
    let release = (shape.release_ms as u64 * sample_rate as u64 / 1000) as usize;
    let sustain_end = total.saturating_sub(release);

    // One-pole low-pass coefficient.
    let dt = 1.0 / sample_rate as f32;
    let rc = 1.0 / (2.0 * std::f32::consts::PI * shape.lowpass_hz);
    let alpha = dt / (rc + dt);

    let mut out = Vec::with_capacity(total);
    let mut filtered = 0.0f32;
    for n in 0..total {
        let t = n as f32 / sample_rate as f32;
        let raw = (2.0 * std::f32::consts::PI * shape.freq_hz * t).sin();
        let env = if attack > 0 && n < attack {
            n as f32 / attack as f32
        } else if release > 0 && n >= sustain_end {
            (total - n) as f32 / release as f32
        } else {
            1.0
        };
        filtered += alpha * (raw * env * shape.gain - filtered);
        out.push(filtered);
    }
    out
}

/// One item of a tone sequence, offset relative to "now".
#[derive(Debug, Clone, Copy)]
pub struct SequenceItem {
    pub offset_ms: u64,
    pub kind: ToneKind,
}

/// Synthesizes tones into a lazily-created sink and notifies the voice bus
/// of every start so speech keeps clear of tone transients.
pub struct ToneEngine {
    sink: Option<Box<dyn ToneSink>>,
    verbosity: Verbosity,
    sample_rate: u32,
}

impl ToneEngine {
    pub fn new() -> Self {
        Self {
            sink: None,
            verbosity: Verbosity::Minimal,
            sample_rate: SAMPLE_RATE,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn ToneSink>) {
        self.sink = Some(sink);
    }

    /// `Silent` fully suppresses tones (the voice bus is then not notified
    /// either -- nothing played).
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Play one tone, fire-and-forget. Sink errors are logged, not surfaced.
    pub fn play(&mut self, kind: ToneKind, now_ms: u64, voice: &mut VoiceBus) {
        if self.verbosity == Verbosity::Silent {
            return;
        }
        let shape = kind.shape();
        let samples = synthesize(&shape, self.sample_rate);
        let rate = self.sample_rate;
        let sink = self.sink.get_or_insert_with(|| Box::new(NullSink));
        if let Err(e) = sink.play(kind, &samples, rate) {
            warn!(tone = ?kind, error = %e, "tone playback failed");
        }
        voice.note_tone(now_ms, shape.duration_ms);
    }

    /// Schedule a cancellable run of tones relative to `now_ms`; one handle
    /// clears them all. The queue's action type just needs to admit a tone.
    pub fn sequence<A: From<ToneKind>>(
        queue: &mut TimerQueue<A>,
        now_ms: u64,
        items: &[SequenceItem],
    ) -> CancelHandle {
        let handle = CancelHandle::new();
        for item in items {
            queue.schedule_under(now_ms + item.offset_ms, A::from(item.kind), &handle);
        }
        handle
    }
}

impl Default for ToneEngine {
    fn default() -> Self {
        Self::new()
    }
}
