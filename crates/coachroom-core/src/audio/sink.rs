//! Output ports for synthesized tones and spoken lines.
//!
//! The concrete audio device and speech backend live in the host. Sink
//! failures are logged by the callers and swallowed: a missed cue must never
//! halt the timeline.

use crate::audio::tone::ToneKind;
use crate::error::AudioError;

/// Plays a synthesized PCM buffer. Implementations are expected to create
/// their output device lazily on first play.
pub trait ToneSink {
    fn play(&mut self, kind: ToneKind, samples: &[f32], sample_rate: u32) -> Result<(), AudioError>;
}

/// Speaks one line of text, fire-and-forget.
pub trait SpeechSink {
    fn speak(&mut self, text: &str) -> Result<(), AudioError>;
}

/// Discards everything; the default for sessions with no audio host.
#[derive(Debug, Default)]
pub struct NullSink;

impl ToneSink for NullSink {
    fn play(&mut self, _kind: ToneKind, _samples: &[f32], _sample_rate: u32) -> Result<(), AudioError> {
        Ok(())
    }
}

impl SpeechSink for NullSink {
    fn speak(&mut self, _text: &str) -> Result<(), AudioError> {
        Ok(())
    }
}
