mod sink;
mod tone;
mod voice;

pub use sink::{NullSink, SpeechSink, ToneSink};
pub use tone::{synthesize, SequenceItem, ToneEngine, ToneKind, ToneShape, SAMPLE_RATE};
pub use voice::{VoiceBus, DEFAULT_GUARD_MS};
