//! Voice bus: one gain stage for all voice audio.
//!
//! Two jobs. First, smooth ducking around tones -- voice gain ramps down as
//! a tone starts, holds low while it rings, then ramps back up. Second, the
//! guard window: speech or captions requested inside `guard_ms` of a tone
//! start are deferred past it, so no spoken line begins inside a tone's
//! transient. The bus is owned by the session, never global, so concurrent
//! sessions don't share throttle state.

pub const DEFAULT_GUARD_MS: u64 = 250;

const DUCK_RAMP_DOWN_MS: u64 = 120;
const DUCK_RAMP_UP_MS: u64 = 300;
const DUCK_FLOOR: f32 = 0.25;

#[derive(Debug)]
pub struct VoiceBus {
    volume: f32,
    guard_ms: u64,
    /// Start of the most recent tone, epoch/offset ms.
    last_tone_ms: Option<u64>,
    /// Ring time of that tone; the duck holds for its length.
    last_tone_duration_ms: u64,
}

impl VoiceBus {
    pub fn new(guard_ms: u64) -> Self {
        Self {
            volume: 1.0,
            guard_ms,
            last_tone_ms: None,
            last_tone_duration_ms: 0,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Record a tone start. Called by the tone engine for every play.
    pub fn note_tone(&mut self, now_ms: u64, tone_duration_ms: u32) {
        self.last_tone_ms = Some(now_ms);
        self.last_tone_duration_ms = u64::from(tone_duration_ms);
    }

    /// Effective voice gain at `now_ms`: full volume away from tones, ducked
    /// through the ramp-down / hold / ramp-up envelope around one.
    pub fn gain_at(&self, now_ms: u64) -> f32 {
        let Some(tone_ms) = self.last_tone_ms else {
            return self.volume;
        };
        let elapsed = now_ms.saturating_sub(tone_ms);
        let hold_end = DUCK_RAMP_DOWN_MS + self.last_tone_duration_ms;
        let factor = if elapsed < DUCK_RAMP_DOWN_MS {
            let t = elapsed as f32 / DUCK_RAMP_DOWN_MS as f32;
            1.0 - (1.0 - DUCK_FLOOR) * t
        } else if elapsed < hold_end {
            DUCK_FLOOR
        } else if elapsed < hold_end + DUCK_RAMP_UP_MS {
            let t = (elapsed - hold_end) as f32 / DUCK_RAMP_UP_MS as f32;
            DUCK_FLOOR + (1.0 - DUCK_FLOOR) * t
        } else {
            1.0
        };
        self.volume * factor
    }

    /// If a speech start at `now_ms` would land inside the guard window,
    /// returns how long to defer it; `None` means start immediately.
    pub fn guard_delay(&self, now_ms: u64) -> Option<u64> {
        let tone_ms = self.last_tone_ms?;
        let elapsed = now_ms.saturating_sub(tone_ms);
        if elapsed < self.guard_ms {
            Some(self.guard_ms - elapsed)
        } else {
            None
        }
    }
}

impl Default for VoiceBus {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_MS)
    }
}
