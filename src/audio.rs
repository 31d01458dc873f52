//! Audio system using Web Audio API
//!
//! Procedurally generated hit sound, no external files needed. Audio is
//! best-effort: any failure to create or drive the context just means silence.
//! Native builds get a silent stand-in with the same interface.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits a block
    BlockHit,
}

/// Gain of a hit at full volume
const HIT_GAIN: f32 = 0.3;

/// Map the 0-100 game volume to an oscillator gain
pub fn hit_gain(volume: u8, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        volume.min(100) as f32 / 100.0 * HIT_GAIN
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{SoundEffect, hit_gain};
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: u8,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self {
                ctx: None,
                volume: 50,
                muted: false,
            }
        }

        /// Create the context lazily, browsers only allow it after a gesture
        fn context(&mut self) -> Option<&AudioContext> {
            if self.ctx.is_none() {
                self.ctx = AudioContext::new().ok();
                if self.ctx.is_none() {
                    log::warn!("Failed to create AudioContext - audio disabled");
                }
            }
            self.ctx.as_ref()
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&mut self) {
            if let Some(ctx) = self.context() {
                let _ = ctx.resume();
            }
        }

        pub fn set_volume(&mut self, volume: u8) {
            self.volume = volume.min(100);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play(&mut self, effect: SoundEffect) {
            let gain = hit_gain(self.volume, self.muted);
            if gain <= 0.0 {
                return;
            }
            let Some(ctx) = self.context() else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::BlockHit => play_block_hit(ctx, gain),
            }
        }
    }

    fn create_osc(ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Square-wave chirp sliding 800 Hz down to 200 Hz
    fn play_block_hit(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = create_osc(ctx, 800.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(800.0, t).ok();
        osc.frequency().exponential_ramp_to_value_at_time(200.0, t + 0.1).ok();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.1).ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.1).ok();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod silent {
    use super::SoundEffect;

    /// Silent audio manager for native runs
    #[derive(Debug, Default)]
    pub struct AudioManager {
        volume: u8,
        muted: bool,
        played: u64,
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self {
                volume: 50,
                ..Self::default()
            }
        }

        pub fn resume(&mut self) {}

        pub fn set_volume(&mut self, volume: u8) {
            self.volume = volume.min(100);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play(&mut self, _effect: SoundEffect) {
            if super::hit_gain(self.volume, self.muted) > 0.0 {
                self.played += 1;
            }
        }

        /// Sounds that would have been audible
        pub fn played(&self) -> u64 {
            self.played
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(not(target_arch = "wasm32"))]
pub use silent::AudioManager;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_gain() {
        assert_eq!(hit_gain(100, false), 0.3);
        assert_eq!(hit_gain(50, false), 0.15);
        assert_eq!(hit_gain(0, false), 0.0);
        assert_eq!(hit_gain(80, true), 0.0);
        assert_eq!(hit_gain(200, false), 0.3);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_silent_manager_counts_audible_hits() {
        let mut audio = AudioManager::new();
        audio.play(SoundEffect::BlockHit);
        audio.set_volume(0);
        audio.play(SoundEffect::BlockHit);
        audio.set_volume(70);
        audio.set_muted(true);
        audio.play(SoundEffect::BlockHit);
        assert_eq!(audio.played(), 1);
    }
}
