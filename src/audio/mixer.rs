// Audio mixer - NES APU non-linear mixing
//
// The 2A03 sums its channels through two resistor ladders, so the output is
// not a linear sum. The standard approximation:
//
// ```text
// pulse_out = 95.88 / (8128 / (pulse1 + pulse2) + 100)
// tnd_out   = 159.79 / (1 / (triangle / 8227 + noise / 12241 + dmc / 22638) + 100)
// output    = pulse_out + tnd_out                        (0.0 ..= ~1.0)
// ```

use serde::{Deserialize, Serialize};

/// Non-linear channel mixer with a master volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mixer {
    volume: f32,
}

impl Mixer {
    pub fn new() -> Self {
        Self { volume: 1.0 }
    }

    pub fn with_volume(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Master volume, clamped to 0.0..=1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mix one CPU cycle of channel levels into a sample in 0.0..=1.0
    ///
    /// # Arguments
    ///
    /// * `pulse1`, `pulse2`, `triangle`, `noise` - Channel levels (0-15)
    /// * `dmc` - DMC level (0-127)
    pub fn mix(&self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
        let mixed = Self::pulse_out(pulse1, pulse2) + Self::tnd_out(triangle, noise, dmc);
        (mixed * self.volume).clamp(0.0, 1.0)
    }

    fn pulse_out(pulse1: u8, pulse2: u8) -> f32 {
        let sum = pulse1 as f32 + pulse2 as f32;
        if sum == 0.0 {
            return 0.0;
        }
        95.88 / (8128.0 / sum + 100.0)
    }

    fn tnd_out(triangle: u8, noise: u8, dmc: u8) -> f32 {
        let sum = triangle as f32 / 8227.0 + noise as f32 / 12241.0 + dmc as f32 / 22638.0;
        if sum == 0.0 {
            return 0.0;
        }
        159.79 / (1.0 / sum + 100.0)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamping() {
        assert_eq!(Mixer::with_volume(2.0).volume(), 1.0);
        assert_eq!(Mixer::with_volume(-1.0).volume(), 0.0);
    }

    #[test]
    fn test_silence_is_zero() {
        assert_eq!(Mixer::new().mix(0, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_pulse_formula() {
        let mixer = Mixer::new();
        let expected = 95.88 / (8128.0 / 30.0 + 100.0);
        assert!((mixer.mix(15, 15, 0, 0, 0) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_tnd_formula() {
        let mixer = Mixer::new();
        let tnd: f32 = 15.0 / 8227.0 + 15.0 / 12241.0 + 127.0 / 22638.0;
        let expected = 159.79 / (1.0 / tnd + 100.0);
        assert!((mixer.mix(0, 0, 15, 15, 127) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_full_scale_stays_in_range() {
        let sample = Mixer::new().mix(15, 15, 15, 15, 127);
        assert!(sample > 0.9 && sample <= 1.0, "got {}", sample);
    }

    #[test]
    fn test_mixing_is_non_linear() {
        let mixer = Mixer::new();
        let one = mixer.mix(8, 0, 0, 0, 0);
        let two = mixer.mix(8, 8, 0, 0, 0);
        assert!(two < one * 2.0);
    }

    #[test]
    fn test_volume_scales_output() {
        let full = Mixer::new().mix(15, 0, 0, 0, 0);
        let half = Mixer::with_volume(0.5).mix(15, 0, 0, 0, 0);
        assert!((half - full * 0.5).abs() < 1e-6);
    }
}
