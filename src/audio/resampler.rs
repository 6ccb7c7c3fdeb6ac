// Audio resampler - CPU-rate samples down to the host rate
//
// The APU produces one sample per CPU cycle (~1.79 MHz). The host wants
// 44.1 or 48 kHz. Each output sample is linearly interpolated between the two
// input samples that straddle its position.

use serde::{Deserialize, Serialize};

pub mod sample_rates {
    /// NTSC CPU clock in Hz
    pub const NES_CPU_CLOCK: f64 = 1_789_773.0;

    pub const AUDIO_44_1_KHZ: f64 = 44_100.0;

    pub const AUDIO_48_KHZ: f64 = 48_000.0;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resampler {
    input_rate: f64,
    output_rate: f64,
    /// Input samples per output sample
    step: f64,
    /// Input samples accumulated toward the next output sample
    position: f64,
    prev_sample: f32,
    current_sample: f32,
}

impl Resampler {
    pub fn new(input_rate: f64, output_rate: f64) -> Self {
        Self {
            input_rate,
            output_rate,
            step: input_rate / output_rate,
            position: 0.0,
            prev_sample: 0.0,
            current_sample: 0.0,
        }
    }

    /// CPU clock to the given host rate
    pub fn from_cpu_clock(output_rate: u32) -> Self {
        Self::new(sample_rates::NES_CPU_CLOCK, output_rate as f64)
    }

    /// Feed one input sample; returns an output sample when one falls due
    pub fn push(&mut self, sample: f32) -> Option<f32> {
        self.prev_sample = self.current_sample;
        self.current_sample = sample;
        self.position += 1.0;

        if self.position < self.step {
            return None;
        }

        // How far the output point lies behind the newest input, in 0.0..1.0
        self.position -= self.step;
        let behind = self.position.min(1.0) as f32;
        Some(self.current_sample + (self.prev_sample - self.current_sample) * behind)
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
        self.prev_sample = 0.0;
        self.current_sample = 0.0;
    }

    pub fn input_rate(&self) -> f64 {
        self.input_rate
    }

    pub fn output_rate(&self) -> f64 {
        self.output_rate
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new(sample_rates::NES_CPU_CLOCK, sample_rates::AUDIO_44_1_KHZ)
    }
}
