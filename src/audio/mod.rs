// Audio module - from APU channel levels to host samples
//
// This module provides:
// - Non-linear APU mixing
// - Sample rate conversion (CPU clock to 44.1/48 kHz)
// - A bounded drop-oldest buffer the host drains
//
// Playback itself belongs to the host; the core only fills `SampleBuffer`.

pub mod buffer;
pub mod mixer;
pub mod resampler;

pub use buffer::SampleBuffer;
pub use mixer::Mixer;
pub use resampler::{sample_rates, Resampler};

use serde::{Deserialize, Serialize};

/// Mixer, resampler and output buffer chained together
///
/// Mixer and resampler state travel with snapshots; the buffered samples
/// belong to the host and are not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioPipeline {
    mixer: Mixer,
    resampler: Resampler,
    #[serde(skip)]
    buffer: SampleBuffer,
    /// CPU-rate samples consumed
    samples_in: u64,
    /// Host-rate samples produced
    samples_out: u64,
}

impl AudioPipeline {
    pub fn new(sample_rate: u32, capacity: usize) -> Self {
        Self {
            mixer: Mixer::new(),
            resampler: Resampler::from_cpu_clock(sample_rate),
            buffer: SampleBuffer::new(capacity),
            samples_in: 0,
            samples_out: 0,
        }
    }

    /// Feed one CPU cycle's channel levels
    #[inline]
    pub fn process(&mut self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) {
        let mixed = self.mixer.mix(pulse1, pulse2, triangle, noise, dmc);
        self.samples_in += 1;
        if let Some(sample) = self.resampler.push(mixed) {
            self.buffer.push(sample);
            self.samples_out += 1;
        }
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut SampleBuffer {
        &mut self.buffer
    }

    /// Swap the host buffers of two pipelines
    ///
    /// Used when a snapshot replaces the machine state so the host keeps its
    /// queued samples and configured capacity.
    pub fn swap_buffer(&mut self, other: &mut AudioPipeline) {
        std::mem::swap(&mut self.buffer, &mut other.buffer);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.mixer.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.mixer.volume()
    }

    pub fn stats(&self) -> AudioStats {
        AudioStats {
            samples_processed: self.samples_in,
            samples_output: self.samples_out,
            buffer_len: self.buffer.len(),
            buffer_capacity: self.buffer.capacity(),
            dropped: self.buffer.dropped(),
        }
    }
}

impl Default for AudioPipeline {
    fn default() -> Self {
        Self::new(
            sample_rates::AUDIO_44_1_KHZ as u32,
            buffer::DEFAULT_CAPACITY,
        )
    }
}

/// Audio statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioStats {
    /// Total CPU-rate samples mixed
    pub samples_processed: u64,

    /// Total host-rate samples produced
    pub samples_output: u64,

    pub buffer_len: usize,

    pub buffer_capacity: usize,

    /// Samples discarded on overflow
    pub dropped: u64,
}

impl AudioStats {
    /// Buffer fullness (0.0 - 1.0)
    pub fn buffer_fullness(&self) -> f32 {
        if self.buffer_capacity == 0 {
            0.0
        } else {
            self.buffer_len as f32 / self.buffer_capacity as f32
        }
    }

    /// Output samples per input sample
    pub fn resampling_ratio(&self) -> f64 {
        if self.samples_processed == 0 {
            0.0
        } else {
            self.samples_output as f64 / self.samples_processed as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_stats() {
        let stats = AudioStats {
            samples_processed: 1000,
            samples_output: 50,
            buffer_len: 25,
            buffer_capacity: 100,
            dropped: 0,
        };

        assert_eq!(stats.buffer_fullness(), 0.25);
        assert_eq!(stats.resampling_ratio(), 0.05);
    }

    #[test]
    fn test_pipeline_fills_buffer_at_host_rate() {
        let mut pipeline = AudioPipeline::new(44_100, 8192);
        for _ in 0..29_781 {
            pipeline.process(15, 0, 0, 0, 0);
        }
        // One NTSC frame of CPU cycles is ~734 samples at 44.1 kHz
        let stats = pipeline.stats();
        assert!((733..=734).contains(&stats.samples_output), "got {}", stats.samples_output);
        assert_eq!(stats.buffer_len as u64, stats.samples_output);
    }

    #[test]
    fn test_buffer_not_serialized() {
        let mut pipeline = AudioPipeline::new(44_100, 16);
        for _ in 0..1000 {
            pipeline.process(15, 15, 0, 0, 0);
        }
        let json = serde_json::to_string(&pipeline).unwrap();
        let restored: AudioPipeline = serde_json::from_str(&json).unwrap();
        assert!(restored.buffer().is_empty());
        assert_eq!(restored.stats().samples_processed, 1000);
    }
}
