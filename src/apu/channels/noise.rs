//! Noise channel at $400C-$400F: a 15-bit LFSR gated by an envelope

use serde::{Deserialize, Serialize};

use crate::apu::components::{Envelope, LengthCounter, Timer};
use crate::apu::constants::NOISE_PERIOD_TABLE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseChannel {
    pub(crate) enabled: bool,
    pub(crate) envelope: Envelope,
    pub(crate) length_counter: LengthCounter,
    pub(crate) timer: Timer,
    pub(crate) lfsr: u16,
    /// Short mode: feedback from bit 6 instead of bit 1
    pub(crate) mode: bool,
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseChannel {
    pub fn new() -> Self {
        let mut timer = Timer::new();
        timer.set_period_direct(NOISE_PERIOD_TABLE[0] - 1);
        Self {
            enabled: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            timer,
            lfsr: 1,
            mode: false,
        }
    }

    /// --LC VVVV
    pub fn write_register_0(&mut self, data: u8) {
        self.length_counter.set_halt(data & 0x20 != 0);
        self.envelope.write_control(data);
    }

    /// M--- PPPP: mode and period index
    pub fn write_register_2(&mut self, data: u8) {
        self.mode = data & 0x80 != 0;
        // Table values are CPU cycles; the timer is clocked every CPU cycle
        let period = NOISE_PERIOD_TABLE[(data & 0x0F) as usize];
        self.timer.set_period_direct(period - 1);
    }

    pub fn write_register_3(&mut self, data: u8) {
        if self.enabled {
            self.length_counter.load(data >> 3);
        }
        self.envelope.restart();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    pub fn clock_timer(&mut self) {
        if !self.timer.clock() {
            return;
        }
        let tap = if self.mode { 6 } else { 1 };
        let feedback = (self.lfsr ^ (self.lfsr >> tap)) & 0x01;
        self.lfsr = (self.lfsr >> 1) | (feedback << 14);
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Envelope volume while LFSR bit 0 is clear, otherwise 0
    pub fn output(&self) -> u8 {
        if !self.length_counter.is_active() || self.lfsr & 0x01 != 0 {
            return 0;
        }
        self.envelope.volume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_new() {
        let noise = NoiseChannel::new();
        assert!(!noise.enabled);
        assert_eq!(noise.lfsr, 1);
        assert!(!noise.mode);
        assert_eq!(noise.output(), 0);
    }

    #[test]
    fn test_period_index_and_mode() {
        let mut noise = NoiseChannel::new();
        noise.write_register_2(0x8F);
        assert!(noise.mode);
        assert_eq!(noise.timer.period, 4067);
    }

    #[test]
    fn test_lfsr_long_mode_step() {
        let mut noise = NoiseChannel::new();
        // First timer tick reloads from zero and shifts
        noise.clock_timer();
        // bit0 = 1, bit1 = 0: feedback 1 lands in bit 14
        assert_eq!(noise.lfsr, 0x4000);
    }

    #[test]
    fn test_lfsr_short_mode_step() {
        let mut noise = NoiseChannel::new();
        noise.write_register_2(0x80);
        noise.lfsr = 0x0041;
        noise.clock_timer();
        // bit0 = 1, bit6 = 1: feedback 0
        assert_eq!(noise.lfsr, 0x0020);
    }

    #[test]
    fn test_output_gated_by_lfsr() {
        let mut noise = NoiseChannel::new();
        noise.set_enabled(true);
        noise.write_register_0(0x1F);
        noise.write_register_3(0x08);

        noise.lfsr = 0x0002;
        assert_eq!(noise.output(), 15);
        noise.lfsr = 0x0003;
        assert_eq!(noise.output(), 0);
    }

    #[test]
    fn test_lfsr_never_reaches_zero() {
        let mut noise = NoiseChannel::new();
        noise.write_register_2(0x00);
        for _ in 0..100_000 {
            noise.clock_timer();
            assert_ne!(noise.lfsr, 0);
        }
    }
}
