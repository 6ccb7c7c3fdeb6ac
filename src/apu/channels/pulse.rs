//! Pulse (square wave) channel, two instances at $4000 and $4004

use serde::{Deserialize, Serialize};

use crate::apu::components::{Envelope, LengthCounter, Sweep, Timer};
use crate::apu::constants::DUTY_PATTERNS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseChannel {
    pub(crate) enabled: bool,
    pub(crate) duty: u8,
    duty_position: u8,
    pub(crate) envelope: Envelope,
    pub(crate) sweep: Sweep,
    pub(crate) length_counter: LengthCounter,
    pub(crate) timer: Timer,
}

impl PulseChannel {
    /// `channel_number` is 1 or 2; it selects the sweep negate behavior
    pub fn new(channel_number: u8) -> Self {
        Self {
            enabled: false,
            duty: 0,
            duty_position: 0,
            envelope: Envelope::new(),
            sweep: Sweep::new(channel_number),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
        }
    }

    /// Duty and sweep state index their tables in bounds
    pub fn indices_in_range(&self) -> bool {
        (self.duty as usize) < DUTY_PATTERNS.len()
            && self.duty_position < 8
            && self.sweep.shift_in_range()
    }

    /// DDLC VVVV: duty, length halt, constant volume, volume/period
    pub fn write_register_0(&mut self, data: u8) {
        self.duty = (data >> 6) & 0x03;
        self.length_counter.set_halt(data & 0x20 != 0);
        self.envelope.write_control(data);
    }

    pub fn write_register_1(&mut self, data: u8) {
        self.sweep.write_control(data);
    }

    pub fn write_register_2(&mut self, data: u8) {
        let high = self.timer.period_high();
        self.timer.set_period(data, high);
    }

    /// LLLL LTTT: length load and timer high; restarts the envelope and the duty sequence
    pub fn write_register_3(&mut self, data: u8) {
        let low = self.timer.period_low();
        self.timer.set_period(low, data & 0x07);
        if self.enabled {
            self.length_counter.load(data >> 3);
        }
        self.envelope.restart();
        self.duty_position = 0;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Length counter non-zero, as reported by $4015
    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Clocked every other CPU cycle
    pub fn clock_timer(&mut self) {
        if self.timer.clock() {
            self.duty_position = (self.duty_position + 1) % 8;
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    pub fn clock_sweep(&mut self) {
        if let Some(period) = self.sweep.clock(self.timer.period) {
            self.timer.set_period_direct(period);
        }
    }

    /// Current output level, 0-15
    pub fn output(&self) -> u8 {
        if !self.length_counter.is_active() || self.sweep.is_muting(self.timer.period) {
            return 0;
        }

        match DUTY_PATTERNS[self.duty as usize][self.duty_position as usize] {
            0 => 0,
            _ => self.envelope.volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audible_pulse() -> PulseChannel {
        let mut pulse = PulseChannel::new(1);
        pulse.set_enabled(true);
        pulse.write_register_0(0b1011_1111); // 50% duty, halt, constant volume 15
        pulse.write_register_2(0x00);
        pulse.write_register_3(0x09); // period 0x100, length index 1
        pulse
    }

    #[test]
    fn test_pulse_new_is_silent() {
        let pulse = PulseChannel::new(1);
        assert!(!pulse.enabled);
        assert!(!pulse.is_active());
        assert_eq!(pulse.output(), 0);
    }

    #[test]
    fn test_register_fields() {
        let pulse = audible_pulse();
        assert_eq!(pulse.duty, 2);
        assert_eq!(pulse.timer.period, 0x100);
        assert_eq!(pulse.length_counter.counter, 254);
        assert!(pulse.length_counter.halt);
    }

    #[test]
    fn test_length_load_ignored_while_disabled() {
        let mut pulse = PulseChannel::new(2);
        pulse.write_register_3(0x08);
        assert_eq!(pulse.length_counter.counter, 0);
    }

    #[test]
    fn test_disable_clears_length() {
        let mut pulse = audible_pulse();
        pulse.set_enabled(false);
        assert!(!pulse.is_active());
    }

    #[test]
    fn test_duty_sequence_output() {
        let mut pulse = audible_pulse();
        pulse.timer.set_period_direct(8);

        // 50% duty: positions 1-4 high
        let mut levels = Vec::new();
        for _ in 0..8 {
            levels.push(pulse.output());
            for _ in 0..9 {
                pulse.clock_timer();
            }
        }
        assert_eq!(levels.iter().filter(|&&v| v == 15).count(), 4);
        assert_eq!(levels.iter().filter(|&&v| v == 0).count(), 4);
    }

    #[test]
    fn test_short_period_mutes() {
        let mut pulse = audible_pulse();
        pulse.timer.set_period_direct(7);
        pulse.duty_position = 1;
        assert_eq!(pulse.output(), 0);
    }
}
