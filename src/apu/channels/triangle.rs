//! Triangle channel at $4008-$400B

use serde::{Deserialize, Serialize};

use crate::apu::components::{LengthCounter, LinearCounter, Timer};
use crate::apu::constants::TRIANGLE_SEQUENCE;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleChannel {
    pub(crate) enabled: bool,
    pub(crate) linear_counter: LinearCounter,
    pub(crate) length_counter: LengthCounter,
    pub(crate) timer: Timer,
    pub(crate) sequence_position: u8,
}

impl TriangleChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// CRRR RRRR: the control bit doubles as the length counter halt
    pub fn write_register_0(&mut self, data: u8) {
        self.length_counter.set_halt(data & 0x80 != 0);
        self.linear_counter.write_control(data);
    }

    pub fn write_register_2(&mut self, data: u8) {
        let high = self.timer.period_high();
        self.timer.set_period(data, high);
    }

    pub fn write_register_3(&mut self, data: u8) {
        let low = self.timer.period_low();
        self.timer.set_period(low, data & 0x07);
        if self.enabled {
            self.length_counter.load(data >> 3);
        }
        self.linear_counter.set_reload_flag();
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

    /// Clocked every CPU cycle; the sequencer only moves while both counters are non-zero
    pub fn clock_timer(&mut self) {
        if self.timer.clock() && self.linear_counter.is_active() && self.length_counter.is_active()
        {
            self.sequence_position = (self.sequence_position + 1) % 32;
        }
    }

    pub fn clock_linear_counter(&mut self) {
        self.linear_counter.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Current output level, 0-15
    ///
    /// A halted sequencer holds its level rather than dropping to zero. Periods
    /// below 2 are ultrasonic and output the sequence midpoint.
    pub fn output(&self) -> u8 {
        if self.timer.period < 2 {
            return 7;
        }
        TRIANGLE_SEQUENCE[self.sequence_position as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_triangle() -> TriangleChannel {
        let mut tri = TriangleChannel::new();
        tri.set_enabled(true);
        tri.write_register_0(0x7F);
        tri.write_register_2(0x10);
        tri.write_register_3(0x08);
        tri.clock_linear_counter();
        tri
    }

    #[test]
    fn test_sequence_advances_when_counters_active() {
        let mut tri = running_triangle();
        assert_eq!(tri.output(), 15);
        // The first tick reloads from zero, then the timer fires every period + 1 ticks
        for _ in 0..18 {
            tri.clock_timer();
        }
        assert_eq!(tri.sequence_position, 2);
        assert_eq!(tri.output(), 13);
    }

    #[test]
    fn test_sequence_holds_without_linear_counter() {
        let mut tri = running_triangle();
        tri.linear_counter.counter = 0;
        for _ in 0..100 {
            tri.clock_timer();
        }
        assert_eq!(tri.sequence_position, 0);
        assert_eq!(tri.output(), 15, "Output holds at the current step");
    }

    #[test]
    fn test_register_3_sets_reload_flag() {
        let mut tri = TriangleChannel::new();
        tri.write_register_3(0x00);
        assert!(tri.linear_counter.reload_flag);
    }

    #[test]
    fn test_disable_clears_length() {
        let mut tri = running_triangle();
        assert!(tri.is_active());
        tri.set_enabled(false);
        assert!(!tri.is_active());
    }

    #[test]
    fn test_ultrasonic_period_outputs_midpoint() {
        let mut tri = running_triangle();
        tri.timer.set_period_direct(1);
        assert_eq!(tri.output(), 7);
    }
}
