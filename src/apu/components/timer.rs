//! Divider that sets a channel's waveform frequency

use serde::{Deserialize, Serialize};

/// Down-counting timer reloaded from an 11-bit period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub(crate) period: u16,
    counter: u16,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count down one tick; returns true on the reload tick that clocks the sequencer
    pub fn clock(&mut self) -> bool {
        if self.counter == 0 {
            self.counter = self.period;
            true
        } else {
            self.counter -= 1;
            false
        }
    }

    /// Set the period from a low byte and the 3 high bits
    pub fn set_period(&mut self, low: u8, high: u8) {
        self.period = (low as u16) | ((high as u16 & 0x07) << 8);
    }

    pub fn set_period_direct(&mut self, period: u16) {
        self.period = period;
    }

    /// Low 8 bits of the period
    pub fn period_low(&self) -> u8 {
        self.period as u8
    }

    /// High 3 bits of the period
    pub fn period_high(&self) -> u8 {
        (self.period >> 8) as u8 & 0x07
    }
}
