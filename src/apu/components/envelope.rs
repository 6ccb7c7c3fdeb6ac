//! Envelope generator: decaying or constant volume

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Set by a length-load write; the next quarter frame restarts the decay
    pub(crate) start: bool,
    divider: u8,
    pub(crate) decay_level: u8,
    /// Divider period, doubling as the constant volume
    pub(crate) period: u8,
    pub(crate) loop_flag: bool,
    pub(crate) constant_volume: bool,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quarter-frame clock
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider = self.period;
            return;
        }

        if self.divider > 0 {
            self.divider -= 1;
            return;
        }

        self.divider = self.period;
        if self.decay_level > 0 {
            self.decay_level -= 1;
        } else if self.loop_flag {
            self.decay_level = 15;
        }
    }

    /// Current volume, 0-15
    pub fn volume(&self) -> u8 {
        if self.constant_volume {
            self.period
        } else {
            self.decay_level
        }
    }

    /// Bits 0-5 of $4000/$4004/$400C
    pub fn write_control(&mut self, data: u8) {
        self.loop_flag = data & 0x20 != 0;
        self.constant_volume = data & 0x10 != 0;
        self.period = data & 0x0F;
    }

    pub fn restart(&mut self) {
        self.start = true;
    }
}
