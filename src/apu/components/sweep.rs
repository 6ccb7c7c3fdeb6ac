//! Sweep unit: periodic pitch bend for the pulse channels

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sweep {
    enabled: bool,
    divider: u8,
    period: u8,
    negate: bool,
    shift: u8,
    reload: bool,
    /// Pulse 1 negates with one's complement, pulse 2 with two's complement
    pub(crate) channel: u8,
}

impl Sweep {
    pub fn new(channel: u8) -> Self {
        Self {
            enabled: false,
            divider: 0,
            period: 0,
            negate: false,
            shift: 0,
            reload: false,
            channel,
        }
    }

    /// Shift count fits a 3-bit field
    pub fn shift_in_range(&self) -> bool {
        self.shift <= 0x07
    }

    /// Period the sweep would move the timer to
    pub fn target_period(&self, current_period: u16) -> u16 {
        let change = current_period >> self.shift;
        match (self.negate, self.channel) {
            (false, _) => current_period.wrapping_add(change),
            (true, 1) => current_period.wrapping_sub(change).wrapping_sub(1),
            (true, _) => current_period.wrapping_sub(change),
        }
    }

    /// The channel is silenced when the period is below 8 or the target overflows 11 bits,
    /// whether or not the sweep is enabled
    pub fn is_muting(&self, current_period: u16) -> bool {
        current_period < 8 || self.target_period(current_period) > 0x7FF
    }

    /// Half-frame clock; returns the new timer period when the sweep fires
    pub fn clock(&mut self, current_period: u16) -> Option<u16> {
        let fire = self.divider == 0 && self.enabled && self.shift > 0 && !self.is_muting(current_period);
        let update = fire.then(|| self.target_period(current_period));

        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }

        update
    }

    /// $4001/$4005: EPPP NSSS
    pub fn write_control(&mut self, data: u8) {
        self.enabled = data & 0x80 != 0;
        self.period = (data >> 4) & 0x07;
        self.negate = data & 0x08 != 0;
        self.shift = data & 0x07;
        self.reload = true;
    }
}
