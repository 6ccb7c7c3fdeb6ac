//! Frame counter for the APU
//!
//! A divider clocked once per CPU cycle that produces the low-frequency
//! quarter-frame and half-frame clocks driving envelopes, the triangle's
//! linear counter, length counters, and sweep units.
//!
//! - 4-step mode: ~240 Hz, raises the frame IRQ at the end of each sequence
//! - 5-step mode: ~192 Hz, never raises an IRQ

use serde::{Deserialize, Serialize};

use crate::apu::constants::{
    FRAME_COUNTER_4_STEP_CYCLES, FRAME_COUNTER_4_STEP_PERIOD, FRAME_COUNTER_5_STEP_CYCLES,
    FRAME_COUNTER_5_STEP_PERIOD,
};

/// Clock produced by one sequencer step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Envelopes and the linear counter
    QuarterFrame,
    /// Everything a quarter frame clocks, plus length counters and sweeps
    HalfFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameMode {
    FourStep,
    FiveStep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounter {
    mode: FrameMode,
    /// CPU cycles since the sequence started
    cycle: u32,
    /// Next step to fire
    step: usize,
    /// Bit 6 of $4017
    irq_inhibit: bool,
    irq_pending: bool,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            mode: FrameMode::FourStep,
            cycle: 0,
            step: 0,
            irq_inhibit: false,
            irq_pending: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write $4017 (MI-- ----)
    ///
    /// The sequence restarts immediately. Selecting 5-step mode also produces
    /// an immediate half-frame clock, which is returned to the caller.
    pub fn write_control(&mut self, value: u8) -> Option<FrameEvent> {
        self.mode = if value & 0x80 != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_pending = false;
        }

        self.cycle = 0;
        self.step = 0;

        (self.mode == FrameMode::FiveStep).then_some(FrameEvent::HalfFrame)
    }

    /// Advance one CPU cycle
    pub fn clock(&mut self) -> Option<FrameEvent> {
        self.cycle += 1;
        match self.mode {
            FrameMode::FourStep => self.clock_4_step(),
            FrameMode::FiveStep => self.clock_5_step(),
        }
    }

    fn clock_4_step(&mut self) -> Option<FrameEvent> {
        let mut event = None;

        if self.step < 4 && self.cycle == FRAME_COUNTER_4_STEP_CYCLES[self.step] {
            event = Some(if self.step % 2 == 0 {
                FrameEvent::QuarterFrame
            } else {
                FrameEvent::HalfFrame
            });
            if self.step == 3 {
                self.raise_irq();
            }
            self.step += 1;
        }

        // The flag is asserted again on the wrap cycle
        if self.cycle >= FRAME_COUNTER_4_STEP_PERIOD {
            self.raise_irq();
            self.cycle = 0;
            self.step = 0;
        }

        event
    }

    fn clock_5_step(&mut self) -> Option<FrameEvent> {
        let mut event = None;

        if self.step < 5 && self.cycle == FRAME_COUNTER_5_STEP_CYCLES[self.step] {
            // Step 4 (index 3) is silent; steps 2 and 5 are half frames
            event = match self.step {
                0 | 2 => Some(FrameEvent::QuarterFrame),
                1 | 4 => Some(FrameEvent::HalfFrame),
                _ => None,
            };
            self.step += 1;
        }

        if self.cycle >= FRAME_COUNTER_5_STEP_PERIOD {
            self.cycle = 0;
            self.step = 0;
        }

        event
    }

    fn raise_irq(&mut self) {
        if !self.irq_inhibit {
            self.irq_pending = true;
        }
    }

    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    /// Acknowledge the frame IRQ ($4015 read)
    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn irq_inhibited(&self) -> bool {
        self.irq_inhibit
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
