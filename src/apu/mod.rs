// APU module - Audio Processing Unit
//
// # Register map
//
// ```text
// $4000-$4003  Pulse 1      duty/envelope, sweep, timer low, length/timer high
// $4004-$4007  Pulse 2      same layout
// $4008-$400B  Triangle     linear counter, (unused), timer low, length/timer high
// $400C-$400F  Noise        envelope, (unused), mode/period, length
// $4010-$4013  DMC          flags/rate, direct load, sample address, sample length
// $4015        Status       write: channel enables; read: lengths active + IRQ flags
// $4017        Frame counter (write only; reads of $4017 belong to pad 2)
// ```
//
// The APU is clocked once per CPU cycle. Pulse and noise timers count APU
// cycles (every other CPU cycle); the triangle and DMC timers count CPU cycles.

pub mod channels;
pub mod components;
pub mod constants;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::audio::AudioPipeline;
use crate::bus::MemoryMappedDevice;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameCounter, FrameEvent};
use constants::TRIANGLE_SEQUENCE;

/// APU structure representing the Audio Processing Unit state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apu {
    pub(crate) pulse1: PulseChannel,
    pub(crate) pulse2: PulseChannel,
    pub(crate) triangle: TriangleChannel,
    pub(crate) noise: NoiseChannel,
    pub(crate) dmc: DmcChannel,
    pub(crate) frame_counter: FrameCounter,
    /// CPU cycles since power-on; parity selects APU cycles
    cycle: u64,
}

impl Apu {
    /// Create a new APU with every channel silenced
    pub fn new() -> Self {
        Apu {
            pulse1: PulseChannel::new(1),
            pulse2: PulseChannel::new(2),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            frame_counter: FrameCounter::new(),
            cycle: 0,
        }
    }

    /// Reset to the power-on state
    pub fn reset(&mut self) {
        *self = Apu::new();
    }

    /// Write an APU register ($4000-$4013, $4015, $4017)
    pub fn write_register(&mut self, addr: u16, data: u8) {
        match addr {
            0x4000 => self.pulse1.write_register_0(data),
            0x4001 => self.pulse1.write_register_1(data),
            0x4002 => self.pulse1.write_register_2(data),
            0x4003 => self.pulse1.write_register_3(data),
            0x4004 => self.pulse2.write_register_0(data),
            0x4005 => self.pulse2.write_register_1(data),
            0x4006 => self.pulse2.write_register_2(data),
            0x4007 => self.pulse2.write_register_3(data),
            0x4008 => self.triangle.write_register_0(data),
            0x400A => self.triangle.write_register_2(data),
            0x400B => self.triangle.write_register_3(data),
            0x400C => self.noise.write_register_0(data),
            0x400E => self.noise.write_register_2(data),
            0x400F => self.noise.write_register_3(data),
            0x4010 => self.dmc.write_register_0(data),
            0x4011 => self.dmc.write_register_1(data),
            0x4012 => self.dmc.write_register_2(data),
            0x4013 => self.dmc.write_register_3(data),
            0x4015 => self.write_status(data),
            0x4017 => {
                if let Some(event) = self.frame_counter.write_control(data) {
                    self.apply_frame_event(event);
                }
            }
            // $4009 and $400D are unused
            _ => {}
        }
    }

    /// ---D NT21: channel enables
    fn write_status(&mut self, data: u8) {
        self.pulse1.set_enabled(data & 0x01 != 0);
        self.pulse2.set_enabled(data & 0x02 != 0);
        self.triangle.set_enabled(data & 0x04 != 0);
        self.noise.set_enabled(data & 0x08 != 0);
        self.dmc.set_enabled(data & 0x10 != 0);
    }

    /// Check the sequencer positions of a decoded APU
    pub fn validate(&self) -> Result<(), String> {
        if !self.pulse1.indices_in_range() || !self.pulse2.indices_in_range() {
            return Err("APU pulse sequencer out of range".to_string());
        }
        if self.triangle.sequence_position as usize >= TRIANGLE_SEQUENCE.len() {
            return Err(format!(
                "APU triangle step {} out of range",
                self.triangle.sequence_position
            ));
        }
        Ok(())
    }

    /// Read $4015 (IF-D NT21) and acknowledge the frame IRQ
    ///
    /// Bit 5 is not driven; the caller merges it from open bus.
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.clear_irq();
        status
    }

    /// $4015 without acknowledging the frame IRQ
    pub fn peek_status(&self) -> u8 {
        let mut status = 0;
        if self.pulse1.is_active() {
            status |= 0x01;
        }
        if self.pulse2.is_active() {
            status |= 0x02;
        }
        if self.triangle.is_active() {
            status |= 0x04;
        }
        if self.noise.is_active() {
            status |= 0x08;
        }
        if self.dmc.is_active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }
        status
    }

    /// Advance one CPU cycle
    pub fn clock(&mut self) {
        if let Some(event) = self.frame_counter.clock() {
            self.apply_frame_event(event);
        }

        self.triangle.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();
        if self.cycle % 2 == 1 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
        }

        self.cycle = self.cycle.wrapping_add(1);
    }

    fn apply_frame_event(&mut self, event: FrameEvent) {
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();

        if event == FrameEvent::HalfFrame {
            self.pulse1.clock_length_counter();
            self.pulse2.clock_length_counter();
            self.triangle.clock_length_counter();
            self.noise.clock_length_counter();
            self.pulse1.clock_sweep();
            self.pulse2.clock_sweep();
        }
    }

    /// Frame counter or DMC interrupt is asserted
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    pub fn frame_irq_pending(&self) -> bool {
        self.frame_counter.irq_pending()
    }

    pub fn dmc_irq_pending(&self) -> bool {
        self.dmc.irq_pending()
    }

    /// CPU address the DMC memory reader wants, if any
    pub fn dmc_fetch_address(&self) -> Option<u16> {
        self.dmc.needs_sample_read()
    }

    /// Hand the DMC the byte read from [`Self::dmc_fetch_address`]
    pub fn dmc_load(&mut self, byte: u8) {
        self.dmc.load_sample_byte(byte);
    }

    pub fn pulse1_output(&self) -> u8 {
        self.pulse1.output()
    }

    pub fn pulse2_output(&self) -> u8 {
        self.pulse2.output()
    }

    pub fn triangle_output(&self) -> u8 {
        self.triangle.output()
    }

    pub fn noise_output(&self) -> u8 {
        self.noise.output()
    }

    pub fn dmc_output(&self) -> u8 {
        self.dmc.output()
    }

    /// Push this cycle's channel levels into the audio pipeline
    #[inline]
    pub fn mix_into(&self, audio: &mut AudioPipeline) {
        audio.process(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMappedDevice for Apu {
    /// Only $4015 is readable; everything else reads as 0
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x4015 => self.read_status(),
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.write_register(addr, data);
    }
}
