//! Delta modulation channel at $4010-$4013
//!
//! Plays 1-bit delta samples fetched from CPU memory. The channel only asks
//! for bytes; the bus performs the read and hands the byte back through
//! [`DmcChannel::load_sample_byte`].

use serde::{Deserialize, Serialize};

use crate::apu::components::Timer;
use crate::apu::constants::DMC_RATE_TABLE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmcChannel {
    pub(crate) irq_enabled: bool,
    pub(crate) loop_flag: bool,
    pub(crate) timer: Timer,

    /// $4012 sample start: $C000 + A * 64
    pub(crate) sample_address: u16,
    /// $4013 sample length: L * 16 + 1
    pub(crate) sample_length: u16,
    pub(crate) current_address: u16,
    pub(crate) bytes_remaining: u16,

    /// One-byte sample buffer between the memory reader and the output unit
    pub(crate) sample_buffer: Option<u8>,
    shift_register: u8,
    bits_remaining: u8,
    silence: bool,
    /// 7-bit DAC level
    pub(crate) output_level: u8,

    pub(crate) irq_flag: bool,
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DmcChannel {
    pub fn new() -> Self {
        let mut timer = Timer::new();
        timer.set_period_direct(DMC_RATE_TABLE[0] - 1);
        Self {
            irq_enabled: false,
            loop_flag: false,
            timer,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer: None,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
            output_level: 0,
            irq_flag: false,
        }
    }

    /// IL-- RRRR: IRQ enable, loop, rate index
    pub fn write_register_0(&mut self, data: u8) {
        self.irq_enabled = data & 0x80 != 0;
        self.loop_flag = data & 0x40 != 0;
        if !self.irq_enabled {
            self.irq_flag = false;
        }
        self.timer
            .set_period_direct(DMC_RATE_TABLE[(data & 0x0F) as usize] - 1);
    }

    /// -DDD DDDD: direct load of the output level
    pub fn write_register_1(&mut self, data: u8) {
        self.output_level = data & 0x7F;
    }

    pub fn write_register_2(&mut self, data: u8) {
        self.sample_address = 0xC000 | ((data as u16) << 6);
    }

    pub fn write_register_3(&mut self, data: u8) {
        self.sample_length = ((data as u16) << 4) | 1;
    }

    /// $4015 bit 4. Enabling restarts the sample only if it had finished; any
    /// write acknowledges the DMC IRQ.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.irq_flag = false;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart_sample();
        }
    }

    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    /// Bytes left to fetch, as reported by $4015
    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Clocked every CPU cycle
    pub fn clock_timer(&mut self) {
        if self.timer.clock() {
            self.clock_output_unit();
        }
    }

    fn clock_output_unit(&mut self) {
        if !self.silence {
            if self.shift_register & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }
        self.shift_register >>= 1;
        self.bits_remaining = self.bits_remaining.saturating_sub(1);

        // Output cycle finished: start the next one from the buffer
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            match self.sample_buffer.take() {
                Some(byte) => {
                    self.shift_register = byte;
                    self.silence = false;
                }
                None => self.silence = true,
            }
        }
    }

    /// Address the memory reader wants next, if the buffer is empty and bytes remain
    pub fn needs_sample_read(&self) -> Option<u16> {
        match (self.sample_buffer, self.bytes_remaining) {
            (None, 1..) => Some(self.current_address),
            _ => None,
        }
    }

    /// Deliver the byte fetched from [`Self::needs_sample_read`]
    pub fn load_sample_byte(&mut self, byte: u8) {
        if self.bytes_remaining == 0 {
            return;
        }

        self.sample_buffer = Some(byte);
        // Address wraps from $FFFF to $8000
        self.current_address = match self.current_address {
            0xFFFF => 0x8000,
            addr => addr + 1,
        };
        self.bytes_remaining -= 1;

        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    pub fn output(&self) -> u8 {
        self.output_level
    }
}
