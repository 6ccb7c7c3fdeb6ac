// Input module - Controller latch and serial read protocol
//
// # Protocol
//
// ```text
// $4016 write, bit 0 = 1:  strobe high, reads keep returning the live A button
// $4016 write, bit 0 = 0:  strobe low, the button snapshot is frozen
// $4016 / $4017 read:      bit 0 = next button in A, B, Select, Start, Up, Down, Left, Right order
//                          after 8 reads the port returns 1
// ```
//
// Every strobe write captures the current buttons as one atomic snapshot, so
// input changes during a shift-out never tear the byte being read.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Pad buttons, one bit each in shift-out order
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buttons: u8 {
        const A      = 0b0000_0001;
        const B      = 0b0000_0010;
        const SELECT = 0b0000_0100;
        const START  = 0b0000_1000;
        const UP     = 0b0001_0000;
        const DOWN   = 0b0010_0000;
        const LEFT   = 0b0100_0000;
        const RIGHT  = 0b1000_0000;
    }
}

/// Host key codes accepted by `Machine::key_down` / `key_up`
pub mod keys {
    pub const LEFT: u32 = 1;
    pub const RIGHT: u32 = 2;
    pub const DOWN: u32 = 3;
    pub const UP: u32 = 4;
    pub const START: u32 = 5;
    pub const SELECT: u32 = 6;
    pub const B: u32 = 7;
    pub const A: u32 = 8;
}

impl Buttons {
    /// Map a host key code to a pad-1 button
    pub fn from_key_code(code: u32) -> Option<Buttons> {
        match code {
            keys::LEFT => Some(Buttons::LEFT),
            keys::RIGHT => Some(Buttons::RIGHT),
            keys::DOWN => Some(Buttons::DOWN),
            keys::UP => Some(Buttons::UP),
            keys::START => Some(Buttons::START),
            keys::SELECT => Some(Buttons::SELECT),
            keys::B => Some(Buttons::B),
            keys::A => Some(Buttons::A),
            _ => None,
        }
    }
}

/// One controller port: live buttons plus the shift register
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    /// Buttons currently held by the host
    buttons: Buttons,
    /// Snapshot taken at the last strobe write
    shift: u8,
    /// Number of bits shifted out since the strobe fell
    index: u8,
    strobe: bool,
}

impl Controller {
    /// Create a new controller with all buttons released
    pub fn new() -> Self {
        Self::default()
    }

    /// Press or release buttons on the live state
    pub fn set(&mut self, buttons: Buttons, pressed: bool) {
        self.buttons.set(buttons, pressed);
    }

    /// Live button state
    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Strobe write: latch the buttons
    pub fn write_strobe(&mut self, data: u8) {
        self.strobe = data & 0x01 != 0;
        self.shift = self.buttons.bits();
        self.index = 0;
    }

    /// Serial read: returns the next button bit in bit 0
    pub fn read(&mut self) -> u8 {
        let bit = self.peek();
        if !self.strobe && self.index < 8 {
            self.index += 1;
        }
        bit
    }

    /// Serial read without advancing the shift register
    pub fn peek(&self) -> u8 {
        if self.strobe {
            self.buttons.bits() & 0x01
        } else if self.index < 8 {
            (self.shift >> self.index) & 0x01
        } else {
            1
        }
    }
}

/// The two controller ports at $4016/$4017
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerIO {
    pub port1: Controller,
    pub port2: Controller,
}

impl ControllerIO {
    pub fn new() -> Self {
        Self::default()
    }

    /// $4016 write strobes both ports
    pub fn write(&mut self, data: u8) {
        self.port1.write_strobe(data);
        self.port2.write_strobe(data);
    }

    /// Read bit 0 for $4016 or $4017
    pub fn read(&mut self, addr: u16) -> u8 {
        if addr == 0x4016 {
            self.port1.read()
        } else {
            self.port2.read()
        }
    }

    /// Side-effect-free read of $4016 or $4017
    pub fn peek(&self, addr: u16) -> u8 {
        if addr == 0x4016 {
            self.port1.peek()
        } else {
            self.port2.peek()
        }
    }
}
