// CPU module - 2A03 processor (6502 core without decimal mode)
//
// `step` runs one whole instruction, or one interrupt entry, against any
// `MemoryMappedDevice` and returns the cycles it took. The caller clocks the
// rest of the machine by that many cycles afterwards.
//
// Interrupts are sampled at instruction boundaries:
// - NMI is edge-triggered: `assert_nmi` latches one request
// - IRQ is level-triggered: `set_irq` mirrors the line before every step and is
//   taken only while the I flag is clear

mod addressing;
mod execute;
mod instructions;
pub mod opcodes;

pub use addressing::{AddressingMode, AddressingResult};
pub use opcodes::{Instruction, OpcodeInfo, OPCODE_TABLE};

use serde::{Deserialize, Serialize};

use crate::bus::MemoryMappedDevice;

/// Processor Status Flags (P register)
///
/// Bit layout:
/// ```text
/// 7  6  5  4  3  2  1  0
/// N  V  -  B  D  I  Z  C
/// ```
///
/// B and the unused bit only exist in copies pushed to the stack.
pub mod flags {
    pub const CARRY: u8 = 0b0000_0001; // Bit 0: C
    pub const ZERO: u8 = 0b0000_0010; // Bit 1: Z
    pub const INTERRUPT_DISABLE: u8 = 0b0000_0100; // Bit 2: I
    pub const DECIMAL: u8 = 0b0000_1000; // Bit 3: D (no effect on the 2A03)
    pub const BREAK: u8 = 0b0001_0000; // Bit 4: B
    pub const UNUSED: u8 = 0b0010_0000; // Bit 5: - (always 1)
    pub const OVERFLOW: u8 = 0b0100_0000; // Bit 6: V
    pub const NEGATIVE: u8 = 0b1000_0000; // Bit 7: N
}

/// Interrupt and reset vectors
pub mod vectors {
    pub const NMI: u16 = 0xFFFA;
    pub const RESET: u16 = 0xFFFC;
    pub const IRQ: u16 = 0xFFFE;
}

/// Stack page base ($0100-$01FF)
const STACK_BASE: u16 = 0x0100;

/// Cycles taken by the reset sequence and by interrupt entry
pub const INTERRUPT_CYCLES: u8 = 7;

/// CPU structure representing the 6502 processor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    // Registers
    pub a: u8,      // Accumulator
    pub x: u8,      // Index Register X
    pub y: u8,      // Index Register Y
    pub sp: u8,     // Stack Pointer
    pub pc: u16,    // Program Counter
    pub status: u8, // Processor Status flags

    /// Total cycles executed since power-on
    pub cycles: u64,

    /// Latched NMI edge, serviced at the next instruction boundary
    nmi_pending: bool,
    /// Current level of the IRQ line
    irq_line: bool,
    /// A JAM opcode locked the CPU; only reset recovers
    halted: bool,
}

impl Cpu {
    /// Create a CPU in its power-on state
    ///
    /// PC stays at 0 until `reset` loads the reset vector.
    pub fn new() -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: flags::UNUSED | flags::INTERRUPT_DISABLE,
            cycles: 0,
            nmi_pending: false,
            irq_line: false,
            halted: false,
        }
    }

    /// RESET signal: I is set, SP drops by 3, and PC is loaded from $FFFC
    ///
    /// A, X and Y keep their values. The sequence takes 7 cycles.
    pub fn reset<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        self.sp = self.sp.wrapping_sub(3);
        self.status |= flags::INTERRUPT_DISABLE | flags::UNUSED;
        self.pc = Self::read_vector(bus, vectors::RESET);
        self.nmi_pending = false;
        self.irq_line = false;
        self.halted = false;
        self.cycles = self.cycles.wrapping_add(INTERRUPT_CYCLES as u64);
    }

    /// Power-on: registers cleared, then the reset sequence
    ///
    /// SP starts at 0 so the reset leaves it at $FD.
    pub fn power_on<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        *self = Cpu::new();
        self.sp = 0x00;
        self.status = flags::UNUSED;
        self.reset(bus);
    }

    /// Latch an NMI edge
    pub fn assert_nmi(&mut self) {
        self.nmi_pending = true;
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Drive the IRQ line level
    pub fn set_irq(&mut self, level: bool) {
        self.irq_line = level;
    }

    pub fn irq_line(&self) -> bool {
        self.irq_line
    }

    /// Locked by a JAM opcode
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn read_vector<B: MemoryMappedDevice>(bus: &mut B, vector: u16) -> u16 {
        let lo = bus.read(vector);
        let hi = bus.read(vector.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    // ========================================
    // Stack Operations
    // ========================================

    fn push<B: MemoryMappedDevice>(&mut self, bus: &mut B, value: u8) {
        bus.write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_BASE | self.sp as u16)
    }

    fn push_word<B: MemoryMappedDevice>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
    }

    fn pop_word<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        u16::from_le_bytes([lo, hi])
    }

    // ========================================
    // Status Flag Manipulation Methods
    // ========================================

    #[inline]
    pub fn get_flag(&self, flag: u8) -> bool {
        (self.status & flag) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: u8) {
        self.status |= flag;
    }

    #[inline]
    pub fn clear_flag(&mut self, flag: u8) {
        self.status &= !flag;
    }

    /// Update a flag based on a condition
    #[inline]
    pub fn update_flag(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set_flag(flag);
        } else {
            self.clear_flag(flag);
        }
    }

    #[inline]
    pub fn get_carry(&self) -> bool {
        self.get_flag(flags::CARRY)
    }

    #[inline]
    pub fn get_zero(&self) -> bool {
        self.get_flag(flags::ZERO)
    }

    #[inline]
    pub fn get_interrupt_disable(&self) -> bool {
        self.get_flag(flags::INTERRUPT_DISABLE)
    }

    #[inline]
    pub fn get_decimal(&self) -> bool {
        self.get_flag(flags::DECIMAL)
    }

    #[inline]
    pub fn get_overflow(&self) -> bool {
        self.get_flag(flags::OVERFLOW)
    }

    #[inline]
    pub fn get_negative(&self) -> bool {
        self.get_flag(flags::NEGATIVE)
    }

    #[inline]
    pub fn set_carry(&mut self, value: bool) {
        self.update_flag(flags::CARRY, value);
    }

    #[inline]
    pub fn set_zero(&mut self, value: bool) {
        self.update_flag(flags::ZERO, value);
    }

    #[inline]
    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.update_flag(flags::INTERRUPT_DISABLE, value);
    }

    #[inline]
    pub fn set_decimal(&mut self, value: bool) {
        self.update_flag(flags::DECIMAL, value);
    }

    #[inline]
    pub fn set_overflow(&mut self, value: bool) {
        self.update_flag(flags::OVERFLOW, value);
    }

    #[inline]
    pub fn set_negative(&mut self, value: bool) {
        self.update_flag(flags::NEGATIVE, value);
    }

    /// Update Zero and Negative flags based on a value
    #[inline]
    pub fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative((value & 0x80) != 0);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
