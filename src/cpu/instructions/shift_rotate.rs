// Shift and rotate instructions
//
// Each works on A (accumulator mode) or on memory as a read-modify-write.
// The bit shifted out lands in C.

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    pub(crate) fn shift_left(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    pub(crate) fn shift_right(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    pub(crate) fn rotate_left(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.get_carry() as u8;
        self.set_carry(value & 0x80 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    pub(crate) fn rotate_right(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);
        self.set_carry(value & 0x01 != 0);
        self.update_zero_and_negative_flags(result);
        result
    }

    /// ASL - Arithmetic Shift Left
    pub fn asl<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.modify(bus, operand, Cpu::shift_left);
    }

    /// LSR - Logical Shift Right
    pub fn lsr<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.modify(bus, operand, Cpu::shift_right);
    }

    /// ROL - Rotate Left through carry
    pub fn rol<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.modify(bus, operand, Cpu::rotate_left);
    }

    /// ROR - Rotate Right through carry
    pub fn ror<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.modify(bus, operand, Cpu::rotate_right);
    }
}
