// Load and store instructions
//
// Loads update Z and N. Stores never touch flags.

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// LDA - Load Accumulator
    ///
    /// Flags affected: Z, N
    pub fn lda<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.a = self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.a);
    }

    /// LDX - Load X Register
    ///
    /// Flags affected: Z, N
    pub fn ldx<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.x = self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.x);
    }

    /// LDY - Load Y Register
    ///
    /// Flags affected: Z, N
    pub fn ldy<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.y = self.read_operand(bus, operand);
        self.update_zero_and_negative_flags(self.y);
    }

    /// STA - Store Accumulator
    pub fn sta<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        bus.write(operand.address, self.a);
    }

    /// STX - Store X Register
    pub fn stx<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        bus.write(operand.address, self.x);
    }

    /// STY - Store Y Register
    pub fn sty<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        bus.write(operand.address, self.y);
    }
}
