// Compare instructions: CMP, CPX, CPY
//
// register - M without storing the result. C is set when register >= M.

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    pub(crate) fn compare(&mut self, register: u8, value: u8) {
        self.set_carry(register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    /// CMP - Compare Accumulator
    pub fn cmp<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.compare(self.a, value);
    }

    /// CPX - Compare X Register
    pub fn cpx<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.compare(self.x, value);
    }

    /// CPY - Compare Y Register
    pub fn cpy<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.compare(self.y, value);
    }
}
