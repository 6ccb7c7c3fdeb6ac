// Arithmetic instructions: add/subtract with carry, increments and decrements
//
// The 2A03 has no decimal mode, so ADC/SBC are always binary even with D set.

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// A + value + C, setting C, V, Z, N
    ///
    /// Overflow is set when both inputs share a sign that the result does not.
    pub(crate) fn add_with_carry(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.get_carry() as u16;
        let result = sum as u8;

        self.set_carry(sum > 0xFF);
        self.set_overflow((self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.a = result;
        self.update_zero_and_negative_flags(result);
    }

    /// ADC - Add with Carry
    ///
    /// Flags affected: C, V, Z, N
    pub fn adc<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.add_with_carry(value);
    }

    /// SBC - Subtract with Carry
    ///
    /// A - value - !C, computed as A + !value + C. Carry clear means a borrow.
    ///
    /// Flags affected: C, V, Z, N
    pub fn sbc<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.add_with_carry(!value);
    }

    /// INC - Increment Memory
    pub fn inc<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.modify(bus, operand, |cpu, value| {
            let result = value.wrapping_add(1);
            cpu.update_zero_and_negative_flags(result);
            result
        });
    }

    /// DEC - Decrement Memory
    pub fn dec<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.modify(bus, operand, |cpu, value| {
            let result = value.wrapping_sub(1);
            cpu.update_zero_and_negative_flags(result);
            result
        });
    }

    pub fn inx(&mut self) {
        self.x = self.x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.x);
    }

    pub fn iny(&mut self) {
        self.y = self.y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.y);
    }

    pub fn dex(&mut self) {
        self.x = self.x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.x);
    }

    pub fn dey(&mut self) {
        self.y = self.y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.y);
    }
}
