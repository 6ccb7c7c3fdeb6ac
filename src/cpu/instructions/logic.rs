// Logical instructions: AND, ORA, EOR, BIT

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// AND - Logical AND with accumulator
    ///
    /// Flags affected: Z, N
    pub fn and<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// ORA - Logical inclusive OR with accumulator
    ///
    /// Flags affected: Z, N
    pub fn ora<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// EOR - Exclusive OR with accumulator
    ///
    /// Flags affected: Z, N
    pub fn eor<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// BIT - Bit Test
    ///
    /// Z from A & M; N and V are copied from bits 7 and 6 of M. A is unchanged.
    pub fn bit<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.set_zero(self.a & value == 0);
        self.set_negative(value & 0x80 != 0);
        self.set_overflow(value & 0x40 != 0);
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::boot;

    #[test]
    fn test_and_ora_eor() {
        // LDA #$F0; AND #$3C; ORA #$01; EOR #$FF
        let (mut cpu, mut bus) = boot(&[0xA9, 0xF0, 0x29, 0x3C, 0x09, 0x01, 0x49, 0xFF]);

        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x30);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0x31);
        cpu.step(&mut bus);
        assert_eq!(cpu.a, 0xCE);
        assert!(cpu.get_negative());
    }

    #[test]
    fn test_bit_copies_high_bits() {
        // LDA #$01; BIT $10
        let (mut cpu, mut bus) = boot(&[0xA9, 0x01, 0x24, 0x10]);
        bus.mem[0x0010] = 0xC0;

        cpu.step(&mut bus);
        assert_eq!(cpu.step(&mut bus), 3);
        assert!(cpu.get_zero());
        assert!(cpu.get_negative());
        assert!(cpu.get_overflow());
        assert_eq!(cpu.a, 0x01);
    }
}
