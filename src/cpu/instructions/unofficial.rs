// Unofficial opcodes
//
// The stable combined operations (LAX, SAX, DCP, ISB, SLO, RLA, SRE, RRA) and
// the immediate-mode ALU oddities are exact. The unstable store group (AHX,
// SHX, SHY, TAS) and XAA/LAS use the common deterministic approximations.

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// LAX - LDA and LDX in one
    pub fn lax<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.a = value;
        self.x = value;
        self.update_zero_and_negative_flags(value);
    }

    /// SAX - store A & X
    pub fn sax<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        bus.write(operand.address, self.a & self.x);
    }

    /// DCP - DEC then CMP
    pub fn dcp<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.modify(bus, operand, |_, value| value.wrapping_sub(1));
        self.compare(self.a, value);
    }

    /// ISB - INC then SBC
    pub fn isb<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.modify(bus, operand, |_, value| value.wrapping_add(1));
        self.add_with_carry(!value);
    }

    /// SLO - ASL then ORA
    pub fn slo<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.modify(bus, operand, Cpu::shift_left);
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// RLA - ROL then AND
    pub fn rla<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.modify(bus, operand, Cpu::rotate_left);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// SRE - LSR then EOR
    pub fn sre<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.modify(bus, operand, Cpu::shift_right);
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// RRA - ROR then ADC
    pub fn rra<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.modify(bus, operand, Cpu::rotate_right);
        self.add_with_carry(value);
    }

    /// ANC - AND, then C copies N
    pub fn anc<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.and(bus, operand);
        self.set_carry(self.get_negative());
    }

    /// ALR - AND then LSR A
    pub fn alr<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.a = self.shift_right(self.a & value);
    }

    /// ARR - AND then ROR A, with C from bit 6 and V from bit 6 ^ bit 5
    pub fn arr<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand) & self.a;
        let result = (value >> 1) | ((self.get_carry() as u8) << 7);
        self.a = result;
        self.update_zero_and_negative_flags(result);
        self.set_carry(result & 0x40 != 0);
        self.set_overflow(((result >> 6) ^ (result >> 5)) & 0x01 != 0);
    }

    /// AXS - X = (A & X) - M, setting C like CMP
    pub fn axs<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        let ax = self.a & self.x;
        self.set_carry(ax >= value);
        self.x = ax.wrapping_sub(value);
        self.update_zero_and_negative_flags(self.x);
    }

    /// XAA - A = X & M
    pub fn xaa<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand);
        self.a = self.x & value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// LAS - A, X and SP all become M & SP
    pub fn las<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        let value = self.read_operand(bus, operand) & self.sp;
        self.a = value;
        self.x = value;
        self.sp = value;
        self.update_zero_and_negative_flags(value);
    }

    /// Value ANDed with the high byte of the target plus one
    fn store_high_and<B: MemoryMappedDevice>(
        &mut self,
        bus: &mut B,
        operand: &AddressingResult,
        value: u8,
    ) {
        let high = ((operand.address >> 8) as u8).wrapping_add(1);
        bus.write(operand.address, value & high);
    }

    /// AHX - store A & X & (H + 1)
    pub fn ahx<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.store_high_and(bus, operand, self.a & self.x);
    }

    /// SHX - store X & (H + 1)
    pub fn shx<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.store_high_and(bus, operand, self.x);
    }

    /// SHY - store Y & (H + 1)
    pub fn shy<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.store_high_and(bus, operand, self.y);
    }

    /// TAS - SP = A & X, then store SP & (H + 1)
    pub fn tas<B: MemoryMappedDevice>(&mut self, bus: &mut B, operand: &AddressingResult) {
        self.sp = self.a & self.x;
        self.store_high_and(bus, operand, self.sp);
    }
}
