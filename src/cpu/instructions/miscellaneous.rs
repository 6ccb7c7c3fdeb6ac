// Miscellaneous instructions: BRK, NOP, and the JAM lockup

use log::warn;

use crate::bus::MemoryMappedDevice;
use crate::cpu::{flags, vectors, Cpu};

impl Cpu {
    /// BRK - Force Interrupt
    ///
    /// Skips a padding byte, pushes PC and P (with B set) and jumps through the
    /// IRQ vector. I is set afterwards.
    pub fn brk<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        let return_addr = self.pc.wrapping_add(1);
        self.push_word(bus, return_addr);
        self.push(bus, self.status | flags::BREAK | flags::UNUSED);
        self.set_interrupt_disable(true);
        self.pc = Self::read_vector(bus, vectors::IRQ);
    }

    /// NOP - No Operation (all addressing-mode variants)
    pub fn nop(&mut self) {}

    /// JAM - lock the CPU until reset
    ///
    /// PC is left on the opcode so a trace shows where execution stopped.
    pub fn jam(&mut self, opcode: u8) {
        self.pc = self.pc.wrapping_sub(1);
        if !self.halted {
            warn!("CPU jammed by opcode ${:02X} at ${:04X}", opcode, self.pc);
        }
        self.halted = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::instructions::boot;

    #[test]
    fn test_brk_pushes_and_vectors() {
        let (mut cpu, mut bus) = boot(&[0x00, 0xFF]);
        bus.load(0xFFFE, &[0x00, 0x90]);
        cpu.set_interrupt_disable(false);
        let sp = cpu.sp;

        assert_eq!(cpu.step(&mut bus), 7);
        assert_eq!(cpu.pc, 0x9000);
        assert!(cpu.get_interrupt_disable());

        // Return address skips the padding byte
        assert_eq!(bus.mem[0x0100 | sp as usize], 0x80);
        assert_eq!(bus.mem[0x0100 | sp.wrapping_sub(1) as usize], 0x02);
        assert_eq!(bus.mem[0x0100 | sp.wrapping_sub(2) as usize] & 0x30, 0x30);
    }

    #[test]
    fn test_multi_byte_nops_skip_operands() {
        // NOP $10; NOP $1234,X; NOP #$00; NOP
        let (mut cpu, mut bus) = boot(&[0x04, 0x10, 0x1C, 0x34, 0x12, 0x80, 0x00, 0xEA]);
        assert_eq!(cpu.step(&mut bus), 3);
        assert_eq!(cpu.step(&mut bus), 4);
        assert_eq!(cpu.step(&mut bus), 2);
        assert_eq!(cpu.step(&mut bus), 2);
        assert_eq!(cpu.pc, 0x8008);
    }

    #[test]
    fn test_jam_halts_until_reset() {
        let (mut cpu, mut bus) = boot(&[0x02, 0xEA]);
        cpu.step(&mut bus);
        assert!(cpu.is_halted());
        assert_eq!(cpu.pc, 0x8000);

        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x8000, "Halted CPU does not fetch");

        cpu.assert_nmi();
        cpu.step(&mut bus);
        assert_eq!(cpu.pc, 0x8000, "NMI does not wake a jammed CPU");
    }
}
