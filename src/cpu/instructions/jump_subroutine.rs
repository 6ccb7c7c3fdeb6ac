// Jump and subroutine instructions: JMP, JSR, RTS, RTI

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// JMP - Jump (absolute or indirect)
    pub fn jmp(&mut self, target: &AddressingResult) {
        self.pc = target.address;
    }

    /// JSR - Jump to Subroutine
    ///
    /// Pushes the address of the last byte of the JSR instruction, high byte first.
    pub fn jsr<B: MemoryMappedDevice>(&mut self, bus: &mut B, target: &AddressingResult) {
        let return_addr = self.pc.wrapping_sub(1);
        self.push_word(bus, return_addr);
        self.pc = target.address;
    }

    /// RTS - Return from Subroutine
    pub fn rts<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        self.pc = self.pop_word(bus).wrapping_add(1);
    }

    /// RTI - Return from Interrupt
    ///
    /// Restores P (ignoring B) and then PC. Unlike RTS, PC is used as pulled.
    pub fn rti<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        let status = self.pop(bus);
        self.status = (status & !flags::BREAK) | flags::UNUSED;
        self.pc = self.pop_word(bus);
    }
}
