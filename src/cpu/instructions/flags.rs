// Flag instructions: CLC, SEC, CLI, SEI, CLD, SED, CLV

use crate::cpu::Cpu;

impl Cpu {
    pub fn clc(&mut self) {
        self.set_carry(false);
    }

    pub fn sec(&mut self) {
        self.set_carry(true);
    }

    pub fn cli(&mut self) {
        self.set_interrupt_disable(false);
    }

    pub fn sei(&mut self) {
        self.set_interrupt_disable(true);
    }

    /// CLD/SED toggle D, which the 2A03 ignores for arithmetic
    pub fn cld(&mut self) {
        self.set_decimal(false);
    }

    pub fn sed(&mut self) {
        self.set_decimal(true);
    }

    /// There is no SEV
    pub fn clv(&mut self) {
        self.set_overflow(false);
    }
}
