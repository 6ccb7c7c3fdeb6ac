// Branch instructions
//
// All branches use relative addressing and leave the flags alone.
//
// Cycles:
// - 2 if not taken
// - 3 if taken
// - 4 if taken to a different page

use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// Take the branch if `condition` holds; returns the extra cycles
    pub(crate) fn branch(&mut self, condition: bool, target: &AddressingResult) -> u8 {
        if !condition {
            return 0;
        }
        self.pc = target.address;
        1 + target.page_crossed as u8
    }

    /// BCC - Branch if Carry Clear
    pub fn bcc(&mut self, target: &AddressingResult) -> u8 {
        self.branch(!self.get_carry(), target)
    }

    /// BCS - Branch if Carry Set
    pub fn bcs(&mut self, target: &AddressingResult) -> u8 {
        self.branch(self.get_carry(), target)
    }

    /// BEQ - Branch if Equal (Z set)
    pub fn beq(&mut self, target: &AddressingResult) -> u8 {
        self.branch(self.get_zero(), target)
    }

    /// BNE - Branch if Not Equal (Z clear)
    pub fn bne(&mut self, target: &AddressingResult) -> u8 {
        self.branch(!self.get_zero(), target)
    }

    /// BMI - Branch if Minus
    pub fn bmi(&mut self, target: &AddressingResult) -> u8 {
        self.branch(self.get_negative(), target)
    }

    /// BPL - Branch if Plus
    pub fn bpl(&mut self, target: &AddressingResult) -> u8 {
        self.branch(!self.get_negative(), target)
    }

    /// BVS - Branch if Overflow Set
    pub fn bvs(&mut self, target: &AddressingResult) -> u8 {
        self.branch(self.get_overflow(), target)
    }

    /// BVC - Branch if Overflow Clear
    pub fn bvc(&mut self, target: &AddressingResult) -> u8 {
        self.branch(!self.get_overflow(), target)
    }
}
