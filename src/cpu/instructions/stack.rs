// Stack instructions: PHA, PHP, PLA, PLP
//
// The stack lives at $0100-$01FF and grows down.

use crate::bus::MemoryMappedDevice;
use crate::cpu::{flags, Cpu};

impl Cpu {
    /// PHA - Push Accumulator
    pub fn pha<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        self.push(bus, self.a);
    }

    /// PHP - Push Processor Status
    ///
    /// The pushed copy has B and the unused bit set.
    pub fn php<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        self.push(bus, self.status | flags::BREAK | flags::UNUSED);
    }

    /// PLA - Pull Accumulator
    ///
    /// Flags affected: Z, N
    pub fn pla<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        self.a = self.pop(bus);
        self.update_zero_and_negative_flags(self.a);
    }

    /// PLP - Pull Processor Status
    pub fn plp<B: MemoryMappedDevice>(&mut self, bus: &mut B) {
        let status = self.pop(bus);
        self.status = (status & !flags::BREAK) | flags::UNUSED;
    }
}
