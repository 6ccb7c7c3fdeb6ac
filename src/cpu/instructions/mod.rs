// Instructions module for 6502 CPU
// This module organizes CPU instructions by semantic grouping

mod arithmetic;
mod branch;
mod compare;
mod flags;
mod jump_subroutine;
mod load_store;
mod logic;
mod miscellaneous;
mod shift_rotate;
mod stack;
mod transfer;
mod unofficial;

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// Immediate/accumulator value, or the byte at the effective address
    #[inline]
    pub(crate) fn read_operand<B: MemoryMappedDevice>(
        &mut self,
        bus: &mut B,
        operand: &AddressingResult,
    ) -> u8 {
        match operand.value {
            Some(value) => value,
            None => bus.read(operand.address),
        }
    }

    /// Read-modify-write on A (accumulator mode) or memory
    ///
    /// Returns the value written back.
    #[inline]
    pub(crate) fn modify<B, F>(&mut self, bus: &mut B, operand: &AddressingResult, op: F) -> u8
    where
        B: MemoryMappedDevice,
        F: FnOnce(&mut Cpu, u8) -> u8,
    {
        match operand.value {
            Some(value) => {
                let result = op(self, value);
                self.a = result;
                result
            }
            None => {
                let value = bus.read(operand.address);
                let result = op(self, value);
                bus.write(operand.address, result);
                result
            }
        }
    }
}

/// Boot a CPU on a flat bus with `program` at $8000
#[cfg(test)]
pub(crate) fn boot(program: &[u8]) -> (Cpu, crate::cpu::test_bus::FlatBus) {
    let mut bus = crate::cpu::test_bus::FlatBus::with_program(program);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);
    (cpu, bus)
}
