// Debug module - Debugging tools for NES emulator
//
// This module provides:
// - The `DebugHook` observer the machine calls per instruction and per access
// - `NoDebug`, the default hook, which compiles away entirely
// - Breakpoints and an execution trace ring buffer
// - A disassembler over side-effect-free bus reads
//
// Hooks are a type parameter of `Machine`. With `NoDebug`, `ACTIVE` is false
// and every hook call site is removed at compile time.

pub mod disassembler;
pub mod execution_log;

use std::collections::HashSet;

use crate::bus::{Bus, MemoryMappedDevice};
use crate::cpu::Cpu;

pub use disassembler::{
    disassemble_count, disassemble_instruction, disassemble_range, DisassembledInstruction,
};
pub use execution_log::{ExecutionLog, ExecutionLogEntry, LogFilter};

/// What the machine should do after an instruction-boundary callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    /// Set the machine's stopped flag and return from `exec`
    Stop,
}

/// Observer attached to a `Machine`
///
/// All callbacks default to no-ops. `on_instruction` runs before each
/// instruction (or interrupt entry) with the machine paused at that boundary;
/// the access callbacks run for every CPU bus access made while stepping.
pub trait DebugHook {
    /// Whether the machine should call this hook at all
    const ACTIVE: bool = true;

    fn on_instruction(&mut self, _cpu: &Cpu, _bus: &Bus) -> HookAction {
        HookAction::Continue
    }

    fn on_read(&mut self, _addr: u16, _value: u8) {}

    fn on_write(&mut self, _addr: u16, _value: u8) {}
}

/// The no-op hook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDebug;

impl DebugHook for NoDebug {
    const ACTIVE: bool = false;
}

/// A bus that reports every CPU access to a hook
pub struct ObservedBus<'a, H: DebugHook> {
    bus: &'a mut Bus,
    hook: &'a mut H,
}

impl<'a, H: DebugHook> ObservedBus<'a, H> {
    pub fn new(bus: &'a mut Bus, hook: &'a mut H) -> Self {
        Self { bus, hook }
    }
}

impl<H: DebugHook> MemoryMappedDevice for ObservedBus<'_, H> {
    fn read(&mut self, addr: u16) -> u8 {
        let value = self.bus.read(addr);
        self.hook.on_read(addr, value);
        value
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.bus.write(addr, data);
        self.hook.on_write(addr, data);
    }
}

/// Stops the machine when PC reaches a breakpoint
///
/// After a stop, resuming executes the instruction at the breakpoint once
/// before the breakpoint can fire again.
#[derive(Debug, Clone, Default)]
pub struct Breakpoints {
    addresses: HashSet<u16>,
    /// Breakpoint that just stopped the machine
    resume_from: Option<u16>,
    hits: u64,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a breakpoint at the specified address
    pub fn add(&mut self, addr: u16) {
        self.addresses.insert(addr);
    }

    /// Remove a breakpoint; returns `true` if one was set
    pub fn remove(&mut self, addr: u16) -> bool {
        self.addresses.remove(&addr)
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
        self.resume_from = None;
    }

    pub fn contains(&self, addr: u16) -> bool {
        self.addresses.contains(&addr)
    }

    /// All breakpoints in ascending order
    pub fn addresses(&self) -> Vec<u16> {
        let mut addresses: Vec<u16> = self.addresses.iter().copied().collect();
        addresses.sort_unstable();
        addresses
    }

    /// Number of times a breakpoint stopped the machine
    pub fn hits(&self) -> u64 {
        self.hits
    }
}

impl DebugHook for Breakpoints {
    fn on_instruction(&mut self, cpu: &Cpu, _bus: &Bus) -> HookAction {
        if !self.addresses.contains(&cpu.pc) {
            self.resume_from = None;
            return HookAction::Continue;
        }

        if self.resume_from.take() == Some(cpu.pc) {
            return HookAction::Continue;
        }

        self.resume_from = Some(cpu.pc);
        self.hits += 1;
        HookAction::Stop
    }
}
