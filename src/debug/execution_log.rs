// Execution Log - Track instruction execution and memory access
//
// Provides:
// - Instruction trace in the familiar nestest layout
// - Memory access tracking (reads and writes), optionally limited to a range
// - Circular buffer with configurable size
// - Search and filter functionality
//
// `ExecutionLog` is a `DebugHook`; attach it to a machine to record a trace.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::ops::RangeInclusive;

use log::trace;

use super::disassembler::{disassemble_instruction, DisassembledInstruction};
use super::{DebugHook, HookAction};
use crate::bus::Bus;
use crate::cpu::Cpu;

/// Default ring size when none is configured
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Execution log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionLogEntry {
    /// Instruction about to execute, with the registers before it runs
    Instruction {
        cycle: u64,
        pc: u16,
        instruction: DisassembledInstruction,
        a: u8,
        x: u8,
        y: u8,
        p: u8,
        sp: u8,
        scanline: u16,
        dot: u16,
    },
    /// Memory read
    MemoryRead { cycle: u64, address: u16, value: u8, pc: u16 },
    /// Memory write
    MemoryWrite { cycle: u64, address: u16, value: u8, pc: u16 },
}

impl ExecutionLogEntry {
    /// CPU cycle at which the entry was recorded
    pub fn cycle(&self) -> u64 {
        match self {
            ExecutionLogEntry::Instruction { cycle, .. }
            | ExecutionLogEntry::MemoryRead { cycle, .. }
            | ExecutionLogEntry::MemoryWrite { cycle, .. } => *cycle,
        }
    }

    /// Address of the instruction that produced the entry
    pub fn pc(&self) -> u16 {
        match self {
            ExecutionLogEntry::Instruction { pc, .. }
            | ExecutionLogEntry::MemoryRead { pc, .. }
            | ExecutionLogEntry::MemoryWrite { pc, .. } => *pc,
        }
    }
}

impl fmt::Display for ExecutionLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionLogEntry::Instruction {
                cycle,
                pc,
                instruction,
                a,
                x,
                y,
                p,
                sp,
                scanline,
                dot,
            } => {
                write!(
                    f,
                    "{:04X}  {:8}  {:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} PPU:{:3},{:3} CYC:{}",
                    pc,
                    instruction.format_bytes(),
                    instruction.format_assembly(),
                    a,
                    x,
                    y,
                    p,
                    sp,
                    scanline,
                    dot,
                    cycle
                )
            }
            ExecutionLogEntry::MemoryRead {
                cycle,
                address,
                value,
                pc,
            } => {
                write!(
                    f,
                    "[{:08}] MEM READ  ${:04X} = ${:02X} (PC: ${:04X})",
                    cycle, address, value, pc
                )
            }
            ExecutionLogEntry::MemoryWrite {
                cycle,
                address,
                value,
                pc,
            } => {
                write!(
                    f,
                    "[{:08}] MEM WRITE ${:04X} = ${:02X} (PC: ${:04X})",
                    cycle, address, value, pc
                )
            }
        }
    }
}

/// Filter settings for execution log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFilter {
    /// Show instruction execution
    pub show_instructions: bool,
    /// Show memory reads
    pub show_memory_reads: bool,
    /// Show memory writes
    pub show_memory_writes: bool,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            show_instructions: true,
            show_memory_reads: false,
            show_memory_writes: false,
        }
    }
}

impl LogFilter {
    /// Check if an entry passes the filter
    pub fn passes(&self, entry: &ExecutionLogEntry) -> bool {
        match entry {
            ExecutionLogEntry::Instruction { .. } => self.show_instructions,
            ExecutionLogEntry::MemoryRead { .. } => self.show_memory_reads,
            ExecutionLogEntry::MemoryWrite { .. } => self.show_memory_writes,
        }
    }
}

/// Execution log
///
/// Records instructions and, when the filter allows, memory accesses in a
/// circular buffer. The oldest entries are dropped once `max_entries` is
/// reached.
#[derive(Debug, Clone)]
pub struct ExecutionLog {
    entries: VecDeque<ExecutionLogEntry>,
    max_entries: usize,
    filter: LogFilter,
    /// Only accesses inside this range are recorded
    memory_range: Option<RangeInclusive<u16>>,
    /// Instruction currently executing, for access entries
    current_pc: u16,
    current_cycle: u64,
}

impl ExecutionLog {
    /// Create a log holding at most `max_entries` entries
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(DEFAULT_MAX_ENTRIES)),
            max_entries: max_entries.max(1),
            filter: LogFilter::default(),
            memory_range: None,
            current_pc: 0,
            current_cycle: 0,
        }
    }

    /// Set maximum number of entries, dropping the oldest if needed
    pub fn set_max_entries(&mut self, max: usize) {
        self.max_entries = max.max(1);
        self.trim_if_needed();
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn filter(&self) -> LogFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: LogFilter) {
        self.filter = filter;
    }

    /// Limit access logging to an address range (`None` logs every address)
    pub fn set_memory_range(&mut self, range: Option<RangeInclusive<u16>>) {
        self.memory_range = range;
    }

    /// Add an entry, subject to the filter
    pub fn push(&mut self, entry: ExecutionLogEntry) {
        if !self.filter.passes(&entry) {
            return;
        }
        self.entries.push_back(entry);
        self.trim_if_needed();
    }

    fn trim_if_needed(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn in_range(&self, addr: u16) -> bool {
        self.memory_range
            .as_ref()
            .map_or(true, |range| range.contains(&addr))
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = &ExecutionLogEntry> {
        self.entries.iter()
    }

    /// The last `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<&ExecutionLogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Case-insensitive search over the formatted entries
    pub fn search(&self, query: &str) -> Vec<&ExecutionLogEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.to_string().to_lowercase().contains(&query))
            .collect()
    }

    /// Write every entry, one per line
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{}", entry)?;
        }
        Ok(())
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl DebugHook for ExecutionLog {
    fn on_instruction(&mut self, cpu: &Cpu, bus: &Bus) -> HookAction {
        self.current_pc = cpu.pc;
        self.current_cycle = cpu.cycles;

        if self.filter.show_instructions {
            let entry = ExecutionLogEntry::Instruction {
                cycle: cpu.cycles,
                pc: cpu.pc,
                instruction: disassemble_instruction(cpu.pc, bus),
                a: cpu.a,
                x: cpu.x,
                y: cpu.y,
                p: cpu.status,
                sp: cpu.sp,
                scanline: bus.ppu().scanline(),
                dot: bus.ppu().cycle(),
            };
            trace!("{}", entry);
            self.push(entry);
        }

        HookAction::Continue
    }

    fn on_read(&mut self, addr: u16, value: u8) {
        if self.filter.show_memory_reads && self.in_range(addr) {
            self.push(ExecutionLogEntry::MemoryRead {
                cycle: self.current_cycle,
                address: addr,
                value,
                pc: self.current_pc,
            });
        }
    }

    fn on_write(&mut self, addr: u16, value: u8) {
        if self.filter.show_memory_writes && self.in_range(addr) {
            self.push(ExecutionLogEntry::MemoryWrite {
                cycle: self.current_cycle,
                address: addr,
                value,
                pc: self.current_pc,
            });
        }
    }
}
