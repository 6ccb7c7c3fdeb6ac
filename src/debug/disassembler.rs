// Disassembler - 6502 instruction disassembly
//
// Converts raw bytes into human-readable 6502 assembly instructions. Memory is
// read through `Bus::peek`, so disassembling never disturbs the machine.

use std::fmt;

use crate::bus::Bus;
use crate::cpu::{AddressingMode, OPCODE_TABLE};

/// Disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInstruction {
    /// Address where the instruction is located
    pub address: u16,

    /// Opcode byte
    pub opcode: u8,

    /// Mnemonic (e.g., "LDA", "STA", "JMP")
    pub mnemonic: &'static str,

    pub mode: AddressingMode,

    /// Operand bytes
    pub operands: Vec<u8>,

    /// Total instruction length in bytes
    pub length: u8,

    /// Undocumented opcode; prefixed with `*` when formatted
    pub unofficial: bool,
}

impl DisassembledInstruction {
    fn operand_byte(&self) -> u8 {
        self.operands.first().copied().unwrap_or(0)
    }

    fn operand_word(&self) -> u16 {
        u16::from_le_bytes([
            self.operands.first().copied().unwrap_or(0),
            self.operands.get(1).copied().unwrap_or(0),
        ])
    }

    /// Format the instruction as assembly code
    ///
    /// # Returns
    ///
    /// A string like "LDA #$42" or "JMP $8000"
    pub fn format_assembly(&self) -> String {
        let operand = match self.mode {
            AddressingMode::Implied => String::new(),
            AddressingMode::Accumulator => " A".to_string(),
            AddressingMode::Immediate => format!(" #${:02X}", self.operand_byte()),
            AddressingMode::ZeroPage => format!(" ${:02X}", self.operand_byte()),
            AddressingMode::ZeroPageX => format!(" ${:02X},X", self.operand_byte()),
            AddressingMode::ZeroPageY => format!(" ${:02X},Y", self.operand_byte()),
            AddressingMode::Absolute => format!(" ${:04X}", self.operand_word()),
            AddressingMode::AbsoluteX => format!(" ${:04X},X", self.operand_word()),
            AddressingMode::AbsoluteY => format!(" ${:04X},Y", self.operand_word()),
            AddressingMode::Indirect => format!(" (${:04X})", self.operand_word()),
            AddressingMode::IndexedIndirect => format!(" (${:02X},X)", self.operand_byte()),
            AddressingMode::IndirectIndexed => format!(" (${:02X}),Y", self.operand_byte()),
            AddressingMode::Relative => {
                let offset = self.operand_byte() as i8;
                let target = self.address.wrapping_add(2).wrapping_add(offset as u16);
                format!(" ${:04X}", target)
            }
        };

        let marker = if self.unofficial { "*" } else { "" };
        format!("{}{}{}", marker, self.mnemonic, operand)
    }

    /// Format the instruction bytes as hex
    ///
    /// # Returns
    ///
    /// A string like "A9 42" or "4C 00 80"
    pub fn format_bytes(&self) -> String {
        std::iter::once(self.opcode)
            .chain(self.operands.iter().copied())
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DisassembledInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:04X}  {:8}  {}",
            self.address,
            self.format_bytes(),
            self.format_assembly()
        )
    }
}

/// Disassemble an instruction at the specified address
///
/// # Example
///
/// ```
/// use madnes::bus::{Bus, MemoryMappedDevice};
/// use madnes::debug::disassemble_instruction;
///
/// let mut bus = Bus::new();
/// bus.write(0x0200, 0xA9);
/// bus.write(0x0201, 0x42);
/// let instruction = disassemble_instruction(0x0200, &bus);
/// assert_eq!(instruction.format_assembly(), "LDA #$42");
/// ```
pub fn disassemble_instruction(addr: u16, bus: &Bus) -> DisassembledInstruction {
    let opcode = bus.peek(addr);
    let info = &OPCODE_TABLE[opcode as usize];

    let operands = (1..info.bytes)
        .map(|i| bus.peek(addr.wrapping_add(i as u16)))
        .collect();

    DisassembledInstruction {
        address: addr,
        opcode,
        mnemonic: info.mnemonic,
        mode: info.mode,
        operands,
        length: info.bytes,
        unofficial: !info.official,
    }
}

/// Disassemble a range of memory (`end` inclusive)
pub fn disassemble_range(start: u16, end: u16, bus: &Bus) -> Vec<DisassembledInstruction> {
    let mut instructions = Vec::new();
    let mut addr = start;

    while addr <= end {
        let instruction = disassemble_instruction(addr, bus);
        addr = addr.wrapping_add(instruction.length as u16);
        instructions.push(instruction);

        // Prevent infinite loop if we wrap around
        if addr < start {
            break;
        }
    }

    instructions
}

/// Disassemble a specific number of instructions
pub fn disassemble_count(start: u16, count: usize, bus: &Bus) -> Vec<DisassembledInstruction> {
    let mut instructions = Vec::with_capacity(count);
    let mut addr = start;

    for _ in 0..count {
        let instruction = disassemble_instruction(addr, bus);
        addr = addr.wrapping_add(instruction.length as u16);
        instructions.push(instruction);
    }

    instructions
}
