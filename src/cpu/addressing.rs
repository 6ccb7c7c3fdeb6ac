// Addressing modes module for 6502 CPU
// Implements all 13 addressing modes used by the 6502 processor

use crate::bus::MemoryMappedDevice;

/// Result of an addressing mode calculation
///
/// Contains information about the effective address, whether a page boundary
/// was crossed (which adds an extra cycle), and the operand value if available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressingResult {
    /// The effective address where the data is located
    pub address: u16,

    /// Whether a page boundary was crossed during address calculation
    pub page_crossed: bool,

    /// Operand for immediate and accumulator modes
    pub value: Option<u8>,
}

impl AddressingResult {
    pub fn new(address: u16) -> Self {
        Self {
            address,
            page_crossed: false,
            value: None,
        }
    }

    pub fn immediate(value: u8) -> Self {
        Self {
            address: 0,
            page_crossed: false,
            value: Some(value),
        }
    }

    pub fn with_page_cross(mut self, crossed: bool) -> Self {
        self.page_crossed = crossed;
        self
    }
}

/// Addressing modes supported by the 6502
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// Implied - No operand (e.g., CLC, NOP)
    Implied,

    /// Accumulator - Operate on accumulator (e.g., LSR A)
    Accumulator,

    /// Immediate - 8-bit constant (e.g., LDA #$01)
    Immediate,

    /// Zero Page - Address in zero page $00-$FF (e.g., LDA $80)
    ZeroPage,

    /// Zero Page,X - Zero page address + X register (e.g., LDA $80,X)
    ZeroPageX,

    /// Zero Page,Y - Zero page address + Y register (e.g., LDX $80,Y)
    ZeroPageY,

    /// Relative - Signed 8-bit offset for branches (e.g., BNE label)
    Relative,

    /// Absolute - 16-bit address (e.g., LDA $8000)
    Absolute,

    /// Absolute,X - 16-bit address + X register (e.g., LDA $8000,X)
    AbsoluteX,

    /// Absolute,Y - 16-bit address + Y register (e.g., LDA $8000,Y)
    AbsoluteY,

    /// Indirect - 16-bit pointer (JMP only) (e.g., JMP ($FFFC))
    Indirect,

    /// Indexed Indirect - Zero page pointer + X (e.g., LDA ($40,X))
    IndexedIndirect,

    /// Indirect Indexed - Zero page pointer + Y (e.g., LDA ($40),Y)
    IndirectIndexed,
}

impl AddressingMode {
    /// Operand bytes following the opcode
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

#[inline]
fn page_crossed(base: u16, addr: u16) -> bool {
    (base & 0xFF00) != (addr & 0xFF00)
}

impl super::Cpu {
    /// Resolve the operand of the instruction at PC, advancing PC past it
    pub(super) fn resolve<B: MemoryMappedDevice>(
        &mut self,
        mode: AddressingMode,
        bus: &mut B,
    ) -> AddressingResult {
        match mode {
            AddressingMode::Implied => AddressingResult::new(0),
            AddressingMode::Accumulator => AddressingResult::immediate(self.a),
            AddressingMode::Immediate => AddressingResult::immediate(self.fetch_byte(bus)),
            AddressingMode::ZeroPage => AddressingResult::new(self.fetch_byte(bus) as u16),
            AddressingMode::ZeroPageX => self.addr_zero_page_indexed(bus, self.x),
            AddressingMode::ZeroPageY => self.addr_zero_page_indexed(bus, self.y),
            AddressingMode::Relative => self.addr_relative(bus),
            AddressingMode::Absolute => AddressingResult::new(self.fetch_word(bus)),
            AddressingMode::AbsoluteX => self.addr_absolute_indexed(bus, self.x),
            AddressingMode::AbsoluteY => self.addr_absolute_indexed(bus, self.y),
            AddressingMode::Indirect => self.addr_indirect(bus),
            AddressingMode::IndexedIndirect => self.addr_indexed_indirect(bus),
            AddressingMode::IndirectIndexed => self.addr_indirect_indexed(bus),
        }
    }

    pub(super) fn fetch_byte<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    pub(super) fn fetch_word<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Read a pointer from zero page; the high byte wraps within page 0
    fn read_zero_page_word<B: MemoryMappedDevice>(bus: &mut B, ptr: u8) -> u16 {
        let lo = bus.read(ptr as u16);
        let hi = bus.read(ptr.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    /// Wraps within zero page: $FF + 2 = $01
    fn addr_zero_page_indexed<B: MemoryMappedDevice>(
        &mut self,
        bus: &mut B,
        index: u8,
    ) -> AddressingResult {
        let base = self.fetch_byte(bus);
        AddressingResult::new(base.wrapping_add(index) as u16)
    }

    /// Branch target; `page_crossed` reports whether the target leaves the
    /// page of the next instruction
    fn addr_relative<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> AddressingResult {
        let offset = self.fetch_byte(bus) as i8;
        let target = self.pc.wrapping_add(offset as u16);
        AddressingResult::new(target).with_page_cross(page_crossed(self.pc, target))
    }

    fn addr_absolute_indexed<B: MemoryMappedDevice>(
        &mut self,
        bus: &mut B,
        index: u8,
    ) -> AddressingResult {
        let base = self.fetch_word(bus);
        let addr = base.wrapping_add(index as u16);
        AddressingResult::new(addr).with_page_cross(page_crossed(base, addr))
    }

    /// JMP ($xxFF) takes the high byte from $xx00, not the next page
    fn addr_indirect<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> AddressingResult {
        let ptr = self.fetch_word(bus);
        let lo = bus.read(ptr);
        let hi = bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
        AddressingResult::new(u16::from_le_bytes([lo, hi]))
    }

    fn addr_indexed_indirect<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> AddressingResult {
        let ptr = self.fetch_byte(bus).wrapping_add(self.x);
        AddressingResult::new(Self::read_zero_page_word(bus, ptr))
    }

    fn addr_indirect_indexed<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> AddressingResult {
        let ptr = self.fetch_byte(bus);
        let base = Self::read_zero_page_word(bus, ptr);
        let addr = base.wrapping_add(self.y as u16);
        AddressingResult::new(addr).with_page_cross(page_crossed(base, addr))
    }
}
