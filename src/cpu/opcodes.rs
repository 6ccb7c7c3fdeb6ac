// Opcode table for the 2A03 CPU
//
// One entry per opcode byte: instruction, addressing mode, length, base cycles,
// and whether a page-crossing index adds a cycle. Unofficial opcodes are
// included; the twelve JAM opcodes lock the CPU until reset.

use super::addressing::AddressingMode;
use super::addressing::AddressingMode::*;
use Instruction::*;

/// Operation performed by an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,

    // Unofficial
    Ahx,
    Alr,
    Anc,
    Arr,
    Axs,
    Dcp,
    Isb,
    Jam,
    Las,
    Lax,
    Rla,
    Rra,
    Sax,
    Shx,
    Shy,
    Slo,
    Sre,
    Tas,
    Xaa,
}

impl Instruction {
    /// Upper-case assembler mnemonic
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Pla => "PLA",
            Plp => "PLP",
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Sta => "STA",
            Stx => "STX",
            Sty => "STY",
            Tax => "TAX",
            Tay => "TAY",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
            Ahx => "AHX",
            Alr => "ALR",
            Anc => "ANC",
            Arr => "ARR",
            Axs => "AXS",
            Dcp => "DCP",
            Isb => "ISB",
            Jam => "JAM",
            Las => "LAS",
            Lax => "LAX",
            Rla => "RLA",
            Rra => "RRA",
            Sax => "SAX",
            Shx => "SHX",
            Shy => "SHY",
            Slo => "SLO",
            Sre => "SRE",
            Tas => "TAS",
            Xaa => "XAA",
        }
    }
}

/// Decoded opcode properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub instruction: Instruction,
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    /// Instruction length including the opcode byte
    pub bytes: u8,
    /// Base cycle count
    pub cycles: u8,
    /// Adds one cycle when the indexed address crosses a page
    pub page_cycle: bool,
    /// Documented by the manufacturer
    pub official: bool,
}

const fn entry(
    instruction: Instruction,
    mode: AddressingMode,
    cycles: u8,
    page_cycle: bool,
    official: bool,
) -> OpcodeInfo {
    OpcodeInfo {
        instruction,
        mnemonic: instruction.mnemonic(),
        mode,
        bytes: mode.operand_bytes() + 1,
        cycles,
        page_cycle,
        official,
    }
}

/// Official opcode, fixed timing
const fn o(instruction: Instruction, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(instruction, mode, cycles, false, true)
}

/// Official opcode, +1 cycle on page cross
const fn p(instruction: Instruction, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(instruction, mode, cycles, true, true)
}

/// Unofficial opcode, fixed timing
const fn u(instruction: Instruction, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(instruction, mode, cycles, false, false)
}

/// Unofficial opcode, +1 cycle on page cross
const fn up(instruction: Instruction, mode: AddressingMode, cycles: u8) -> OpcodeInfo {
    entry(instruction, mode, cycles, true, false)
}

const JAM: OpcodeInfo = u(Jam, Implied, 2);

/// Opcode byte -> properties
#[rustfmt::skip]
pub static OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00
    o(Brk, Implied, 7),          o(Ora, IndexedIndirect, 6),  JAM,                          u(Slo, IndexedIndirect, 8),
    u(Nop, ZeroPage, 3),         o(Ora, ZeroPage, 3),         o(Asl, ZeroPage, 5),          u(Slo, ZeroPage, 5),
    o(Php, Implied, 3),          o(Ora, Immediate, 2),        o(Asl, Accumulator, 2),       u(Anc, Immediate, 2),
    u(Nop, Absolute, 4),         o(Ora, Absolute, 4),         o(Asl, Absolute, 6),          u(Slo, Absolute, 6),
    // 0x10
    o(Bpl, Relative, 2),         p(Ora, IndirectIndexed, 5),  JAM,                          u(Slo, IndirectIndexed, 8),
    u(Nop, ZeroPageX, 4),        o(Ora, ZeroPageX, 4),        o(Asl, ZeroPageX, 6),         u(Slo, ZeroPageX, 6),
    o(Clc, Implied, 2),          p(Ora, AbsoluteY, 4),        u(Nop, Implied, 2),           u(Slo, AbsoluteY, 7),
    up(Nop, AbsoluteX, 4),       p(Ora, AbsoluteX, 4),        o(Asl, AbsoluteX, 7),         u(Slo, AbsoluteX, 7),
    // 0x20
    o(Jsr, Absolute, 6),         o(And, IndexedIndirect, 6),  JAM,                          u(Rla, IndexedIndirect, 8),
    o(Bit, ZeroPage, 3),         o(And, ZeroPage, 3),         o(Rol, ZeroPage, 5),          u(Rla, ZeroPage, 5),
    o(Plp, Implied, 4),          o(And, Immediate, 2),        o(Rol, Accumulator, 2),       u(Anc, Immediate, 2),
    o(Bit, Absolute, 4),         o(And, Absolute, 4),         o(Rol, Absolute, 6),          u(Rla, Absolute, 6),
    // 0x30
    o(Bmi, Relative, 2),         p(And, IndirectIndexed, 5),  JAM,                          u(Rla, IndirectIndexed, 8),
    u(Nop, ZeroPageX, 4),        o(And, ZeroPageX, 4),        o(Rol, ZeroPageX, 6),         u(Rla, ZeroPageX, 6),
    o(Sec, Implied, 2),          p(And, AbsoluteY, 4),        u(Nop, Implied, 2),           u(Rla, AbsoluteY, 7),
    up(Nop, AbsoluteX, 4),       p(And, AbsoluteX, 4),        o(Rol, AbsoluteX, 7),         u(Rla, AbsoluteX, 7),
    // 0x40
    o(Rti, Implied, 6),          o(Eor, IndexedIndirect, 6),  JAM,                          u(Sre, IndexedIndirect, 8),
    u(Nop, ZeroPage, 3),         o(Eor, ZeroPage, 3),         o(Lsr, ZeroPage, 5),          u(Sre, ZeroPage, 5),
    o(Pha, Implied, 3),          o(Eor, Immediate, 2),        o(Lsr, Accumulator, 2),       u(Alr, Immediate, 2),
    o(Jmp, Absolute, 3),         o(Eor, Absolute, 4),         o(Lsr, Absolute, 6),          u(Sre, Absolute, 6),
    // 0x50
    o(Bvc, Relative, 2),         p(Eor, IndirectIndexed, 5),  JAM,                          u(Sre, IndirectIndexed, 8),
    u(Nop, ZeroPageX, 4),        o(Eor, ZeroPageX, 4),        o(Lsr, ZeroPageX, 6),         u(Sre, ZeroPageX, 6),
    o(Cli, Implied, 2),          p(Eor, AbsoluteY, 4),        u(Nop, Implied, 2),           u(Sre, AbsoluteY, 7),
    up(Nop, AbsoluteX, 4),       p(Eor, AbsoluteX, 4),        o(Lsr, AbsoluteX, 7),         u(Sre, AbsoluteX, 7),
    // 0x60
    o(Rts, Implied, 6),          o(Adc, IndexedIndirect, 6),  JAM,                          u(Rra, IndexedIndirect, 8),
    u(Nop, ZeroPage, 3),         o(Adc, ZeroPage, 3),         o(Ror, ZeroPage, 5),          u(Rra, ZeroPage, 5),
    o(Pla, Implied, 4),          o(Adc, Immediate, 2),        o(Ror, Accumulator, 2),       u(Arr, Immediate, 2),
    o(Jmp, Indirect, 5),         o(Adc, Absolute, 4),         o(Ror, Absolute, 6),          u(Rra, Absolute, 6),
    // 0x70
    o(Bvs, Relative, 2),         p(Adc, IndirectIndexed, 5),  JAM,                          u(Rra, IndirectIndexed, 8),
    u(Nop, ZeroPageX, 4),        o(Adc, ZeroPageX, 4),        o(Ror, ZeroPageX, 6),         u(Rra, ZeroPageX, 6),
    o(Sei, Implied, 2),          p(Adc, AbsoluteY, 4),        u(Nop, Implied, 2),           u(Rra, AbsoluteY, 7),
    up(Nop, AbsoluteX, 4),       p(Adc, AbsoluteX, 4),        o(Ror, AbsoluteX, 7),         u(Rra, AbsoluteX, 7),
    // 0x80
    u(Nop, Immediate, 2),        o(Sta, IndexedIndirect, 6),  u(Nop, Immediate, 2),         u(Sax, IndexedIndirect, 6),
    o(Sty, ZeroPage, 3),         o(Sta, ZeroPage, 3),         o(Stx, ZeroPage, 3),          u(Sax, ZeroPage, 3),
    o(Dey, Implied, 2),          u(Nop, Immediate, 2),        o(Txa, Implied, 2),           u(Xaa, Immediate, 2),
    o(Sty, Absolute, 4),         o(Sta, Absolute, 4),         o(Stx, Absolute, 4),          u(Sax, Absolute, 4),
    // 0x90
    o(Bcc, Relative, 2),         o(Sta, IndirectIndexed, 6),  JAM,                          u(Ahx, IndirectIndexed, 6),
    o(Sty, ZeroPageX, 4),        o(Sta, ZeroPageX, 4),        o(Stx, ZeroPageY, 4),         u(Sax, ZeroPageY, 4),
    o(Tya, Implied, 2),          o(Sta, AbsoluteY, 5),        o(Txs, Implied, 2),           u(Tas, AbsoluteY, 5),
    u(Shy, AbsoluteX, 5),        o(Sta, AbsoluteX, 5),        u(Shx, AbsoluteY, 5),         u(Ahx, AbsoluteY, 5),
    // 0xA0
    o(Ldy, Immediate, 2),        o(Lda, IndexedIndirect, 6),  o(Ldx, Immediate, 2),         u(Lax, IndexedIndirect, 6),
    o(Ldy, ZeroPage, 3),         o(Lda, ZeroPage, 3),         o(Ldx, ZeroPage, 3),          u(Lax, ZeroPage, 3),
    o(Tay, Implied, 2),          o(Lda, Immediate, 2),        o(Tax, Implied, 2),           u(Lax, Immediate, 2),
    o(Ldy, Absolute, 4),         o(Lda, Absolute, 4),         o(Ldx, Absolute, 4),          u(Lax, Absolute, 4),
    // 0xB0
    o(Bcs, Relative, 2),         p(Lda, IndirectIndexed, 5),  JAM,                          up(Lax, IndirectIndexed, 5),
    o(Ldy, ZeroPageX, 4),        o(Lda, ZeroPageX, 4),        o(Ldx, ZeroPageY, 4),         u(Lax, ZeroPageY, 4),
    o(Clv, Implied, 2),          p(Lda, AbsoluteY, 4),        o(Tsx, Implied, 2),           up(Las, AbsoluteY, 4),
    p(Ldy, AbsoluteX, 4),        p(Lda, AbsoluteX, 4),        p(Ldx, AbsoluteY, 4),         up(Lax, AbsoluteY, 4),
    // 0xC0
    o(Cpy, Immediate, 2),        o(Cmp, IndexedIndirect, 6),  u(Nop, Immediate, 2),         u(Dcp, IndexedIndirect, 8),
    o(Cpy, ZeroPage, 3),         o(Cmp, ZeroPage, 3),         o(Dec, ZeroPage, 5),          u(Dcp, ZeroPage, 5),
    o(Iny, Implied, 2),          o(Cmp, Immediate, 2),        o(Dex, Implied, 2),           u(Axs, Immediate, 2),
    o(Cpy, Absolute, 4),         o(Cmp, Absolute, 4),         o(Dec, Absolute, 6),          u(Dcp, Absolute, 6),
    // 0xD0
    o(Bne, Relative, 2),         p(Cmp, IndirectIndexed, 5),  JAM,                          u(Dcp, IndirectIndexed, 8),
    u(Nop, ZeroPageX, 4),        o(Cmp, ZeroPageX, 4),        o(Dec, ZeroPageX, 6),         u(Dcp, ZeroPageX, 6),
    o(Cld, Implied, 2),          p(Cmp, AbsoluteY, 4),        u(Nop, Implied, 2),           u(Dcp, AbsoluteY, 7),
    up(Nop, AbsoluteX, 4),       p(Cmp, AbsoluteX, 4),        o(Dec, AbsoluteX, 7),         u(Dcp, AbsoluteX, 7),
    // 0xE0
    o(Cpx, Immediate, 2),        o(Sbc, IndexedIndirect, 6),  u(Nop, Immediate, 2),         u(Isb, IndexedIndirect, 8),
    o(Cpx, ZeroPage, 3),         o(Sbc, ZeroPage, 3),         o(Inc, ZeroPage, 5),          u(Isb, ZeroPage, 5),
    o(Inx, Implied, 2),          o(Sbc, Immediate, 2),        o(Nop, Implied, 2),           u(Sbc, Immediate, 2),
    o(Cpx, Absolute, 4),         o(Sbc, Absolute, 4),         o(Inc, Absolute, 6),          u(Isb, Absolute, 6),
    // 0xF0
    o(Beq, Relative, 2),         p(Sbc, IndirectIndexed, 5),  JAM,                          u(Isb, IndirectIndexed, 8),
    u(Nop, ZeroPageX, 4),        o(Sbc, ZeroPageX, 4),        o(Inc, ZeroPageX, 6),         u(Isb, ZeroPageX, 6),
    o(Sed, Implied, 2),          p(Sbc, AbsoluteY, 4),        u(Nop, Implied, 2),           u(Isb, AbsoluteY, 7),
    up(Nop, AbsoluteX, 4),       p(Sbc, AbsoluteX, 4),        o(Inc, AbsoluteX, 7),         u(Isb, AbsoluteX, 7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_entries() {
        let lda = &OPCODE_TABLE[0xA9];
        assert_eq!(lda.instruction, Lda);
        assert_eq!(lda.mode, Immediate);
        assert_eq!(lda.bytes, 2);
        assert_eq!(lda.cycles, 2);

        let jmp = &OPCODE_TABLE[0x6C];
        assert_eq!(jmp.mnemonic, "JMP");
        assert_eq!(jmp.mode, Indirect);
        assert_eq!(jmp.bytes, 3);

        let sta = &OPCODE_TABLE[0x9D];
        assert!(!sta.page_cycle, "Stores always take the extra cycle");
        assert_eq!(sta.cycles, 5);
    }

    #[test]
    fn test_official_count() {
        let official = OPCODE_TABLE.iter().filter(|info| info.official).count();
        assert_eq!(official, 151);
    }

    #[test]
    fn test_jam_opcodes() {
        let jams: Vec<usize> = (0..256)
            .filter(|&op| OPCODE_TABLE[op].instruction == Jam)
            .collect();
        assert_eq!(
            jams,
            vec![0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2]
        );
    }

    #[test]
    fn test_mnemonic_matches_instruction() {
        for info in OPCODE_TABLE.iter() {
            assert_eq!(info.mnemonic, info.instruction.mnemonic());
        }
    }

    #[test]
    fn test_unofficial_sbc_alias() {
        let info = &OPCODE_TABLE[0xEB];
        assert_eq!(info.instruction, Sbc);
        assert!(!info.official);
    }
}
