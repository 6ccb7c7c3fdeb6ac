// Instruction fetch, dispatch and interrupt entry

use crate::bus::MemoryMappedDevice;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::opcodes::{Instruction, OPCODE_TABLE};
use crate::cpu::{flags, vectors, Cpu, INTERRUPT_CYCLES};

impl Cpu {
    /// Execute one instruction, or enter a pending interrupt
    ///
    /// Pending NMI wins over IRQ; IRQ is only taken while I is clear. A jammed
    /// CPU does nothing but report one cycle so the rest of the machine keeps
    /// running.
    ///
    /// # Returns
    /// The number of cycles consumed
    pub fn step<B: MemoryMappedDevice>(&mut self, bus: &mut B) -> u8 {
        if self.halted {
            self.cycles = self.cycles.wrapping_add(1);
            return 1;
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            return self.interrupt(bus, vectors::NMI);
        }

        if self.irq_line && !self.get_interrupt_disable() {
            return self.interrupt(bus, vectors::IRQ);
        }

        let opcode = self.fetch_byte(bus);
        let info = &OPCODE_TABLE[opcode as usize];
        let operand = self.resolve(info.mode, bus);

        let extra_cycles = self.execute_instruction(info.instruction, opcode, &operand, bus);

        let mut cycles = info.cycles + extra_cycles;
        if info.page_cycle && operand.page_crossed {
            cycles += 1;
        }

        self.cycles = self.cycles.wrapping_add(cycles as u64);
        cycles
    }

    /// Hardware interrupt entry: push PC and P (B clear), set I, load vector
    fn interrupt<B: MemoryMappedDevice>(&mut self, bus: &mut B, vector: u16) -> u8 {
        self.push_word(bus, self.pc);
        self.push(bus, (self.status & !flags::BREAK) | flags::UNUSED);
        self.set_interrupt_disable(true);
        self.pc = Self::read_vector(bus, vector);
        self.cycles = self.cycles.wrapping_add(INTERRUPT_CYCLES as u64);
        INTERRUPT_CYCLES
    }

    /// Returns extra cycles taken by branches
    fn execute_instruction<B: MemoryMappedDevice>(
        &mut self,
        instruction: Instruction,
        opcode: u8,
        operand: &AddressingResult,
        bus: &mut B,
    ) -> u8 {
        use Instruction::*;

        match instruction {
            // Branches
            Bcc => return self.bcc(operand),
            Bcs => return self.bcs(operand),
            Beq => return self.beq(operand),
            Bne => return self.bne(operand),
            Bmi => return self.bmi(operand),
            Bpl => return self.bpl(operand),
            Bvc => return self.bvc(operand),
            Bvs => return self.bvs(operand),

            // Load/Store
            Lda => self.lda(bus, operand),
            Ldx => self.ldx(bus, operand),
            Ldy => self.ldy(bus, operand),
            Sta => self.sta(bus, operand),
            Stx => self.stx(bus, operand),
            Sty => self.sty(bus, operand),

            // Transfers
            Tax => self.tax(),
            Tay => self.tay(),
            Txa => self.txa(),
            Tya => self.tya(),
            Tsx => self.tsx(),
            Txs => self.txs(),

            // Arithmetic
            Adc => self.adc(bus, operand),
            Sbc => self.sbc(bus, operand),
            Inc => self.inc(bus, operand),
            Dec => self.dec(bus, operand),
            Inx => self.inx(),
            Iny => self.iny(),
            Dex => self.dex(),
            Dey => self.dey(),

            // Logic
            And => self.and(bus, operand),
            Ora => self.ora(bus, operand),
            Eor => self.eor(bus, operand),
            Bit => self.bit(bus, operand),

            // Shifts and rotates
            Asl => self.asl(bus, operand),
            Lsr => self.lsr(bus, operand),
            Rol => self.rol(bus, operand),
            Ror => self.ror(bus, operand),

            // Compare
            Cmp => self.cmp(bus, operand),
            Cpx => self.cpx(bus, operand),
            Cpy => self.cpy(bus, operand),

            // Jumps and subroutines
            Jmp => self.jmp(operand),
            Jsr => self.jsr(bus, operand),
            Rts => self.rts(bus),
            Rti => self.rti(bus),

            // Stack
            Pha => self.pha(bus),
            Php => self.php(bus),
            Pla => self.pla(bus),
            Plp => self.plp(bus),

            // Flags
            Clc => self.clc(),
            Sec => self.sec(),
            Cli => self.cli(),
            Sei => self.sei(),
            Cld => self.cld(),
            Sed => self.sed(),
            Clv => self.clv(),

            Brk => self.brk(bus),
            Nop => self.nop(),
            Jam => self.jam(opcode),

            // Unofficial
            Lax => self.lax(bus, operand),
            Sax => self.sax(bus, operand),
            Dcp => self.dcp(bus, operand),
            Isb => self.isb(bus, operand),
            Slo => self.slo(bus, operand),
            Rla => self.rla(bus, operand),
            Sre => self.sre(bus, operand),
            Rra => self.rra(bus, operand),
            Anc => self.anc(bus, operand),
            Alr => self.alr(bus, operand),
            Arr => self.arr(bus, operand),
            Axs => self.axs(bus, operand),
            Xaa => self.xaa(bus, operand),
            Las => self.las(bus, operand),
            Ahx => self.ahx(bus, operand),
            Shx => self.shx(bus, operand),
            Shy => self.shy(bus, operand),
            Tas => self.tas(bus, operand),
        }

        0
    }
}
