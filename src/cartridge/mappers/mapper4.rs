// Mapper 4 (MMC3) - Fine-grained banking with a scanline IRQ counter
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (optional, battery-backed in some games)
// - CPU $8000-$9FFF: 8KB PRG-ROM bank (R6, or second-to-last in PRG mode 1)
// - CPU $A000-$BFFF: 8KB PRG-ROM bank (R7)
// - CPU $C000-$DFFF: 8KB PRG-ROM bank (second-to-last, or R6 in PRG mode 1)
// - CPU $E000-$FFFF: 8KB PRG-ROM bank (fixed to last bank)
// - PPU $0000-$1FFF: two 2KB banks (R0, R1) and four 1KB banks (R2-R5),
//   swapped between halves by the CHR A12 inversion bit
//
// Register Interface (address & $E001):
// - $8000: Bank select
//   Bit 7: CHR A12 inversion
//   Bit 6: PRG-ROM bank mode
//   Bits 0-2: Bank register to update on the next $8001 write
// - $8001: Bank data
// - $A000: Mirroring (bit 0: 0 = vertical, 1 = horizontal)
// - $A001: PRG-RAM protect (bit 7 = enable, bit 6 = deny writes)
// - $C000: IRQ latch
// - $C001: IRQ reload
// - $E000: IRQ disable and acknowledge
// - $E001: IRQ enable
//
// IRQ counter:
// Clocked once per scanline by the PPU. When the counter is zero or a reload
// is pending it is reloaded from the latch, otherwise decremented. Reaching
// zero with IRQs enabled asserts the CPU IRQ line until $E000 is written.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{banked, check_memory};
use crate::cartridge::{Mapper, Mirroring, RomImage, PRG_RAM_SIZE};

const PRG_BANK_SIZE: usize = 8 * 1024;

const CHR_1KB_BANK_SIZE: usize = 1024;

/// MMC3 board (TxROM)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapper4 {
    prg_rom: Vec<u8>,
    chr_mem: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_is_ram: bool,

    // Internal registers
    bank_select: u8,
    bank_registers: [u8; 8],
    mirroring: Mirroring,
    prg_ram_protect: u8,

    // IRQ registers
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
}

impl Mapper4 {
    pub fn new(image: RomImage) -> Self {
        Mapper4 {
            prg_rom: image.prg_rom,
            chr_mem: image.chr_mem,
            prg_ram: image.prg_ram,
            chr_is_ram: image.chr_is_ram,

            bank_select: 0,
            bank_registers: [0, 2, 4, 5, 6, 7, 0, 1],
            mirroring: image.mirroring,
            prg_ram_protect: 0x80,

            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
        }
    }

    pub(crate) fn check_memory(&self) -> Result<(), String> {
        check_memory(&self.prg_rom, &self.chr_mem, Some(&self.prg_ram))
    }

    fn prg_mode_swapped(&self) -> bool {
        self.bank_select & 0x40 != 0
    }

    fn chr_a12_inversion(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    fn prg_bank_count(&self) -> usize {
        (self.prg_rom.len() / PRG_BANK_SIZE).max(1)
    }

    fn prg_bank_for(&self, address: u16) -> usize {
        let second_last = self.prg_bank_count().saturating_sub(2);
        match (address, self.prg_mode_swapped()) {
            (0x8000..=0x9FFF, false) => self.bank_registers[6] as usize,
            (0x8000..=0x9FFF, true) => second_last,
            (0xA000..=0xBFFF, _) => self.bank_registers[7] as usize,
            (0xC000..=0xDFFF, false) => second_last,
            (0xC000..=0xDFFF, true) => self.bank_registers[6] as usize,
            _ => self.prg_bank_count() - 1,
        }
    }

    /// 1KB CHR bank for a pattern address
    fn chr_bank_for(&self, address: u16) -> usize {
        // Inversion swaps the 2KB and 1KB halves
        let address = if self.chr_a12_inversion() {
            address ^ 0x1000
        } else {
            address
        };

        let slot = (address as usize & 0x1FFF) / CHR_1KB_BANK_SIZE;
        match slot {
            0 => (self.bank_registers[0] & 0xFE) as usize,
            1 => (self.bank_registers[0] | 0x01) as usize,
            2 => (self.bank_registers[1] & 0xFE) as usize,
            3 => (self.bank_registers[1] | 0x01) as usize,
            n => self.bank_registers[n - 2] as usize,
        }
    }

    fn chr_index(&self, address: u16) -> usize {
        let banks = (self.chr_mem.len() / CHR_1KB_BANK_SIZE).max(1);
        let bank = self.chr_bank_for(address) % banks;
        (bank * CHR_1KB_BANK_SIZE + (address as usize & 0x03FF)) % self.chr_mem.len()
    }

    fn prg_ram_readable(&self) -> bool {
        self.prg_ram_protect & 0x80 != 0
    }

    fn prg_ram_writable(&self) -> bool {
        self.prg_ram_protect & 0xC0 == 0x80
    }
}

impl Mapper for Mapper4 {
    fn cpu_read(&self, address: u16) -> Option<u8> {
        match address {
            0x6000..=0x7FFF if self.prg_ram_readable() => {
                Some(self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE])
            }
            0x8000..=0xFFFF => Some(banked(
                &self.prg_rom,
                self.prg_bank_for(address),
                PRG_BANK_SIZE,
                (address & 0x1FFF) as usize,
            )),
            _ => None,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        match address {
            0x6000..=0x7FFF => {
                if self.prg_ram_writable() {
                    self.prg_ram[(address as usize - 0x6000) % PRG_RAM_SIZE] = value;
                }
            }
            0x8000..=0xFFFF => match address & 0xE001 {
                0x8000 => self.bank_select = value,
                0x8001 => {
                    let reg = (self.bank_select & 0x07) as usize;
                    self.bank_registers[reg] = value;
                    debug!("MMC3 R{} -> {:02X}", reg, value);
                }
                0xA000 => {
                    self.mirroring = if value & 0x01 != 0 {
                        Mirroring::Horizontal
                    } else {
                        Mirroring::Vertical
                    };
                }
                0xA001 => self.prg_ram_protect = value,
                0xC000 => self.irq_latch = value,
                0xC001 => {
                    self.irq_counter = 0;
                    self.irq_reload = true;
                }
                0xE000 => {
                    self.irq_enabled = false;
                    self.irq_pending = false;
                }
                _ => self.irq_enabled = true,
            },
            _ => {}
        }
    }

    fn ppu_peek(&self, address: u16) -> u8 {
        self.chr_mem[self.chr_index(address)]
    }

    fn ppu_write(&mut self, address: u16, value: u8) {
        if self.chr_is_ram {
            let index = self.chr_index(address);
            self.chr_mem[index] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    fn clock_scanline(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }
}
