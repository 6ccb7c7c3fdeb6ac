// Bus module - Memory bus implementation
//
// This module implements the main memory bus that connects the CPU to all memory-mapped
// components in the NES system. It owns every device, decodes addresses, keeps the
// open-bus latch, and clocks the PPU and APU for the cycles the CPU reports.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$1FFF: Mirrors of RAM (3 times)
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4000-$4017: APU and I/O Registers
// $4018-$401F: APU and I/O test functionality (disabled; open bus)
// $4020-$FFFF: Cartridge space (PRG-ROM, PRG-RAM, and mapper registers)
// ```

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::apu::Apu;
use crate::audio::AudioPipeline;
use crate::cartridge::{Cartridge, Mapper};
use crate::input::ControllerIO;
use crate::ppu::Ppu;

/// Size of the internal work RAM
pub const RAM_SIZE: usize = 0x0800;

/// Bytes copied by one OAM DMA transfer
pub const OAM_DMA_BYTES: u16 = 256;

/// Trait for memory-mapped components
///
/// This trait defines the interface the CPU core uses to reach memory. The
/// system [`Bus`] implements it; tests and tools can substitute a flat
/// 64KB array or a wrapper that observes every access.
pub trait MemoryMappedDevice {
    /// Read a byte from the device
    ///
    /// Some devices have side effects on read (e.g., PPU PPUSTATUS clears flags),
    /// so this method takes &mut self.
    fn read(&mut self, addr: u16) -> u8;

    /// Write a byte to the device
    fn write(&mut self, addr: u16, data: u8);
}

/// Main memory bus structure
///
/// The Bus connects the CPU to all memory-mapped components in the NES system.
/// It handles address decoding, memory mirroring, and routes read/write operations
/// to the appropriate components.
///
/// # Memory Layout
///
/// - Internal RAM: 2KB of general-purpose memory with 3 mirrors
/// - PPU Registers: 8 registers mirrored throughout $2000-$3FFF
/// - APU/I/O: Audio and input/output registers
/// - Cartridge Space: Game ROM and mapper-controlled memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    /// Internal RAM: 2KB, mirrored 3 times at $0800-$1FFF
    ram: Vec<u8>,

    ppu: Ppu,
    apu: Apu,
    controllers: ControllerIO,

    /// Inserted cartridge; `None` leaves $4020-$FFFF on open bus
    cartridge: Option<Cartridge>,

    /// Last value driven on the CPU data bus
    open_bus: u8,

    /// Source page of a $4014 write, consumed after the current instruction
    dma_page: Option<u8>,

    audio: AudioPipeline,
}

impl Bus {
    /// Create a bus with no cartridge and default audio settings
    ///
    /// # Example
    /// ```
    /// use madnes::bus::{Bus, MemoryMappedDevice};
    ///
    /// let mut bus = Bus::new();
    /// bus.write(0x0000, 0x42);
    /// assert_eq!(bus.read(0x0800), 0x42);
    /// ```
    pub fn new() -> Self {
        Self::with_audio(AudioPipeline::default())
    }

    /// Create a bus feeding the given audio pipeline
    pub fn with_audio(audio: AudioPipeline) -> Self {
        Bus {
            ram: vec![0; RAM_SIZE],
            ppu: Ppu::new(),
            apu: Apu::new(),
            controllers: ControllerIO::new(),
            cartridge: None,
            open_bus: 0,
            dma_page: None,
            audio,
        }
    }

    /// Reset button: PPU and APU restart, RAM and cartridge RAM survive
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.dma_page = None;
    }

    /// Power cycle: clear RAM and every device
    pub fn power_on(&mut self) {
        self.ram.fill(0);
        self.ppu = Ppu::new();
        self.apu = Apu::new();
        self.controllers.port1.write_strobe(0);
        self.controllers.port2.write_strobe(0);
        self.open_bus = 0;
        self.dma_page = None;
    }

    // ========================================
    // Cartridge
    // ========================================

    /// Install a cartridge, returning the one it replaces
    pub fn insert_cartridge(&mut self, cartridge: Cartridge) -> Option<Cartridge> {
        self.cartridge.replace(cartridge)
    }

    /// Take the cartridge out; cartridge space returns to open bus
    pub fn remove_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    // ========================================
    // Side-effect-free access
    // ========================================

    /// Read without side effects
    ///
    /// PPUSTATUS keeps its flags, controllers keep their shift position, the
    /// APU frame IRQ stays pending and the open-bus latch is left alone.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.peek_register(addr, &self.cartridge),
            0x4015 => self.apu.peek_status() | (self.open_bus & 0x20),
            0x4016 | 0x4017 => (self.open_bus & 0xE0) | self.controllers.peek(addr),
            0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self
                .cartridge
                .as_ref()
                .and_then(|cart| cart.cpu_read(addr))
                .unwrap_or(self.open_bus),
        }
    }

    /// Read PPU address space ($0000-$3FFF) without side effects
    pub fn ppu_peek(&self, addr: u16) -> u8 {
        self.ppu.peek_vram(addr, &self.cartridge)
    }

    /// Write PPU address space ($0000-$3FFF) directly
    pub fn ppu_poke(&mut self, addr: u16, data: u8) {
        self.ppu.write_vram(addr, data, &mut self.cartridge);
    }

    // ========================================
    // Clocking
    // ========================================

    /// Run the PPU and APU for `cpu_cycles` CPU cycles
    ///
    /// The PPU advances three dots per cycle and the APU one step. DMC sample
    /// fetches are served from CPU space as they come due.
    pub fn tick(&mut self, cpu_cycles: u32) {
        for _ in 0..cpu_cycles {
            for _ in 0..3 {
                self.ppu.step(&mut self.cartridge);
            }

            self.apu.clock();
            if let Some(addr) = self.apu.dmc_fetch_address() {
                let byte = self.read(addr);
                self.apu.dmc_load(byte);
            }
            self.apu.mix_into(&mut self.audio);
        }
    }

    /// Collect a pending vblank NMI edge
    pub fn take_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }

    /// Level of the shared CPU IRQ line (APU frame/DMC or mapper)
    pub fn irq_line(&self) -> bool {
        self.apu.irq_pending()
            || self
                .cartridge
                .as_ref()
                .is_some_and(|cart| cart.irq_pending())
    }

    // ========================================
    // OAM DMA Methods
    // ========================================

    /// Check if an OAM DMA transfer is waiting to run
    pub fn is_dma_pending(&self) -> bool {
        self.dma_page.is_some()
    }

    /// Perform a pending OAM DMA and return the CPU stall it costs
    ///
    /// 256 bytes from $XX00-$XXFF are written to OAM through OAMDATA, so the
    /// copy starts at the current OAM address and wraps. The stall is 513
    /// cycles when `cpu_cycle` is even and 514 when odd.
    ///
    /// # Example
    ///
    /// ```
    /// use madnes::bus::{Bus, MemoryMappedDevice};
    ///
    /// let mut bus = Bus::new();
    /// bus.write(0x4014, 0x02);
    /// assert_eq!(bus.take_dma_stall(10), 513);
    /// assert_eq!(bus.take_dma_stall(10), 0);
    /// ```
    pub fn take_dma_stall(&mut self, cpu_cycle: u64) -> u32 {
        let Some(page) = self.dma_page.take() else {
            return 0;
        };

        let base_addr = (page as u16) << 8;
        debug!(
            "OAM DMA from ${:04X} at OAMADDR ${:02X}",
            base_addr,
            self.ppu.oam_addr()
        );

        for offset in 0..OAM_DMA_BYTES {
            let data = self.read(base_addr.wrapping_add(offset));
            self.ppu.write_oam_data(data);
        }

        if cpu_cycle % 2 == 0 {
            513
        } else {
            514
        }
    }

    // ========================================
    // Component access
    // ========================================

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn controllers(&self) -> &ControllerIO {
        &self.controllers
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerIO {
        &mut self.controllers
    }

    pub fn audio(&self) -> &AudioPipeline {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioPipeline {
        &mut self.audio
    }

    /// Current open-bus latch
    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }

    /// Internal RAM contents
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Check the sizes and indices a decoded bus must satisfy before it runs
    ///
    /// A freshly built bus always passes; a deserialized one may not.
    pub fn validate(&self) -> Result<(), String> {
        if self.ram.len() != RAM_SIZE {
            return Err(format!(
                "work RAM is {} bytes, expected {}",
                self.ram.len(),
                RAM_SIZE
            ));
        }
        self.ppu.validate()?;
        self.apu.validate()?;
        if let Some(cart) = &self.cartridge {
            cart.validate()?;
        }
        Ok(())
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMappedDevice for Bus {
    /// Read a byte from the bus
    ///
    /// Routes the read operation to the appropriate memory region or device
    /// based on the address. Undriven addresses return the open-bus latch;
    /// every read then refreshes the latch.
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            // Internal RAM, mirrored every 2KB
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],

            // PPU registers, mirrored every 8 bytes
            0x2000..=0x3FFF => self.ppu.read_register(addr, &mut self.cartridge),

            // APU status; bit 5 is not driven
            0x4015 => self.apu.read_status() | (self.open_bus & 0x20),

            // Controllers drive bit 0 only
            0x4016 | 0x4017 => (self.open_bus & 0xE0) | self.controllers.read(addr),

            // Write-only APU registers, $4014 and the test range
            0x4000..=0x401F => {
                trace!("Open bus read at ${:04X}", addr);
                self.open_bus
            }

            0x4020..=0xFFFF => match self.cartridge.as_ref().and_then(|c| c.cpu_read(addr)) {
                Some(value) => value,
                None => {
                    trace!("Open bus read at ${:04X}", addr);
                    self.open_bus
                }
            },
        };

        self.open_bus = value;
        value
    }

    /// Write a byte to the bus
    ///
    /// Writes to read-only regions are dropped. $4014 records an OAM DMA
    /// request that runs once the current instruction finishes.
    fn write(&mut self, addr: u16, data: u8) {
        self.open_bus = data;

        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,

            0x2000..=0x3FFF => self.ppu.write_register(addr, data, &mut self.cartridge),

            0x4014 => self.dma_page = Some(data),

            0x4016 => self.controllers.write(data),

            // $4017 writes go to the frame counter, not pad 2
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write_register(addr, data),

            0x4018..=0x401F => trace!("Ignored write ${:02X} to ${:04X}", data, addr),

            0x4020..=0xFFFF => match self.cartridge.as_mut() {
                Some(cart) => cart.cpu_write(addr, data),
                None => trace!("Ignored write ${:02X} to ${:04X}", data, addr),
            },
        }
    }
}
