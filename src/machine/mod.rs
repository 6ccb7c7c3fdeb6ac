// Machine module - The whole console and its host-facing API
//
// `Machine` owns the CPU and the bus (which owns everything else) and runs the
// scheduler: one CPU instruction at a time, then the PPU and APU catch up by the
// cycles it took, plus any OAM DMA stall. Interrupts are exchanged at
// instruction boundaries:
//
// - the PPU's vblank NMI edge is handed to the CPU after each instruction
// - the IRQ line (APU or mapper) is sampled before each instruction
//
// Time is budgeted in microseconds at the NTSC CPU clock. Fractions and
// overshoot carry into the next `exec` call, so long runs stay exact.

mod config;
pub mod snapshot;

pub use config::{ConfigError, MachineConfig, CONFIG_FILE};
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::audio::{AudioPipeline, SampleBuffer};
use crate::bus::Bus;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::cpu::Cpu;
use crate::debug::{DebugHook, ExecutionLog, HookAction, NoDebug, ObservedBus};
use crate::display::{encode_png, DisplayInfo, ScreenshotError};
use crate::input::Buttons;

/// NTSC CPU clock in Hz
pub const CPU_CLOCK_HZ: i64 = 1_789_773;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Longest instruction plus the longest OAM DMA stall, in budget units
const MAX_OVERSHOOT: i64 = (8 + 514) * MICROS_PER_SECOND;

/// Controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pad {
    One,
    Two,
}

/// Everything a snapshot captures
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MachineState {
    cpu: Cpu,
    bus: Bus,
    /// Unspent time in CPU-cycle microunits; negative after an overshoot
    budget: i64,
    /// CPU cycles executed by `exec` and `step` since power-on
    ticks: u64,
}

impl MachineState {
    fn new(bus: Bus) -> Self {
        MachineState {
            cpu: Cpu::new(),
            bus,
            budget: 0,
            ticks: 0,
        }
    }

    /// Reject decoded state that would index past its memories once run
    fn validate(&self) -> Result<(), SnapshotError> {
        // Between calls the budget is spent: at most one instruction plus a DMA stall over
        if !(-MAX_OVERSHOOT..=0).contains(&self.budget) {
            return Err(SnapshotError::Invalid(format!(
                "time budget {} out of range",
                self.budget
            )));
        }
        self.bus.validate().map_err(SnapshotError::Invalid)
    }
}

/// The emulated console
///
/// `H` observes execution; the default [`NoDebug`] costs nothing.
///
/// # Example
///
/// ```
/// use madnes::Machine;
///
/// let mut machine = Machine::new();
/// assert!(!machine.cartridge_inserted());
/// assert!(machine.insert_cart(b"not a cartridge").is_err());
/// ```
pub struct Machine<H: DebugHook = NoDebug> {
    state: MachineState,
    hook: H,
    config: MachineConfig,
    /// Set by a hook or `stop`; `exec` does nothing until `resume`
    stopped: bool,
}

impl Machine<NoDebug> {
    /// Create a machine with the default configuration and no cartridge
    pub fn new() -> Self {
        Machine::assemble(MachineConfig::default(), NoDebug)
    }

    /// Create a machine with the given configuration
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` when a setting is out of range
    pub fn with_config(config: MachineConfig) -> Result<Self, ConfigError> {
        Machine::with_hook(config, NoDebug)
    }
}

impl Machine<ExecutionLog> {
    /// Create a machine that records an execution trace
    ///
    /// The log holds `config.trace_capacity` entries.
    pub fn with_trace(config: MachineConfig) -> Result<Self, ConfigError> {
        let log = ExecutionLog::new(config.trace_capacity);
        Machine::with_hook(config, log)
    }
}

impl Default for Machine<NoDebug> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: DebugHook> Machine<H> {
    /// Create a machine observed by `hook`
    ///
    /// The configuration is validated first; a zero sample rate or buffer
    /// would otherwise leave the machine silently without audio.
    pub fn with_hook(config: MachineConfig, hook: H) -> Result<Self, ConfigError> {
        config.validate().map_err(|e| {
            warn!("Rejected machine configuration: {}", e);
            e
        })?;
        Ok(Machine::assemble(config, hook))
    }

    fn assemble(config: MachineConfig, hook: H) -> Self {
        let mut audio = AudioPipeline::new(config.sample_rate, config.audio_buffer_capacity);
        audio.set_volume(config.volume);

        Machine {
            state: MachineState::new(Bus::with_audio(audio)),
            hook,
            config,
            stopped: false,
        }
    }

    // ========================================
    // Execution
    // ========================================

    /// Run for `micros` microseconds of emulated time
    ///
    /// Whole instructions run until the budget is spent; the overshoot is
    /// charged to the next call. Nothing runs while stopped or without a
    /// cartridge.
    ///
    /// # Returns
    ///
    /// CPU cycles executed, DMA stalls included
    pub fn exec(&mut self, micros: u32) -> u32 {
        if self.stopped || self.state.bus.cartridge().is_none() {
            return 0;
        }

        self.state.budget += micros as i64 * CPU_CLOCK_HZ;

        let mut ticks: u32 = 0;
        while self.state.budget > 0 {
            match self.step_instruction() {
                Some(cycles) => {
                    ticks = ticks.wrapping_add(cycles);
                    self.state.budget -= cycles as i64 * MICROS_PER_SECOND;
                }
                None => break,
            }
        }
        ticks
    }

    /// Execute exactly one instruction (or interrupt entry), even when stopped
    ///
    /// The hook still sees the instruction, but cannot veto it. Returns `None`
    /// without a cartridge.
    pub fn step(&mut self) -> Option<u32> {
        if self.state.bus.cartridge().is_none() {
            return None;
        }
        if H::ACTIVE {
            self.hook.on_instruction(&self.state.cpu, &self.state.bus);
        }
        Some(self.run_instruction())
    }

    /// One scheduler iteration; `None` when a hook stops the machine
    fn step_instruction(&mut self) -> Option<u32> {
        let state = &self.state;
        if H::ACTIVE && self.hook.on_instruction(&state.cpu, &state.bus) == HookAction::Stop {
            debug!("Stopped by debug hook at ${:04X}", state.cpu.pc);
            self.stopped = true;
            self.state.budget = 0;
            return None;
        }

        Some(self.run_instruction())
    }

    fn run_instruction(&mut self) -> u32 {
        let state = &mut self.state;
        state.cpu.set_irq(state.bus.irq_line());

        let mut cycles = u32::from(if H::ACTIVE {
            let mut bus = ObservedBus::new(&mut state.bus, &mut self.hook);
            state.cpu.step(&mut bus)
        } else {
            state.cpu.step(&mut state.bus)
        });

        let stall = state.bus.take_dma_stall(state.cpu.cycles);
        if stall > 0 {
            state.cpu.cycles = state.cpu.cycles.wrapping_add(stall as u64);
            cycles += stall;
        }

        state.bus.tick(cycles);
        if state.bus.take_nmi() {
            state.cpu.assert_nmi();
        }

        state.ticks = state.ticks.wrapping_add(cycles as u64);
        cycles
    }

    /// Stop execution at the next instruction boundary
    pub fn stop(&mut self) {
        self.stopped = true;
        self.state.budget = 0;
    }

    /// Let `exec` run again
    pub fn resume(&mut self) {
        self.stopped = false;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ========================================
    // Cartridge and reset
    // ========================================

    /// Insert an iNES image and power the machine on
    ///
    /// On error nothing changes: the previous cartridge keeps running.
    ///
    /// # Errors
    ///
    /// * `CartridgeError::Malformed` - bad magic, truncated data, or no PRG-ROM
    /// * `CartridgeError::UnsupportedMapper` - no board for the mapper number
    pub fn insert_cart(&mut self, image: &[u8]) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::from_ines_bytes(image)?;
        self.install(cartridge);
        Ok(())
    }

    fn install(&mut self, cartridge: Cartridge) {
        let state = &mut self.state;
        state.bus.insert_cartridge(cartridge);
        state.bus.power_on();
        state.cpu.power_on(&mut state.bus);
        state.budget = 0;
        state.ticks = 0;
        self.stopped = false;
    }

    /// Remove the cartridge; cartridge space reads as open bus
    pub fn remove_cartridge(&mut self) {
        let state = &mut self.state;
        if state.bus.remove_cartridge().is_some() {
            info!("Cartridge removed");
        }
        state.bus.power_on();
        state.cpu = Cpu::new();
        state.budget = 0;
        state.ticks = 0;
    }

    pub fn cartridge_inserted(&self) -> bool {
        self.state.bus.cartridge().is_some()
    }

    /// Press the reset button
    ///
    /// CPU and PPU/APU restart; RAM, cartridge RAM and bank state survive.
    pub fn reset(&mut self) {
        let state = &mut self.state;
        state.bus.reset();
        state.cpu.reset(&mut state.bus);
        state.budget = 0;
        info!("Machine reset, PC=${:04X}", state.cpu.pc);
    }

    // ========================================
    // Input
    // ========================================

    /// Press a pad-1 button by host key code; unknown codes are ignored
    pub fn key_down(&mut self, code: u32) {
        if let Some(button) = Buttons::from_key_code(code) {
            self.set_button(Pad::One, button, true);
        }
    }

    /// Release a pad-1 button by host key code; unknown codes are ignored
    pub fn key_up(&mut self, code: u32) {
        if let Some(button) = Buttons::from_key_code(code) {
            self.set_button(Pad::One, button, false);
        }
    }

    /// Press or release buttons on either pad
    pub fn set_button(&mut self, pad: Pad, buttons: Buttons, pressed: bool) {
        let controllers = self.state.bus.controllers_mut();
        match pad {
            Pad::One => controllers.port1.set(buttons, pressed),
            Pad::Two => controllers.port2.set(buttons, pressed),
        }
    }

    /// Pad-1 buttons held, in shift-out bit order (A = 0x01 .. Right = 0x80)
    pub fn pad_mask(&self) -> u8 {
        self.state.bus.controllers().port1.buttons().bits()
    }

    // ========================================
    // Output
    // ========================================

    /// The current frame
    pub fn display_info(&self) -> DisplayInfo<'_> {
        let ppu = self.state.bus.ppu();
        DisplayInfo::new(ppu.frame(), ppu.frame_count())
    }

    /// The current frame as PNG bytes
    pub fn screenshot_png(&self) -> Result<Vec<u8>, ScreenshotError> {
        encode_png(&self.display_info())
    }

    /// Samples produced so far, for the host to drain
    pub fn audio_samples(&mut self) -> &mut SampleBuffer {
        self.state.bus.audio_mut().buffer_mut()
    }

    /// Completed PPU frames since power-on
    pub fn frame_count(&self) -> u64 {
        self.state.bus.ppu().frame_count()
    }

    /// CPU cycles executed since power-on
    pub fn ticks(&self) -> u64 {
        self.state.ticks
    }

    // ========================================
    // Snapshots
    // ========================================

    /// Capture the complete machine state
    ///
    /// Queued audio samples belong to the host and are not included.
    pub fn save_snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let snapshot = Snapshot::capture(&self.state)?;
        info!(
            "Saved snapshot: {} bytes, version {:#010x}",
            snapshot.len(),
            snapshot.version
        );
        Ok(snapshot)
    }

    /// Restore a snapshot taken by this build
    ///
    /// The image is fully decoded before anything is replaced, so a failed
    /// load leaves the running machine untouched.
    ///
    /// # Errors
    ///
    /// * `SnapshotError::VersionMismatch` - taken by a different build
    /// * `SnapshotError::Decode` - the image is corrupt
    /// * `SnapshotError::Invalid` - the image decodes but its memories are the wrong size
    pub fn load_snapshot(&mut self, version: u32, image: &[u8]) -> Result<(), SnapshotError> {
        let mut restored: MachineState = Snapshot::restore(version, image)
            .and_then(|state: MachineState| state.validate().map(|()| state))
            .map_err(|e| {
                warn!("Snapshot rejected: {}", e);
                e
            })?;

        // Keep the host's queued samples and buffer capacity
        restored
            .bus
            .audio_mut()
            .swap_buffer(self.state.bus.audio_mut());
        self.state = restored;
        info!("Loaded snapshot at PC=${:04X}", self.state.cpu.pc);
        Ok(())
    }

    // ========================================
    // Debugger access
    // ========================================

    /// CPU-space read without side effects
    pub fn peek(&self, addr: u16) -> u8 {
        self.state.bus.peek(addr)
    }

    /// PPU-space read without side effects
    pub fn ppu_peek(&self, addr: u16) -> u8 {
        self.state.bus.ppu_peek(addr)
    }

    /// PPU-space write
    pub fn ppu_poke(&mut self, addr: u16, value: u8) {
        self.state.bus.ppu_poke(addr, value);
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    pub fn cpu(&self) -> &Cpu {
        &self.state.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.state.bus
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}
