// NES Emulator Library
// Core library for the madnes emulator: a headless console driven by the host
//
// The host owns the loop: it calls `Machine::exec` with elapsed time, then
// reads the frame, drains audio samples and feeds input back in.

// Public modules
pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod display;
pub mod input;
pub mod machine;
pub mod ppu;

// Re-export main types for convenience
pub use apu::Apu;
pub use audio::{AudioPipeline, SampleBuffer};
pub use bus::{Bus, MemoryMappedDevice};
pub use cartridge::{Cartridge, CartridgeError, INesHeader, Mapper, Mirroring};
pub use cpu::Cpu;
pub use debug::{
    Breakpoints, DebugHook, DisassembledInstruction, ExecutionLog, HookAction, NoDebug,
};
pub use display::{encode_png, DisplayInfo, ScreenshotError, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use input::{keys, Buttons, Controller, ControllerIO};
pub use machine::{
    ConfigError, Machine, MachineConfig, Pad, Snapshot, SnapshotError, CPU_CLOCK_HZ,
    SNAPSHOT_VERSION,
};
pub use ppu::Ppu;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let _cpu = Cpu::new();
        let _ppu = Ppu::new();
        let _apu = Apu::new();
        let _bus = Bus::new();
        let _controller = Controller::new();
        let _controller_io = ControllerIO::new();
        let _machine = Machine::new();
    }

    #[test]
    fn test_machine_can_move_between_threads() {
        assert_send::<Machine>();
        assert_send::<Machine<ExecutionLog>>();
        assert_send::<Snapshot>();
    }
}
