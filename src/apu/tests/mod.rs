// APU integration tests, driving the APU through its register interface
//
// - `registers`: register decoding and $4015 status
// - `frame_counter`: sequencer timing seen through the channels
// - `channels`: channel output through a full clocked APU


use super::Apu;
use crate::bus::MemoryMappedDevice;

/// APU with every channel enabled
fn enabled_apu() -> Apu {
    let mut apu = Apu::new();
    apu.write(0x4015, 0x0F);
    apu
}

fn run(apu: &mut Apu, cycles: u32) {
    for _ in 0..cycles {
        apu.clock();
    }
}
