// Nestest ROM integration test
// This test runs the Nestest ROM in automation mode and compares the execution
// trace with the golden log

use madnes::bus::{Bus, MemoryMappedDevice};
use madnes::cartridge::Cartridge;
use madnes::cpu::Cpu;
use madnes::debug::{DebugHook, ExecutionLog};
use std::fs;

const ROM_PATH: &str = "tests/nes-test-rom/other/nestest.nes";
const LOG_PATH: &str = "tests/nes-test-rom/other/nestest.log";

/// Instructions run by the official-opcode and unofficial-opcode sections
const MAX_INSTRUCTIONS: usize = 8991;

#[test]
#[ignore] // Run with: cargo test --test nestest -- --ignored --nocapture
fn nestest_cpu_test() {
    let (Ok(rom_data), Ok(golden_log)) = (fs::read(ROM_PATH), fs::read_to_string(LOG_PATH)) else {
        println!("Skipping nestest: ROM or golden log not found");
        return;
    };
    let golden_lines: Vec<&str> = golden_log.lines().collect();

    let cartridge = Cartridge::from_ines_bytes(&rom_data).expect("nestest should parse");
    let mut bus = Bus::new();
    bus.insert_cartridge(cartridge);
    let mut cpu = Cpu::new();
    cpu.power_on(&mut bus);

    // Automation mode starts at $C000 instead of the reset vector
    cpu.pc = 0xC000;

    let mut log = ExecutionLog::new(1);
    let mut mismatches = 0;

    for (index, golden_line) in golden_lines.iter().take(MAX_INSTRUCTIONS).enumerate() {
        log.on_instruction(&cpu, &bus);
        let trace_line = log.recent(1)[0].to_string();

        if !compare_trace_lines(&trace_line, golden_line) {
            mismatches += 1;
            if mismatches <= 10 {
                println!("\nMismatch at instruction {}:", index + 1);
                println!("Expected: {}", golden_line);
                println!("Got:      {}", trace_line);
            }
        }

        let cycles = cpu.step(&mut bus);
        bus.tick(cycles as u32);
    }

    // $02 and $03 hold the error codes of the official and unofficial sections
    let result_02 = bus.read(0x02);
    let result_03 = bus.read(0x03);
    println!("\n$02 = {:02X}, $03 = {:02X}", result_02, result_03);

    assert_eq!(result_02, 0, "Official opcode test failed");
    assert_eq!(result_03, 0, "Unofficial opcode test failed");
    assert_eq!(mismatches, 0, "Trace diverged from the golden log");
}

/// Compare PC, the register dump and the CYC value
///
/// The disassembly column is skipped (the golden log annotates operands with
/// memory values) and so are PPU dot positions.
fn compare_trace_lines(actual: &str, expected: &str) -> bool {
    fn registers(line: &str) -> Option<&str> {
        let start = line.find("A:")?;
        let end = line.find("SP:")? + 5;
        line.get(start..end)
    }

    fn cycles(line: &str) -> Option<&str> {
        line.split("CYC:").nth(1).map(str::trim)
    }

    actual.get(..4) == expected.get(..4)
        && registers(actual) == registers(expected)
        && cycles(actual) == cycles(expected)
}

#[test]
fn nestest_quick_smoke_test() {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();

    // LDA #$42, STA $00, BRK in RAM
    bus.write(0x0200, 0xA9);
    bus.write(0x0201, 0x42);
    bus.write(0x0202, 0x85);
    bus.write(0x0203, 0x00);
    bus.write(0x0204, 0x00);

    cpu.pc = 0x0200;

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x0202);

    cpu.step(&mut bus);
    assert_eq!(bus.read(0x00), 0x42);
    assert_eq!(cpu.pc, 0x0204);
}

#[test]
fn trace_lines_compare_registers_and_cycles() {
    let golden = "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7";
    let ours = "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0,  0 CYC:7";
    assert!(compare_trace_lines(ours, golden));
    assert!(!compare_trace_lines(&ours.replace("CYC:7", "CYC:8"), golden));
    assert!(!compare_trace_lines(&ours.replace("A:00", "A:01"), golden));

    let annotated = "C72A  A5 00     LDA $00 = 00                    A:00 X:00 Y:00 P:24 SP:FB PPU:  0, 21 CYC:7";
    let plain = "C72A  A5 00     LDA $00                         A:00 X:00 Y:00 P:24 SP:FB PPU:  0,  0 CYC:7";
    assert!(compare_trace_lines(plain, annotated));
}
