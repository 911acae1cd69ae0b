//! Conformance harness for the 6502 core against SingleStepTests-format
//! JSON case files.
//!
//! Case data is large and externally maintained, so it is not vendored.
//! Drop the `65x02/6502/v1` JSON files under
//! `cpu-validation/test_data/6502/` (`.json` or `.json.gz`) and the
//! harness validates every documented opcode; without the data the test
//! skips with a notice.
//!
//! The core is instruction-stepped, so validation covers the final
//! register file, final memory, and the total cycle count — not the
//! per-T-state bus trace.

use std::io::Read;
use std::path::{Path, PathBuf};

use filament_core::cpu::m6502::M6502;
use filament_cpu_validation::{M6502TestCase, TracingBus};

const DATA_DIR: &str = "test_data/6502";

/// All 151 documented NMOS 6502 opcodes.
#[rustfmt::skip]
const LEGAL_OPCODES: &[u8] = &[
    0x00, 0x01, 0x05, 0x06, 0x08, 0x09, 0x0A, 0x0D, 0x0E,
    0x10, 0x11, 0x15, 0x16, 0x18, 0x19, 0x1D, 0x1E,
    0x20, 0x21, 0x24, 0x25, 0x26, 0x28, 0x29, 0x2A, 0x2C, 0x2D, 0x2E,
    0x30, 0x31, 0x35, 0x36, 0x38, 0x39, 0x3D, 0x3E,
    0x40, 0x41, 0x45, 0x46, 0x48, 0x49, 0x4A, 0x4C, 0x4D, 0x4E,
    0x50, 0x51, 0x55, 0x56, 0x58, 0x59, 0x5D, 0x5E,
    0x60, 0x61, 0x65, 0x66, 0x68, 0x69, 0x6A, 0x6C, 0x6D, 0x6E,
    0x70, 0x71, 0x75, 0x76, 0x78, 0x79, 0x7D, 0x7E,
    0x81, 0x84, 0x85, 0x86, 0x88, 0x8A, 0x8C, 0x8D, 0x8E,
    0x90, 0x91, 0x94, 0x95, 0x96, 0x98, 0x99, 0x9A, 0x9D,
    0xA0, 0xA1, 0xA2, 0xA4, 0xA5, 0xA6, 0xA8, 0xA9, 0xAA, 0xAC, 0xAD, 0xAE,
    0xB0, 0xB1, 0xB4, 0xB5, 0xB6, 0xB8, 0xB9, 0xBA, 0xBC, 0xBD, 0xBE,
    0xC0, 0xC1, 0xC4, 0xC5, 0xC6, 0xC8, 0xC9, 0xCA, 0xCC, 0xCD, 0xCE,
    0xD0, 0xD1, 0xD5, 0xD6, 0xD8, 0xD9, 0xDD, 0xDE,
    0xE0, 0xE1, 0xE4, 0xE5, 0xE6, 0xE8, 0xE9, 0xEA, 0xEC, 0xED, 0xEE,
    0xF0, 0xF1, 0xF5, 0xF6, 0xF8, 0xF9, 0xFD, 0xFE,
];

fn read_cases(dir: &Path, opcode: u8) -> Option<Vec<M6502TestCase>> {
    let plain: PathBuf = dir.join(format!("{opcode:02x}.json"));
    if plain.exists() {
        let json = std::fs::read_to_string(&plain).ok()?;
        return serde_json::from_str(&json).ok();
    }
    let gz: PathBuf = dir.join(format!("{opcode:02x}.json.gz"));
    if gz.exists() {
        let file = std::fs::File::open(&gz).ok()?;
        let mut json = String::new();
        flate2::read::GzDecoder::new(file)
            .read_to_string(&mut json)
            .ok()?;
        return serde_json::from_str(&json).ok();
    }
    None
}

fn run_test_case(tc: &M6502TestCase) {
    let mut cpu = M6502::new();
    let mut bus = TracingBus::new();

    cpu.pc = tc.initial.pc;
    cpu.sp = tc.initial.s;
    cpu.a = tc.initial.a;
    cpu.x = tc.initial.x;
    cpu.y = tc.initial.y;
    cpu.p = tc.initial.p;
    for &(addr, val) in &tc.initial.ram {
        bus.memory[addr as usize] = val;
    }

    let cycles = cpu.step(&mut bus);

    assert_eq!(cpu.pc, tc.final_state.pc, "{}: PC", tc.name);
    assert_eq!(cpu.a, tc.final_state.a, "{}: A", tc.name);
    assert_eq!(cpu.x, tc.final_state.x, "{}: X", tc.name);
    assert_eq!(cpu.y, tc.final_state.y, "{}: Y", tc.name);
    assert_eq!(cpu.sp, tc.final_state.s, "{}: SP", tc.name);
    assert_eq!(cpu.p, tc.final_state.p, "{}: P", tc.name);

    for &(addr, expected) in &tc.final_state.ram {
        assert_eq!(
            bus.memory[addr as usize], expected,
            "{}: RAM[0x{:04X}]",
            tc.name, addr
        );
    }

    assert_eq!(
        cycles as usize,
        tc.cycles.len(),
        "{}: cycle count",
        tc.name
    );
}

#[test]
fn test_all_legal_opcodes() {
    let test_dir = Path::new(DATA_DIR);
    if !test_dir.exists() {
        eprintln!("No SingleStepTests data under {DATA_DIR}; skipping 6502 conformance run");
        return;
    }

    let mut total_tests = 0;
    let mut total_files = 0;

    for &opcode in LEGAL_OPCODES {
        let Some(tests) = read_cases(test_dir, opcode) else {
            eprintln!("Missing case file for opcode 0x{opcode:02X}; skipping");
            continue;
        };
        for tc in &tests {
            run_test_case(tc);
        }
        total_tests += tests.len();
        total_files += 1;
    }

    eprintln!("Validated {total_tests} tests across {total_files} opcode files");
}
