use filament_core::cpu::m6502::M6502;

mod common;
use common::TestBus;

#[test]
fn test_pha_pla_round_trip() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    cpu.a = 0x42;
    bus.load(0, &[0x48, 0xA9, 0x00, 0x68]); // PHA, LDA #0, PLA

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 3);
    assert_eq!(bus.memory[0x01FD], 0x42);
    assert_eq!(cpu.sp, 0xFC);

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x00);

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 4);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn test_php_sets_break_and_unused_in_pushed_copy() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    cpu.p = 0x25; // C + I + U
    bus.load(0, &[0x08]); // PHP

    cpu.step(&mut bus);

    assert_eq!(bus.memory[0x01FD], 0x35); // B forced on in the copy
    assert_eq!(cpu.p, 0x25); // live P unchanged
}

#[test]
fn test_plp_ignores_break_bit() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.memory[0x01FE] = 0xDF; // everything set, including B
    cpu.sp = 0xFD;
    bus.load(0, &[0x28]); // PLP

    cpu.step(&mut bus);

    assert_eq!(cpu.p & 0x10, 0); // B not live
    assert_ne!(cpu.p & 0x20, 0); // U always reads 1
    assert_ne!(cpu.p & 0x01, 0);
}

#[test]
fn test_stack_wraps_within_page_one() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    cpu.sp = 0x00;
    cpu.a = 0x99;
    bus.load(0, &[0x48]); // PHA

    cpu.step(&mut bus);

    assert_eq!(bus.memory[0x0100], 0x99);
    assert_eq!(cpu.sp, 0xFF);
}
