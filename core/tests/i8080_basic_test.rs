use filament_core::cpu::i8080::I8080;

mod common;
use common::TestBus;

#[test]
fn test_mvi_and_mov() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x3E, 0x42, 0x47]); // MVI A,0x42; MOV B,A

    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(cpu.a, 0x42);

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.b, 0x42);
}

#[test]
fn test_mov_memory_forms() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0x1000);
    cpu.b = 0x55;
    bus.load(0, &[0x70, 0x7E]); // MOV M,B; MOV A,M

    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(bus.memory[0x1000], 0x55);

    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(cpu.a, 0x55);
}

#[test]
fn test_mvi_m() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0x2000);
    bus.load(0, &[0x36, 0x99]); // MVI M,0x99

    assert_eq!(cpu.step(&mut bus), 10);
    assert_eq!(bus.memory[0x2000], 0x99);
}

#[test]
fn test_lxi_all_pairs() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(
        0,
        &[
            0x01, 0x11, 0x11, // LXI B
            0x11, 0x22, 0x22, // LXI D
            0x21, 0x33, 0x33, // LXI H
            0x31, 0x44, 0x44, // LXI SP
        ],
    );

    assert_eq!(cpu.step(&mut bus), 10);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(cpu.get_bc(), 0x1111);
    assert_eq!(cpu.get_de(), 0x2222);
    assert_eq!(cpu.get_hl(), 0x3333);
    assert_eq!(cpu.sp, 0x4444);
}

#[test]
fn test_sta_lda() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.a = 0x77;
    bus.load(0, &[0x32, 0x00, 0x50, 0x3E, 0x00, 0x3A, 0x00, 0x50]);
    // STA 0x5000; MVI A,0; LDA 0x5000

    assert_eq!(cpu.step(&mut bus), 13);
    assert_eq!(bus.memory[0x5000], 0x77);

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0);

    assert_eq!(cpu.step(&mut bus), 13);
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn test_ldax_stax() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.a = 0x12;
    cpu.set_bc(0x3000);
    cpu.set_de(0x3001);
    bus.load(0, &[0x02, 0x12, 0x0A]); // STAX B; STAX D; LDAX B

    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(bus.memory[0x3000], 0x12);

    cpu.step(&mut bus);
    assert_eq!(bus.memory[0x3001], 0x12);

    cpu.a = 0;
    assert_eq!(cpu.step(&mut bus), 7);
    assert_eq!(cpu.a, 0x12);
}

#[test]
fn test_shld_lhld() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0xBEEF);
    bus.load(0, &[0x22, 0x00, 0x40, 0x21, 0x00, 0x00, 0x2A, 0x00, 0x40]);
    // SHLD 0x4000; LXI H,0; LHLD 0x4000

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(bus.memory[0x4000], 0xEF);
    assert_eq!(bus.memory[0x4001], 0xBE);

    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.get_hl(), 0xBEEF);
}

#[test]
fn test_xchg() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_de(0x1234);
    cpu.set_hl(0x5678);
    bus.load(0, &[0xEB]);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.get_de(), 0x5678);
    assert_eq!(cpu.get_hl(), 0x1234);
}

#[test]
fn test_sphl_pchl() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0x9000);
    bus.load(0, &[0xF9]); // SPHL

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.sp, 0x9000);

    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0x4000);
    bus.load(0, &[0xE9]); // PCHL
    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.pc, 0x4000);
}

#[test]
fn test_hlt_freezes_pc() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x76]);

    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 7);
    assert!(cpu.halted);
    assert_eq!(cpu.pc, 0); // PC stays on the HLT

    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 4);
    assert!(cpu.halted);
}

#[test]
fn test_unknown_opcode_is_a_noop() {
    let mut cpu = I8080::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x08]); // undocumented

    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 4);
    assert_eq!(cpu.pc, 1);
    assert_eq!(cpu.unknown_opcodes, 1);
}

#[test]
fn test_flag_register_constant_bits() {
    let mut cpu = I8080::new();
    cpu.set_f(0xFF);
    assert_eq!(cpu.f, 0xD7); // bits 3 and 5 stuck low, bit 1 stuck high

    cpu.set_f(0x00);
    assert_eq!(cpu.f, 0x02);
}
