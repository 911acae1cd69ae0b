use filament_core::cpu::z80::Z80;

mod common;
use common::TestBus;

const C: u8 = 0x01;
const Z: u8 = 0x40;

fn fresh() -> (Z80, TestBus) {
    let mut cpu = Z80::new();
    cpu.pc = 0;
    cpu.f = 0;
    cpu.sp = 0x8000;
    (cpu, TestBus::new())
}

#[test]
fn test_ld_ix_nn() {
    let (mut cpu, mut bus) = fresh();
    bus.load(0, &[0xDD, 0x21, 0x34, 0x12]); // LD IX,0x1234

    assert_eq!(cpu.step(&mut bus), 14);
    assert_eq!(cpu.ix, 0x1234);
    assert_ne!(cpu.get_hl(), 0x1234); // HL untouched
}

#[test]
fn test_ld_a_ix_displacement() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    bus.memory[0x1005] = 0x42;
    bus.load(0, &[0xDD, 0x7E, 0x05]); // LD A,(IX+5)

    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 3);
}

#[test]
fn test_negative_displacement() {
    let (mut cpu, mut bus) = fresh();
    cpu.iy = 0x1000;
    bus.memory[0x0FFE] = 0x99;
    bus.load(0, &[0xFD, 0x7E, 0xFE]); // LD A,(IY-2)

    cpu.step(&mut bus);

    assert_eq!(cpu.a, 0x99);
}

#[test]
fn test_ld_ix_d_n() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x2000;
    bus.load(0, &[0xDD, 0x36, 0x03, 0x55]); // LD (IX+3),0x55

    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(bus.memory[0x2003], 0x55);
}

#[test]
fn test_ld_h_from_indexed_memory_uses_real_h() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    cpu.set_hl(0x0000);
    bus.memory[0x1001] = 0x77;
    bus.load(0, &[0xDD, 0x66, 0x01]); // LD H,(IX+1)

    cpu.step(&mut bus);

    assert_eq!(cpu.h, 0x77); // real H, not IXH
    assert_eq!(cpu.ix, 0x1000);
}

#[test]
fn test_ixh_ixl_register_access() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x12FF;
    bus.load(0, &[0xDD, 0x24, 0xDD, 0x2C, 0xDD, 0x7C]); // INC IXH; INC IXL; LD A,IXH

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.ix, 0x13FF);

    cpu.step(&mut bus);
    assert_eq!(cpu.ix, 0x1300); // low byte wrapped

    cpu.step(&mut bus);
    assert_eq!(cpu.a, 0x13);
}

#[test]
fn test_alu_on_indexed_memory() {
    let (mut cpu, mut bus) = fresh();
    cpu.a = 0x10;
    cpu.ix = 0x1000;
    bus.memory[0x1002] = 0x05;
    bus.load(0, &[0xDD, 0x86, 0x02]); // ADD A,(IX+2)

    assert_eq!(cpu.step(&mut bus), 19);
    assert_eq!(cpu.a, 0x15);
}

#[test]
fn test_inc_indexed_memory() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    bus.memory[0x1004] = 0xFF;
    bus.load(0, &[0xDD, 0x34, 0x04]); // INC (IX+4)

    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.memory[0x1004], 0x00);
    assert_ne!(cpu.f & Z, 0);
}

#[test]
fn test_add_ix_rr() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    cpu.set_bc(0x0234);
    bus.load(0, &[0xDD, 0x09]); // ADD IX,BC

    assert_eq!(cpu.step(&mut bus), 15);
    assert_eq!(cpu.ix, 0x1234);
}

#[test]
fn test_push_pop_ix() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0xBEEF;
    bus.load(0, &[0xDD, 0xE5, 0xFD, 0xE1]); // PUSH IX; POP IY

    assert_eq!(cpu.step(&mut bus), 15);
    assert_eq!(cpu.step(&mut bus), 14);
    assert_eq!(cpu.iy, 0xBEEF);
}

#[test]
fn test_jp_ix() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x4000;
    bus.load(0, &[0xDD, 0xE9]); // JP (IX)

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.pc, 0x4000);
}

#[test]
fn test_indexed_cb_bit() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    bus.memory[0x1003] = 0x01;
    bus.load(0, &[0xDD, 0xCB, 0x03, 0x46]); // BIT 0,(IX+3)

    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(cpu.f & Z, 0); // bit set
    assert_eq!(cpu.pc, 4);
}

#[test]
fn test_indexed_cb_set_and_register_copy() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    bus.memory[0x1002] = 0x00;
    bus.load(0, &[0xDD, 0xCB, 0x02, 0xC7]); // SET 0,(IX+2),A (undocumented copy)

    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.memory[0x1002], 0x01);
    assert_eq!(cpu.a, 0x01); // result copied into A
}

#[test]
fn test_indexed_cb_rotate() {
    let (mut cpu, mut bus) = fresh();
    cpu.iy = 0x2000;
    bus.memory[0x2001] = 0x81;
    bus.load(0, &[0xFD, 0xCB, 0x01, 0x06]); // RLC (IY+1)

    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(bus.memory[0x2001], 0x03);
    assert_ne!(cpu.f & C, 0);
}

#[test]
fn test_repeated_prefix_last_wins() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1000;
    cpu.iy = 0x2000;
    bus.memory[0x2001] = 0x42;
    bus.load(0, &[0xDD, 0xFD, 0x7E, 0x01]); // DD FD -> IY applies

    let cycles = cpu.step(&mut bus);

    assert_eq!(cpu.a, 0x42);
    assert_eq!(cycles, 23); // extra prefix costs 4 more
}

#[test]
fn test_ex_sp_ix() {
    let (mut cpu, mut bus) = fresh();
    cpu.ix = 0x1234;
    cpu.sp = 0x7000;
    bus.memory[0x7000] = 0x78;
    bus.memory[0x7001] = 0x56;
    bus.load(0, &[0xDD, 0xE3]); // EX (SP),IX

    assert_eq!(cpu.step(&mut bus), 23);
    assert_eq!(cpu.ix, 0x5678);
    assert_eq!(bus.memory[0x7000], 0x34);
}
