use filament_core::cpu::z80::Z80;

mod common;
use common::TestBus;

const C: u8 = 0x01;
const N: u8 = 0x02;
const PV: u8 = 0x04;
const Z: u8 = 0x40;

fn fresh() -> (Z80, TestBus) {
    let mut cpu = Z80::new();
    cpu.pc = 0;
    cpu.f = 0;
    (cpu, TestBus::new())
}

#[test]
fn test_ldi_moves_one_byte() {
    let (mut cpu, mut bus) = fresh();
    cpu.set_hl(0x1000);
    cpu.set_de(0x2000);
    cpu.set_bc(0x0002);
    bus.memory[0x1000] = 0xAA;
    bus.load(0, &[0xED, 0xA0]); // LDI

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(bus.memory[0x2000], 0xAA);
    assert_eq!(cpu.get_hl(), 0x1001);
    assert_eq!(cpu.get_de(), 0x2001);
    assert_eq!(cpu.get_bc(), 0x0001);
    assert_ne!(cpu.f & PV, 0); // BC still nonzero
    assert_eq!(cpu.f & N, 0);
}

#[test]
fn test_ldd_moves_backwards() {
    let (mut cpu, mut bus) = fresh();
    cpu.set_hl(0x1001);
    cpu.set_de(0x2001);
    cpu.set_bc(0x0001);
    bus.memory[0x1001] = 0xBB;
    bus.load(0, &[0xED, 0xA8]); // LDD

    cpu.step(&mut bus);

    assert_eq!(bus.memory[0x2001], 0xBB);
    assert_eq!(cpu.get_hl(), 0x1000);
    assert_eq!(cpu.get_de(), 0x2000);
    assert_eq!(cpu.f & PV, 0); // BC hit zero
}

#[test]
fn test_ldir_copies_block_with_repeat_cycles() {
    let (mut cpu, mut bus) = fresh();
    cpu.set_hl(0x1000);
    cpu.set_de(0x2000);
    cpu.set_bc(0x0003);
    bus.load(0x1000, b"ABC");
    bus.load(0, &[0xED, 0xB0]); // LDIR

    assert_eq!(cpu.step(&mut bus), 21); // repeats
    assert_eq!(cpu.pc, 0); // backed up over the prefix
    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.step(&mut bus), 16); // final transfer
    assert_eq!(cpu.pc, 2);

    assert_eq!(&bus.memory[0x2000..0x2003], b"ABC");
    assert_eq!(cpu.get_bc(), 0);
}

#[test]
fn test_cpi_compares_and_steps() {
    let (mut cpu, mut bus) = fresh();
    cpu.a = 0x42;
    cpu.set_hl(0x1000);
    cpu.set_bc(0x0002);
    bus.memory[0x1000] = 0x42;
    bus.load(0, &[0xED, 0xA1]); // CPI

    assert_eq!(cpu.step(&mut bus), 16);
    assert_ne!(cpu.f & Z, 0); // matched
    assert_ne!(cpu.f & N, 0);
    assert_ne!(cpu.f & PV, 0); // BC nonzero
    assert_eq!(cpu.get_hl(), 0x1001);
    assert_eq!(cpu.get_bc(), 0x0001);
}

#[test]
fn test_cpir_stops_on_match() {
    let (mut cpu, mut bus) = fresh();
    cpu.a = b'C';
    cpu.set_hl(0x1000);
    cpu.set_bc(0x0010);
    bus.load(0x1000, b"ABCD");
    bus.load(0, &[0xED, 0xB1]); // CPIR

    cpu.step(&mut bus); // A — no match, repeat
    cpu.step(&mut bus); // B — no match, repeat
    let cycles = cpu.step(&mut bus); // C — match, stop

    assert_eq!(cycles, 16);
    assert_ne!(cpu.f & Z, 0);
    assert_eq!(cpu.get_hl(), 0x1003); // one past the match
    assert_eq!(cpu.pc, 2);
}

#[test]
fn test_cpi_preserves_carry() {
    let (mut cpu, mut bus) = fresh();
    cpu.a = 0x00;
    cpu.f = C;
    cpu.set_hl(0x1000);
    cpu.set_bc(0x0001);
    bus.memory[0x1000] = 0x01;
    bus.load(0, &[0xED, 0xA1]);

    cpu.step(&mut bus);

    assert_ne!(cpu.f & C, 0);
}

#[test]
fn test_ini_reads_port_into_memory() {
    let (mut cpu, mut bus) = fresh();
    cpu.set_bc(0x0210); // B=2 transfers, port 0x10
    cpu.set_hl(0x3000);
    bus.io[0x10] = 0x77;
    bus.load(0, &[0xED, 0xA2]); // INI

    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(bus.memory[0x3000], 0x77);
    assert_eq!(cpu.get_hl(), 0x3001);
    assert_eq!(cpu.b, 1);
    assert_eq!(cpu.f & Z, 0);
    assert_ne!(cpu.f & N, 0);
}

#[test]
fn test_otir_drains_memory_to_port() {
    let (mut cpu, mut bus) = fresh();
    cpu.set_bc(0x0220); // B=2, port 0x20
    cpu.set_hl(0x3000);
    bus.load(0x3000, &[0x11, 0x22]);
    bus.load(0, &[0xED, 0xB3]); // OTIR

    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.step(&mut bus), 16);

    assert_eq!(bus.io_writes, vec![(0x20, 0x11), (0x20, 0x22)]);
    assert_eq!(cpu.b, 0);
    assert_ne!(cpu.f & Z, 0);
}

#[test]
fn test_rrd_rotates_nibbles_right() {
    let (mut cpu, mut bus) = fresh();
    cpu.a = 0x12;
    cpu.set_hl(0x1000);
    bus.memory[0x1000] = 0x34;
    bus.load(0, &[0xED, 0x67]); // RRD

    assert_eq!(cpu.step(&mut bus), 18);
    assert_eq!(cpu.a, 0x14);
    assert_eq!(bus.memory[0x1000], 0x23);
}

#[test]
fn test_rld_rotates_nibbles_left() {
    let (mut cpu, mut bus) = fresh();
    cpu.a = 0x12;
    cpu.set_hl(0x1000);
    bus.memory[0x1000] = 0x34;
    bus.load(0, &[0xED, 0x6F]); // RLD

    cpu.step(&mut bus);

    assert_eq!(cpu.a, 0x13);
    assert_eq!(bus.memory[0x1000], 0x42);
}
