use filament_core::cpu::i8080::I8080;

mod common;
use common::TestBus;

fn fresh() -> (I8080, TestBus) {
    let mut cpu = I8080::new();
    cpu.sp = 0x8000;
    (cpu, TestBus::new())
}

#[test]
fn test_irq_ignored_with_inte_clear() {
    let (mut cpu, mut bus) = fresh();
    bus.ints.irq = true;
    bus.ints.irq_vector = 0xFF;
    bus.load(0, &[0x00]);

    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 4);
    assert_eq!(cpu.pc, 1);
    assert_eq!(bus.irq_acks, 0);
}

#[test]
fn test_irq_executes_delivered_rst() {
    let (mut cpu, mut bus) = fresh();
    cpu.inte = true;
    cpu.pc = 0x0100;
    bus.ints.irq = true;
    bus.ints.irq_vector = 0xFF; // RST 7

    let cycles = cpu.step(&mut bus);

    assert_eq!(cycles, 11);
    assert_eq!(cpu.pc, 0x0038);
    assert!(!cpu.inte); // acceptance disables interrupts
    assert_eq!(bus.irq_acks, 1);
    assert_eq!(bus.memory[0x7FFE], 0x00);
    assert_eq!(bus.memory[0x7FFF], 0x01);
}

#[test]
fn test_irq_vector_selects_rst_address() {
    for n in 0..8u8 {
        let (mut cpu, mut bus) = fresh();
        cpu.inte = true;
        bus.ints.irq = true;
        bus.ints.irq_vector = 0xC7 | (n << 3);

        cpu.step(&mut bus);

        assert_eq!(cpu.pc, (n as u16) * 8, "RST {n}");
    }
}

#[test]
fn test_ei_defers_by_one_instruction() {
    let (mut cpu, mut bus) = fresh();
    bus.ints.irq = true;
    bus.ints.irq_vector = 0xFF;
    bus.load(0, &[0xFB, 0x00, 0x00]); // EI; NOP; NOP

    cpu.step(&mut bus); // EI
    assert!(cpu.inte);

    let cycles = cpu.step(&mut bus); // protected instruction
    assert_eq!(cycles, 4);
    assert_eq!(cpu.pc, 2);

    let cycles = cpu.step(&mut bus); // IRQ lands now
    assert_eq!(cycles, 11);
    assert_eq!(cpu.pc, 0x0038);
}

#[test]
fn test_hlt_wakes_on_irq_and_returns_to_hlt() {
    let (mut cpu, mut bus) = fresh();
    cpu.inte = true;
    cpu.pc = 0x0100;
    bus.load(0x0100, &[0x76]); // HLT
    bus.load(0x0038, &[0xC9]); // handler: RET

    cpu.step(&mut bus);
    assert!(cpu.halted);

    bus.ints.irq = true;
    bus.ints.irq_vector = 0xFF;
    cpu.step(&mut bus);
    assert!(!cpu.halted);
    assert_eq!(cpu.pc, 0x0038);
    // Pushed address is the HLT itself
    assert_eq!(bus.memory[0x7FFE], 0x00);
    assert_eq!(bus.memory[0x7FFF], 0x01);

    bus.ints.irq = false;
    cpu.step(&mut bus); // RET to the HLT
    assert_eq!(cpu.pc, 0x0100);

    cpu.step(&mut bus);
    assert!(cpu.halted);
}

#[test]
fn test_di_blocks_immediately() {
    let (mut cpu, mut bus) = fresh();
    cpu.inte = true;
    bus.ints.irq = false;
    bus.load(0, &[0xF3, 0x00]); // DI; NOP

    cpu.step(&mut bus);
    assert!(!cpu.inte);

    bus.ints.irq = true;
    let cycles = cpu.step(&mut bus);
    assert_eq!(cycles, 4); // NOP, no interrupt
}
