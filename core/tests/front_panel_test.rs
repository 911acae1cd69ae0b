use filament_core::cpu::i8080::I8080;
use filament_core::device::front_panel::{
    FrontPanel, STATUS_HLTA, STATUS_INTE, STATUS_M1, STATUS_MEMR, STATUS_WO,
};

fn fresh() -> (FrontPanel, I8080, Box<[u8; 0x10000]>) {
    (FrontPanel::new(), I8080::new(), Box::new([0; 0x10000]))
}

#[test]
fn test_examine_shows_memory_at_switches() {
    let (mut panel, mut cpu, mut mem) = fresh();
    mem[0x0100] = 0x3E;
    panel.set_address_switches(0x0100);

    panel.examine(&mut cpu, &mem);

    assert_eq!(cpu.pc, 0x0100);
    assert_eq!(panel.address_leds, 0x0100);
    assert_eq!(panel.data_leds, 0x3E);
    assert_ne!(panel.status_leds & (STATUS_MEMR | STATUS_M1 | STATUS_WO), 0);
}

#[test]
fn test_examine_next_walks_memory() {
    let (mut panel, mut cpu, mut mem) = fresh();
    mem[0x0101] = 0x42;
    panel.set_address_switches(0x0100);
    panel.examine(&mut cpu, &mem);

    panel.examine_next(&mut cpu, &mem);

    assert_eq!(cpu.pc, 0x0101);
    assert_eq!(panel.data_leds, 0x42);
}

#[test]
fn test_examine_next_wraps_address_space() {
    let (mut panel, mut cpu, mem) = fresh();
    panel.set_address_switches(0xFFFF);
    panel.examine(&mut cpu, &mem);

    panel.examine_next(&mut cpu, &mem);

    assert_eq!(cpu.pc, 0x0000);
}

#[test]
fn test_deposit_and_deposit_next() {
    let (mut panel, mut cpu, mut mem) = fresh();
    panel.set_address_switches(0x0000);
    panel.examine(&mut cpu, &mem);

    panel.set_data_switches(0x3E);
    panel.deposit(&cpu, &mut mem);
    panel.set_data_switches(0x42);
    panel.deposit_next(&mut cpu, &mut mem);
    panel.set_data_switches(0x76);
    panel.deposit_next(&mut cpu, &mut mem);

    assert_eq!(mem[0], 0x3E);
    assert_eq!(mem[1], 0x42);
    assert_eq!(mem[2], 0x76);
    assert_eq!(panel.data_leds, 0x76);
}

#[test]
fn test_switch_bits_and_bounds() {
    let (mut panel, _, _) = fresh();

    panel.set_address_switch(0, true);
    panel.set_address_switch(15, true);
    assert_eq!(panel.address_switches, 0x8001);

    panel.toggle_address_switch(0);
    assert_eq!(panel.address_switches, 0x8000);

    panel.set_data_switch(7, true);
    assert_eq!(panel.data_switches, 0x80);

    // Out-of-range indices are no-ops
    panel.set_address_switch(16, true);
    panel.toggle_address_switch(200);
    panel.set_data_switch(8, true);
    panel.toggle_data_switch(8);
    assert_eq!(panel.address_switches, 0x8000);
    assert_eq!(panel.data_switches, 0x80);
}

#[test]
fn test_switches_work_while_running() {
    let (mut panel, mut cpu, _) = fresh();
    panel.run(&mut cpu);

    panel.set_address_switches(0x1234);
    panel.set_data_switches(0x56);

    assert!(panel.running);
    assert_eq!(panel.address_switches, 0x1234);
    assert_eq!(panel.data_switches, 0x56);
}

#[test]
fn test_run_clears_halt_latch() {
    let (mut panel, mut cpu, _) = fresh();
    cpu.halted = true;

    panel.run(&mut cpu);

    assert!(panel.running);
    assert!(!cpu.halted);
}

#[test]
fn test_stop_refreshes_leds() {
    let (mut panel, mut cpu, mut mem) = fresh();
    mem[0x0200] = 0x99;
    cpu.pc = 0x0200;
    panel.run(&mut cpu);

    panel.stop(&cpu, &mem);

    assert!(!panel.running);
    assert_eq!(panel.address_leds, 0x0200);
    assert_eq!(panel.data_leds, 0x99);
}

#[test]
fn test_status_leds_reflect_cpu_state() {
    let (mut panel, mut cpu, mem) = fresh();

    cpu.halted = true;
    cpu.inte = true;
    panel.update_leds(&cpu, &mem);

    assert_ne!(panel.status_leds & STATUS_HLTA, 0);
    assert_ne!(panel.status_leds & STATUS_INTE, 0);

    cpu.halted = false;
    cpu.inte = false;
    panel.update_leds(&cpu, &mem);

    assert_eq!(panel.status_leds & STATUS_HLTA, 0);
    assert_eq!(panel.status_leds & STATUS_INTE, 0);
}

#[test]
fn test_reset_preserves_switches() {
    let (mut panel, mut cpu, mem) = fresh();
    panel.set_address_switches(0x1234);
    panel.run(&mut cpu);
    panel.update_leds(&cpu, &mem);

    panel.reset();

    assert!(!panel.running);
    assert_eq!(panel.address_leds, 0);
    assert_eq!(panel.address_switches, 0x1234); // operator's switches stay
}
