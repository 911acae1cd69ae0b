#![allow(dead_code)]

use filament_core::core::{Bus, bus::InterruptState};

/// Minimal bus for testing: flat 64KB read/write memory, scriptable
/// interrupt lines, byte-per-port I/O space.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub io: [u8; 256],
    pub io_writes: Vec<(u8, u8)>,
    pub ints: InterruptState,
    pub irq_acks: u32,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            io: [0; 256],
            io_writes: Vec::new(),
            ints: InterruptState::default(),
            irq_acks: 0,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn io_read(&mut self, addr: u16) -> u8 {
        self.io[(addr & 0xFF) as usize]
    }

    fn io_write(&mut self, addr: u16, data: u8) {
        self.io_writes.push(((addr & 0xFF) as u8, data));
    }

    fn check_interrupts(&self) -> InterruptState {
        self.ints
    }

    fn irq_ack(&mut self) {
        self.irq_acks += 1;
    }
}
