use filament_core::core::bus::InterruptState;
use filament_core::core::Bus;
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with bus-traffic recording ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub cycles: Vec<BusCycle>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            cycles: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState::default()
    }
}

// --- Test-case types (SingleStepTests JSON shape) ---

/// 6502 register + memory snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct M6502CpuState {
    pub pc: u16,
    pub s: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub ram: Vec<(u16, u8)>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct M6502TestCase {
    pub name: String,
    pub initial: M6502CpuState,
    #[serde(rename = "final")]
    pub final_state: M6502CpuState,
    /// Per-cycle (addr, data, "read"/"write") records. Instruction-stepped
    /// cores validate the total count and the read/write subset.
    pub cycles: Vec<(u16, u8, String)>,
}

/// 8080 register + memory snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct I8080CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub h: u8,
    pub l: u8,
    pub ram: Vec<(u16, u8)>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct I8080TestCase {
    pub name: String,
    pub initial: I8080CpuState,
    #[serde(rename = "final")]
    pub final_state: I8080CpuState,
    pub cycles: Vec<(u16, u8, String)>,
}
