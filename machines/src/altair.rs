use filament_core::core::bus::InterruptState;
use filament_core::core::machine::{InputButton, Machine};
use filament_core::core::software::SoftwareImage;
use filament_core::core::Bus;
use filament_core::cpu::state::I8080State;
use filament_core::cpu::{Cpu, CpuStateTrait, i8080::I8080};
use filament_core::device::front_panel::FrontPanel;
use filament_core::device::serial::Serial2Sio;

// ---------------------------------------------------------------------------
// I/O map
// ---------------------------------------------------------------------------
// Port 0x10  serial status (read) / control (write, discarded)
// Port 0x11  serial data
// Port 0xFF  sense switches (reads 0x00)
//
// Memory is a flat 64 KiB of RAM; programs arrive through the front panel
// or a software image.

const SERIAL_STATUS_PORT: u8 = 0x10;
const SERIAL_DATA_PORT: u8 = 0x11;
const SENSE_PORT: u8 = 0xFF;

/// CPU clock: 2 MHz.
pub const CPU_CLOCK_HZ: u64 = 2_000_000;

const INPUT_MAP: &[InputButton] = &[
    InputButton { id: 0x0D, name: "RETURN" },
];

/// Bus side of the machine: flat RAM plus the serial console.
pub struct AltairBus {
    pub(crate) ram: Box<[u8; 0x10000]>,
    pub serial: Serial2Sio,
}

impl AltairBus {
    fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            serial: Serial2Sio::new(),
        }
    }
}

impl Bus for AltairBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.ram[addr as usize] = data;
    }

    fn io_read(&mut self, addr: u16) -> u8 {
        match (addr & 0xFF) as u8 {
            SERIAL_STATUS_PORT => self.serial.status(),
            SERIAL_DATA_PORT => self.serial.read_data(),
            SENSE_PORT => 0x00, // sense switches, all open
            _ => 0xFF,
        }
    }

    fn io_write(&mut self, addr: u16, data: u8) {
        match (addr & 0xFF) as u8 {
            SERIAL_STATUS_PORT => self.serial.write_control(data),
            SERIAL_DATA_PORT => self.serial.write_data(data),
            _ => {}
        }
    }

    fn check_interrupts(&self) -> InterruptState {
        // Nothing raises interrupts; the stock software polls
        InterruptState::default()
    }
}

/// Altair 8800 class machine: 8080 @ 2 MHz, front panel, 6850-style
/// serial console.
pub struct AltairSystem {
    pub cpu: I8080,
    pub bus: AltairBus,
    pub panel: FrontPanel,
}

impl AltairSystem {
    pub fn new() -> Self {
        let mut system = Self {
            cpu: I8080::new(),
            bus: AltairBus::new(),
            panel: FrontPanel::new(),
        };
        system.reset();
        system
    }

    // --- Front panel operations ---

    pub fn examine(&mut self) {
        self.panel.examine(&mut self.cpu, &self.bus.ram);
    }

    pub fn examine_next(&mut self) {
        self.panel.examine_next(&mut self.cpu, &self.bus.ram);
    }

    pub fn deposit(&mut self) {
        self.panel.deposit(&self.cpu, &mut self.bus.ram);
    }

    pub fn deposit_next(&mut self) {
        self.panel.deposit_next(&mut self.cpu, &mut self.bus.ram);
    }

    /// RUN: release the CPU; `run()` will execute while the latch holds.
    pub fn run_switch(&mut self) {
        self.panel.run(&mut self.cpu);
    }

    /// STOP: latch the CPU stopped.
    pub fn stop_switch(&mut self) {
        self.panel.stop(&self.cpu, &self.bus.ram);
    }

    /// SINGLE STEP: execute exactly one instruction, stopped.
    pub fn single_step(&mut self) {
        self.panel.running = false;
        self.cpu.halted = false;
        self.cpu.step(&mut self.bus);
        self.panel.update_leds(&self.cpu, &self.bus.ram);
    }

    /// Panel RESET: stop and reset the CPU; memory is preserved.
    pub fn reset_switch(&mut self) {
        self.panel.running = false;
        self.cpu.reset(&mut self.bus);
        self.panel.update_leds(&self.cpu, &self.bus.ram);
    }

    /// Queue a console character.
    pub fn serial_in(&mut self, byte: u8) {
        self.bus.serial.queue_input(byte);
    }

    pub fn get_cpu_state(&self) -> I8080State {
        self.cpu.snapshot()
    }

    /// Direct memory read, for panel-style inspection by hosts/tests.
    pub fn peek(&self, addr: u16) -> u8 {
        self.bus.ram[addr as usize]
    }
}

impl Default for AltairSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for AltairSystem {
    fn reset(&mut self) {
        *self.bus.ram = [0; 0x10000];
        self.bus.serial.reset();
        self.cpu.reset(&mut self.bus);
        self.panel.reset();
        self.panel.update_leds(&self.cpu, &self.bus.ram);
    }

    /// Runs only while the panel RUN latch is set; returns 0 otherwise.
    /// A HLT drops the latch and refreshes the lights.
    fn run(&mut self, max_cycles: u64) -> u64 {
        if !self.panel.running {
            return 0;
        }
        let mut consumed = 0u64;
        while consumed < max_cycles {
            consumed += self.cpu.step(&mut self.bus) as u64;
            if self.cpu.halted {
                self.panel.running = false;
                self.panel.update_leds(&self.cpu, &self.bus.ram);
                break;
            }
        }
        consumed
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        // The console is the only keyboard: keystrokes become serial input
        if pressed {
            self.serial_in(key);
        }
    }

    fn serial_input(&mut self, byte: u8) {
        self.serial_in(byte);
    }

    fn take_serial_output(&mut self) -> Vec<u8> {
        self.bus.serial.take_output()
    }

    fn input_map(&self) -> &[InputButton] {
        INPUT_MAP
    }

    fn load_software(&mut self, image: &SoftwareImage) {
        if image.is_empty() {
            return;
        }
        for region in &image.regions {
            for (i, &byte) in region.bytes.iter().enumerate() {
                let addr = region.start.wrapping_add(i as u16);
                self.bus.ram[addr as usize] = byte;
            }
        }
        // Flat RAM: nothing overlays ROM, so enter at the entry point
        self.cpu.pc = image.entry_point;
        self.panel.update_leds(&self.cpu, &self.bus.ram);
    }

    /// Panel snapshot: address/data LEDs in binary plus the status row.
    fn display_lines(&self) -> Vec<String> {
        let status = &self.panel.status_leds;
        let mut flags = String::new();
        for (bit, name) in [
            (filament_core::device::front_panel::STATUS_INTE, "INTE"),
            (filament_core::device::front_panel::STATUS_MEMR, "MEMR"),
            (filament_core::device::front_panel::STATUS_INP, "INP"),
            (filament_core::device::front_panel::STATUS_M1, "M1"),
            (filament_core::device::front_panel::STATUS_OUT, "OUT"),
            (filament_core::device::front_panel::STATUS_HLTA, "HLTA"),
            (filament_core::device::front_panel::STATUS_STACK, "STACK"),
            (filament_core::device::front_panel::STATUS_WO, "WO"),
            (filament_core::device::front_panel::STATUS_INT, "INT"),
        ] {
            if status & bit != 0 {
                if !flags.is_empty() {
                    flags.push(' ');
                }
                flags.push_str(name);
            }
        }
        vec![
            format!("ADDR {:016b}  DATA {:08b}", self.panel.address_leds, self.panel.data_leds),
            format!("STATUS {}  {}", flags, if self.panel.running { "RUN" } else { "STOP" }),
        ]
    }

    fn is_halted(&self) -> bool {
        self.cpu.halted
    }

    fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }
}

fn create_machine() -> Box<dyn Machine> {
    Box::new(AltairSystem::new())
}

inventory::submit! {
    crate::registry::MachineEntry::new(
        "altair",
        "8080 @ 2 MHz, front panel, 2SIO serial console",
        create_machine,
    )
}
