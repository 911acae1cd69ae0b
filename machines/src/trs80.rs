use filament_core::core::bus::InterruptState;
use filament_core::core::machine::{InputButton, Machine};
use filament_core::core::software::SoftwareImage;
use filament_core::core::Bus;
use filament_core::cpu::state::Z80State;
use filament_core::cpu::{Cpu, CpuStateTrait, z80::Z80};
use filament_core::device::keyboard_matrix::KeyboardMatrix;
use filament_core::device::video_ram::VideoRam;

// ---------------------------------------------------------------------------
// Memory map
// ---------------------------------------------------------------------------
// 0x0000-0x2FFF  ROM (12 KiB)
// 0x3000-0x37FF  unmapped (reads 0xFF, writes ignored)
// 0x3800-0x3BFF  keyboard matrix (row-select decode of the low address byte)
// 0x3C00-0x3FFF  video RAM (1 KiB, 64×16)
// 0x4000-0xFFFF  user RAM

const ROM_SIZE: usize = 0x3000;
const KEYBOARD_BASE: u16 = 0x3800;
const KEYBOARD_END: u16 = 0x3BFF;
const VIDEO_BASE: u16 = 0x3C00;
const VIDEO_END: u16 = 0x3FFF;
const RAM_BASE: u16 = 0x4000;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
// CPU clock: 1.774 MHz. The heartbeat interrupt runs at 40 Hz, i.e. one
// interrupt every 44,350 CPU cycles, acknowledged by reading port 0xFF.

pub const CPU_CLOCK_HZ: u64 = 1_774_000;
pub const INTERRUPT_PERIOD: u64 = CPU_CLOCK_HZ / 40; // 44,350 cycles

/// Timer status/acknowledge port.
const TIMER_PORT: u8 = 0xFF;

/// Built-in stub boot ROM: prints READY to the top of the screen, then
/// spins scanning the whole keyboard matrix, echoing any scan code into
/// the seventh screen cell. Stands in for the 12 KiB system ROM, which is
/// not distributable.
pub fn stub_rom() -> Vec<u8> {
    #[rustfmt::skip]
    const BOOT: &[u8] = &[
        0xF3,             // 0000  DI
        0x31, 0xFF, 0xFF, // 0001  LD SP,0xFFFF
        0x21, 0x40, 0x00, // 0004  LD HL,MSG
        0x11, 0x00, 0x3C, // 0007  LD DE,0x3C00
        0x01, 0x05, 0x00, // 000A  LD BC,5
        0xED, 0xB0,       // 000D  LDIR
        0x3A, 0xFF, 0x38, // 000F  POLL: LD A,(0x38FF)  ; scan every row
        0xB7,             // 0012  OR A
        0x28, 0xFA,       // 0013  JR Z,POLL
        0x32, 0x06, 0x3C, // 0015  LD (0x3C06),A        ; echo the scan code
        0x18, 0xF5,       // 0018  JR POLL
    ];
    let mut rom = vec![0u8; 0x60];
    rom[..BOOT.len()].copy_from_slice(BOOT);
    rom[0x40..0x45].copy_from_slice(b"READY");
    rom
}

// ---------------------------------------------------------------------------
// Keyboard matrix layout (slot = row*8 + bit)
// ---------------------------------------------------------------------------

pub const KEY_ENTER: u8 = 6 * 8;
pub const KEY_CLEAR: u8 = 6 * 8 + 1;
pub const KEY_BREAK: u8 = 6 * 8 + 2;
pub const KEY_UP: u8 = 6 * 8 + 3;
pub const KEY_DOWN: u8 = 6 * 8 + 4;
pub const KEY_LEFT: u8 = 6 * 8 + 5;
pub const KEY_RIGHT: u8 = 6 * 8 + 6;
pub const KEY_SPACE: u8 = 6 * 8 + 7;
pub const KEY_SHIFT: u8 = 7 * 8;

#[rustfmt::skip]
const INPUT_MAP: &[InputButton] = &[
    InputButton { id: 0,  name: "@" }, InputButton { id: 1,  name: "A" },
    InputButton { id: 2,  name: "B" }, InputButton { id: 3,  name: "C" },
    InputButton { id: 4,  name: "D" }, InputButton { id: 5,  name: "E" },
    InputButton { id: 6,  name: "F" }, InputButton { id: 7,  name: "G" },
    InputButton { id: 8,  name: "H" }, InputButton { id: 9,  name: "I" },
    InputButton { id: 10, name: "J" }, InputButton { id: 11, name: "K" },
    InputButton { id: 12, name: "L" }, InputButton { id: 13, name: "M" },
    InputButton { id: 14, name: "N" }, InputButton { id: 15, name: "O" },
    InputButton { id: 16, name: "P" }, InputButton { id: 17, name: "Q" },
    InputButton { id: 18, name: "R" }, InputButton { id: 19, name: "S" },
    InputButton { id: 20, name: "T" }, InputButton { id: 21, name: "U" },
    InputButton { id: 22, name: "V" }, InputButton { id: 23, name: "W" },
    InputButton { id: 24, name: "X" }, InputButton { id: 25, name: "Y" },
    InputButton { id: 26, name: "Z" },
    InputButton { id: 32, name: "0" }, InputButton { id: 33, name: "1" },
    InputButton { id: 34, name: "2" }, InputButton { id: 35, name: "3" },
    InputButton { id: 36, name: "4" }, InputButton { id: 37, name: "5" },
    InputButton { id: 38, name: "6" }, InputButton { id: 39, name: "7" },
    InputButton { id: 40, name: "8" }, InputButton { id: 41, name: "9" },
    InputButton { id: 42, name: ":" }, InputButton { id: 43, name: ";" },
    InputButton { id: 44, name: "," }, InputButton { id: 45, name: "-" },
    InputButton { id: 46, name: "." }, InputButton { id: 47, name: "/" },
    InputButton { id: KEY_ENTER, name: "ENTER" },
    InputButton { id: KEY_CLEAR, name: "CLEAR" },
    InputButton { id: KEY_BREAK, name: "BREAK" },
    InputButton { id: KEY_UP,    name: "UP" },
    InputButton { id: KEY_DOWN,  name: "DOWN" },
    InputButton { id: KEY_LEFT,  name: "LEFT" },
    InputButton { id: KEY_RIGHT, name: "RIGHT" },
    InputButton { id: KEY_SPACE, name: "SPACE" },
    InputButton { id: KEY_SHIFT, name: "SHIFT" },
];

/// Map a typed character to its matrix slot plus whether SHIFT must be
/// held. Unknown characters return None (not an error).
pub fn key_for_char(ch: char) -> Option<(u8, bool)> {
    let ch = ch.to_ascii_uppercase();
    match ch {
        '@' => Some((0, false)),
        'A'..='G' => Some((ch as u8 - b'A' + 1, false)),
        'H'..='O' => Some((8 + ch as u8 - b'H', false)),
        'P'..='W' => Some((16 + ch as u8 - b'P', false)),
        'X'..='Z' => Some((24 + ch as u8 - b'X', false)),
        '0'..='9' => Some((32 + ch as u8 - b'0', false)),
        ':' => Some((42, false)),
        ';' => Some((43, false)),
        ',' => Some((44, false)),
        '-' => Some((45, false)),
        '.' => Some((46, false)),
        '/' => Some((47, false)),
        '!'..=')' => Some((33 + ch as u8 - b'!', true)), // shift-1 .. shift-9
        '*' => Some((42, true)),
        '+' => Some((43, true)),
        '<' => Some((44, true)),
        '=' => Some((45, true)),
        '>' => Some((46, true)),
        '?' => Some((47, true)),
        ' ' => Some((KEY_SPACE, false)),
        '\r' | '\n' => Some((KEY_ENTER, false)),
        _ => None,
    }
}

/// Bus side of the machine: ROM, RAM, the keyboard matrix, the video RAM,
/// and the heartbeat-pending latch that drives the IRQ line.
pub struct Trs80Bus {
    rom: Box<[u8; ROM_SIZE]>,
    ram: Box<[u8; 0x10000]>,
    pub keyboard: KeyboardMatrix,
    pub video: VideoRam,
    timer_pending: bool,
}

impl Trs80Bus {
    fn new() -> Self {
        Self {
            rom: Box::new([0; ROM_SIZE]),
            ram: Box::new([0; 0x10000]),
            keyboard: KeyboardMatrix::new(),
            video: VideoRam::new(),
            timer_pending: false,
        }
    }

    /// Replace the ROM image; a shorter image clears the rest of the
    /// window so nothing stale survives a previous load.
    pub fn load_rom(&mut self, image: &[u8]) {
        *self.rom = [0; ROM_SIZE];
        let n = image.len().min(ROM_SIZE);
        self.rom[..n].copy_from_slice(&image[..n]);
    }

    /// Loader path: ROM-window bytes land in the ROM backing store (the
    /// bus write path would drop them); video and RAM take the rest.
    /// Keyboard-window bytes have no backing store and are dropped.
    fn load_region(&mut self, start: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let addr = start.wrapping_add(i as u16);
            match addr {
                0..=0x2FFF => self.rom[addr as usize] = byte,
                VIDEO_BASE..=VIDEO_END => self.video.write(addr, byte),
                a if a >= RAM_BASE => self.ram[addr as usize] = byte,
                _ => {}
            }
        }
    }
}

impl Bus for Trs80Bus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x2FFF => self.rom[addr as usize],
            0x3000..=0x37FF => 0xFF, // unmapped
            KEYBOARD_BASE..=KEYBOARD_END => self.keyboard.read(addr),
            VIDEO_BASE..=VIDEO_END => self.video.read(addr),
            _ => self.ram[addr as usize],
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x37FF => {}                  // ROM / unmapped: dropped
            KEYBOARD_BASE..=KEYBOARD_END => {}     // keyboard is read-only
            VIDEO_BASE..=VIDEO_END => self.video.write(addr, data),
            _ => self.ram[addr as usize] = data,
        }
    }

    fn io_read(&mut self, addr: u16) -> u8 {
        if (addr & 0xFF) as u8 == TIMER_PORT {
            // Bit 7 reports the heartbeat; reading acknowledges it
            let status = if self.timer_pending { 0x80 } else { 0x00 };
            self.timer_pending = false;
            status
        } else {
            0xFF // open bus
        }
    }

    fn io_write(&mut self, _addr: u16, _data: u8) {}

    fn check_interrupts(&self) -> InterruptState {
        InterruptState {
            irq: self.timer_pending,
            ..InterruptState::default()
        }
    }

    fn irq_ack(&mut self) {
        self.timer_pending = false;
    }
}

/// TRS-80 Model I class machine: Z80 @ 1.774 MHz, memory-mapped keyboard
/// matrix and 64×16 video RAM, 40 Hz heartbeat interrupt.
pub struct Trs80System {
    pub cpu: Z80,
    pub bus: Trs80Bus,
    cycles_since_interrupt: u64,
}

impl Trs80System {
    /// New machine with the built-in stub ROM installed.
    pub fn new() -> Self {
        let mut system = Self {
            cpu: Z80::new(),
            bus: Trs80Bus::new(),
            cycles_since_interrupt: 0,
        };
        system.bus.load_rom(&stub_rom());
        system.reset();
        system
    }

    /// Replace the system ROM (e.g. with a real Level II image).
    pub fn load_rom(&mut self, image: &[u8]) {
        self.bus.load_rom(image);
    }

    /// Press/release a key by matrix coordinates.
    pub fn key_down(&mut self, row: u8, bit: u8) {
        self.bus.keyboard.key_down(row, bit);
    }

    pub fn key_up(&mut self, row: u8, bit: u8) {
        self.bus.keyboard.key_up(row, bit);
    }

    /// Type one character, pressing SHIFT as the layout requires.
    pub fn type_char(&mut self, ch: char) {
        if let Some((slot, shifted)) = key_for_char(ch) {
            if shifted {
                self.bus.keyboard.set_slot(KEY_SHIFT, true);
            }
            self.bus.keyboard.set_slot(slot, true);
            self.bus.keyboard.set_slot(slot, false);
            if shifted {
                self.bus.keyboard.set_slot(KEY_SHIFT, false);
            }
        }
    }

    pub fn get_cpu_state(&self) -> Z80State {
        self.cpu.snapshot()
    }

    /// Screen snapshot decoded through the character generator.
    pub fn screen(&self) -> Vec<String> {
        self.bus.video.lines()
    }

    /// Advance the peripherals after `cycles` of CPU progress: keyboard
    /// hold timers tick down, and the heartbeat latch raises the IRQ line
    /// each time a 40 Hz period elapses.
    fn credit_cycles(&mut self, cycles: u64) {
        self.bus.keyboard.tick(cycles);
        self.cycles_since_interrupt += cycles;
        while self.cycles_since_interrupt >= INTERRUPT_PERIOD {
            self.cycles_since_interrupt -= INTERRUPT_PERIOD;
            self.bus.timer_pending = true;
        }
    }

    /// True when stepping the CPU now could make progress; false while it
    /// sits halted with no deliverable interrupt.
    fn can_step(&self) -> bool {
        !self.cpu.halted || (self.bus.timer_pending && self.cpu.iff1)
    }
}

impl Default for Trs80System {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for Trs80System {
    fn reset(&mut self) {
        *self.bus.ram = [0; 0x10000];
        self.bus.keyboard.reset();
        self.bus.video.reset();
        self.bus.timer_pending = false;
        self.cycles_since_interrupt = 0;
        self.cpu.reset(&mut self.bus);
    }

    fn run(&mut self, max_cycles: u64) -> u64 {
        let mut consumed = 0u64;
        while consumed < max_cycles {
            let used = if self.can_step() {
                self.cpu.step(&mut self.bus) as u64
            } else {
                // HALT with nothing deliverable: fast-forward to the next
                // heartbeat (or the end of the budget), crediting the
                // keyboard tick for the skipped span.
                let to_heartbeat = INTERRUPT_PERIOD - self.cycles_since_interrupt;
                let chunk = to_heartbeat.min(max_cycles - consumed).max(1);
                self.cpu.idle(chunk);
                chunk
            };
            self.credit_cycles(used);
            consumed += used;
        }
        consumed
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        if key < 64 {
            self.bus.keyboard.set_slot(key, pressed);
        }
    }

    fn input_map(&self) -> &[InputButton] {
        INPUT_MAP
    }

    fn load_software(&mut self, image: &SoftwareImage) {
        if image.is_empty() {
            return;
        }
        for region in &image.regions {
            self.bus.load_region(region.start, &region.bytes);
        }
        if image.overlaps(0x0000..=(ROM_SIZE as u16 - 1)) {
            // The ROM changed under the CPU: restart from address 0
            self.cpu.reset(&mut self.bus);
        } else {
            self.cpu.pc = image.entry_point;
        }
    }

    fn display_lines(&self) -> Vec<String> {
        self.bus.video.lines()
    }

    fn is_halted(&self) -> bool {
        self.cpu.halted
    }

    fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }
}

fn create_machine() -> Box<dyn Machine> {
    Box::new(Trs80System::new())
}

inventory::submit! {
    crate::registry::MachineEntry::new(
        "trs80",
        "Z80 @ 1.774 MHz, keyboard matrix, 64x16 video, 40 Hz heartbeat",
        create_machine,
    )
}
