use filament_core::core::bus::InterruptState;
use filament_core::core::machine::{InputButton, Machine};
use filament_core::core::software::SoftwareImage;
use filament_core::core::Bus;
use filament_core::cpu::state::M6502State;
use filament_core::cpu::{Cpu, CpuStateTrait, m6502::M6502};
use filament_core::device::pia6821::Pia6821;
use filament_core::device::terminal::TerminalModel;

// ---------------------------------------------------------------------------
// Memory map
// ---------------------------------------------------------------------------
// 0x0000-0xCFFF  RAM (zero page, stack, user program space)
// 0xD010-0xD013  PIA (keyboard + display)
// 0xD014-0xFEFF  RAM (open bus on hardware; RAM-backed here)
// 0xFF00-0xFFFF  Monitor ROM (256 bytes, switchable for diagnostics)

const PIA_BASE: u16 = 0xD010;
const PIA_END: u16 = 0xD013;
const ROM_BASE: u16 = 0xFF00;
const ROM_SIZE: usize = 0x100;

/// CPU clock: ~1.023 MHz (NTSC-derived 14.318 MHz / 14).
pub const CPU_CLOCK_HZ: u64 = 1_022_727;

const INPUT_MAP: &[InputButton] = &[
    InputButton { id: 0x0D, name: "RETURN" },
    InputButton { id: 0x1B, name: "ESC" },
];

/// Built-in 256-byte monitor: echoes keys, and on return parses the last
/// four characters typed as a hex address and prints `AAAA: DD` for the
/// byte found there. Assembled by hand for the ROM window at 0xFF00.
pub fn monitor_rom() -> [u8; ROM_SIZE] {
    let mut rom = [0u8; ROM_SIZE];

    #[rustfmt::skip]
    const MAIN: &[u8] = &[
        0xD8,             // FF00  CLD
        0xA2, 0x00,       // FF01  LDX #$00          ; input buffer index
        0xAD, 0x11, 0xD0, // FF03  LOOP: LDA $D011   ; key waiting?
        0x10, 0xFB,       // FF06  BPL LOOP
        0xAD, 0x10, 0xD0, // FF08  LDA $D010         ; take the key
        0x29, 0x7F,       // FF0B  AND #$7F
        0xC9, 0x0D,       // FF0D  CMP #$0D
        0xF0, 0x0A,       // FF0F  BEQ DO_CR
        0x9D, 0x00, 0x02, // FF11  STA $0200,X       ; buffer it
        0xE8,             // FF14  INX
        0x20, 0xE0, 0xFF, // FF15  JSR ECHO
        0x4C, 0x03, 0xFF, // FF18  JMP LOOP
        0x20, 0xE0, 0xFF, // FF1B  DO_CR: JSR ECHO   ; newline
        0xE0, 0x04,       // FF1E  CPX #$04          ; enough for an address?
        0x90, 0x52,       // FF20  BCC RESTART
        0xA9, 0x00,       // FF22  LDA #$00
        0x85, 0x24,       // FF24  STA $24           ; address low
        0x85, 0x25,       // FF26  STA $25           ; address high
        0x8A,             // FF28  TXA               ; rewind to last 4 chars
        0x38,             // FF29  SEC
        0xE9, 0x04,       // FF2A  SBC #$04
        0xAA,             // FF2C  TAX
        0x20, 0xC0, 0xFF, // FF2D  JSR GETNIB
        0x0A,             // FF30  ASL A
        0x0A,             // FF31  ASL A
        0x0A,             // FF32  ASL A
        0x0A,             // FF33  ASL A
        0x85, 0x25,       // FF34  STA $25
        0x20, 0xC0, 0xFF, // FF36  JSR GETNIB
        0x05, 0x25,       // FF39  ORA $25
        0x85, 0x25,       // FF3B  STA $25           ; high byte assembled
        0x20, 0xC0, 0xFF, // FF3D  JSR GETNIB
        0x0A,             // FF40  ASL A
        0x0A,             // FF41  ASL A
        0x0A,             // FF42  ASL A
        0x0A,             // FF43  ASL A
        0x85, 0x24,       // FF44  STA $24
        0x20, 0xC0, 0xFF, // FF46  JSR GETNIB
        0x05, 0x24,       // FF49  ORA $24
        0x85, 0x24,       // FF4B  STA $24           ; low byte assembled
        0x8A,             // FF4D  TXA               ; print the address back
        0x38,             // FF4E  SEC
        0xE9, 0x04,       // FF4F  SBC #$04
        0xAA,             // FF51  TAX
        0xA0, 0x04,       // FF52  LDY #$04
        0xBD, 0x00, 0x02, // FF54  ECHO4: LDA $0200,X
        0x20, 0xE0, 0xFF, // FF57  JSR ECHO
        0xE8,             // FF5A  INX
        0x88,             // FF5B  DEY
        0xD0, 0xF6,       // FF5C  BNE ECHO4
        0xA9, 0x3A,       // FF5E  LDA #':'
        0x20, 0xE0, 0xFF, // FF60  JSR ECHO
        0xA9, 0x20,       // FF63  LDA #' '
        0x20, 0xE0, 0xFF, // FF65  JSR ECHO
        0xA0, 0x00,       // FF68  LDY #$00
        0xB1, 0x24,       // FF6A  LDA ($24),Y       ; the examined byte
        0x20, 0xD0, 0xFF, // FF6C  JSR PRBYTE
        0xA9, 0x0D,       // FF6F  LDA #$0D
        0x20, 0xE0, 0xFF, // FF71  JSR ECHO
        0xA2, 0x00,       // FF74  RESTART: LDX #$00
        0x4C, 0x03, 0xFF, // FF76  JMP LOOP
    ];
    rom[..MAIN.len()].copy_from_slice(MAIN);

    #[rustfmt::skip]
    const GETNIB: &[u8] = &[
        0xBD, 0x00, 0x02, // FFC0  LDA $0200,X       ; hex digit -> nibble
        0xE8,             // FFC3  INX
        0x38,             // FFC4  SEC
        0xE9, 0x30,       // FFC5  SBC #'0'
        0xC9, 0x0A,       // FFC7  CMP #$0A
        0x90, 0x02,       // FFC9  BCC NIBOK
        0xE9, 0x07,       // FFCB  SBC #$07          ; 'A'-'F'
        0x29, 0x0F,       // FFCD  NIBOK: AND #$0F
        0x60,             // FFCF  RTS
    ];
    rom[0xC0..0xC0 + GETNIB.len()].copy_from_slice(GETNIB);

    #[rustfmt::skip]
    const PRINT: &[u8] = &[
        0x48,             // FFD0  PRBYTE: PHA
        0x4A,             // FFD1  LSR A
        0x4A,             // FFD2  LSR A
        0x4A,             // FFD3  LSR A
        0x4A,             // FFD4  LSR A
        0x20, 0xE4, 0xFF, // FFD5  JSR PRHEX
        0x68,             // FFD8  PLA
        0x29, 0x0F,       // FFD9  AND #$0F
        0x20, 0xE4, 0xFF, // FFDB  JSR PRHEX
        0x60,             // FFDE  RTS
        0x00,             // FFDF  (pad)
        0x8D, 0x12, 0xD0, // FFE0  ECHO: STA $D012
        0x60,             // FFE3  RTS
        0x09, 0x30,       // FFE4  PRHEX: ORA #'0'
        0xC9, 0x3A,       // FFE6  CMP #':'
        0x90, 0xF6,       // FFE8  BCC ECHO
        0x69, 0x06,       // FFEA  ADC #$06          ; carry set: +7 -> 'A'-'F'
        0x4C, 0xE0, 0xFF, // FFEC  JMP ECHO
    ];
    rom[0xD0..0xD0 + PRINT.len()].copy_from_slice(PRINT);

    // NMI / RESET / IRQ vectors, all at the monitor entry
    rom[0xFA..].copy_from_slice(&[0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF]);
    rom
}

/// Bus side of the machine: RAM, monitor ROM, PIA and the terminal it
/// drives. Owned separately from the CPU so `cpu.step(&mut bus)` borrows
/// disjoint fields.
pub struct Apple1Bus {
    ram: Box<[u8; 0x10000]>,
    rom: [u8; ROM_SIZE],
    rom_enabled: bool,
    pub pia: Pia6821,
    pub terminal: TerminalModel,
}

impl Apple1Bus {
    fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            rom: monitor_rom(),
            rom_enabled: true,
            pia: Pia6821::new(),
            terminal: TerminalModel::new(),
        }
    }

    /// Replace the monitor image. A shorter image clears the remainder of
    /// the window, so nothing from the previous ROM survives.
    pub fn load_rom(&mut self, image: &[u8]) {
        self.rom = [0; ROM_SIZE];
        let n = image.len().min(ROM_SIZE);
        self.rom[..n].copy_from_slice(&image[..n]);
    }

    /// Loader path: ROM-window bytes land in the ROM backing store (while
    /// the ROM is enabled); everything else is RAM. Wraps at 0xFFFF.
    fn load_region(&mut self, start: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            let addr = start.wrapping_add(i as u16);
            if self.rom_enabled && addr >= ROM_BASE {
                self.rom[(addr - ROM_BASE) as usize] = byte;
            } else {
                self.ram[addr as usize] = byte;
            }
        }
    }
}

impl Bus for Apple1Bus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            PIA_BASE..=PIA_END => self.pia.read((addr - PIA_BASE) as u8),
            _ if self.rom_enabled && addr >= ROM_BASE => {
                self.rom[(addr - ROM_BASE) as usize]
            }
            _ => self.ram[addr as usize],
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            PIA_BASE..=PIA_END => {
                if let Some(byte) = self.pia.write((addr - PIA_BASE) as u8, data) {
                    self.terminal.receive(byte);
                }
            }
            _ if self.rom_enabled && addr >= ROM_BASE => {} // ROM: dropped
            _ => self.ram[addr as usize] = data,
        }
    }

    fn check_interrupts(&self) -> InterruptState {
        // No timed interrupt sources on this machine
        InterruptState::default()
    }
}

/// Apple I class machine: 6502 @ ~1 MHz, PIA-driven 40×24 terminal,
/// 256-byte monitor ROM at the top of memory.
pub struct Apple1System {
    pub cpu: M6502,
    pub bus: Apple1Bus,
}

impl Apple1System {
    pub fn new() -> Self {
        let mut system = Self {
            cpu: M6502::new(),
            bus: Apple1Bus::new(),
        };
        system.reset();
        system
    }

    /// Disable the monitor ROM window so programs loaded at 0xFF00 run
    /// from RAM (diagnostic images carry their own vectors).
    pub fn set_rom_enabled(&mut self, enabled: bool) {
        self.bus.rom_enabled = enabled;
    }

    /// Deliver one keystroke. Lowercase folds to uppercase — the keyboard
    /// has no lowercase.
    pub fn key_press(&mut self, ascii: u8) {
        let key = if ascii.is_ascii_lowercase() {
            ascii.to_ascii_uppercase()
        } else {
            ascii & 0x7F
        };
        self.bus.pia.key_press(key);
    }

    pub fn get_cpu_state(&self) -> M6502State {
        self.cpu.snapshot()
    }

    /// Terminal cursor, for hosts that draw one.
    pub fn cursor(&self) -> (usize, usize) {
        self.bus.terminal.cursor()
    }
}

impl Default for Apple1System {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for Apple1System {
    fn reset(&mut self) {
        *self.bus.ram = [0; 0x10000];
        self.bus.pia.reset();
        self.bus.terminal.reset();
        self.cpu.reset(&mut self.bus);
    }

    fn run(&mut self, max_cycles: u64) -> u64 {
        let mut consumed = 0u64;
        while consumed < max_cycles {
            consumed += self.cpu.step(&mut self.bus) as u64;
        }
        consumed
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        // Key-up carries no information for an ASCII keyboard
        if pressed {
            self.key_press(key);
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
        if image.overlaps(ROM_BASE..=0xFFFF) {
            // New reset vector: restart through it
            self.cpu.reset(&mut self.bus);
        } else {
            self.cpu.pc = image.entry_point;
        }
    }

    fn display_lines(&self) -> Vec<String> {
        self.bus.terminal.lines()
    }

    fn is_halted(&self) -> bool {
        false
    }

    fn cycles(&self) -> u64 {
        self.cpu.cycles()
    }
}

fn create_machine() -> Box<dyn Machine> {
    Box::new(Apple1System::new())
}

inventory::submit! {
    crate::registry::MachineEntry::new(
        "apple1",
        "6502 @ 1 MHz, PIA keyboard/display, 40x24 terminal",
        create_machine,
    )
}
