mod alu;
mod branch;
mod load_store;
mod shift;
mod stack;

use crate::core::{Bus, bus::InterruptState};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, M6502State},
};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StatusFlag {
    C = 0x01, // Carry
    Z = 0x02, // Zero
    I = 0x04, // Interrupt Disable
    D = 0x08, // Decimal
    B = 0x10, // Break
    U = 0x20, // Unused (always 1)
    V = 0x40, // Overflow
    N = 0x80, // Negative
}

/// Addressing modes for operand fetch. Index 6 of the opcode matrix —
/// implied/accumulator — is handled inline by the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Mode {
    Imm,
    Zp,
    ZpX,
    ZpY,
    Abs,
    AbsX,
    AbsY,
    IndX,
    IndY,
}

/// NMOS 6502 core, instruction-stepped.
///
/// `step` executes one instruction (or takes one pending interrupt) and
/// returns the data-sheet cycle count, including page-cross and
/// taken-branch penalties. Interrupts are sampled at instruction
/// boundaries: NMI on its rising edge, IRQ while the line is held and the
/// I flag is clear.
pub struct M6502 {
    // Registers
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub p: u8,

    pub(crate) cycles: u64,
    /// Previous NMI line state for edge detection
    pub(crate) nmi_previous: bool,
    /// Count of undocumented opcodes executed as no-ops (diagnostics only)
    pub unknown_opcodes: u64,
}

const VECTOR_NMI: u16 = 0xFFFA;
const VECTOR_RESET: u16 = 0xFFFC;
const VECTOR_IRQ: u16 = 0xFFFE;

/// Cycles charged when a hardware interrupt is taken.
const INTERRUPT_CYCLES: u32 = 7;

impl Default for M6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6502 {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            p: 0x24, // I=1, U=1
            cycles: 0,
            nmi_previous: false,
            unknown_opcodes: 0,
        }
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: StatusFlag, set: bool) {
        if set {
            self.p |= flag as u8;
        } else {
            self.p &= !(flag as u8);
        }
    }

    #[inline]
    pub(crate) fn flag(&self, flag: StatusFlag) -> bool {
        (self.p & flag as u8) != 0
    }

    #[inline]
    pub(crate) fn set_nz(&mut self, val: u8) {
        self.set_flag(StatusFlag::Z, val == 0);
        self.set_flag(StatusFlag::N, (val & 0x80) != 0);
    }

    #[inline]
    pub(crate) fn fetch_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u8 {
        let val = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    #[inline]
    pub(crate) fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u16 {
        let lo = self.fetch_byte(bus) as u16;
        let hi = self.fetch_byte(bus) as u16;
        (hi << 8) | lo
    }

    #[inline]
    pub(crate) fn read_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        addr: u16,
    ) -> u16 {
        let lo = bus.read(addr) as u16;
        let hi = bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Execute one instruction and return cycles consumed.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let ints = bus.check_interrupts();
        if let Some(cycles) = self.handle_interrupts(bus, ints) {
            self.cycles += cycles as u64;
            return cycles;
        }

        let opcode = self.fetch_byte(bus);
        let cycles = self.execute(opcode, bus);
        self.cycles += cycles as u64;
        cycles
    }

    /// Run instructions until at least `max_cycles` have been consumed.
    pub fn run<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        max_cycles: u64,
    ) -> u64 {
        let mut consumed = 0u64;
        while consumed < max_cycles {
            consumed += self.step(bus) as u64;
        }
        consumed
    }

    /// Check the interrupt lines at an instruction boundary. Returns the
    /// cycles consumed if an interrupt was taken.
    fn handle_interrupts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        ints: InterruptState,
    ) -> Option<u32> {
        // NMI is edge-triggered: detect rising edge
        let nmi_edge = ints.nmi && !self.nmi_previous;
        self.nmi_previous = ints.nmi;

        if nmi_edge {
            self.take_interrupt(bus, VECTOR_NMI);
            return Some(INTERRUPT_CYCLES);
        }

        // IRQ is level-triggered, masked by I flag
        if ints.irq && !self.flag(StatusFlag::I) {
            bus.irq_ack();
            self.take_interrupt(bus, VECTOR_IRQ);
            return Some(INTERRUPT_CYCLES);
        }

        None
    }

    /// Hardware interrupt response: push PC and P (with B=0, U=1), set I,
    /// load the vector.
    fn take_interrupt<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        vector: u16,
    ) {
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);
        let p_push = (self.p | StatusFlag::U as u8) & !(StatusFlag::B as u8);
        self.push(bus, p_push);
        self.set_flag(StatusFlag::I, true);
        self.pc = self.read_word(bus, vector);
    }

    fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        match opcode {
            // --- LDA ---
            0xA9 => self.op_lda(bus, Mode::Imm),
            0xA5 => self.op_lda(bus, Mode::Zp),
            0xB5 => self.op_lda(bus, Mode::ZpX),
            0xAD => self.op_lda(bus, Mode::Abs),
            0xBD => self.op_lda(bus, Mode::AbsX),
            0xB9 => self.op_lda(bus, Mode::AbsY),
            0xA1 => self.op_lda(bus, Mode::IndX),
            0xB1 => self.op_lda(bus, Mode::IndY),

            // --- LDX ---
            0xA2 => self.op_ldx(bus, Mode::Imm),
            0xA6 => self.op_ldx(bus, Mode::Zp),
            0xB6 => self.op_ldx(bus, Mode::ZpY),
            0xAE => self.op_ldx(bus, Mode::Abs),
            0xBE => self.op_ldx(bus, Mode::AbsY),

            // --- LDY ---
            0xA0 => self.op_ldy(bus, Mode::Imm),
            0xA4 => self.op_ldy(bus, Mode::Zp),
            0xB4 => self.op_ldy(bus, Mode::ZpX),
            0xAC => self.op_ldy(bus, Mode::Abs),
            0xBC => self.op_ldy(bus, Mode::AbsX),

            // --- STA ---
            0x85 => self.op_sta(bus, Mode::Zp),
            0x95 => self.op_sta(bus, Mode::ZpX),
            0x8D => self.op_sta(bus, Mode::Abs),
            0x9D => self.op_sta(bus, Mode::AbsX),
            0x99 => self.op_sta(bus, Mode::AbsY),
            0x81 => self.op_sta(bus, Mode::IndX),
            0x91 => self.op_sta(bus, Mode::IndY),

            // --- STX / STY ---
            0x86 => self.op_stx(bus, Mode::Zp),
            0x96 => self.op_stx(bus, Mode::ZpY),
            0x8E => self.op_stx(bus, Mode::Abs),
            0x84 => self.op_sty(bus, Mode::Zp),
            0x94 => self.op_sty(bus, Mode::ZpX),
            0x8C => self.op_sty(bus, Mode::Abs),

            // --- ADC ---
            0x69 => self.op_adc(bus, Mode::Imm),
            0x65 => self.op_adc(bus, Mode::Zp),
            0x75 => self.op_adc(bus, Mode::ZpX),
            0x6D => self.op_adc(bus, Mode::Abs),
            0x7D => self.op_adc(bus, Mode::AbsX),
            0x79 => self.op_adc(bus, Mode::AbsY),
            0x61 => self.op_adc(bus, Mode::IndX),
            0x71 => self.op_adc(bus, Mode::IndY),

            // --- SBC ---
            0xE9 => self.op_sbc(bus, Mode::Imm),
            0xE5 => self.op_sbc(bus, Mode::Zp),
            0xF5 => self.op_sbc(bus, Mode::ZpX),
            0xED => self.op_sbc(bus, Mode::Abs),
            0xFD => self.op_sbc(bus, Mode::AbsX),
            0xF9 => self.op_sbc(bus, Mode::AbsY),
            0xE1 => self.op_sbc(bus, Mode::IndX),
            0xF1 => self.op_sbc(bus, Mode::IndY),

            // --- CMP ---
            0xC9 => self.op_cmp(bus, Mode::Imm),
            0xC5 => self.op_cmp(bus, Mode::Zp),
            0xD5 => self.op_cmp(bus, Mode::ZpX),
            0xCD => self.op_cmp(bus, Mode::Abs),
            0xDD => self.op_cmp(bus, Mode::AbsX),
            0xD9 => self.op_cmp(bus, Mode::AbsY),
            0xC1 => self.op_cmp(bus, Mode::IndX),
            0xD1 => self.op_cmp(bus, Mode::IndY),

            // --- AND ---
            0x29 => self.op_and(bus, Mode::Imm),
            0x25 => self.op_and(bus, Mode::Zp),
            0x35 => self.op_and(bus, Mode::ZpX),
            0x2D => self.op_and(bus, Mode::Abs),
            0x3D => self.op_and(bus, Mode::AbsX),
            0x39 => self.op_and(bus, Mode::AbsY),
            0x21 => self.op_and(bus, Mode::IndX),
            0x31 => self.op_and(bus, Mode::IndY),

            // --- ORA ---
            0x09 => self.op_ora(bus, Mode::Imm),
            0x05 => self.op_ora(bus, Mode::Zp),
            0x15 => self.op_ora(bus, Mode::ZpX),
            0x0D => self.op_ora(bus, Mode::Abs),
            0x1D => self.op_ora(bus, Mode::AbsX),
            0x19 => self.op_ora(bus, Mode::AbsY),
            0x01 => self.op_ora(bus, Mode::IndX),
            0x11 => self.op_ora(bus, Mode::IndY),

            // --- EOR ---
            0x49 => self.op_eor(bus, Mode::Imm),
            0x45 => self.op_eor(bus, Mode::Zp),
            0x55 => self.op_eor(bus, Mode::ZpX),
            0x4D => self.op_eor(bus, Mode::Abs),
            0x5D => self.op_eor(bus, Mode::AbsX),
            0x59 => self.op_eor(bus, Mode::AbsY),
            0x41 => self.op_eor(bus, Mode::IndX),
            0x51 => self.op_eor(bus, Mode::IndY),

            // --- BIT ---
            0x24 => self.op_bit(bus, Mode::Zp),
            0x2C => self.op_bit(bus, Mode::Abs),

            // --- CPX / CPY ---
            0xE0 => self.op_cpx(bus, Mode::Imm),
            0xE4 => self.op_cpx(bus, Mode::Zp),
            0xEC => self.op_cpx(bus, Mode::Abs),
            0xC0 => self.op_cpy(bus, Mode::Imm),
            0xC4 => self.op_cpy(bus, Mode::Zp),
            0xCC => self.op_cpy(bus, Mode::Abs),

            // --- ASL ---
            0x0A => {
                self.a = self.perform_asl(self.a);
                2
            }
            0x06 => self.op_asl(bus, Mode::Zp),
            0x16 => self.op_asl(bus, Mode::ZpX),
            0x0E => self.op_asl(bus, Mode::Abs),
            0x1E => self.op_asl(bus, Mode::AbsX),

            // --- LSR ---
            0x4A => {
                self.a = self.perform_lsr(self.a);
                2
            }
            0x46 => self.op_lsr(bus, Mode::Zp),
            0x56 => self.op_lsr(bus, Mode::ZpX),
            0x4E => self.op_lsr(bus, Mode::Abs),
            0x5E => self.op_lsr(bus, Mode::AbsX),

            // --- ROL ---
            0x2A => {
                self.a = self.perform_rol(self.a);
                2
            }
            0x26 => self.op_rol(bus, Mode::Zp),
            0x36 => self.op_rol(bus, Mode::ZpX),
            0x2E => self.op_rol(bus, Mode::Abs),
            0x3E => self.op_rol(bus, Mode::AbsX),

            // --- ROR ---
            0x6A => {
                self.a = self.perform_ror(self.a);
                2
            }
            0x66 => self.op_ror(bus, Mode::Zp),
            0x76 => self.op_ror(bus, Mode::ZpX),
            0x6E => self.op_ror(bus, Mode::Abs),
            0x7E => self.op_ror(bus, Mode::AbsX),

            // --- INC / DEC (memory) ---
            0xE6 => self.op_inc(bus, Mode::Zp),
            0xF6 => self.op_inc(bus, Mode::ZpX),
            0xEE => self.op_inc(bus, Mode::Abs),
            0xFE => self.op_inc(bus, Mode::AbsX),
            0xC6 => self.op_dec(bus, Mode::Zp),
            0xD6 => self.op_dec(bus, Mode::ZpX),
            0xCE => self.op_dec(bus, Mode::Abs),
            0xDE => self.op_dec(bus, Mode::AbsX),

            // --- Flag instructions (all 2-cycle implied) ---
            0x18 => {
                self.set_flag(StatusFlag::C, false);
                2
            }
            0x38 => {
                self.set_flag(StatusFlag::C, true);
                2
            }
            0x58 => {
                self.set_flag(StatusFlag::I, false);
                2
            }
            0x78 => {
                self.set_flag(StatusFlag::I, true);
                2
            }
            0xB8 => {
                self.set_flag(StatusFlag::V, false);
                2
            }
            0xD8 => {
                self.set_flag(StatusFlag::D, false);
                2
            }
            0xF8 => {
                self.set_flag(StatusFlag::D, true);
                2
            }

            // --- Transfers (2-cycle implied) ---
            0xAA => {
                self.x = self.a;
                self.set_nz(self.x);
                2
            }
            0xA8 => {
                self.y = self.a;
                self.set_nz(self.y);
                2
            }
            0x8A => {
                self.a = self.x;
                self.set_nz(self.a);
                2
            }
            0x98 => {
                self.a = self.y;
                self.set_nz(self.a);
                2
            }
            0xBA => {
                self.x = self.sp;
                self.set_nz(self.x);
                2
            }
            0x9A => {
                // TXS does NOT set flags
                self.sp = self.x;
                2
            }

            // --- Register increment/decrement (2-cycle implied) ---
            0xE8 => {
                self.x = self.x.wrapping_add(1);
                self.set_nz(self.x);
                2
            }
            0xC8 => {
                self.y = self.y.wrapping_add(1);
                self.set_nz(self.y);
                2
            }
            0xCA => {
                self.x = self.x.wrapping_sub(1);
                self.set_nz(self.x);
                2
            }
            0x88 => {
                self.y = self.y.wrapping_sub(1);
                self.set_nz(self.y);
                2
            }

            // --- NOP ---
            0xEA => 2,

            // --- Branches ---
            0x10 => self.op_branch(bus, !self.flag(StatusFlag::N)),
            0x30 => self.op_branch(bus, self.flag(StatusFlag::N)),
            0x50 => self.op_branch(bus, !self.flag(StatusFlag::V)),
            0x70 => self.op_branch(bus, self.flag(StatusFlag::V)),
            0x90 => self.op_branch(bus, !self.flag(StatusFlag::C)),
            0xB0 => self.op_branch(bus, self.flag(StatusFlag::C)),
            0xD0 => self.op_branch(bus, !self.flag(StatusFlag::Z)),
            0xF0 => self.op_branch(bus, self.flag(StatusFlag::Z)),

            // --- Jumps / subroutines ---
            0x4C => self.op_jmp_abs(bus),
            0x6C => self.op_jmp_ind(bus),
            0x20 => self.op_jsr(bus),
            0x60 => self.op_rts(bus),
            0x40 => self.op_rti(bus),

            // --- Stack ---
            0x48 => self.op_pha(bus),
            0x68 => self.op_pla(bus),
            0x08 => self.op_php(bus),
            0x28 => self.op_plp(bus),

            // --- BRK ---
            0x00 => self.op_brk(bus),

            // Undocumented opcode: one-byte no-op, minimum cycle count
            _ => {
                self.unknown_opcodes += 1;
                2
            }
        }
    }
}

impl Cpu for M6502 {
    fn reset(&mut self, bus: &mut dyn Bus<Address = u16, Data = u8>) {
        self.sp = 0xFD;
        self.p = 0x24; // I=1, U=1
        self.pc = self.read_word(bus, VECTOR_RESET);
        self.cycles = 0;
        self.nmi_previous = false;
    }

    fn step(&mut self, bus: &mut dyn Bus<Address = u16, Data = u8>) -> u32 {
        M6502::step(self, bus)
    }

    fn is_halted(&self) -> bool {
        false // The NMOS 6502 has no HALT instruction
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl CpuStateTrait for M6502 {
    type Snapshot = M6502State;

    fn snapshot(&self) -> M6502State {
        M6502State {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            p: self.p,
            cycles: self.cycles,
        }
    }
}
