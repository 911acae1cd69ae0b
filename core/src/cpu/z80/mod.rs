mod alu;
mod bit;
mod block;
mod branch;
mod load_store;
mod stack;

use crate::core::{Bus, bus::InterruptState};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, Z80State},
};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    C = 0x01,  // Carry
    N = 0x02,  // Add/Subtract
    PV = 0x04, // Parity/Overflow
    H = 0x10,  // Half Carry
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IndexMode {
    HL,
    IX,
    IY,
}

/// Zilog Z80 core, instruction-stepped.
///
/// `step` executes one complete instruction — prefixes included — and
/// returns the data-sheet T-state count. Interrupts are sampled from the
/// bus at instruction boundaries (never between a prefix and its opcode):
/// NMI on its rising edge, IRQ while the line is held and IFF1 is set, with
/// the one-instruction enable delay after EI. The undocumented F bits 3
/// and 5 are not computed.
///
/// HALT leaves PC on the halt opcode ("PC does not advance"), so a woken
/// CPU that returns from its interrupt handler re-executes HALT and halts
/// again.
pub struct Z80 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Shadow registers
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    // Index & special registers
    pub ix: u16,
    pub iy: u16,
    pub i: u8,
    pub r: u8,
    pub sp: u16,
    pub pc: u16,

    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    /// EI takes effect after the following instruction
    pub(crate) ei_delay: bool,
    /// Active index prefix while executing one instruction
    pub(crate) index_mode: IndexMode,
    /// Previous NMI line state for edge detection
    pub(crate) nmi_previous: bool,

    pub(crate) cycles: u64,
    /// Count of undocumented opcodes executed as no-ops (diagnostics only)
    pub unknown_opcodes: u64,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self {
            a: 0xFF,
            f: 0xFF,
            b: 0xFF,
            c: 0xFF,
            d: 0xFF,
            e: 0xFF,
            h: 0xFF,
            l: 0xFF,
            a_prime: 0xFF,
            f_prime: 0xFF,
            b_prime: 0xFF,
            c_prime: 0xFF,
            d_prime: 0xFF,
            e_prime: 0xFF,
            h_prime: 0xFF,
            l_prime: 0xFF,
            ix: 0xFFFF,
            iy: 0xFFFF,
            i: 0,
            r: 0,
            sp: 0xFFFF,
            pc: 0x0000,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
            ei_delay: false,
            index_mode: IndexMode::HL,
            nmi_previous: false,
            cycles: 0,
            unknown_opcodes: 0,
        }
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 {
        ((self.b as u16) << 8) | self.c as u16
    }
    pub fn set_bc(&mut self, val: u16) {
        self.b = (val >> 8) as u8;
        self.c = val as u8;
    }

    pub fn get_de(&self) -> u16 {
        ((self.d as u16) << 8) | self.e as u16
    }
    pub fn set_de(&mut self, val: u16) {
        self.d = (val >> 8) as u8;
        self.e = val as u8;
    }

    pub fn get_hl(&self) -> u16 {
        ((self.h as u16) << 8) | self.l as u16
    }
    pub fn set_hl(&mut self, val: u16) {
        self.h = (val >> 8) as u8;
        self.l = val as u8;
    }

    pub fn get_af(&self) -> u16 {
        ((self.a as u16) << 8) | self.f as u16
    }
    pub fn set_af(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.f = val as u8;
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: Flag, set: bool) {
        if set {
            self.f |= flag as u8;
        } else {
            self.f &= !(flag as u8);
        }
    }

    #[inline]
    pub(crate) fn flag(&self, flag: Flag) -> bool {
        (self.f & flag as u8) != 0
    }

    /// Get 8-bit register by index, respecting IX/IY prefix for H/L
    /// (undocumented IXH/IXL/IYH/IYL). Index 6 is NOT handled here —
    /// callers handle (HL)/(IX+d)/(IY+d) separately.
    pub fn get_reg8_ix(&self, index: u8) -> u8 {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => (self.ix >> 8) as u8,
            (5, IndexMode::IX) => self.ix as u8,
            (4, IndexMode::IY) => (self.iy >> 8) as u8,
            (5, IndexMode::IY) => self.iy as u8,
            _ => self.get_reg8(index),
        }
    }

    pub fn set_reg8_ix(&mut self, index: u8, val: u8) {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => self.ix = (self.ix & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IX) => self.ix = (self.ix & 0xFF00) | val as u16,
            (4, IndexMode::IY) => self.iy = (self.iy & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IY) => self.iy = (self.iy & 0xFF00) | val as u16,
            _ => self.set_reg8(index, val),
        }
    }

    pub fn get_reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => unreachable!("get_reg8 called with index {}", index),
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            7 => self.a = val,
            _ => unreachable!("set_reg8 called with index {}", index),
        }
    }

    /// Get 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    /// Index 2 respects the current index mode for DD/FD prefixes.
    pub(crate) fn get_rp(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => match self.index_mode {
                IndexMode::HL => self.get_hl(),
                IndexMode::IX => self.ix,
                IndexMode::IY => self.iy,
            },
            3 => self.sp,
            _ => unreachable!("get_rp called with index {}", index),
        }
    }

    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => match self.index_mode {
                IndexMode::HL => self.set_hl(val),
                IndexMode::IX => self.ix = val,
                IndexMode::IY => self.iy = val,
            },
            3 => self.sp = val,
            _ => unreachable!("set_rp called with index {}", index),
        }
    }

    /// Get 16-bit register pair by index for PUSH/POP (3=AF instead of SP).
    pub(crate) fn get_rp_af(&self, index: u8) -> u16 {
        if index == 3 {
            self.get_af()
        } else {
            self.get_rp(index)
        }
    }

    pub(crate) fn set_rp_af(&mut self, index: u8, val: u16) {
        if index == 3 {
            self.set_af(val);
        } else {
            self.set_rp(index, val);
        }
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

    #[inline]
    pub(crate) fn write_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        addr: u16,
        val: u16,
    ) {
        bus.write(addr, val as u8);
        bus.write(addr.wrapping_add(1), (val >> 8) as u8);
    }

    /// Opcode fetch: M1 cycle, refreshes the low 7 bits of R.
    #[inline]
    fn fetch_opcode<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let op = self.fetch_byte(bus);
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
        op
    }

    /// Effective address for (HL), or (IX+d)/(IY+d) with the displacement
    /// fetched from the instruction stream.
    pub(crate) fn index_addr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => {
                let d = self.fetch_byte(bus) as i8;
                self.ix.wrapping_add(d as i16 as u16)
            }
            IndexMode::IY => {
                let d = self.fetch_byte(bus) as i8;
                self.iy.wrapping_add(d as i16 as u16)
            }
        }
    }

    /// True while an IX/IY prefix is active.
    #[inline]
    pub(crate) fn indexed(&self) -> bool {
        self.index_mode != IndexMode::HL
    }

    /// Execute one instruction and return T-states consumed.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let ints = bus.check_interrupts();
        if let Some(cycles) = self.handle_interrupts(bus, ints) {
            self.cycles += cycles as u64;
            return cycles;
        }

        if self.halted {
            // HALT state: execute internal NOPs, PC stays on the opcode
            self.cycles += 4;
            return 4;
        }

        self.index_mode = IndexMode::HL;
        let opcode = self.fetch_opcode(bus);
        let cycles = self.execute_main(opcode, bus);
        self.cycles += cycles as u64;
        cycles
    }

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

    /// Credit cycles without executing (HALT fast-forward). The caller is
    /// responsible for not skipping past an interrupt boundary.
    pub fn idle(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    fn handle_interrupts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        ints: InterruptState,
    ) -> Option<u32> {
        if self.ei_delay {
            // Skip the interrupt check for one instruction after EI
            self.ei_delay = false;
            return None;
        }

        // NMI: edge-triggered, higher priority than IRQ
        let nmi_edge = ints.nmi && !self.nmi_previous;
        self.nmi_previous = ints.nmi;

        if nmi_edge {
            self.halted = false;
            self.iff1 = false; // IFF2 preserved for RETN
            self.push_word(bus, self.pc);
            self.pc = 0x0066;
            return Some(11);
        }

        // IRQ: level-triggered, masked by IFF1
        if ints.irq && self.iff1 {
            self.halted = false;
            self.iff1 = false;
            self.iff2 = false;
            bus.irq_ack();
            self.push_word(bus, self.pc);
            return Some(match self.im {
                2 => {
                    // IM 2: vector table entry at (I << 8) | (data & 0xFE)
                    let table = ((self.i as u16) << 8) | (ints.irq_vector & 0xFE) as u16;
                    self.pc = self.read_word(bus, table);
                    19
                }
                1 => {
                    self.pc = 0x0038;
                    13
                }
                _ => {
                    // IM 0: execute the byte on the data bus; devices use
                    // RST in practice. Anything else falls back to RST 38h.
                    self.pc = if (ints.irq_vector & 0xC7) == 0xC7 {
                        (ints.irq_vector & 0x38) as u16
                    } else {
                        0x0038
                    };
                    13
                }
            });
        }

        None
    }

    /// Main (unprefixed) opcode dispatch. Handlers return total T-states
    /// for the unprefixed form; the DD/FD dispatcher adds the prefix fetch
    /// and displacement overhead.
    fn execute_main<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        match opcode {
            // NOP — 4
            0x00 => 4,

            // HALT — 4. PC stays on the opcode so a woken CPU re-halts
            // after its handler returns.
            0x76 => {
                self.pc = self.pc.wrapping_sub(1);
                self.halted = true;
                4
            }

            // Prefixes
            0xCB => self.dispatch_cb(bus),
            0xED => self.dispatch_ed(bus),
            0xDD => self.dispatch_index(bus, IndexMode::IX),
            0xFD => self.dispatch_index(bus, IndexMode::IY),

            // --- Load/Store ---
            0x02 => self.op_ld_bc_a(bus),
            0x12 => self.op_ld_de_a(bus),
            0x0A => self.op_ld_a_bc(bus),
            0x1A => self.op_ld_a_de(bus),
            0x22 => self.op_ld_nn_hl(bus),
            0x2A => self.op_ld_hl_nn(bus),
            0x32 => self.op_ld_nn_a(bus),
            0x3A => self.op_ld_a_nn(bus),
            0x08 => self.op_ex_af_af(),
            0xEB => self.op_ex_de_hl(),
            0xD9 => self.op_exx(),
            0xE3 => self.op_ex_sp_hl(bus),
            0xF9 => self.op_ld_sp_hl(),
            op if (op & 0xCF) == 0x01 => self.op_ld_rr_nn(op, bus),
            op if (op & 0xC7) == 0x06 => self.op_ld_r_n(op, bus),
            op if (op & 0xC0) == 0x40 => self.op_ld_r_r(op, bus),

            // --- Stack ---
            op if (op & 0xCF) == 0xC5 => self.op_push(op, bus),
            op if (op & 0xCF) == 0xC1 => self.op_pop(op, bus),

            // --- ALU ---
            0x07 => self.op_rlca(),
            0x0F => self.op_rrca(),
            0x17 => self.op_rla(),
            0x1F => self.op_rra(),
            0x27 => self.op_daa(),
            0x2F => self.op_cpl(),
            0x37 => self.op_scf(),
            0x3F => self.op_ccf(),
            op if (op & 0xC0) == 0x80 => self.op_alu_r(op, bus),
            op if (op & 0xC7) == 0xC6 => self.op_alu_n(op, bus),
            op if (op & 0xC7) == 0x04 => self.op_inc_r(op, bus),
            op if (op & 0xC7) == 0x05 => self.op_dec_r(op, bus),
            op if (op & 0xCF) == 0x09 => self.op_add_hl_rr(op),
            op if (op & 0xCF) == 0x03 => self.op_inc_rr(op),
            op if (op & 0xCF) == 0x0B => self.op_dec_rr(op),

            // --- Branch / control flow ---
            0xC3 => self.op_jp_nn(bus),
            0xE9 => self.op_jp_hl(),
            0x18 => self.op_jr_e(bus),
            0x10 => self.op_djnz(bus),
            0xCD => self.op_call_nn(bus),
            0xC9 => self.op_ret(bus),
            0xDB => self.op_in_a_n(bus),
            0xD3 => self.op_out_n_a(bus),
            0xF3 => self.op_di(),
            0xFB => self.op_ei(),
            op if (op & 0xC7) == 0xC2 => self.op_jp_cc_nn(op, bus),
            op if (op & 0xE7) == 0x20 => self.op_jr_cc_e(op, bus),
            op if (op & 0xC7) == 0xC4 => self.op_call_cc_nn(op, bus),
            op if (op & 0xC7) == 0xC0 => self.op_ret_cc(op, bus),
            op if (op & 0xC7) == 0xC7 => self.op_rst(op, bus),

            // Every unprefixed opcode is covered above; this arm is the
            // decoder's safety net.
            _ => {
                self.unknown_opcodes += 1;
                4
            }
        }
    }

    /// DD/FD prefix chains: the last prefix wins; ED under an index prefix
    /// executes as plain ED; CB selects the indexed bit-operation table.
    fn dispatch_index<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: IndexMode,
    ) -> u32 {
        let mut mode = mode;
        let mut prefix_cycles = 0u32;
        loop {
            let op = self.fetch_opcode(bus);
            match op {
                0xDD => {
                    mode = IndexMode::IX;
                    prefix_cycles += 4;
                }
                0xFD => {
                    mode = IndexMode::IY;
                    prefix_cycles += 4;
                }
                0xCB => {
                    self.index_mode = mode;
                    let c = self.dispatch_index_cb(bus);
                    self.index_mode = IndexMode::HL;
                    return prefix_cycles + 4 + c;
                }
                0xED => {
                    // ED cancels the index prefix
                    self.index_mode = IndexMode::HL;
                    return prefix_cycles + 4 + self.dispatch_ed(bus);
                }
                _ => {
                    self.index_mode = mode;
                    let c = self.execute_main(op, bus);
                    self.index_mode = IndexMode::HL;
                    return prefix_cycles + 4 + c;
                }
            }
        }
    }
}

impl Cpu for Z80 {
    fn reset(&mut self, _bus: &mut dyn Bus<Address = u16, Data = u8>) {
        self.pc = 0x0000;
        self.sp = 0xFFFF;
        self.a = 0xFF;
        self.f = 0xFF;
        self.i = 0;
        self.r = 0;
        self.im = 0;
        self.iff1 = false;
        self.iff2 = false;
        self.halted = false;
        self.ei_delay = false;
        self.index_mode = IndexMode::HL;
        self.nmi_previous = false;
        self.cycles = 0;
    }

    fn step(&mut self, bus: &mut dyn Bus<Address = u16, Data = u8>) -> u32 {
        Z80::step(self, bus)
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl CpuStateTrait for Z80 {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        Z80State {
            a: self.a,
            f: self.f,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a_prime: self.a_prime,
            f_prime: self.f_prime,
            b_prime: self.b_prime,
            c_prime: self.c_prime,
            d_prime: self.d_prime,
            e_prime: self.e_prime,
            h_prime: self.h_prime,
            l_prime: self.l_prime,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            halted: self.halted,
            cycles: self.cycles,
        }
    }
}
