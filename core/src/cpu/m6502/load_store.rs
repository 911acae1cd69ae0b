use crate::core::Bus;
use crate::cpu::m6502::{M6502, Mode};

impl M6502 {
    /// Resolve an operand address. The bool is true when indexing crossed a
    /// page boundary (one extra cycle on read instructions).
    pub(crate) fn operand_addr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> (u16, bool) {
        match mode {
            Mode::Imm => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            Mode::Zp => (self.fetch_byte(bus) as u16, false),
            Mode::ZpX => {
                // Zero-page indexing wraps within page zero
                let base = self.fetch_byte(bus);
                (base.wrapping_add(self.x) as u16, false)
            }
            Mode::ZpY => {
                let base = self.fetch_byte(bus);
                (base.wrapping_add(self.y) as u16, false)
            }
            Mode::Abs => (self.fetch_word(bus), false),
            Mode::AbsX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.x as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            Mode::AbsY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(self.y as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            Mode::IndX => {
                // Pointer fetch wraps within page zero, including the high byte
                let ptr = self.fetch_byte(bus).wrapping_add(self.x);
                let lo = bus.read(ptr as u16) as u16;
                let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
                ((hi << 8) | lo, false)
            }
            Mode::IndY => {
                let ptr = self.fetch_byte(bus);
                let lo = bus.read(ptr as u16) as u16;
                let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.y as u16);
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
        }
    }

    /// Fetch the operand value; the extra cycle is 1 when a read-type
    /// instruction crossed a page.
    pub(crate) fn read_operand<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> (u8, u32) {
        let (addr, crossed) = self.operand_addr(bus, mode);
        (bus.read(addr), crossed as u32)
    }

    /// Base cycles for read instructions (LDA/ADC/CMP/AND/...).
    pub(crate) fn read_cycles(mode: Mode) -> u32 {
        match mode {
            Mode::Imm => 2,
            Mode::Zp => 3,
            Mode::ZpX | Mode::ZpY | Mode::Abs => 4,
            Mode::AbsX | Mode::AbsY => 4, // +1 on page cross
            Mode::IndX => 6,
            Mode::IndY => 5, // +1 on page cross
        }
    }

    /// Cycles for store instructions. Indexed stores always pay the
    /// address-fixup cycle, page cross or not.
    pub(crate) fn store_cycles(mode: Mode) -> u32 {
        match mode {
            Mode::Zp => 3,
            Mode::ZpX | Mode::ZpY | Mode::Abs => 4,
            Mode::AbsX | Mode::AbsY => 5,
            Mode::IndX | Mode::IndY => 6,
            Mode::Imm => unreachable!("store with immediate mode"),
        }
    }

    /// Cycles for read-modify-write instructions (shifts, INC/DEC).
    pub(crate) fn rmw_cycles(mode: Mode) -> u32 {
        match mode {
            Mode::Zp => 5,
            Mode::ZpX | Mode::Abs => 6,
            Mode::AbsX => 7,
            _ => unreachable!("RMW with mode {mode:?}"),
        }
    }

    // --- Loads ---

    pub(crate) fn op_lda<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.a = val;
        self.set_nz(self.a);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_ldx<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.x = val;
        self.set_nz(self.x);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_ldy<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.y = val;
        self.set_nz(self.y);
        Self::read_cycles(mode) + extra
    }

    // --- Stores ---

    pub(crate) fn op_sta<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (addr, _) = self.operand_addr(bus, mode);
        bus.write(addr, self.a);
        Self::store_cycles(mode)
    }

    pub(crate) fn op_stx<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (addr, _) = self.operand_addr(bus, mode);
        bus.write(addr, self.x);
        Self::store_cycles(mode)
    }

    pub(crate) fn op_sty<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (addr, _) = self.operand_addr(bus, mode);
        bus.write(addr, self.y);
        Self::store_cycles(mode)
    }
}
