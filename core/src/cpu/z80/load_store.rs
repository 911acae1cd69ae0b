use crate::core::Bus;
use crate::cpu::tables::SZ;
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    /// LD r, r' — 4 T; LD r,(HL) / LD (HL),r — 7 T; indexed forms 19 T
    /// total. With an active DD/FD prefix, register operands 4/5 address
    /// IXH/IXL — unless the other operand is memory, in which case H and L
    /// mean the real registers.
    pub(crate) fn op_ld_r_r<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;

        match (dst, src) {
            (6, s) => {
                let indexed = self.indexed();
                let addr = self.index_addr(bus);
                bus.write(addr, self.get_reg8(s));
                if indexed { 15 } else { 7 }
            }
            (d, 6) => {
                let indexed = self.indexed();
                let addr = self.index_addr(bus);
                let val = bus.read(addr);
                self.set_reg8(d, val);
                if indexed { 15 } else { 7 }
            }
            (d, s) => {
                let val = self.get_reg8_ix(s);
                self.set_reg8_ix(d, val);
                4
            }
        }
    }

    /// LD r, n — 7 T; LD (HL), n — 10 T; LD (IX+d), n — 19 T total.
    /// The displacement precedes the immediate in the instruction stream.
    pub(crate) fn op_ld_r_n<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        if dst == 6 {
            let indexed = self.indexed();
            let addr = self.index_addr(bus);
            let val = self.fetch_byte(bus);
            bus.write(addr, val);
            if indexed { 15 } else { 10 }
        } else {
            let val = self.fetch_byte(bus);
            self.set_reg8_ix(dst, val);
            7
        }
    }

    /// LD rr, nn — 10 T (LD IX,nn — 14 T total).
    pub(crate) fn op_ld_rr_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let val = self.fetch_word(bus);
        self.set_rp(rp, val);
        10
    }

    /// LD (BC), A — 7 T
    pub(crate) fn op_ld_bc_a<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        bus.write(self.get_bc(), self.a);
        7
    }

    /// LD (DE), A — 7 T
    pub(crate) fn op_ld_de_a<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        bus.write(self.get_de(), self.a);
        7
    }

    /// LD A, (BC) — 7 T
    pub(crate) fn op_ld_a_bc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        self.a = bus.read(self.get_bc());
        7
    }

    /// LD A, (DE) — 7 T
    pub(crate) fn op_ld_a_de<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        self.a = bus.read(self.get_de());
        7
    }

    /// LD (nn), HL — 16 T (LD (nn),IX — 20 T total).
    pub(crate) fn op_ld_nn_hl<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.fetch_word(bus);
        self.write_word(bus, addr, self.get_rp(2));
        16
    }

    /// LD HL, (nn) — 16 T (LD IX,(nn) — 20 T total).
    pub(crate) fn op_ld_hl_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.fetch_word(bus);
        let val = self.read_word(bus, addr);
        self.set_rp(2, val);
        16
    }

    /// LD (nn), A — 13 T
    pub(crate) fn op_ld_nn_a<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.a);
        13
    }

    /// LD A, (nn) — 13 T
    pub(crate) fn op_ld_a_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.fetch_word(bus);
        self.a = bus.read(addr);
        13
    }

    /// LD SP, HL — 6 T (LD SP,IX — 10 T total).
    pub(crate) fn op_ld_sp_hl(&mut self) -> u32 {
        self.sp = self.get_rp(2);
        6
    }

    /// LD (nn), rr (ED) — 20 T
    pub(crate) fn op_ld_nn_rr_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let addr = self.fetch_word(bus);
        self.write_word(bus, addr, self.get_rp(rp));
        20
    }

    /// LD rr, (nn) (ED) — 20 T
    pub(crate) fn op_ld_rr_nn_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let addr = self.fetch_word(bus);
        let val = self.read_word(bus, addr);
        self.set_rp(rp, val);
        20
    }

    /// LD I, A (ED 47) — 9 T
    pub(crate) fn op_ld_i_a(&mut self) -> u32 {
        self.i = self.a;
        9
    }

    /// LD R, A (ED 4F) — 9 T
    pub(crate) fn op_ld_r_a(&mut self) -> u32 {
        self.r = self.a;
        9
    }

    /// LD A, I (ED 57) — 9 T. S/Z from A, H/N cleared, PV = IFF2.
    pub(crate) fn op_ld_a_i(&mut self) -> u32 {
        self.a = self.i;
        self.set_interrupt_load_flags();
        9
    }

    /// LD A, R (ED 5F) — 9 T. Same flags as LD A,I.
    pub(crate) fn op_ld_a_r(&mut self) -> u32 {
        self.a = self.r;
        self.set_interrupt_load_flags();
        9
    }

    fn set_interrupt_load_flags(&mut self) {
        let mut f = SZ[self.a as usize] | (self.f & Flag::C as u8);
        if self.iff2 {
            f |= Flag::PV as u8;
        }
        self.f = f;
    }

    /// EX AF, AF' — 4 T
    pub(crate) fn op_ex_af_af(&mut self) -> u32 {
        std::mem::swap(&mut self.a, &mut self.a_prime);
        std::mem::swap(&mut self.f, &mut self.f_prime);
        4
    }

    /// EX DE, HL — 4 T. Not affected by DD/FD prefixes.
    pub(crate) fn op_ex_de_hl(&mut self) -> u32 {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
        4
    }

    /// EXX — 4 T. Swap BC/DE/HL with the shadow set.
    pub(crate) fn op_exx(&mut self) -> u32 {
        std::mem::swap(&mut self.b, &mut self.b_prime);
        std::mem::swap(&mut self.c, &mut self.c_prime);
        std::mem::swap(&mut self.d, &mut self.d_prime);
        std::mem::swap(&mut self.e, &mut self.e_prime);
        std::mem::swap(&mut self.h, &mut self.h_prime);
        std::mem::swap(&mut self.l, &mut self.l_prime);
        4
    }

    /// EX (SP), HL — 19 T (EX (SP),IX — 23 T total).
    pub(crate) fn op_ex_sp_hl<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let from_stack = self.read_word(bus, self.sp);
        self.write_word(bus, self.sp, self.get_rp(2));
        self.set_rp(2, from_stack);
        19
    }
}
