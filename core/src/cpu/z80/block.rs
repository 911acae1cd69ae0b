use crate::core::Bus;
use crate::cpu::tables::{SZ, SZP};
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    /// ED-prefixed dispatch. Undefined ED opcodes execute as 8 T no-ops.
    pub(crate) fn dispatch_ed<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let op = self.fetch_ed_opcode(bus);
        match op {
            0x47 => self.op_ld_i_a(),
            0x4F => self.op_ld_r_a(),
            0x57 => self.op_ld_a_i(),
            0x5F => self.op_ld_a_r(),
            0x67 => self.op_rrd(bus),
            0x6F => self.op_rld(bus),

            // Block transfer / compare / I/O
            0xA0 | 0xA8 => self.op_ldi_ldd(op, bus),
            0xA1 | 0xA9 => self.op_cpi_cpd(op, bus),
            0xA2 | 0xAA => self.op_ini_ind(op, bus),
            0xA3 | 0xAB => self.op_outi_outd(op, bus),
            0xB0 | 0xB8 => self.op_ldir_lddr(op, bus),
            0xB1 | 0xB9 => self.op_cpir_cpdr(op, bus),
            0xB2 | 0xBA => self.op_inir_indr(op, bus),
            0xB3 | 0xBB => self.op_otir_otdr(op, bus),

            op if (op & 0xC7) == 0x40 => self.op_in_r_c(op, bus),
            op if (op & 0xC7) == 0x41 => self.op_out_c_r(op, bus),
            op if (op & 0xCF) == 0x42 => self.op_sbc_hl_rr(op),
            op if (op & 0xCF) == 0x43 => self.op_ld_nn_rr_ed(op, bus),
            op if (op & 0xC7) == 0x44 => self.op_neg(),
            op if (op & 0xC7) == 0x45 => self.op_retn(bus),
            op if (op & 0xC7) == 0x46 => self.op_im(op),
            op if (op & 0xCF) == 0x4A => self.op_adc_hl_rr(op),
            op if (op & 0xCF) == 0x4B => self.op_ld_rr_nn_ed(op, bus),

            // Undefined ED opcodes act as two-byte NOPs
            _ => {
                self.unknown_opcodes += 1;
                8
            }
        }
    }

    fn fetch_ed_opcode<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let op = self.fetch_byte(bus);
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
        op
    }

    /// Step HL forward or backward depending on the block direction bit
    /// (opcode bit 3: 0 = increment, 1 = decrement).
    #[inline]
    fn block_step(opcode: u8, val: u16) -> u16 {
        if opcode & 0x08 == 0 {
            val.wrapping_add(1)
        } else {
            val.wrapping_sub(1)
        }
    }

    /// LDI / LDD — 16 T. (DE) = (HL); BC counts down; PV = BC != 0.
    pub(crate) fn op_ldi_ldd<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let val = bus.read(self.get_hl());
        bus.write(self.get_de(), val);
        self.set_hl(Self::block_step(opcode, self.get_hl()));
        self.set_de(Self::block_step(opcode, self.get_de()));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::C as u8);
        if bc != 0 {
            f |= Flag::PV as u8;
        }
        self.f = f;
        16
    }

    /// LDIR / LDDR — 21 T per repeat, 16 T on the final transfer. One
    /// transfer per step: the PC is backed up over the prefix so the
    /// instruction re-executes, which keeps interrupts deliverable
    /// mid-block.
    pub(crate) fn op_ldir_lddr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        self.op_ldi_ldd(opcode, bus);
        if self.get_bc() != 0 {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    /// CPI / CPD — 16 T. Compare A with (HL); C preserved, PV = BC != 0.
    pub(crate) fn op_cpi_cpd<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let val = bus.read(self.get_hl());
        let result = self.a.wrapping_sub(val);
        self.set_hl(Self::block_step(opcode, self.get_hl()));
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        let mut f = (self.f & Flag::C as u8) | Flag::N as u8 | SZ[result as usize];
        if (self.a & 0x0F) < (val & 0x0F) {
            f |= Flag::H as u8;
        }
        if bc != 0 {
            f |= Flag::PV as u8;
        }
        self.f = f;
        16
    }

    /// CPIR / CPDR — 21/16 T. Repeats until BC = 0 or a match.
    pub(crate) fn op_cpir_cpdr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        self.op_cpi_cpd(opcode, bus);
        if self.get_bc() != 0 && !self.flag(Flag::Z) {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    /// INI / IND — 16 T. (HL) = port (BC); B counts down; Z from B, N set.
    pub(crate) fn op_ini_ind<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let val = bus.io_read(self.get_bc());
        bus.write(self.get_hl(), val);
        self.set_hl(Self::block_step(opcode, self.get_hl()));
        self.b = self.b.wrapping_sub(1);
        self.set_block_io_flags();
        16
    }

    pub(crate) fn op_inir_indr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        self.op_ini_ind(opcode, bus);
        if self.b != 0 {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    /// OUTI / OUTD — 16 T. B counts down before the port address is used.
    pub(crate) fn op_outi_outd<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let val = bus.read(self.get_hl());
        self.b = self.b.wrapping_sub(1);
        bus.io_write(self.get_bc(), val);
        self.set_hl(Self::block_step(opcode, self.get_hl()));
        self.set_block_io_flags();
        16
    }

    pub(crate) fn op_otir_otdr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        self.op_outi_outd(opcode, bus);
        if self.b != 0 {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    fn set_block_io_flags(&mut self) {
        let f = (self.f & Flag::C as u8) | Flag::N as u8 | SZ[self.b as usize];
        self.f = f;
    }

    /// RRD — 18 T. Low nibble of A rotates through (HL) rightward.
    pub(crate) fn op_rrd<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.get_hl();
        let mem = bus.read(addr);
        bus.write(addr, (self.a << 4) | (mem >> 4));
        self.a = (self.a & 0xF0) | (mem & 0x0F);
        self.set_nibble_rotate_flags();
        18
    }

    /// RLD — 18 T. Low nibble of A rotates through (HL) leftward.
    pub(crate) fn op_rld<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.get_hl();
        let mem = bus.read(addr);
        bus.write(addr, (mem << 4) | (self.a & 0x0F));
        self.a = (self.a & 0xF0) | (mem >> 4);
        self.set_nibble_rotate_flags();
        18
    }

    fn set_nibble_rotate_flags(&mut self) {
        self.f = (self.f & Flag::C as u8) | SZP[self.a as usize];
    }

    /// IN r, (C) — 12 T. S/Z/P from the value, H/N cleared, C preserved.
    /// r = 6 sets flags only (IN F,(C)).
    pub(crate) fn op_in_r_c<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let r = (opcode >> 3) & 0x07;
        let val = bus.io_read(self.get_bc());
        if r != 6 {
            self.set_reg8(r, val);
        }
        self.f = (self.f & Flag::C as u8) | SZP[val as usize];
        12
    }

    /// OUT (C), r — 12 T. r = 6 outputs 0 (undocumented OUT (C),0).
    pub(crate) fn op_out_c_r<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let r = (opcode >> 3) & 0x07;
        let val = if r == 6 { 0 } else { self.get_reg8(r) };
        bus.io_write(self.get_bc(), val);
        12
    }
}
