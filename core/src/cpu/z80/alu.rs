use crate::core::Bus;
use crate::cpu::tables::{SZ, SZP};
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    // --- Flag helpers ---

    /// Flags for AND/XOR/OR: S/Z/P from the result, C and N cleared,
    /// H set only by AND.
    pub(crate) fn update_flags_logic(&mut self, result: u8, is_and: bool) {
        let mut f = SZP[result as usize];
        if is_and {
            f |= Flag::H as u8;
        }
        self.f = f;
    }

    pub(crate) fn do_add(&mut self, val: u8, carry_in: bool) {
        let a = self.a;
        let c = (carry_in && self.flag(Flag::C)) as u8;
        let sum = a as u16 + val as u16 + c as u16;
        let result = sum as u8;

        let mut f = SZ[result as usize];
        // H: carry out of bit 3
        if (a & 0xF) + (val & 0xF) + c > 0xF {
            f |= Flag::H as u8;
        }
        // P/V: overflow = operands agree in sign, result disagrees
        if ((a ^ result) & (val ^ result) & 0x80) != 0 {
            f |= Flag::PV as u8;
        }
        if sum > 0xFF {
            f |= Flag::C as u8;
        }
        self.a = result;
        self.f = f;
    }

    pub(crate) fn do_sub(&mut self, val: u8, carry_in: bool) {
        let a = self.a;
        let c = (carry_in && self.flag(Flag::C)) as u8;
        let diff = (a as u16).wrapping_sub(val as u16).wrapping_sub(c as u16);
        let result = diff as u8;

        let mut f = SZ[result as usize] | Flag::N as u8;
        // H: borrow from bit 4
        if (a & 0xF) < (val & 0xF) + c {
            f |= Flag::H as u8;
        }
        if ((a ^ val) & (a ^ result) & 0x80) != 0 {
            f |= Flag::PV as u8;
        }
        if diff > 0xFF {
            f |= Flag::C as u8;
        }
        self.a = result;
        self.f = f;
    }

    /// CP: subtract without storing the result.
    pub(crate) fn do_cp(&mut self, val: u8) {
        let a = self.a;
        self.do_sub(val, false);
        self.a = a;
    }

    pub(crate) fn perform_alu_op(&mut self, op: u8, val: u8) {
        match op {
            0 => self.do_add(val, false), // ADD
            1 => self.do_add(val, true),  // ADC
            2 => self.do_sub(val, false), // SUB
            3 => self.do_sub(val, true),  // SBC
            4 => {
                self.a &= val;
                self.update_flags_logic(self.a, true);
            } // AND
            5 => {
                self.a ^= val;
                self.update_flags_logic(self.a, false);
            } // XOR
            6 => {
                self.a |= val;
                self.update_flags_logic(self.a, false);
            } // OR
            7 => self.do_cp(val), // CP
            _ => unreachable!(),
        }
    }

    pub(crate) fn calc_inc_flags(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        let mut f = (self.f & Flag::C as u8) | SZ[result as usize]; // Preserve C
        if (val & 0xF) == 0xF {
            f |= Flag::H as u8;
        }
        if val == 0x7F {
            f |= Flag::PV as u8; // Overflow 7F -> 80
        }
        self.f = f;
        result
    }

    pub(crate) fn calc_dec_flags(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        let mut f = (self.f & Flag::C as u8) | Flag::N as u8 | SZ[result as usize];
        if (val & 0xF) == 0x0 {
            f |= Flag::H as u8; // Borrow from bit 4
        }
        if val == 0x80 {
            f |= Flag::PV as u8; // Overflow 80 -> 7F
        }
        self.f = f;
        result
    }

    // --- Instructions ---

    /// ALU A, r — 4 T; ALU A, (HL) — 7 T; ALU A, (IX+d) — 19 T total.
    /// Opcode mask: 10 ooo rrr
    pub(crate) fn op_alu_r<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let alu_op = (opcode >> 3) & 0x07;
        let r = opcode & 0x07;

        if r == 6 {
            let indexed = self.indexed();
            let addr = self.index_addr(bus);
            let val = bus.read(addr);
            self.perform_alu_op(alu_op, val);
            if indexed { 15 } else { 7 }
        } else {
            let val = self.get_reg8_ix(r);
            self.perform_alu_op(alu_op, val);
            4
        }
    }

    /// ALU A, n — 7 T. Opcode mask: 11 ooo 110
    pub(crate) fn op_alu_n<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let alu_op = (opcode >> 3) & 0x07;
        let val = self.fetch_byte(bus);
        self.perform_alu_op(alu_op, val);
        7
    }

    /// INC r — 4 T; INC (HL) — 11 T; INC (IX+d) — 23 T total.
    pub(crate) fn op_inc_r<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let r = (opcode >> 3) & 0x07;
        if r == 6 {
            let indexed = self.indexed();
            let addr = self.index_addr(bus);
            let val = bus.read(addr);
            let result = self.calc_inc_flags(val);
            bus.write(addr, result);
            if indexed { 19 } else { 11 }
        } else {
            let result = self.calc_inc_flags(self.get_reg8_ix(r));
            self.set_reg8_ix(r, result);
            4
        }
    }

    /// DEC r — 4 T; DEC (HL) — 11 T; DEC (IX+d) — 23 T total.
    pub(crate) fn op_dec_r<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let r = (opcode >> 3) & 0x07;
        if r == 6 {
            let indexed = self.indexed();
            let addr = self.index_addr(bus);
            let val = bus.read(addr);
            let result = self.calc_dec_flags(val);
            bus.write(addr, result);
            if indexed { 19 } else { 11 }
        } else {
            let result = self.calc_dec_flags(self.get_reg8_ix(r));
            self.set_reg8_ix(r, result);
            4
        }
    }

    /// ADD HL,rr — 11 T (ADD IX,rr — 15 T total). H from bit 11, C from
    /// bit 15, N cleared; S/Z/PV preserved.
    pub(crate) fn op_add_hl_rr(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let hl = self.get_rp(2);
        let val = self.get_rp(rp);
        let sum = hl as u32 + val as u32;

        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        if (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF {
            f |= Flag::H as u8;
        }
        if sum > 0xFFFF {
            f |= Flag::C as u8;
        }
        self.f = f;
        self.set_rp(2, sum as u16);
        11
    }

    /// ADC HL,rr — 15 T. Full 16-bit flags.
    pub(crate) fn op_adc_hl_rr(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let hl = self.get_hl();
        let val = self.get_rp(rp);
        let c = self.flag(Flag::C) as u32;
        let sum = hl as u32 + val as u32 + c;
        let result = sum as u16;

        let mut f = 0u8;
        if result == 0 {
            f |= Flag::Z as u8;
        }
        if (result & 0x8000) != 0 {
            f |= Flag::S as u8;
        }
        if (hl & 0x0FFF) + (val & 0x0FFF) + c as u16 > 0x0FFF {
            f |= Flag::H as u8;
        }
        if ((hl ^ result) & (val ^ result) & 0x8000) != 0 {
            f |= Flag::PV as u8;
        }
        if sum > 0xFFFF {
            f |= Flag::C as u8;
        }
        self.f = f;
        self.set_hl(result);
        15
    }

    /// SBC HL,rr — 15 T. Full 16-bit flags, N set.
    pub(crate) fn op_sbc_hl_rr(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let hl = self.get_hl();
        let val = self.get_rp(rp);
        let c = self.flag(Flag::C) as u32;
        let diff = (hl as u32).wrapping_sub(val as u32).wrapping_sub(c);
        let result = diff as u16;

        let mut f = Flag::N as u8;
        if result == 0 {
            f |= Flag::Z as u8;
        }
        if (result & 0x8000) != 0 {
            f |= Flag::S as u8;
        }
        if (hl & 0x0FFF) < (val & 0x0FFF) + c as u16 {
            f |= Flag::H as u8;
        }
        if ((hl ^ val) & (hl ^ result) & 0x8000) != 0 {
            f |= Flag::PV as u8;
        }
        if diff > 0xFFFF {
            f |= Flag::C as u8;
        }
        self.f = f;
        self.set_hl(result);
        15
    }

    /// INC rr — 6 T (INC IX — 10 T total). No flags.
    pub(crate) fn op_inc_rr(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        self.set_rp(rp, self.get_rp(rp).wrapping_add(1));
        6
    }

    /// DEC rr — 6 T. No flags.
    pub(crate) fn op_dec_rr(&mut self, opcode: u8) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        self.set_rp(rp, self.get_rp(rp).wrapping_sub(1));
        6
    }

    /// RLCA — 4 T. Only C/H/N affected.
    pub(crate) fn op_rlca(&mut self) -> u32 {
        let carry = (self.a & 0x80) != 0;
        self.a = self.a.rotate_left(1);
        self.f &= !(Flag::C as u8 | Flag::H as u8 | Flag::N as u8);
        if carry {
            self.f |= Flag::C as u8;
        }
        4
    }

    /// RRCA — 4 T.
    pub(crate) fn op_rrca(&mut self) -> u32 {
        let carry = (self.a & 0x01) != 0;
        self.a = self.a.rotate_right(1);
        self.f &= !(Flag::C as u8 | Flag::H as u8 | Flag::N as u8);
        if carry {
            self.f |= Flag::C as u8;
        }
        4
    }

    /// RLA — 4 T. Rotate left through carry.
    pub(crate) fn op_rla(&mut self) -> u32 {
        let carry = (self.a & 0x80) != 0;
        self.a = (self.a << 1) | self.flag(Flag::C) as u8;
        self.f &= !(Flag::C as u8 | Flag::H as u8 | Flag::N as u8);
        if carry {
            self.f |= Flag::C as u8;
        }
        4
    }

    /// RRA — 4 T. Rotate right through carry.
    pub(crate) fn op_rra(&mut self) -> u32 {
        let carry = (self.a & 0x01) != 0;
        self.a = (self.a >> 1) | ((self.flag(Flag::C) as u8) << 7);
        self.f &= !(Flag::C as u8 | Flag::H as u8 | Flag::N as u8);
        if carry {
            self.f |= Flag::C as u8;
        }
        4
    }

    /// DAA — 4 T. Post-add/post-sub decimal correction: the N flag selects
    /// the direction, H/C select the nibble corrections, C propagates.
    pub(crate) fn op_daa(&mut self) -> u32 {
        let a = self.a;
        let mut correction = 0u8;
        let mut carry = self.flag(Flag::C);

        if self.flag(Flag::H) || (a & 0x0F) > 0x09 {
            correction |= 0x06;
        }
        if carry || a > 0x99 {
            correction |= 0x60;
            carry = true;
        }

        let result = if self.flag(Flag::N) {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };

        let mut f = SZP[result as usize] | (self.f & Flag::N as u8);
        if ((a ^ result) & 0x10) != 0 {
            f |= Flag::H as u8;
        }
        if carry {
            f |= Flag::C as u8;
        }
        self.a = result;
        self.f = f;
        4
    }

    /// CPL — 4 T. Complement A; H and N set, others preserved.
    pub(crate) fn op_cpl(&mut self) -> u32 {
        self.a = !self.a;
        self.f |= Flag::H as u8 | Flag::N as u8;
        4
    }

    /// SCF — 4 T. C set, H and N cleared.
    pub(crate) fn op_scf(&mut self) -> u32 {
        self.f = (self.f & !(Flag::H as u8 | Flag::N as u8)) | Flag::C as u8;
        4
    }

    /// CCF — 4 T. H takes the old carry, C inverts, N cleared.
    pub(crate) fn op_ccf(&mut self) -> u32 {
        let old_c = self.flag(Flag::C);
        self.f &= !(Flag::C as u8 | Flag::H as u8 | Flag::N as u8);
        if old_c {
            self.f |= Flag::H as u8;
        } else {
            self.f |= Flag::C as u8;
        }
        4
    }

    /// NEG (ED) — 8 T. A = 0 − A with full subtract flags.
    pub(crate) fn op_neg(&mut self) -> u32 {
        let val = self.a;
        self.a = 0;
        self.do_sub(val, false);
        8
    }
}
