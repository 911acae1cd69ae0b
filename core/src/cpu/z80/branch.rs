use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    /// Condition by opcode field: NZ, Z, NC, C, PO, PE, P, M.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        match cc {
            0 => !self.flag(Flag::Z),
            1 => self.flag(Flag::Z),
            2 => !self.flag(Flag::C),
            3 => self.flag(Flag::C),
            4 => !self.flag(Flag::PV),
            5 => self.flag(Flag::PV),
            6 => !self.flag(Flag::S),
            7 => self.flag(Flag::S),
            _ => unreachable!(),
        }
    }

    /// JP nn — 10 T
    pub(crate) fn op_jp_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        self.pc = self.fetch_word(bus);
        10
    }

    /// JP cc, nn — 10 T taken or not.
    pub(crate) fn op_jp_cc_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let target = self.fetch_word(bus);
        if self.condition((opcode >> 3) & 0x07) {
            self.pc = target;
        }
        10
    }

    /// JP (HL) — 4 T (JP (IX) — 8 T total). No displacement byte.
    pub(crate) fn op_jp_hl(&mut self) -> u32 {
        self.pc = self.get_rp(2);
        4
    }

    /// JR e — 12 T
    pub(crate) fn op_jr_e<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        self.pc = self.pc.wrapping_add(offset as i16 as u16);
        12
    }

    /// JR cc, e — 12 T taken / 7 T not taken. Conditions NZ/Z/NC/C only.
    pub(crate) fn op_jr_cc_e<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        if self.condition((opcode >> 3) & 0x03) {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            12
        } else {
            7
        }
    }

    /// DJNZ e — 13 T taken / 8 T not taken. Decrements B, no flags.
    pub(crate) fn op_djnz<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        self.b = self.b.wrapping_sub(1);
        if self.b != 0 {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            13
        } else {
            8
        }
    }

    /// CALL nn — 17 T
    pub(crate) fn op_call_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let target = self.fetch_word(bus);
        self.push_word(bus, self.pc);
        self.pc = target;
        17
    }

    /// CALL cc, nn — 17 T taken / 10 T not taken.
    pub(crate) fn op_call_cc_nn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let target = self.fetch_word(bus);
        if self.condition((opcode >> 3) & 0x07) {
            self.push_word(bus, self.pc);
            self.pc = target;
            17
        } else {
            10
        }
    }

    /// RET — 10 T
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.pop_word(bus);
        10
    }

    /// RET cc — 11 T taken / 5 T not taken.
    pub(crate) fn op_ret_cc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        if self.condition((opcode >> 3) & 0x07) {
            self.pc = self.pop_word(bus);
            11
        } else {
            5
        }
    }

    /// RETN / RETI (ED) — 14 T. Both restore IFF1 from IFF2.
    pub(crate) fn op_retn<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        self.pc = self.pop_word(bus);
        self.iff1 = self.iff2;
        14
    }

    /// RST p — 11 T. Target = opcode bits 5-3 × 8.
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        self.push_word(bus, self.pc);
        self.pc = (opcode & 0x38) as u16;
        11
    }

    /// IN A, (n) — 11 T. A on the upper address lines; no flags.
    pub(crate) fn op_in_a_n<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let port = self.fetch_byte(bus) as u16 | ((self.a as u16) << 8);
        self.a = bus.io_read(port);
        11
    }

    /// OUT (n), A — 11 T
    pub(crate) fn op_out_n_a<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let port = self.fetch_byte(bus) as u16 | ((self.a as u16) << 8);
        bus.io_write(port, self.a);
        11
    }

    /// DI — 4 T
    pub(crate) fn op_di(&mut self) -> u32 {
        self.iff1 = false;
        self.iff2 = false;
        4
    }

    /// EI — 4 T. Interrupts stay masked for one more instruction.
    pub(crate) fn op_ei(&mut self) -> u32 {
        self.iff1 = true;
        self.iff2 = true;
        self.ei_delay = true;
        4
    }

    /// IM 0/1/2 (ED) — 8 T
    pub(crate) fn op_im(&mut self, opcode: u8) -> u32 {
        self.im = match (opcode >> 3) & 0x03 {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        };
        8
    }
}
