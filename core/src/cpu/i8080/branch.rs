use crate::core::Bus;
use crate::cpu::i8080::{Flag, I8080};

impl I8080 {
    /// Condition by opcode field: NZ, Z, NC, C, PO, PE, P, M.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        match cc {
            0 => !self.flag(Flag::Z),
            1 => self.flag(Flag::Z),
            2 => !self.flag(Flag::C),
            3 => self.flag(Flag::C),
            4 => !self.flag(Flag::P),
            5 => self.flag(Flag::P),
            6 => !self.flag(Flag::S),
            7 => self.flag(Flag::S),
            _ => unreachable!(),
        }
    }

    /// JMP nn — 10
    pub(crate) fn op_jmp<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.fetch_word(bus);
        10
    }

    /// Jcc nn — 10 (taken or not; the 8080 always pays the full fetch)
    pub(crate) fn op_jcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
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

    /// CALL nn — 17
    pub(crate) fn op_call<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let target = self.fetch_word(bus);
        self.push_word(bus, self.pc);
        self.pc = target;
        17
    }

    /// Ccc nn — 17 taken / 11 not taken
    pub(crate) fn op_ccc<B: Bus<Address = u16, Data = u8> + ?Sized>(
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
            11
        }
    }

    /// RET — 10
    pub(crate) fn op_ret<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.pop_word(bus);
        10
    }

    /// Rcc — 11 taken / 5 not taken
    pub(crate) fn op_rcc<B: Bus<Address = u16, Data = u8> + ?Sized>(
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

    /// RST n — 11. Target = n * 8.
    pub(crate) fn op_rst<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        self.push_word(bus, self.pc);
        self.pc = (opcode & 0x38) as u16;
        11
    }
}
