use crate::core::Bus;
use crate::cpu::i8080::I8080;

impl I8080 {
    /// MOV r,r — 5; MOV r,M / MOV M,r — 7
    pub(crate) fn op_mov<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;
        match (dst, src) {
            (6, s) => {
                let val = self.get_reg8(s);
                bus.write(self.get_hl(), val);
                7
            }
            (d, 6) => {
                let val = bus.read(self.get_hl());
                self.set_reg8(d, val);
                7
            }
            (d, s) => {
                let val = self.get_reg8(s);
                self.set_reg8(d, val);
                5
            }
        }
    }

    /// MVI r — 7; MVI M — 10
    pub(crate) fn op_mvi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let val = self.fetch_byte(bus);
        if dst == 6 {
            bus.write(self.get_hl(), val);
            10
        } else {
            self.set_reg8(dst, val);
            7
        }
    }

    /// LXI rp, nn — 10
    pub(crate) fn op_lxi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let rp = (opcode >> 4) & 0x03;
        let val = self.fetch_word(bus);
        self.set_rp(rp, val);
        10
    }

    /// STAX B/D — 7
    pub(crate) fn op_stax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let addr = if opcode == 0x02 {
            self.get_bc()
        } else {
            self.get_de()
        };
        bus.write(addr, self.a);
        7
    }

    /// LDAX B/D — 7
    pub(crate) fn op_ldax<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: u8,
        bus: &mut B,
    ) -> u32 {
        let addr = if opcode == 0x0A {
            self.get_bc()
        } else {
            self.get_de()
        };
        self.a = bus.read(addr);
        7
    }

    /// STA nn — 13
    pub(crate) fn op_sta<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.a);
        13
    }

    /// LDA nn — 13
    pub(crate) fn op_lda<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        self.a = bus.read(addr);
        13
    }

    /// SHLD nn — 16
    pub(crate) fn op_shld<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.l);
        bus.write(addr.wrapping_add(1), self.h);
        16
    }

    /// LHLD nn — 16
    pub(crate) fn op_lhld<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.fetch_word(bus);
        self.l = bus.read(addr);
        self.h = bus.read(addr.wrapping_add(1));
        16
    }

    /// XCHG — 4. Swap DE and HL.
    pub(crate) fn op_xchg(&mut self) -> u32 {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
        4
    }
}
