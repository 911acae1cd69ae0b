use crate::core::Bus;
use crate::cpu::tables::SZP;
use crate::cpu::z80::{Flag, Z80};

impl Z80 {
    /// CB-prefixed dispatch. The opcode encodes group (bits 7-6), bit
    /// number or rotate kind (bits 5-3), and register (bits 2-0).
    pub(crate) fn dispatch_cb<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let op = self.fetch_cb_opcode(bus);
        let r = op & 0x07;
        let b = (op >> 3) & 0x07;

        match op >> 6 {
            0 => {
                // Rotate/shift group
                if r == 6 {
                    let addr = self.get_hl();
                    let val = bus.read(addr);
                    let result = self.perform_rot(b, val);
                    bus.write(addr, result);
                    15
                } else {
                    let result = self.perform_rot(b, self.get_reg8(r));
                    self.set_reg8(r, result);
                    8
                }
            }
            1 => {
                // BIT b, r
                if r == 6 {
                    let val = bus.read(self.get_hl());
                    self.bit_flags(b, val);
                    12
                } else {
                    self.bit_flags(b, self.get_reg8(r));
                    8
                }
            }
            2 => {
                // RES b, r
                if r == 6 {
                    let addr = self.get_hl();
                    let val = bus.read(addr) & !(1 << b);
                    bus.write(addr, val);
                    15
                } else {
                    let val = self.get_reg8(r) & !(1 << b);
                    self.set_reg8(r, val);
                    8
                }
            }
            _ => {
                // SET b, r
                if r == 6 {
                    let addr = self.get_hl();
                    let val = bus.read(addr) | (1 << b);
                    bus.write(addr, val);
                    15
                } else {
                    let val = self.get_reg8(r) | (1 << b);
                    self.set_reg8(r, val);
                    8
                }
            }
        }
    }

    /// DD CB d op / FD CB d op: the displacement precedes the sub-opcode,
    /// which is read as data (no refresh). All forms act on memory; the
    /// undocumented non-(HL) register fields also copy the result into
    /// that register.
    pub(crate) fn dispatch_index_cb<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let addr = self.index_addr(bus);
        let op = self.fetch_byte(bus);
        let r = op & 0x07;
        let b = (op >> 3) & 0x07;

        match op >> 6 {
            1 => {
                // BIT b, (IX+d) — 20 T total (the prefix fetch is charged
                // by the index dispatcher)
                let val = bus.read(addr);
                self.bit_flags(b, val);
                16
            }
            group => {
                // Rotate/RES/SET on (IX+d) — 23 T total
                let val = bus.read(addr);
                let result = match group {
                    0 => self.perform_rot(b, val),
                    2 => val & !(1 << b),
                    _ => val | (1 << b),
                };
                bus.write(addr, result);
                if r != 6 {
                    self.set_reg8(r, result);
                }
                19
            }
        }
    }

    /// CB sub-opcode fetch is an M1 cycle (R refresh).
    fn fetch_cb_opcode<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let op = self.fetch_byte(bus);
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
        op
    }

    /// Rotate/shift kinds: RLC RRC RL RR SLA SRA SLL SRL. SLL is the
    /// undocumented shift-left that feeds a 1 into bit 0. Flags: S/Z/P
    /// from the result, C from the shifted-out bit, H and N cleared.
    pub(crate) fn perform_rot(&mut self, kind: u8, val: u8) -> u8 {
        let carry_in = self.flag(Flag::C) as u8;
        let (result, carry_out) = match kind {
            0 => (val.rotate_left(1), val & 0x80 != 0),          // RLC
            1 => (val.rotate_right(1), val & 0x01 != 0),         // RRC
            2 => ((val << 1) | carry_in, val & 0x80 != 0),       // RL
            3 => ((val >> 1) | (carry_in << 7), val & 0x01 != 0), // RR
            4 => (val << 1, val & 0x80 != 0),                    // SLA
            5 => ((val >> 1) | (val & 0x80), val & 0x01 != 0),   // SRA
            6 => ((val << 1) | 0x01, val & 0x80 != 0),           // SLL
            _ => (val >> 1, val & 0x01 != 0),                    // SRL
        };

        let mut f = SZP[result as usize];
        if carry_out {
            f |= Flag::C as u8;
        }
        self.f = f;
        result
    }

    /// BIT flags: Z (and PV) reflect the tested bit, H set, N cleared,
    /// S only for a set bit 7, C preserved.
    pub(crate) fn bit_flags(&mut self, bit: u8, val: u8) {
        let bit_set = (val & (1 << bit)) != 0;
        let mut f = (self.f & Flag::C as u8) | Flag::H as u8;
        if !bit_set {
            f |= Flag::Z as u8 | Flag::PV as u8;
        }
        if bit == 7 && bit_set {
            f |= Flag::S as u8;
        }
        self.f = f;
    }
}
