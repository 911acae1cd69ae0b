use crate::core::Bus;
use crate::cpu::m6502::{M6502, Mode, StatusFlag};

impl M6502 {
    /// ADC core. Binary mode is the usual two's-complement add; decimal
    /// mode applies the NMOS per-nibble correction, with Z taken from the
    /// binary sum and N/V from the intermediate high nibble.
    pub(crate) fn perform_adc(&mut self, val: u8) {
        let carry_in = self.flag(StatusFlag::C) as u16;

        if self.flag(StatusFlag::D) {
            let a = self.a as u16;
            let v = val as u16;
            let binary = a + v + carry_in;
            self.set_flag(StatusFlag::Z, (binary & 0xFF) == 0);

            let mut lo = (a & 0x0F) + (v & 0x0F) + carry_in;
            let mut hi = (a & 0xF0) + (v & 0xF0);
            if lo > 0x09 {
                hi += 0x10;
                lo += 0x06;
            }
            self.set_flag(StatusFlag::N, (hi & 0x80) != 0);
            self.set_flag(
                StatusFlag::V,
                ((a ^ v) & 0x80) == 0 && ((a ^ hi) & 0x80) != 0,
            );
            if hi > 0x90 {
                hi += 0x60;
            }
            self.set_flag(StatusFlag::C, hi > 0xFF);
            self.a = ((hi & 0xF0) | (lo & 0x0F)) as u8;
        } else {
            let sum = self.a as u16 + val as u16 + carry_in;
            let result = sum as u8;
            self.set_flag(StatusFlag::C, sum > 0xFF);
            // V: operands agree in sign, result disagrees
            self.set_flag(
                StatusFlag::V,
                ((self.a ^ result) & (val ^ result) & 0x80) != 0,
            );
            self.a = result;
            self.set_nz(self.a);
        }
    }

    /// SBC core. In decimal mode N/V/Z/C come from the binary difference;
    /// only the stored result is nibble-adjusted.
    pub(crate) fn perform_sbc(&mut self, val: u8) {
        let borrow = !self.flag(StatusFlag::C) as i16;
        let a = self.a as i16;
        let v = val as i16;
        let diff = a - v - borrow;
        let result = diff as u8;

        self.set_flag(StatusFlag::C, diff >= 0);
        self.set_flag(
            StatusFlag::V,
            ((self.a ^ val) & (self.a ^ result) & 0x80) != 0,
        );
        self.set_nz(result);

        if self.flag(StatusFlag::D) {
            let mut lo = (a & 0x0F) - (v & 0x0F) - borrow;
            let mut hi = (a >> 4) - (v >> 4);
            if lo < 0 {
                lo -= 6;
                hi -= 1;
            }
            if hi < 0 {
                hi -= 6;
            }
            self.a = (((hi as u8) << 4) & 0xF0) | ((lo as u8) & 0x0F);
        } else {
            self.a = result;
        }
    }

    /// Compare: subtract without storing. C = no borrow, N/Z from the
    /// difference.
    pub(crate) fn perform_cmp(&mut self, reg: u8, val: u8) {
        let diff = reg.wrapping_sub(val);
        self.set_flag(StatusFlag::C, reg >= val);
        self.set_nz(diff);
    }

    pub(crate) fn op_adc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.perform_adc(val);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_sbc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.perform_sbc(val);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_cmp<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.perform_cmp(self.a, val);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_cpx<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.perform_cmp(self.x, val);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_cpy<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.perform_cmp(self.y, val);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_and<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.a &= val;
        self.set_nz(self.a);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_ora<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.a |= val;
        self.set_nz(self.a);
        Self::read_cycles(mode) + extra
    }

    pub(crate) fn op_eor<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, extra) = self.read_operand(bus, mode);
        self.a ^= val;
        self.set_nz(self.a);
        Self::read_cycles(mode) + extra
    }

    /// BIT: Z from A & M, N and V copied from memory bits 7 and 6.
    pub(crate) fn op_bit<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        let (val, _) = self.read_operand(bus, mode);
        self.set_flag(StatusFlag::Z, (self.a & val) == 0);
        self.set_flag(StatusFlag::N, (val & 0x80) != 0);
        self.set_flag(StatusFlag::V, (val & 0x40) != 0);
        Self::read_cycles(mode)
    }
}
