use crate::core::Bus;
use crate::cpu::m6502::{M6502, Mode, StatusFlag};

impl M6502 {
    pub(crate) fn perform_asl(&mut self, val: u8) -> u8 {
        let result = val << 1;
        self.set_flag(StatusFlag::C, (val & 0x80) != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn perform_lsr(&mut self, val: u8) -> u8 {
        let result = val >> 1;
        self.set_flag(StatusFlag::C, (val & 0x01) != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn perform_rol(&mut self, val: u8) -> u8 {
        let carry_in = self.flag(StatusFlag::C) as u8;
        let result = (val << 1) | carry_in;
        self.set_flag(StatusFlag::C, (val & 0x80) != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn perform_ror(&mut self, val: u8) -> u8 {
        let carry_in = (self.flag(StatusFlag::C) as u8) << 7;
        let result = (val >> 1) | carry_in;
        self.set_flag(StatusFlag::C, (val & 0x01) != 0);
        self.set_nz(result);
        result
    }

    /// Read-modify-write helper: fetch, transform, write back.
    fn rmw<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
        f: fn(&mut Self, u8) -> u8,
    ) -> u32 {
        let (addr, _) = self.operand_addr(bus, mode);
        let val = bus.read(addr);
        let result = f(self, val);
        bus.write(addr, result);
        Self::rmw_cycles(mode)
    }

    pub(crate) fn op_asl<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        self.rmw(bus, mode, Self::perform_asl)
    }

    pub(crate) fn op_lsr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        self.rmw(bus, mode, Self::perform_lsr)
    }

    pub(crate) fn op_rol<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        self.rmw(bus, mode, Self::perform_rol)
    }

    pub(crate) fn op_ror<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        self.rmw(bus, mode, Self::perform_ror)
    }

    pub(crate) fn op_inc<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        self.rmw(bus, mode, |cpu, v| {
            let result = v.wrapping_add(1);
            cpu.set_nz(result);
            result
        })
    }

    pub(crate) fn op_dec<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        mode: Mode,
    ) -> u32 {
        self.rmw(bus, mode, |cpu, v| {
            let result = v.wrapping_sub(1);
            cpu.set_nz(result);
            result
        })
    }
}
