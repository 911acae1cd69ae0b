use crate::core::Bus;
use crate::cpu::m6502::{M6502, StatusFlag};

impl M6502 {
    /// Push a byte onto the stack page (0x0100 | SP), post-decrementing SP.
    pub(crate) fn push<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        val: u8,
    ) {
        bus.write(0x0100 | self.sp as u16, val);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Pop a byte from the stack page, pre-incrementing SP.
    pub(crate) fn pop<B: Bus<Address = u16, Data = u8> + ?Sized>(&mut self, bus: &mut B) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16)
    }

    pub(crate) fn op_pha<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        self.push(bus, self.a);
        3
    }

    pub(crate) fn op_pla<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        self.a = self.pop(bus);
        self.set_nz(self.a);
        4
    }

    /// PHP pushes P with B and U both set.
    pub(crate) fn op_php<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let p_push = self.p | StatusFlag::B as u8 | StatusFlag::U as u8;
        self.push(bus, p_push);
        3
    }

    /// PLP ignores the pushed B bit; U always reads 1.
    pub(crate) fn op_plp<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> u32 {
        let val = self.pop(bus);
        self.p = (val & !(StatusFlag::B as u8)) | StatusFlag::U as u8;
        4
    }
}
