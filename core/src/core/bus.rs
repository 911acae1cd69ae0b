/// Generic bus interface for the per-machine memory maps.
///
/// A machine's bus maps a 16-bit address to RAM, ROM, or a device register.
/// Addresses are masked to the bus width on entry; reads of unmapped space
/// return 0 and writes to read-only space are dropped — the bus never fails.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for the 8-bit machines
    type Data; // u8

    fn read(&mut self, addr: Self::Address) -> Self::Data;
    fn write(&mut self, addr: Self::Address, data: Self::Data);

    /// Read from I/O port address space (separate from memory on Z80/8080).
    /// Default maps to memory read; override for CPUs with separate I/O.
    fn io_read(&mut self, addr: Self::Address) -> Self::Data {
        self.read(addr)
    }

    /// Write to I/O port address space (separate from memory on Z80/8080).
    /// Default maps to memory write; override for CPUs with separate I/O.
    fn io_write(&mut self, addr: Self::Address, data: Self::Data) {
        self.write(addr, data)
    }

    /// Current state of the interrupt lines. CPUs sample this at each
    /// instruction boundary: IRQ is level-triggered (the bus keeps reporting
    /// it until the device is acknowledged), NMI is edge-detected by the CPU.
    fn check_interrupts(&self) -> InterruptState;

    /// Interrupt-acknowledge cycle: the CPU accepted the IRQ it sampled.
    /// Devices that assert a level-triggered line drop it here (or when
    /// their status port is read, whichever comes first).
    fn irq_ack(&mut self) {}
}

#[derive(Default, Clone, Copy, Debug)]
pub struct InterruptState {
    pub nmi: bool,
    pub irq: bool,
    /// Byte the interrupting device drives onto the data bus during the
    /// acknowledge cycle (Z80 IM 0/IM 2 vector, 8080 RST opcode).
    pub irq_vector: u8,
}
