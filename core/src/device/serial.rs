use std::collections::VecDeque;

/// 6850-compatible serial console, the two-port subset the 8080 machine's
/// I/O bus exposes (status + data).
///
/// Input is a FIFO of 7-bit characters queued by the host; output is
/// collected in a buffer the host drains after each run (pull model — the
/// device holds no reference to its observer).
pub struct Serial2Sio {
    fifo: VecDeque<u8>,
    output: Vec<u8>,
}

/// Status bit 0: a received byte is waiting.
pub const STATUS_RX_READY: u8 = 0x01;
/// Status bit 1: transmitter ready. Always set — output never stalls.
pub const STATUS_TX_READY: u8 = 0x02;

impl Serial2Sio {
    pub fn new() -> Self {
        Self {
            fifo: VecDeque::new(),
            output: Vec::new(),
        }
    }

    /// Status register read (port 0x10).
    pub fn status(&self) -> u8 {
        let mut status = STATUS_TX_READY;
        if !self.fifo.is_empty() {
            status |= STATUS_RX_READY;
        }
        status
    }

    /// Control register write (port 0x10): accepted and discarded.
    pub fn write_control(&mut self, _val: u8) {}

    /// Data register read (port 0x11): pops the FIFO head, 0x00 when empty.
    pub fn read_data(&mut self) -> u8 {
        self.fifo.pop_front().unwrap_or(0x00)
    }

    /// Data register write (port 0x11): emits the low 7 bits.
    pub fn write_data(&mut self, val: u8) {
        self.output.push(val & 0x7F);
    }

    /// Queue a 7-bit character from the host console.
    pub fn queue_input(&mut self, byte: u8) {
        self.fifo.push_back(byte & 0x7F);
    }

    /// Drain everything the program wrote to the console.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    pub fn reset(&mut self) {
        self.fifo.clear();
        self.output.clear();
    }
}

impl Default for Serial2Sio {
    fn default() -> Self {
        Self::new()
    }
}
