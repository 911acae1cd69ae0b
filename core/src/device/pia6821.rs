/// MC6821 Peripheral Interface Adapter, wired the way the Apple-class
/// machine uses it: port A is the keyboard, port B the display.
///
/// Only the four data/status bytes the monitor ROM touches are modeled:
///
/// | Offset | Register | Role                                       |
/// |--------|----------|--------------------------------------------|
/// | 0      | KBD      | Key byte, bit 7 forced high                |
/// | 1      | KBDCR    | Bit 7 = key waiting                        |
/// | 2      | DSP      | Display output; bit 7 = busy (always clear)|
/// | 3      | DSPCR    | Bit 7 reads set (display always ready)     |
///
/// Reading KBD consumes the pending-key flag but keeps the byte, so a
/// second read returns the same key with KBDCR bit 7 clear.
pub struct Pia6821 {
    kbd: u8,
    kbdcr: u8,
    dsp: u8,
    dspcr: u8,
}

impl Pia6821 {
    pub fn new() -> Self {
        Self {
            kbd: 0,
            kbdcr: 0,
            dsp: 0,
            dspcr: 0,
        }
    }

    /// Latch a 7-bit key code from the keyboard. Bit 7 is forced high on
    /// the data lines, and KBDCR bit 7 flags the pending key.
    pub fn key_press(&mut self, ascii: u8) {
        self.kbd = (ascii & 0x7F) | 0x80;
        self.kbdcr |= 0x80;
    }

    /// True while a latched key has not been consumed by a KBD read.
    pub fn key_pending(&self) -> bool {
        (self.kbdcr & 0x80) != 0
    }

    /// Read a PIA register. `offset` is the low two address bits.
    pub fn read(&mut self, offset: u8) -> u8 {
        match offset & 0x03 {
            0 => {
                // Reading the key byte acknowledges it
                self.kbdcr &= 0x7F;
                self.kbd
            }
            1 => self.kbdcr,
            2 => self.dsp,
            // Display control reads ready
            _ => self.dspcr | 0x80,
        }
    }

    /// Write a PIA register. Keyboard registers are input-only. A DSP
    /// write clears the busy bit immediately (the display never stalls)
    /// and returns the emitted 7-bit byte for the terminal.
    pub fn write(&mut self, offset: u8, data: u8) -> Option<u8> {
        match offset & 0x03 {
            0 | 1 => None,
            2 => {
                self.dsp = data & 0x7F;
                Some(data & 0x7F)
            }
            _ => {
                self.dspcr = data & 0x7F;
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.kbd = 0;
        self.kbdcr = 0;
        self.dsp = 0;
        self.dspcr = 0;
    }
}

impl Default for Pia6821 {
    fn default() -> Self {
        Self::new()
    }
}
