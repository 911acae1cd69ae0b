/// 1 KiB memory-mapped video RAM, a 64×16 character grid.
///
/// The stored bytes are character-generator codes, not ASCII; renderers
/// decode them with [`glyph`]. A dirty flag is raised on every write so
/// pull-based observers know when to re-render, and the last written
/// offset is tracked so hosts can derive a cursor position without
/// knowing the ROM's internals.
pub struct VideoRam {
    data: [u8; VideoRam::SIZE],
    last_write: u16,
    dirty: bool,
}

/// One decoded display cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Glyph {
    /// Printable character
    Text(char),
    /// Inverse-video character
    Inverse(char),
    /// 2×3 block graphics; bits 0-5 select TL, TR, ML, MR, BL, BR cells
    Blocks(u8),
}

/// Decode one video byte per the machine's character generator:
/// 0x20-0x5F pass through, 0x00-0x1F fold up, 0x60-0x7F fold down,
/// 0xC0-0xFF are inverse video of the low six bits, and 0x80-0xBF are
/// 2×3 semigraphics (0x80 blank through 0xBF full block).
pub fn glyph(code: u8) -> Glyph {
    match code {
        0x00..=0x1F => Glyph::Text((code + 0x40) as char),
        0x20..=0x5F => Glyph::Text(code as char),
        0x60..=0x7F => Glyph::Text((code - 0x40) as char),
        0x80..=0xBF => Glyph::Blocks(code & 0x3F),
        _ => {
            let folded = code & 0x3F;
            let ch = if folded < 0x20 {
                (folded + 0x40) as char
            } else {
                folded as char
            };
            Glyph::Inverse(ch)
        }
    }
}

/// Plain-text rendering of one cell, for display snapshots: inverse video
/// flattens to its character, block graphics to '#' (blank block to ' ').
pub fn to_text(code: u8) -> char {
    match glyph(code) {
        Glyph::Text(ch) | Glyph::Inverse(ch) => ch,
        Glyph::Blocks(0) => ' ',
        Glyph::Blocks(_) => '#',
    }
}

impl VideoRam {
    pub const SIZE: usize = 1024;
    pub const COLUMNS: usize = 64;
    pub const ROWS: usize = 16;

    pub fn new() -> Self {
        Self {
            data: [0x20; Self::SIZE],
            last_write: 0,
            dirty: false,
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.data[(addr as usize) & (Self::SIZE - 1)]
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        let offset = addr & (Self::SIZE as u16 - 1);
        self.data[offset as usize] = val;
        self.last_write = offset;
        self.dirty = true;
    }

    /// Offset of the most recent write (cursor heuristic for hosts).
    pub fn last_write(&self) -> u16 {
        self.last_write
    }

    /// True if any cell changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub fn raw(&self) -> &[u8; Self::SIZE] {
        &self.data
    }

    /// Text snapshot, 16 rows of 64 characters.
    pub fn lines(&self) -> Vec<String> {
        (0..Self::ROWS)
            .map(|row| {
                self.data[row * Self::COLUMNS..(row + 1) * Self::COLUMNS]
                    .iter()
                    .map(|&code| to_text(code))
                    .collect()
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.data = [0x20; Self::SIZE];
        self.last_write = 0;
        self.dirty = false;
    }
}

impl Default for VideoRam {
    fn default() -> Self {
        Self::new()
    }
}
