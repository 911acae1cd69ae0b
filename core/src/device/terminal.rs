/// 40×24 terminal fed by the PIA display port.
///
/// The character generator has no lowercase: only 0x20-0x5F are printable,
/// 0x0D starts a new line, everything else is dropped on the floor. The
/// buffer always holds exactly 24 rows; scrolling discards row 0.
pub struct TerminalModel {
    grid: [[u8; TerminalModel::COLUMNS]; TerminalModel::ROWS],
    cursor_row: usize,
    cursor_col: usize,
    dirty: bool,
}

impl TerminalModel {
    pub const COLUMNS: usize = 40;
    pub const ROWS: usize = 24;

    pub fn new() -> Self {
        Self {
            grid: [[b' '; Self::COLUMNS]; Self::ROWS],
            cursor_row: 0,
            cursor_col: 0,
            dirty: false,
        }
    }

    /// Consume one byte of the display stream.
    pub fn receive(&mut self, byte: u8) {
        match byte & 0x7F {
            0x0D => self.newline(),
            ch @ 0x20..=0x5F => {
                self.grid[self.cursor_row][self.cursor_col] = ch;
                self.cursor_col += 1;
                if self.cursor_col == Self::COLUMNS {
                    self.newline();
                }
                self.dirty = true;
            }
            _ => {} // Not in the character generator
        }
    }

    fn newline(&mut self) {
        self.cursor_col = 0;
        if self.cursor_row + 1 == Self::ROWS {
            self.scroll();
        } else {
            self.cursor_row += 1;
        }
        self.dirty = true;
    }

    /// Drop row 0, shift everything up, blank the bottom row.
    fn scroll(&mut self) {
        self.grid.copy_within(1.., 0);
        self.grid[Self::ROWS - 1] = [b' '; Self::COLUMNS];
    }

    /// Current cursor position as (row, col).
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Snapshot of the screen, each row exactly 40 characters.
    pub fn lines(&self) -> Vec<String> {
        self.grid
            .iter()
            .map(|row| row.iter().map(|&b| b as char).collect())
            .collect()
    }

    /// True if the screen changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub fn reset(&mut self) {
        self.grid = [[b' '; Self::COLUMNS]; Self::ROWS];
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.dirty = false;
    }
}

impl Default for TerminalModel {
    fn default() -> Self {
        Self::new()
    }
}
