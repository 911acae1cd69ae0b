use crate::core::software::SoftwareImage;

/// Describes a single input a machine accepts.
pub struct InputButton {
    /// Machine-defined key identifier, passed to `set_key()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "ENTER", "A").
    pub name: &'static str,
}

/// Machine-agnostic interface for emulated systems.
///
/// Each machine (apple1, trs80, altair) implements this trait so that a host
/// can drive any of them uniformly: feed input, run bounded cycle budgets,
/// and read display snapshots. The host never sees the hardware inside
/// (PIAs, keyboard matrices, panel LEDs) — only this surface.
pub trait Machine {
    /// Reset the machine to its power-on state.
    fn reset(&mut self);

    /// Run at most one instruction past `max_cycles` CPU cycles and return
    /// the cycles actually consumed. Consumes at least `max_cycles` unless
    /// the machine refuses to run (e.g. a stopped front panel returns 0).
    ///
    /// Callers enforce wall-clock pacing by sizing the budget to one frame
    /// (`clock_hz / 60`).
    fn run(&mut self, max_cycles: u64) -> u64;

    /// Handle a key event. `key` is a machine-defined ID from `input_map()`
    /// (matrix slot for trs80, 7-bit ASCII for apple1). Called per-event;
    /// events arriving between runs are observed at the start of the next
    /// run.
    fn set_key(&mut self, key: u8, pressed: bool);

    /// Queue a byte for the machine's serial console. Machines without a
    /// serial port ignore it.
    fn serial_input(&mut self, _byte: u8) {}

    /// Drain bytes the machine wrote to its serial console output.
    fn take_serial_output(&mut self) -> Vec<u8> {
        Vec::new()
    }

    /// List of inputs this machine accepts, for host key-map discovery.
    fn input_map(&self) -> &[InputButton];

    /// Apply a software entry: write each region through the machine's load
    /// path, then either reset (the entry overlays ROM space, so the CPU
    /// must see the new vectors) or jump the CPU to the entry point.
    /// An entry with no regions is a no-op.
    fn load_software(&mut self, image: &SoftwareImage);

    /// Text snapshot of the display, one string per row, padded to the
    /// machine's display width.
    fn display_lines(&self) -> Vec<String>;

    /// True while the CPU sits in a HALT state.
    fn is_halted(&self) -> bool;

    /// Total CPU cycles executed since the last reset.
    fn cycles(&self) -> u64;
}
