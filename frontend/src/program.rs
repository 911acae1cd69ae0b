//! Host-side program loading: raw binary images placed at a load address.

use filament_core::core::software::SoftwareImage;
use std::path::Path;

/// Errors raised while turning a file into a software entry.
#[derive(Debug)]
pub enum ProgramLoadError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),
    /// Image does not fit in the 64 KiB address space from its load address.
    TooLarge { size: usize },
    /// Empty file: nothing to load.
    Empty,
}

impl std::fmt::Display for ProgramLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::TooLarge { size } => {
                write!(f, "image is {size} bytes; it does not fit below 0x10000")
            }
            Self::Empty => write!(f, "image file is empty"),
        }
    }
}

impl std::error::Error for ProgramLoadError {}

impl From<std::io::Error> for ProgramLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Read a raw binary and wrap it as a single-region software entry.
pub fn load_program(
    path: &Path,
    load_addr: u16,
    entry: Option<u16>,
) -> Result<SoftwareImage, ProgramLoadError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(ProgramLoadError::Empty);
    }
    if bytes.len() > 0x10000 - load_addr as usize {
        return Err(ProgramLoadError::TooLarge { size: bytes.len() });
    }

    let mut image = SoftwareImage::single(load_addr, bytes);
    if let Some(entry) = entry {
        image.entry_point = entry;
    }
    Ok(image)
}

/// Parse a "0x"-optional hex address argument.
pub fn parse_addr(text: &str) -> Result<u16, String> {
    let trimmed = text.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(trimmed, 16).map_err(|e| format!("bad address {text:?}: {e}"))
}
