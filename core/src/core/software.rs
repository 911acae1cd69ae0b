//! Loaded software entries.
//!
//! A `SoftwareImage` is the engine-side shape of a program to run: one or
//! more byte regions plus an entry point. Loaders (file-format parsers, URL
//! fetchers) live outside the engine and construct these; the per-machine
//! `System::load_software` consumes them.

use std::ops::RangeInclusive;

/// A contiguous run of bytes to place at `start`. Regions wrap at 0xFFFF.
#[derive(Clone, Debug, PartialEq)]
pub struct SoftwareRegion {
    pub start: u16,
    pub bytes: Vec<u8>,
}

impl SoftwareRegion {
    pub fn new(start: u16, bytes: Vec<u8>) -> Self {
        Self { start, bytes }
    }

    /// True if any byte of this region lands inside `window` (wrapping at
    /// the 64 KiB boundary).
    pub fn overlaps(&self, window: RangeInclusive<u16>) -> bool {
        (0..self.bytes.len()).any(|i| {
            let addr = self.start.wrapping_add(i as u16);
            window.contains(&addr)
        })
    }
}

/// A program ready to load into a machine.
#[derive(Clone, Debug, Default)]
pub struct SoftwareImage {
    pub regions: Vec<SoftwareRegion>,
    pub entry_point: u16,
}

impl SoftwareImage {
    pub fn new(entry_point: u16) -> Self {
        Self {
            regions: Vec::new(),
            entry_point,
        }
    }

    /// Single-region image starting (and entered) at `start`.
    pub fn single(start: u16, bytes: Vec<u8>) -> Self {
        Self {
            regions: vec![SoftwareRegion::new(start, bytes)],
            entry_point: start,
        }
    }

    pub fn with_region(mut self, start: u16, bytes: Vec<u8>) -> Self {
        self.regions.push(SoftwareRegion::new(start, bytes));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Classification: does any region land in the machine's ROM window?
    /// Such entries force a post-load reset so the CPU fetches the new
    /// reset vector instead of jumping to `entry_point`.
    pub fn overlaps(&self, window: RangeInclusive<u16>) -> bool {
        self.regions
            .iter()
            .any(|r| r.overlaps(window.clone()))
    }
}
