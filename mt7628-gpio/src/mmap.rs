//! # Register window mapping module
//!
//! The GPIO register block lives in physical address space. This module owns
//! the shared read-write mapping of the page containing the block and the
//! lifetime of that mapping. Construction happens once at driver start,
//! unmapping happens when the window is dropped.
use std::fs::OpenOptions;
use std::io;

use memmap2::{MmapOptions, MmapRaw};

/// Path of the physical memory device the register window is mapped through.
pub const MEM_DEVICE_PATH: &str = "/dev/mem";

/// Physical base address of the page containing the GPIO register block.
pub const WINDOW_PHYS_ADDR: u64 = 0x1000_0000;

/// Length of the mapped window.
///
/// One page covers the full GPIO block, which starts at
/// [mt7628::gpio::GPIO_BASE_ADDR] and ends 0xAC bytes later.
pub const WINDOW_LEN: usize = 0x1000;

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("opening {MEM_DEVICE_PATH} read-write failed: {0}")]
    DeviceOpen(#[source] io::Error),
    #[error("mapping the register window failed: {0}")]
    Map(#[source] io::Error),
}

/// Shared read-write mapping of the physical page containing the GPIO block.
///
/// The window is process-wide state: it is created once, all pin operations
/// go through it, and dropping it unmaps the block. The memory device file
/// descriptor is closed as soon as the mapping is established, the mapping
/// stays valid without it.
pub struct RegisterWindow {
    mapping: MmapRaw,
}

impl RegisterWindow {
    /// Open the memory device and map the register window.
    ///
    /// There is no degraded mode without a valid window, so a failure of
    /// either step is fatal to driver construction and leaves no partial
    /// state behind.
    pub fn open() -> Result<Self, MappingError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(MEM_DEVICE_PATH)
            .map_err(MappingError::DeviceOpen)?;
        let mapping = MmapOptions::new()
            .offset(WINDOW_PHYS_ADDR)
            .len(WINDOW_LEN)
            .map_raw(&file)
            .map_err(MappingError::Map)?;
        log::info!(
            "mapped {:#x} bytes of {} at physical address {:#010x}",
            WINDOW_LEN,
            MEM_DEVICE_PATH,
            WINDOW_PHYS_ADDR
        );
        Ok(Self { mapping })
    }

    /// Virtual address of the GPIO register block inside the window.
    pub fn gpio_base_addr(&self) -> usize {
        self.mapping.as_mut_ptr() as usize + (mt7628::gpio::GPIO_BASE_ADDR - WINDOW_PHYS_ADDR as usize)
    }
}
