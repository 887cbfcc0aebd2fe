//! # User-space GPIO driver for the MediaTek MT7628 family of SoCs
//!
//! This crate drives the GPIO controller of the MT7628/MT7688 (found for
//! example on the VoCore2 board) from user space. It maps the physical
//! register block of the controller through the memory device into the
//! process's address space and performs every pin operation as a volatile
//! 32-bit access against the live hardware registers on top of the
//! [mt7628] peripheral access crate.
//!
//! The typed pin abstractions implement traits specified by the
//! [embedded-hal](https://github.com/rust-embedded/embedded-hal) project,
//! making them compatible with various drivers in the embedded rust
//! ecosystem.
//!
//! The mapped register block is shared with the kernel and the hardware
//! itself, so no read-modify-write sequence performed by this crate is
//! atomic. Driving the controller from more than one thread requires
//! external serialization of all register accesses.

pub mod gpio;
pub mod mmap;

pub use gpio::{Direction, Gpio, InvalidPinOffset, PinState, Polarity};
pub use mmap::{MappingError, RegisterWindow};
