//! # PAC for the MediaTek MT7628/MT7688 family of SoCs
//!
//! This crate models the register layout of MT7628 peripheral blocks as
//! `#[repr(C)]` structures with MMIO accessors derived by
//! [derive-mmio](https://crates.io/crates/derive-mmio). All register accesses
//! performed through the generated handles are volatile 32-bit accesses.
//!
//! The crate is `no_std` and makes no assumption about how the physical
//! register block becomes addressable. On bare metal with an identity-mapped
//! address space, the `new_mmio_fixed` constructors can be used directly. A
//! user-space driver which maps the block through the operating system must
//! use the generated `new_mmio_at` constructors with the virtual address of
//! the mapping instead.
#![no_std]

pub mod gpio;
