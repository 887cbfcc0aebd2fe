//! # GPIO register module.
//!
//! The MT7628 GPIO controller manages 96 pins split into three banks of 32
//! pins each. Every register kind has one 32-bit instance per bank at a
//! stride of 0x04, followed by one reserved word up to the next kind.

/// Physical base address of the GPIO register block.
pub const GPIO_BASE_ADDR: usize = 0x1000_0600;

/// GPIO register access.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Registers {
    /// Direction control (bank 0, pins 0 to 31). 0 is input, 1 is output.
    ctrl_0: u32,
    /// Direction control (bank 1, pins 32 to 63)
    ctrl_1: u32,
    /// Direction control (bank 2, pins 64 to 95)
    ctrl_2: u32,

    _reserved_0: u32,

    /// Polarity control (bank 0). 0 is normal, 1 inverts the pin sense.
    pol_0: u32,
    /// Polarity control (bank 1)
    pol_1: u32,
    /// Polarity control (bank 2)
    pol_2: u32,

    _reserved_1: u32,

    /// Current pin data (bank 0)
    data_0: u32,
    /// Current pin data (bank 1)
    data_1: u32,
    /// Current pin data (bank 2)
    data_2: u32,

    _reserved_2: u32,

    /// Data set (bank 0). Writing 1 sets the data bit, writing 0 is a no-op.
    #[mmio(Write)]
    dset_0: u32,
    /// Data set (bank 1)
    #[mmio(Write)]
    dset_1: u32,
    /// Data set (bank 2)
    #[mmio(Write)]
    dset_2: u32,

    _reserved_3: u32,

    /// Data clear (bank 0). Writing 1 clears the data bit, writing 0 is a
    /// no-op.
    #[mmio(Write)]
    dclr_0: u32,
    /// Data clear (bank 1)
    #[mmio(Write)]
    dclr_1: u32,
    /// Data clear (bank 2)
    #[mmio(Write)]
    dclr_2: u32,

    _reserved_4: u32,

    /// Rising edge interrupt enable (bank 0)
    gint_redge_0: u32,
    /// Rising edge interrupt enable (bank 1)
    gint_redge_1: u32,
    /// Rising edge interrupt enable (bank 2)
    gint_redge_2: u32,

    _reserved_5: u32,

    /// Falling edge interrupt enable (bank 0)
    gint_fedge_0: u32,
    /// Falling edge interrupt enable (bank 1)
    gint_fedge_1: u32,
    /// Falling edge interrupt enable (bank 2)
    gint_fedge_2: u32,

    _reserved_6: u32,

    /// High level interrupt enable (bank 0)
    gint_hlvl_0: u32,
    /// High level interrupt enable (bank 1)
    gint_hlvl_1: u32,
    /// High level interrupt enable (bank 2)
    gint_hlvl_2: u32,

    _reserved_7: u32,

    /// Low level interrupt enable (bank 0)
    gint_llvl_0: u32,
    /// Low level interrupt enable (bank 1)
    gint_llvl_1: u32,
    /// Low level interrupt enable (bank 2)
    gint_llvl_2: u32,

    _reserved_8: u32,

    /// Interrupt status (bank 0), write 1 to clear
    #[mmio(PureRead, Write)]
    gint_stat_0: u32,
    /// Interrupt status (bank 1), write 1 to clear
    #[mmio(PureRead, Write)]
    gint_stat_1: u32,
    /// Interrupt status (bank 2), write 1 to clear
    #[mmio(PureRead, Write)]
    gint_stat_2: u32,

    _reserved_9: u32,

    /// Interrupt edge status (bank 0), write 1 to clear
    #[mmio(PureRead, Write)]
    gint_edge_0: u32,
    /// Interrupt edge status (bank 1), write 1 to clear
    #[mmio(PureRead, Write)]
    gint_edge_1: u32,
    /// Interrupt edge status (bank 2), write 1 to clear
    #[mmio(PureRead, Write)]
    gint_edge_2: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Registers>(), 0xAC);

impl Registers {
    /// Create a new GPIO MMIO instance at the fixed physical base address.
    ///
    /// This constructor is only usable when the physical register block is
    /// actually addressable at [GPIO_BASE_ADDR], i.e. on bare metal or with
    /// an identity-mapped address space. A user-space driver must map the
    /// block first and use [Registers::new_mmio_at] with the virtual address
    /// of the mapping.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    pub unsafe fn new_mmio_fixed() -> MmioRegisters<'static> {
        unsafe { Self::new_mmio_at(GPIO_BASE_ADDR) }
    }
}
