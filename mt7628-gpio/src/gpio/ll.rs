//! Low-level GPIO access module.
use mt7628::gpio::MmioRegisters;

/// Number of GPIO pins of the controller.
pub const NUM_PINS: usize = 96;

#[derive(Debug, thiserror::Error)]
#[error("invalid GPIO pin offset {0}, only pins 0 to 95 exist")]
pub struct InvalidPinOffset(pub usize);

impl embedded_hal::digital::Error for InvalidPinOffset {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Validated pin offset in the flat 0 to 95 pin space.
///
/// A pin offset larger than 95 never addresses memory: the constructor is
/// the only way to obtain a value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinOffset(usize);

impl PinOffset {
    /// Returns [InvalidPinOffset] if offset is larger than 95.
    pub const fn new(offset: usize) -> Result<Self, InvalidPinOffset> {
        if offset >= NUM_PINS {
            return Err(InvalidPinOffset(offset));
        }
        Ok(Self(offset))
    }

    pub const fn offset(&self) -> usize {
        self.0
    }

    /// Bank index of the pin. Bank 0 covers pins 0 to 31, bank 1 covers pins
    /// 32 to 63 and bank 2 covers pins 64 to 95.
    pub const fn bank(&self) -> usize {
        match self.0 {
            0..=31 => 0,
            32..=63 => 1,
            _ => 2,
        }
    }

    /// Bit position of the pin inside the 32-bit registers of its bank.
    pub const fn local_offset(&self) -> usize {
        match self.0 {
            0..=31 => self.0,
            32..=63 => self.0 - 32,
            _ => self.0 - 64,
        }
    }
}

/// Raw driver for one pin of the GPIO controller.
///
/// All mutating operations on the control and polarity registers are
/// non-atomic read-modify-write sequences against live hardware state. Data
/// writes go through the data set and data clear registers, which act on a
/// single written 1 bit and therefore need no read-modify-write.
pub struct LowLevelGpio {
    offset: PinOffset,
    regs: MmioRegisters<'static>,
}

impl LowLevelGpio {
    pub fn new(regs: MmioRegisters<'static>, offset: PinOffset) -> Self {
        Self { offset, regs }
    }

    pub fn offset(&self) -> PinOffset {
        self.offset
    }

    /// Configure the pin as an output pin.
    pub fn configure_as_output(&mut self) {
        let (offset, ctrl) = self.ctrl_reg_and_local_offset();
        let mut curr_ctrl = unsafe { core::ptr::read_volatile(ctrl) };
        curr_ctrl |= 1 << offset;
        unsafe { core::ptr::write_volatile(ctrl, curr_ctrl) };
    }

    /// Configure the pin as an input pin.
    pub fn configure_as_input(&mut self) {
        let (offset, ctrl) = self.ctrl_reg_and_local_offset();
        let mut curr_ctrl = unsafe { core::ptr::read_volatile(ctrl) };
        curr_ctrl &= !(1 << offset);
        unsafe { core::ptr::write_volatile(ctrl, curr_ctrl) };
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        let (offset, ctrl) = self.ctrl_reg_and_local_offset();
        let ctrl_val = unsafe { core::ptr::read_volatile(ctrl) };
        ((ctrl_val >> offset) & 0b1) == 1
    }

    /// Invert the read/write sense of the pin.
    pub fn enable_polarity_inversion(&mut self) {
        let (offset, pol) = self.pol_reg_and_local_offset();
        let mut curr_pol = unsafe { core::ptr::read_volatile(pol) };
        curr_pol |= 1 << offset;
        unsafe { core::ptr::write_volatile(pol, curr_pol) };
    }

    /// Restore the normal read/write sense of the pin.
    pub fn disable_polarity_inversion(&mut self) {
        let (offset, pol) = self.pol_reg_and_local_offset();
        let mut curr_pol = unsafe { core::ptr::read_volatile(pol) };
        curr_pol &= !(1 << offset);
        unsafe { core::ptr::write_volatile(pol, curr_pol) };
    }

    #[inline]
    pub fn is_polarity_inverted(&self) -> bool {
        let (offset, pol) = self.pol_reg_and_local_offset();
        let pol_val = unsafe { core::ptr::read_volatile(pol) };
        ((pol_val >> offset) & 0b1) == 1
    }

    #[inline]
    pub fn set_high(&mut self) {
        let offset = self.offset.local_offset();
        match self.offset.bank() {
            0 => self.regs.write_dset_0(1 << offset),
            1 => self.regs.write_dset_1(1 << offset),
            _ => self.regs.write_dset_2(1 << offset),
        }
    }

    #[inline]
    pub fn set_low(&mut self) {
        let offset = self.offset.local_offset();
        match self.offset.bank() {
            0 => self.regs.write_dclr_0(1 << offset),
            1 => self.regs.write_dclr_1(1 << offset),
            _ => self.regs.write_dclr_2(1 << offset),
        }
    }

    #[inline]
    pub fn write_level(&mut self, level: embedded_hal::digital::PinState) {
        match level {
            embedded_hal::digital::PinState::Low => self.set_low(),
            embedded_hal::digital::PinState::High => self.set_high(),
        }
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        let (offset, data) = self.data_reg_and_local_offset();
        let data_val = unsafe { core::ptr::read_volatile(data) };
        ((data_val >> offset) & 0b1) == 0
    }

    #[inline]
    pub fn is_high(&self) -> bool {
        !self.is_low()
    }

    #[inline(always)]
    fn ctrl_reg_and_local_offset(&self) -> (usize, *mut u32) {
        let local_offset = self.offset.local_offset();
        match self.offset.bank() {
            0 => (local_offset, self.regs.pointer_to_ctrl_0()),
            1 => (local_offset, self.regs.pointer_to_ctrl_1()),
            _ => (local_offset, self.regs.pointer_to_ctrl_2()),
        }
    }

    #[inline(always)]
    fn pol_reg_and_local_offset(&self) -> (usize, *mut u32) {
        let local_offset = self.offset.local_offset();
        match self.offset.bank() {
            0 => (local_offset, self.regs.pointer_to_pol_0()),
            1 => (local_offset, self.regs.pointer_to_pol_1()),
            _ => (local_offset, self.regs.pointer_to_pol_2()),
        }
    }

    #[inline(always)]
    fn data_reg_and_local_offset(&self) -> (usize, *mut u32) {
        let local_offset = self.offset.local_offset();
        match self.offset.bank() {
            0 => (local_offset, self.regs.pointer_to_data_0()),
            1 => (local_offset, self.regs.pointer_to_data_1()),
            _ => (local_offset, self.regs.pointer_to_data_2()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt7628::gpio::Registers;

    const REG_WORDS: usize = 0xAC / 4;

    const CTRL_0: usize = 0;
    const POL_0: usize = 4;
    const DATA_0: usize = 8;
    const DSET_0: usize = 12;
    const DCLR_0: usize = 16;

    fn ll_for(backing: &mut [u32; REG_WORDS], pin: usize) -> LowLevelGpio {
        let regs = unsafe { Registers::new_mmio_at(backing.as_mut_ptr() as usize) };
        LowLevelGpio::new(regs, PinOffset::new(pin).unwrap())
    }

    #[test]
    fn test_pin_offset_resolution() {
        for pin in 0..32 {
            let offset = PinOffset::new(pin).unwrap();
            assert_eq!(offset.bank(), 0);
            assert_eq!(offset.local_offset(), pin);
        }
        for pin in 32..64 {
            let offset = PinOffset::new(pin).unwrap();
            assert_eq!(offset.bank(), 1);
            assert_eq!(offset.local_offset(), pin - 32);
        }
        for pin in 64..96 {
            let offset = PinOffset::new(pin).unwrap();
            assert_eq!(offset.bank(), 2);
            assert_eq!(offset.local_offset(), pin - 64);
        }
    }

    #[test]
    fn test_pin_offset_out_of_range() {
        assert_eq!(PinOffset::new(96).unwrap_err().0, 96);
        assert_eq!(PinOffset::new(200).unwrap_err().0, 200);
        assert!(PinOffset::new(95).is_ok());
    }

    #[test]
    fn test_configure_as_output_only_touches_target_bit() {
        let mut backing = [0u32; REG_WORDS];
        backing[CTRL_0] = 0x5555_5550;
        let mut ll = ll_for(&mut backing, 5);
        ll.configure_as_output();
        assert_eq!(backing[CTRL_0], 0x5555_5570);
        assert!(ll.is_output());
    }

    #[test]
    fn test_configure_as_input_clears_with_complement() {
        // A stray AND without the complement would wipe every other bit of
        // the register, so the surrounding pattern must survive.
        let mut backing = [0u32; REG_WORDS];
        backing[CTRL_0 + 1] = 0xFFFF_FFFF;
        let mut ll = ll_for(&mut backing, 33);
        ll.configure_as_input();
        assert_eq!(backing[CTRL_0 + 1], 0xFFFF_FFFD);
        assert!(!ll.is_output());
        ll.configure_as_output();
        assert_eq!(backing[CTRL_0 + 1], 0xFFFF_FFFF);
    }

    #[test]
    fn test_direction_targets_bank_register() {
        let mut backing = [0u32; REG_WORDS];
        ll_for(&mut backing, 64).configure_as_output();
        assert_eq!(backing[CTRL_0], 0);
        assert_eq!(backing[CTRL_0 + 1], 0);
        assert_eq!(backing[CTRL_0 + 2], 1);
    }

    #[test]
    fn test_polarity_inversion_round_trip() {
        let mut backing = [0u32; REG_WORDS];
        backing[POL_0 + 2] = 0x8000_0001;
        let mut ll = ll_for(&mut backing, 70);
        ll.enable_polarity_inversion();
        assert_eq!(backing[POL_0 + 2], 0x8000_0041);
        assert!(ll.is_polarity_inverted());
        ll.disable_polarity_inversion();
        assert_eq!(backing[POL_0 + 2], 0x8000_0001);
        assert!(!ll.is_polarity_inverted());
    }

    #[test]
    fn test_set_high_writes_data_set_register() {
        let mut backing = [0u32; REG_WORDS];
        ll_for(&mut backing, 40).set_high();
        assert_eq!(backing[DSET_0 + 1], 1 << 8);
        // Pure write, the data register itself is not touched by software.
        assert_eq!(backing[DATA_0 + 1], 0);
    }

    #[test]
    fn test_set_low_writes_data_clear_register() {
        let mut backing = [0u32; REG_WORDS];
        ll_for(&mut backing, 95).set_low();
        assert_eq!(backing[DCLR_0 + 2], 1 << 31);
        assert_eq!(backing[DSET_0 + 2], 0);
    }

    #[test]
    fn test_data_read_single_shift_per_bank() {
        let mut backing = [0u32; REG_WORDS];
        // Pin 70 lives in bank 2, bit 6. No further shift correction may be
        // applied on top of the bank-local offset.
        backing[DATA_0 + 2] = 0b0100_0000;
        assert!(ll_for(&mut backing, 70).is_high());
        assert!(ll_for(&mut backing, 71).is_low());
        assert!(ll_for(&mut backing, 6).is_low());
        backing[DATA_0 + 2] = !0b0100_0000;
        assert!(ll_for(&mut backing, 70).is_low());
        assert!(ll_for(&mut backing, 71).is_high());
    }
}
