//! GPIO support module for the MT7628 SoC.
//!
//! This module contains the [Gpio] register controller, a pin resource
//! management singleton as well as typed abstractions to use individual pins
//! as GPIOs.
//!
//! The controller performs every operation against the live hardware
//! registers. Nothing is cached: other agents, including the hardware
//! itself, may change bits of the same register words at any time, which is
//! why all direction and polarity updates re-read the current register
//! value before modifying it.
pub mod ll;

use core::convert::Infallible;

use crate::mmap::{MappingError, RegisterWindow};
use ll::{LowLevelGpio, NUM_PINS, PinOffset};
use mt7628::gpio::{MmioRegisters, Registers};

pub use embedded_hal::digital::PinState;
pub use ll::InvalidPinOffset;

/// Pin direction as configured in the per-bank CTRL registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Pin polarity as configured in the per-bank POL registers.
///
/// An inverted pin has its read/write sense flipped by the hardware.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Polarity {
    Normal,
    Inverted,
}

/// GPIO register controller.
///
/// Owns the mapped register window and exposes the pin operation surface.
/// Operations take the raw pin number and fail with [InvalidPinOffset] for
/// pins outside the 0 to 95 range without performing any register access.
pub struct Gpio {
    regs: MmioRegisters<'static>,
    _window: Option<RegisterWindow>,
}

impl Gpio {
    /// Map the register window and create the controller.
    ///
    /// This is process-wide state and meant to be constructed exactly once
    /// at program start. A mapping failure is fatal, there is no degraded
    /// mode without a register window.
    pub fn new() -> Result<Self, MappingError> {
        let window = RegisterWindow::open()?;
        let regs = unsafe { Registers::new_mmio_at(window.gpio_base_addr()) };
        Ok(Self {
            regs,
            _window: Some(window),
        })
    }

    /// Create a controller against an already mapped register block.
    ///
    /// # Safety
    ///
    /// `base_addr` must be the virtual address of a readable and writable
    /// mapping of the GPIO register block, and the mapping must stay valid
    /// for the lifetime of the controller. This API can also be used to
    /// create multiple controllers to the same peripheral structure, in
    /// which case the user must ensure that concurrent accesses do not
    /// interfere with each other.
    pub unsafe fn with_base_addr(base_addr: usize) -> Self {
        Self {
            regs: unsafe { Registers::new_mmio_at(base_addr) },
            _window: None,
        }
    }

    /// Configure the direction of a pin.
    pub fn set_direction(&mut self, pin: usize, direction: Direction) -> Result<(), InvalidPinOffset> {
        let mut ll = self.ll(PinOffset::new(pin)?);
        match direction {
            Direction::Output => ll.configure_as_output(),
            Direction::Input => ll.configure_as_input(),
        }
        Ok(())
    }

    /// Read the configured direction of a pin back from the hardware.
    pub fn direction(&self, pin: usize) -> Result<Direction, InvalidPinOffset> {
        if self.ll(PinOffset::new(pin)?).is_output() {
            return Ok(Direction::Output);
        }
        Ok(Direction::Input)
    }

    /// Configure the polarity of a pin.
    pub fn set_polarity(&mut self, pin: usize, polarity: Polarity) -> Result<(), InvalidPinOffset> {
        let mut ll = self.ll(PinOffset::new(pin)?);
        match polarity {
            Polarity::Inverted => ll.enable_polarity_inversion(),
            Polarity::Normal => ll.disable_polarity_inversion(),
        }
        Ok(())
    }

    /// Read the configured polarity of a pin back from the hardware.
    pub fn polarity(&self, pin: usize) -> Result<Polarity, InvalidPinOffset> {
        if self.ll(PinOffset::new(pin)?).is_polarity_inverted() {
            return Ok(Polarity::Inverted);
        }
        Ok(Polarity::Normal)
    }

    /// Drive an output pin to the given level.
    ///
    /// High levels go through the data set register, low levels through the
    /// data clear register. Both act on the written 1 bit only, so other
    /// pins of the bank are unaffected by design.
    pub fn set_data(&mut self, pin: usize, level: PinState) -> Result<(), InvalidPinOffset> {
        self.ll(PinOffset::new(pin)?).write_level(level);
        Ok(())
    }

    /// Drive an output pin low.
    ///
    /// Equivalent to [Gpio::set_data] with [PinState::Low].
    pub fn clear_data(&mut self, pin: usize) -> Result<(), InvalidPinOffset> {
        self.set_data(pin, PinState::Low)
    }

    /// Read the current logic level of a pin.
    pub fn get_data(&self, pin: usize) -> Result<bool, InvalidPinOffset> {
        Ok(self.ll(PinOffset::new(pin)?).is_high())
    }

    fn ll(&self, offset: PinOffset) -> LowLevelGpio {
        LowLevelGpio::new(unsafe { self.regs.clone() }, offset)
    }
}

/// Movable pin resource handle.
///
/// Obtained from the [Pins] singleton and consumed by the typed pin
/// constructors.
pub struct GpioPin {
    offset: PinOffset,
    regs: MmioRegisters<'static>,
}

impl GpioPin {
    /// Steal a GPIO pin instance from a controller.
    ///
    /// It is recommended to retrieve pins safely by using the [Pins::new]
    /// and [Pins::take] API instead.
    ///
    /// # Safety
    ///
    /// This allows to create multiple instances of the same pin, which can
    /// lead to data races on concurrent access.
    pub unsafe fn steal(gpio: &Gpio, offset: PinOffset) -> Self {
        Self {
            offset,
            regs: unsafe { gpio.regs.clone() },
        }
    }

    pub fn offset(&self) -> usize {
        self.offset.offset()
    }
}

/// GPIO pin singleton to allow resource management of all 96 pins.
pub struct Pins {
    pins: [Option<GpioPin>; NUM_PINS],
    _window: Option<RegisterWindow>,
}

impl Pins {
    /// Create the pin resource management structure from the controller.
    ///
    /// This structure is supposed to be used as a singleton. Each pin can be
    /// taken out of it exactly once until it is given back.
    pub fn new(gpio: Gpio) -> Self {
        let Gpio { regs, _window } = gpio;
        let mut pins = [const { None }; NUM_PINS];
        (0..NUM_PINS).for_each(|i| {
            pins[i] = Some(GpioPin {
                // Unwrap okay, the index is always in range here.
                offset: PinOffset::new(i).unwrap(),
                regs: unsafe { regs.clone() },
            });
        });
        Self { pins, _window }
    }

    pub fn take(&mut self, offset: usize) -> Option<GpioPin> {
        self.pins.get_mut(offset)?.take()
    }

    pub fn give(&mut self, pin: GpioPin) {
        let offset = pin.offset.offset();
        self.pins[offset].replace(pin);
    }
}

/// Flex pin abstraction which can be dynamically re-configured.
///
/// Flex pins are always input pins after construction. Re-configuring the
/// direction performs the read-modify-write against the CTRL register of the
/// pin's bank; driving the level goes through the data set and data clear
/// registers.
pub struct Flex {
    ll: LowLevelGpio,
    direction: Direction,
}

impl Flex {
    pub fn new(pin: GpioPin) -> Self {
        let GpioPin { offset, regs } = pin;
        let mut ll = LowLevelGpio::new(regs, offset);
        ll.configure_as_input();
        Self {
            ll,
            direction: Direction::Input,
        }
    }

    pub fn configure_as_input(&mut self) {
        self.direction = Direction::Input;
        self.ll.configure_as_input();
    }

    pub fn configure_as_output(&mut self, init_level: PinState) {
        self.direction = Direction::Output;
        self.ll.configure_as_output();
        self.ll.write_level(init_level);
    }

    /// If the pin is configured as an input pin, this function does nothing.
    pub fn set_high(&mut self) {
        if self.direction == Direction::Input {
            return;
        }
        self.ll.set_high();
    }

    /// If the pin is configured as an input pin, this function does nothing.
    pub fn set_low(&mut self) {
        if self.direction == Direction::Input {
            return;
        }
        self.ll.set_low();
    }

    /// Reads the level of the pin, regardless of configured direction.
    #[inline]
    pub fn is_high(&self) -> bool {
        self.ll.is_high()
    }

    /// Reads the level of the pin, regardless of configured direction.
    #[inline]
    pub fn is_low(&self) -> bool {
        self.ll.is_low()
    }
}

impl embedded_hal::digital::ErrorType for Flex {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for Flex {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ll.is_high())
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ll.is_low())
    }
}

impl embedded_hal::digital::OutputPin for Flex {
    /// If the pin is configured as an input pin, this function does nothing.
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_low();
        Ok(())
    }

    /// If the pin is configured as an input pin, this function does nothing.
    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_high();
        Ok(())
    }
}

/// Output pin.
pub struct Output(LowLevelGpio);

impl Output {
    pub fn new(pin: GpioPin, init_level: PinState) -> Self {
        let GpioPin { offset, regs } = pin;
        let mut ll = LowLevelGpio::new(regs, offset);
        ll.configure_as_output();
        ll.write_level(init_level);
        Self(ll)
    }

    #[inline]
    pub fn set_low(&mut self) {
        self.0.set_low();
    }

    #[inline]
    pub fn set_high(&mut self) {
        self.0.set_high();
    }
}

impl embedded_hal::digital::ErrorType for Output {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for Output {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for Output {
    /// Reads the driven level back from the data register.
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    /// Reads the driven level back from the data register.
    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

/// Input pin.
pub struct Input(LowLevelGpio);

impl Input {
    pub fn new(pin: GpioPin) -> Self {
        let GpioPin { offset, regs } = pin;
        let mut ll = LowLevelGpio::new(regs, offset);
        ll.configure_as_input();
        Self(ll)
    }

    pub fn is_high(&self) -> bool {
        self.0.is_high()
    }

    pub fn is_low(&self) -> bool {
        self.0.is_low()
    }
}

impl embedded_hal::digital::ErrorType for Input {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for Input {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::StatefulOutputPin;

    const REG_WORDS: usize = 0xAC / 4;

    const CTRL_0: usize = 0;
    const POL_0: usize = 4;
    const DATA_0: usize = 8;
    const DSET_0: usize = 12;
    const DCLR_0: usize = 16;

    fn gpio_for(backing: &mut [u32; REG_WORDS]) -> Gpio {
        unsafe { Gpio::with_base_addr(backing.as_mut_ptr() as usize) }
    }

    /// Folds pending data set/clear strobes into the data registers the way
    /// the hardware does.
    fn propagate_data_strobes(backing: &mut [u32; REG_WORDS]) {
        for bank in 0..3 {
            let set = core::mem::take(&mut backing[DSET_0 + bank]);
            let clear = core::mem::take(&mut backing[DCLR_0 + bank]);
            backing[DATA_0 + bank] = (backing[DATA_0 + bank] | set) & !clear;
        }
    }

    #[test]
    fn test_direction_surface() {
        let mut backing = [0u32; REG_WORDS];
        backing[CTRL_0 + 1] = 0xA000_000A;
        let mut gpio = gpio_for(&mut backing);
        gpio.set_direction(40, Direction::Output).unwrap();
        assert_eq!(backing[CTRL_0 + 1], 0xA000_010A);
        assert_eq!(gpio.direction(40).unwrap(), Direction::Output);
        gpio.set_direction(40, Direction::Input).unwrap();
        assert_eq!(backing[CTRL_0 + 1], 0xA000_000A);
        assert_eq!(gpio.direction(40).unwrap(), Direction::Input);
    }

    #[test]
    fn test_polarity_surface() {
        let mut backing = [0u32; REG_WORDS];
        let mut gpio = gpio_for(&mut backing);
        gpio.set_polarity(3, Polarity::Inverted).unwrap();
        assert_eq!(backing[POL_0], 0b1000);
        assert_eq!(gpio.polarity(3).unwrap(), Polarity::Inverted);
        gpio.set_polarity(3, Polarity::Normal).unwrap();
        assert_eq!(backing[POL_0], 0);
        assert_eq!(gpio.polarity(3).unwrap(), Polarity::Normal);
    }

    #[test]
    fn test_data_round_trip_in_every_bank() {
        let mut backing = [0u32; REG_WORDS];
        let mut gpio = gpio_for(&mut backing);
        for pin in [0, 32, 64] {
            gpio.set_data(pin, PinState::High).unwrap();
            propagate_data_strobes(&mut backing);
            assert!(gpio.get_data(pin).unwrap());
            gpio.set_data(pin, PinState::Low).unwrap();
            propagate_data_strobes(&mut backing);
            assert!(!gpio.get_data(pin).unwrap());
        }
    }

    #[test]
    fn test_clear_data_goes_through_data_clear_register() {
        let mut backing = [0u32; REG_WORDS];
        let mut gpio = gpio_for(&mut backing);
        gpio.clear_data(70).unwrap();
        assert_eq!(backing[DCLR_0 + 2], 1 << 6);
        // The data register is only ever written by the hardware.
        assert_eq!(backing[DATA_0 + 2], 0);
    }

    #[test]
    fn test_invalid_pin_is_rejected_without_register_access() {
        let mut backing = [0u32; REG_WORDS];
        let mut gpio = gpio_for(&mut backing);
        assert_eq!(gpio.set_direction(96, Direction::Output).unwrap_err().0, 96);
        assert_eq!(gpio.set_polarity(200, Polarity::Inverted).unwrap_err().0, 200);
        assert_eq!(gpio.set_data(96, PinState::High).unwrap_err().0, 96);
        assert_eq!(gpio.clear_data(200).unwrap_err().0, 200);
        assert_eq!(gpio.get_data(96).unwrap_err().0, 96);
        assert_eq!(backing, [0u32; REG_WORDS]);
    }

    #[test]
    fn test_pins_take_and_give() {
        let mut backing = [0u32; REG_WORDS];
        let mut pins = Pins::new(gpio_for(&mut backing));
        let pin = pins.take(5).unwrap();
        assert_eq!(pin.offset(), 5);
        assert!(pins.take(5).is_none());
        pins.give(pin);
        assert!(pins.take(5).is_some());
        assert!(pins.take(96).is_none());
    }

    #[test]
    fn test_output_pin_drives_strobe_registers() {
        let mut backing = [0u32; REG_WORDS];
        let mut pins = Pins::new(gpio_for(&mut backing));
        let mut led = Output::new(pins.take(44).unwrap(), PinState::High);
        assert_eq!(backing[CTRL_0 + 1], 1 << 12);
        propagate_data_strobes(&mut backing);
        assert!(led.is_set_high().unwrap());
        led.set_low();
        propagate_data_strobes(&mut backing);
        assert!(led.is_set_low().unwrap());
    }

    #[test]
    fn test_flex_ignores_level_writes_while_input() {
        let mut backing = [0u32; REG_WORDS];
        let mut pins = Pins::new(gpio_for(&mut backing));
        let mut flex = Flex::new(pins.take(10).unwrap());
        flex.set_high();
        assert_eq!(backing[DSET_0], 0);
        flex.configure_as_output(PinState::Low);
        assert_eq!(backing[CTRL_0], 1 << 10);
        assert_eq!(backing[DCLR_0], 1 << 10);
        flex.set_high();
        assert_eq!(backing[DSET_0], 1 << 10);
    }

    #[test]
    fn test_flex_reads_as_input_pin() {
        let mut backing = [0u32; REG_WORDS];
        backing[DATA_0 + 2] = 1 << 3;
        let mut pins = Pins::new(gpio_for(&mut backing));
        let flex = Flex::new(pins.take(67).unwrap());
        assert!(flex.is_high());
        let input = Input::new(pins.take(68).unwrap());
        assert!(input.is_low());
    }
}
