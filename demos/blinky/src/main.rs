//! Simple blinky app, showing a raw controller variant and a typed pin
//! variant.
use std::{thread, time::Duration};

use embedded_hal::digital::StatefulOutputPin;
use mt7628_gpio::gpio::{Direction, Gpio, Output, Pins, PinState};

pub const LIB: Lib = Lib::TypedPin;

/// The VoCore2 Ultimate on-board LED sits on GPIO 44.
const LED_PIN: usize = 44;

const BLINK_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum Lib {
    RawController,
    TypedPin,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("blinking GPIO {} every {:?}", LED_PIN, BLINK_PERIOD);
    match LIB {
        Lib::RawController => {
            let mut gpio = Gpio::new()?;
            gpio.set_direction(LED_PIN, Direction::Output)?;
            loop {
                let level = gpio.get_data(LED_PIN)?;
                gpio.set_data(
                    LED_PIN,
                    if level { PinState::Low } else { PinState::High },
                )?;
                thread::sleep(BLINK_PERIOD);
            }
        }
        Lib::TypedPin => {
            let gpio = Gpio::new()?;
            let mut pins = Pins::new(gpio);
            // Unwrap okay, the pin is taken exactly once here.
            let mut led = Output::new(pins.take(LED_PIN).unwrap(), PinState::High);
            loop {
                led.toggle()?;
                thread::sleep(BLINK_PERIOD);
            }
        }
    }
}
