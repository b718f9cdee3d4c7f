//! GPIO setup for the sensed bus pin

use embassy_rp::gpio::{AnyPin, Input};
use embassy_rp::Peri;
use trackbus_core::{PinConfig, Pull};

/// Number of user GPIO pins on the RP2040 (GPIO0..GPIO29)
pub const GPIO_COUNT: u8 = 30;

/// Convert a configured bias to the embassy-rp one
pub fn to_rp_pull(pull: Pull) -> embassy_rp::gpio::Pull {
    match pull {
        Pull::None => embassy_rp::gpio::Pull::None,
        Pull::Up => embassy_rp::gpio::Pull::Up,
        Pull::Down => embassy_rp::gpio::Pull::Down,
    }
}

/// Create the bus input with the configured bias
///
/// Polarity is not applied here; the receiver inverts edges itself.
pub fn bus_input(pin: Peri<'static, AnyPin>, config: &PinConfig) -> Input<'static> {
    Input::new(pin, to_rp_pull(config.pull))
}
