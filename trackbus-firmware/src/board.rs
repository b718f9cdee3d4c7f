//! Board wiring generated from control_unit.toml
//!
//! `build.rs` validates the config file and writes the constants and the
//! pin split below into `OUT_DIR`.

use embassy_rp::gpio::AnyPin;
use embassy_rp::{Peri, Peripherals};
use trackbus_core::{BitTiming, PinConfig, Pull, PulseWindow, ReceiverConfig};

include!(concat!(env!("OUT_DIR"), "/board.rs"));
