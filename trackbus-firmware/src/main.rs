//! Track-bus start light
//!
//! Firmware for an RP2040 board wired to the track bus of a digital
//! slot-car Control Unit. It listens to the bus and mirrors the Control
//! Unit's start countdown on five lamps.
//!
//! Wiring and bus timing come from `control_unit.toml`.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use trackbus_core::ControlUnit;
use trackbus_hal_rp2040::{bus_input, RpEdgeTimer};

use crate::lamps::StartLight;

mod board;
mod lamps;
mod tasks;

// The receiver is shared by the edge capture and start light tasks
static CONTROL_UNIT: StaticCell<ControlUnit<RpEdgeTimer>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Track-bus start light starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    let pins = board::split(p);
    info!("Peripherals initialized");

    let cu = match ControlUnit::try_new(RpEdgeTimer::new(), board::RECEIVER) {
        Ok(cu) => CONTROL_UNIT.init(cu),
        Err(e) => defmt::panic!("Invalid bus timing: {}", e),
    };
    info!(
        "Bus on gpio{} (inverted={}), {}-bit words",
        board::RECEIVER.pin.pin,
        board::RECEIVER.pin.inverted,
        board::RECEIVER.timing.word_bits
    );

    let input = bus_input(pins.bus, &board::RECEIVER.pin);
    let lamps = StartLight::new(pins.lamps);

    spawner.spawn(tasks::bus_task(input, cu)).unwrap();
    spawner.spawn(tasks::start_light_task(cu, lamps)).unwrap();

    info!("All tasks spawned");
}
