//! Bus edge capture task
//!
//! Waits on GPIO edges of the bus pin and feeds them to the receiver.

use defmt::*;
use embassy_rp::gpio::Input;
use trackbus_core::ControlUnit;
use trackbus_hal_rp2040::{capture_edges, RpEdgeTimer};

/// Edge capture task - runs for the lifetime of the firmware
#[embassy_executor::task]
pub async fn bus_task(mut input: Input<'static>, cu: &'static ControlUnit<RpEdgeTimer>) {
    info!("Bus task started");
    capture_edges(&mut input, cu).await
}
