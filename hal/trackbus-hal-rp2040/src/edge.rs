//! Edge capture on RP2040 GPIO
//!
//! The GPIO bank interrupt wakes [`capture_edges`], which timestamps the
//! edge and hands it to the receiver. Timestamps come from the embassy
//! time driver (1 MHz timer on the RP2040) truncated to 32 bits.

use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use portable_atomic::{AtomicBool, Ordering};
use trackbus_core::ControlUnit;
use trackbus_hal::{Edge, EdgeTimer};

/// Edge timer backed by the embassy time driver
pub struct RpEdgeTimer {
    listening: AtomicBool,
    /// Raised on `listen` to release an idle capture loop
    armed: Signal<CriticalSectionRawMutex, ()>,
}

impl RpEdgeTimer {
    pub const fn new() -> Self {
        Self {
            listening: AtomicBool::new(false),
            armed: Signal::new(),
        }
    }

    /// Check if edges are currently wanted
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }
}

impl Default for RpEdgeTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeTimer for RpEdgeTimer {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }

    fn listen(&self) {
        self.listening.store(true, Ordering::Release);
        self.armed.signal(());
    }

    fn unlisten(&self) {
        self.listening.store(false, Ordering::Release);
    }
}

/// Forward edges on `input` to the receiver while it listens, forever
///
/// The level is sampled after the wake, so an edge lost under load shows
/// up as a repeated level, which the receiver treats as a glitch.
pub async fn capture_edges(input: &mut Input<'_>, cu: &ControlUnit<RpEdgeTimer>) {
    let timer = cu.timer();

    loop {
        if !timer.is_listening() {
            timer.armed.wait().await;
            continue;
        }

        input.wait_for_any_edge().await;
        let now_us = timer.now_us();

        if timer.is_listening() {
            cu.on_edge_at(Edge::from_level(input.is_high()), now_us);
        }
    }
}
