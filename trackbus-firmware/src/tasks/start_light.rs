//! Start light task
//!
//! Reads words from the bus, logs them, and shows the Control Unit's start
//! countdown on the lamps.

use defmt::*;
use embassy_time::{Duration, Instant};
use trackbus_core::ControlUnit;
use trackbus_hal_rp2040::RpEdgeTimer;
use trackbus_protocol::Packet;

use crate::lamps::StartLight;

/// Report receive statistics this often
const STATS_INTERVAL: Duration = Duration::from_secs(10);

#[embassy_executor::task]
pub async fn start_light_task(cu: &'static ControlUnit<RpEdgeTimer>, mut lamps: StartLight) {
    info!("Start light task started");

    cu.start();
    lamps.clear();

    let mut words: u32 = 0;
    let mut unknown: u32 = 0;
    let mut last_stats = Instant::now();

    while let Some(word) = cu.read().await {
        words = words.wrapping_add(1);

        match Packet::decode(word) {
            Some(Packet::Programming(prog)) => {
                debug!("prog {}", prog);
                if let Some(value) = prog.start_light() {
                    info!("Start light: {}", value);
                    lamps.show(value);
                }
            }
            Some(packet) => trace!("{}", packet),
            None => {
                unknown = unknown.wrapping_add(1);
                trace!("Unknown word {=u16:#x}", word.bits());
            }
        }

        if last_stats.elapsed() >= STATS_INTERVAL {
            info!("Bus: {} words, {} unknown", words, unknown);
            last_stats = Instant::now();
        }
    }

    warn!("Receiver stopped, lamps off");
    lamps.clear();
}
