//! Start-light lamp outputs

use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::Peri;

use crate::board::{LAMP_COUNT, LAMP_INVERTED};

/// The row of start-light lamps, lamp 1 first
pub struct StartLight {
    lamps: [Output<'static>; LAMP_COUNT],
}

impl StartLight {
    /// Take the lamp pins and switch every lamp off
    pub fn new(pins: [Peri<'static, AnyPin>; LAMP_COUNT]) -> Self {
        let mut i = 0;
        let lamps = pins.map(|pin| {
            let off = level(false, LAMP_INVERTED[i]);
            i += 1;
            Output::new(pin, off)
        });
        Self { lamps }
    }

    /// Show a countdown value: lamp `n` is lit iff `value >= n`
    pub fn show(&mut self, value: u8) {
        for (i, lamp) in self.lamps.iter_mut().enumerate() {
            let lit = usize::from(value) > i;
            lamp.set_level(level(lit, LAMP_INVERTED[i]));
        }
    }

    /// Switch every lamp off
    pub fn clear(&mut self) {
        self.show(0);
    }
}

fn level(lit: bool, inverted: bool) -> Level {
    Level::from(lit != inverted)
}
