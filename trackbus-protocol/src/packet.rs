//! Packet decoding
//!
//! Each packet kind has its own record type and a pure `parse_*` function.
//! A parse function returns `None` when the word's leading marker bits do
//! not belong to its kind, and always for [`RawWord::EMPTY`].

use crate::word::RawWord;

/// Programming command that drives the start light
pub const START_LIGHT_COMMAND: u8 = 16;

/// Programming address used for broadcast (start light, race state)
pub const BROADCAST_ADDRESS: u8 = 7;

/// Controller address carrying pace car state instead of a controller
pub const PACE_CAR_ADDRESS: u8 = 7;

// Payload masks and start bit markers, one pair per kind
const PROG_MASK: u16 = 0x0fff;
const PROG_MARKER: u16 = 0x1000;
const CTRL_MASK: u16 = 0x01ff;
const CTRL_MARKER: u16 = 0x0200;
const PACE_MASK: u16 = 0x003f;
const PACE_MARKER: u16 = 0x03c0;
const ACT_MASK: u16 = 0x007f;
const ACT_MARKER: u16 = 0x0080;
const ACK_MASK: u16 = 0x00ff;
const ACK_MARKER: u16 = 0x0100;

/// Programming word: a setting sent to one controller or broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Programming {
    /// Command (0..31)
    pub command: u8,
    /// Command argument (0..15)
    pub value: u8,
    /// Target controller, or 7 for broadcast (0..7)
    pub address: u8,
}

impl Programming {
    /// Pack into a data word
    pub fn to_word(self) -> RawWord {
        RawWord::new(
            PROG_MARKER
                | (self.address as u16 & 0x07) << 9
                | (self.command as u16 & 0x1f) << 4
                | (self.value as u16 & 0x0f),
        )
    }

    /// Number of lit start light lamps, if this is a start light update
    pub fn start_light(&self) -> Option<u8> {
        (self.command == START_LIGHT_COMMAND && self.address == BROADCAST_ADDRESS)
            .then_some(self.value)
    }
}

/// Controller word: throttle and buttons of one hand controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Controller {
    /// Controller address (0..6)
    pub address: u8,
    /// Lane change button pressed
    pub lane_change: bool,
    /// Throttle position (0..15)
    pub throttle: u8,
    /// Fuel mode enabled
    pub fuel_mode: bool,
}

impl Controller {
    /// Pack into a data word
    ///
    /// Address 7 packs into a pace car word.
    pub fn to_word(self) -> RawWord {
        // lane change is transmitted active low
        let lane = if self.lane_change { 0 } else { 0x20 };
        RawWord::new(
            CTRL_MARKER
                | (self.address as u16 & 0x07) << 6
                | lane
                | (self.throttle as u16 & 0x0f) << 1
                | self.fuel_mode as u16,
        )
    }
}

/// Pace car word: pace car and autonomous car state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaceCar {
    /// Pace car and autonomous car are stopped
    pub stopped: bool,
    /// Pace car should return to the pit
    pub return_to_pit: bool,
    /// Pace car is active
    pub active: bool,
    /// Fuel mode enabled
    pub fuel_mode: bool,
}

impl PaceCar {
    /// Pack into a data word
    pub fn to_word(self) -> RawWord {
        let mut bits = PACE_MARKER;
        if self.stopped {
            bits |= 0x20;
        }
        if self.return_to_pit {
            bits |= 0x04;
        }
        if self.active {
            bits |= 0x02;
        }
        if self.fuel_mode {
            bits |= 0x01;
        }
        RawWord::new(bits)
    }
}

/// Activity word: which controllers have been used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Activity {
    /// Active controllers as received, one bit per controller (0..63)
    pub controller_mask: u8,
    /// At least one controller was active
    pub any_active: bool,
}

impl Activity {
    /// Pack into a data word
    pub fn to_word(self) -> RawWord {
        RawWord::new(
            ACT_MARKER | (self.controller_mask as u16 & 0x3f) << 1 | self.any_active as u16,
        )
    }
}

/// Acknowledge word: time slots in which the Control Unit received a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Acknowledge {
    /// One bit per time slot (0..255)
    pub slot_mask: u8,
}

impl Acknowledge {
    /// Pack into a data word
    pub fn to_word(self) -> RawWord {
        RawWord::new(ACK_MARKER | self.slot_mask as u16)
    }
}

/// Split a programming word into its fields
pub fn parse_prog(word: RawWord) -> Option<Programming> {
    if !word.has_marker(PROG_MASK, PROG_MARKER) {
        return None;
    }
    let bits = word.bits();
    Some(Programming {
        command: ((bits >> 4) & 0x1f) as u8,
        value: (bits & 0x0f) as u8,
        address: ((bits >> 9) & 0x07) as u8,
    })
}

/// Split a controller word into its fields
///
/// Words addressed to the pace car are rejected; see [`parse_pace`].
pub fn parse_ctrl(word: RawWord) -> Option<Controller> {
    if !word.has_marker(CTRL_MASK, CTRL_MARKER) {
        return None;
    }
    let bits = word.bits();
    let address = ((bits >> 6) & 0x07) as u8;
    if address == PACE_CAR_ADDRESS {
        return None;
    }
    Some(Controller {
        address,
        lane_change: bits & 0x20 == 0,
        throttle: ((bits >> 1) & 0x0f) as u8,
        fuel_mode: bits & 0x01 != 0,
    })
}

/// Split a pace car word into its fields
pub fn parse_pace(word: RawWord) -> Option<PaceCar> {
    if !word.has_marker(PACE_MASK, PACE_MARKER) {
        return None;
    }
    let bits = word.bits();
    Some(PaceCar {
        stopped: bits & 0x20 != 0,
        return_to_pit: bits & 0x04 != 0,
        active: bits & 0x02 != 0,
        fuel_mode: bits & 0x01 != 0,
    })
}

/// Split an activity word into its fields
pub fn parse_act(word: RawWord) -> Option<Activity> {
    if !word.has_marker(ACT_MASK, ACT_MARKER) {
        return None;
    }
    let bits = word.bits();
    Some(Activity {
        controller_mask: ((bits >> 1) & 0x3f) as u8,
        any_active: bits & 0x01 != 0,
    })
}

/// Split an acknowledge word into its fields
pub fn parse_ack(word: RawWord) -> Option<Acknowledge> {
    if !word.has_marker(ACK_MASK, ACK_MARKER) {
        return None;
    }
    Some(Acknowledge {
        slot_mask: (word.bits() & 0xff) as u8,
    })
}

/// Any decoded packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Packet {
    Programming(Programming),
    Controller(Controller),
    PaceCar(PaceCar),
    Activity(Activity),
    Acknowledge(Acknowledge),
}

impl Packet {
    /// Decode a word of any kind
    ///
    /// Markers are disjoint, so at most one kind matches.
    pub fn decode(word: RawWord) -> Option<Self> {
        parse_prog(word)
            .map(Packet::Programming)
            .or_else(|| parse_ctrl(word).map(Packet::Controller))
            .or_else(|| parse_pace(word).map(Packet::PaceCar))
            .or_else(|| parse_act(word).map(Packet::Activity))
            .or_else(|| parse_ack(word).map(Packet::Acknowledge))
    }

    /// Pack into a data word
    pub fn to_word(self) -> RawWord {
        match self {
            Packet::Programming(p) => p.to_word(),
            Packet::Controller(c) => c.to_word(),
            Packet::PaceCar(p) => p.to_word(),
            Packet::Activity(a) => a.to_word(),
            Packet::Acknowledge(a) => a.to_word(),
        }
    }
}
