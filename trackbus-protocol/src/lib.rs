//! Control Unit Track-Bus Protocol
//!
//! This crate defines the data words broadcast by a digital slot-car
//! Control Unit and how to split them into typed packets.
//!
//! # Protocol Overview
//!
//! Every word starts with a `1` start bit. Words are assembled MSB-first,
//! so the start bit becomes the highest set bit and its position tells the
//! word's length, which in turn identifies the packet kind:
//! ```text
//! ┌─────────────┬───────┬─────────────────────────────────────┐
//! │ KIND        │ BITS  │ LAYOUT (MSB → LSB)                  │
//! ├─────────────┼───────┼─────────────────────────────────────┤
//! │ Programming │ 13    │ 1 AAA CCCCC VVVV                    │
//! │ Controller  │ 10    │ 1 AAA L TTTT F     (AAA = 0..6)     │
//! │ Pace car    │ 10    │ 1 111 S xx R P F                    │
//! │ Acknowledge │ 9     │ 1 SSSSSSSS                          │
//! │ Activity    │ 8     │ 1 MMMMMM Y                          │
//! └─────────────┴───────┴─────────────────────────────────────┘
//! ```
//!
//! A word value of 0 never comes off the wire and means "no packet".

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod packet;
pub mod word;

pub use packet::{
    parse_ack, parse_act, parse_ctrl, parse_pace, parse_prog, Acknowledge, Activity,
    Controller, PaceCar, Packet, Programming,
};
pub use word::RawWord;
