//! RP2040 back-end for the track-bus receiver
//!
//! This crate provides RP2040-specific implementations of the shared
//! `trackbus-hal` traits:
//!
//! - Microsecond edge timestamps from the embassy time driver
//! - GPIO edge capture feeding a [`trackbus_core::ControlUnit`]
//! - Mapping of configured pins onto embassy-rp GPIO drivers

#![no_std]
#![deny(unsafe_code)]

pub mod edge;
pub mod gpio;

pub use edge::{capture_edges, RpEdgeTimer};
pub use gpio::{bus_input, GPIO_COUNT};
