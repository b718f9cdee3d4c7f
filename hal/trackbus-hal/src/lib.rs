//! Trackbus Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the track-bus receiver consumes.
//! Chip-specific crates (RP2040, ...) implement them, so the decoder logic in
//! `trackbus-core` stays platform-independent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (trackbus-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trackbus-core (receiver, classifier)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  trackbus-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ trackbus-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`edge::EdgeTimer`] - Edge delivery control and microsecond clock
//!
//! [`gpio::Pull`] is the chip-independent pin bias used in configuration.

#![no_std]
#![deny(unsafe_code)]

pub mod edge;
pub mod gpio;

// Re-export key types at crate root for convenience
pub use edge::{Edge, EdgeTimer};
pub use gpio::Pull;
