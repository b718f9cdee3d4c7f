//! Embassy async tasks
//!
//! Each task runs independently and shares the receiver by reference.

pub mod bus;
pub mod start_light;

pub use bus::bus_task;
pub use start_light::start_light_task;
