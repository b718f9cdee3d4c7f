//! Edge delivery and timing
//!
//! The track bus carries its data in the time between signal transitions,
//! so the receiver needs exactly two things from the hardware: to be told
//! about every transition, and a clock to timestamp it with.

/// Direction of a transition on the sensed pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl Edge {
    /// The edge that leaves the pin at the given level
    pub fn from_level(high: bool) -> Self {
        if high {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }

    /// The opposite transition
    pub fn inverted(self) -> Self {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }
}

/// Edge interrupt source plus free-running microsecond clock
///
/// Back-ends deliver every transition of the sensed pin to the receiver's
/// `on_edge` handler while listening. The handler runs in interrupt context,
/// so it must never wait on anything the back-end holds.
///
/// All methods take `&self`: the receiver calls them from both the consumer
/// and the interrupt side.
pub trait EdgeTimer {
    /// Current time in microseconds
    ///
    /// Monotonic and wrapping at `u32::MAX`. Must be callable from within
    /// the edge handler.
    fn now_us(&self) -> u32;

    /// Start delivering edges to the receiver
    ///
    /// Calling this while already listening has no effect.
    fn listen(&self);

    /// Stop delivering edges
    ///
    /// Once this returns, no new edge is delivered.
    fn unlisten(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_from_level() {
        assert_eq!(Edge::from_level(true), Edge::Rising);
        assert_eq!(Edge::from_level(false), Edge::Falling);
    }

    #[test]
    fn test_edge_inverted() {
        assert_eq!(Edge::Rising.inverted(), Edge::Falling);
        assert_eq!(Edge::Falling.inverted(), Edge::Rising);
        assert_eq!(Edge::Rising.inverted().inverted(), Edge::Rising);
    }
}
