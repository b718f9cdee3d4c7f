//! Raw data words

/// Largest word length the bus uses, in bits (programming words)
pub const MAX_WORD_BITS: u8 = 13;

/// One fully received data word
///
/// Holds the bits exactly as assembled by the receiver, start bit included.
/// The value 0 is reserved: no valid word is all zeros, so `RawWord::EMPTY`
/// stands for "no packet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawWord(u16);

impl RawWord {
    /// The "no packet" sentinel
    pub const EMPTY: RawWord = RawWord(0);

    /// Wrap raw bits
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits of the word
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check for the "no packet" sentinel
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Word length in bits, counted from the start bit
    ///
    /// Returns 0 for the empty word.
    pub const fn len(self) -> u8 {
        (u16::BITS - self.0.leading_zeros()) as u8
    }

    /// Check that every bit above `mask` is clear and `marker` is set
    ///
    /// `marker` is the start bit pattern (plus any fixed header bits) and
    /// `mask` covers the payload bits that may vary freely.
    pub(crate) const fn has_marker(self, mask: u16, marker: u16) -> bool {
        self.0 & !mask == marker
    }
}

impl From<u16> for RawWord {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl From<RawWord> for u16 {
    fn from(word: RawWord) -> Self {
        word.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_word() {
        assert!(RawWord::EMPTY.is_empty());
        assert_eq!(RawWord::EMPTY.len(), 0);
        assert_eq!(RawWord::default(), RawWord::EMPTY);
        assert!(!RawWord::new(1).is_empty());
    }

    #[test]
    fn test_word_len_follows_start_bit() {
        assert_eq!(RawWord::new(0x1000).len(), MAX_WORD_BITS);
        assert_eq!(RawWord::new(0x1fff).len(), 13);
        assert_eq!(RawWord::new(0x0200).len(), 10);
        assert_eq!(RawWord::new(0x0100).len(), 9);
        assert_eq!(RawWord::new(0x00ff).len(), 8);
        assert_eq!(RawWord::new(0x0001).len(), 1);
    }

    #[test]
    fn test_marker() {
        // Start bit alone, payload free
        assert!(RawWord::new(0x1234).has_marker(0x0fff, 0x1000));
        // Extra bit above the start bit
        assert!(!RawWord::new(0x3234).has_marker(0x0fff, 0x1000));
        // Shorter word
        assert!(!RawWord::new(0x0234).has_marker(0x0fff, 0x1000));
    }
}
