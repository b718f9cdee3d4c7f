//! Word assembly
//!
//! Collects classified bits into fixed-width words between SYNC markers.

use trackbus_protocol::RawWord;

use crate::timing::Symbol;

/// Accumulates bits after a SYNC until a word is complete
///
/// Bits are shifted in MSB-first, so the first bit on the wire ends up
/// as the word's highest bit.
#[derive(Debug, Clone)]
pub struct WordAssembler {
    word_bits: u8,
    bits: u16,
    /// Bits received since SYNC, or `None` while hunting for SYNC
    index: Option<u8>,
}

impl WordAssembler {
    /// Create an assembler for words of `word_bits` bits
    pub const fn new(word_bits: u8) -> Self {
        Self {
            word_bits,
            bits: 0,
            index: None,
        }
    }

    /// Drop any partial word and wait for the next SYNC
    pub fn reset(&mut self) {
        self.bits = 0;
        self.index = None;
    }

    /// Check if a word is being received
    pub fn in_word(&self) -> bool {
        self.index.is_some()
    }

    /// Feed one symbol
    ///
    /// Returns the completed word when the last bit arrives. Bits seen
    /// while hunting for SYNC are ignored, and a glitch discards the
    /// partial word.
    pub fn push(&mut self, symbol: Symbol) -> Option<RawWord> {
        match symbol {
            Symbol::Sync => {
                self.bits = 0;
                self.index = Some(0);
                None
            }
            Symbol::Glitch => {
                self.reset();
                None
            }
            Symbol::Bit(bit) => {
                let index = self.index? + 1;
                self.bits = (self.bits << 1) | bit as u16;

                if index < self.word_bits {
                    self.index = Some(index);
                    return None;
                }

                let word = RawWord::new(self.bits);
                self.reset();
                // All zeros is the "no packet" sentinel, never a word
                (!word.is_empty()).then_some(word)
            }
        }
    }
}
