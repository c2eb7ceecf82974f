//! BIP-39 mnemonic generation and seed derivation.
//!
//! Entropy is extended with the leading `ENT / 32` bits of its SHA-256 hash,
//! split into 11-bit groups and mapped onto the English word list. Decoding
//! reverses the mapping and rejects any sentence whose checksum disagrees.
//! [`Seed`] stretches the sentence into 64 bytes with PBKDF2-HMAC-SHA512.

pub mod seed;
pub mod wordlist;

use std::fmt;
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::entropy::{Entropy, EntropySource};
use crate::hash::sha256;
use crate::PrimitivesError;

pub use seed::Seed;

/// Mnemonic lengths allowed by BIP-39.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Bits encoded per word.
const BITS_PER_WORD: usize = 11;

/// A checksum-valid BIP-39 mnemonic.
///
/// Stored as word indices. A value can only be produced from entropy or by
/// parsing a sentence whose checksum verifies.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    indices: Vec<u16>,
}

impl Mnemonic {
    /// Encode entropy as a mnemonic.
    pub fn from_entropy(entropy: &Entropy) -> Self {
        let bytes = entropy.as_bytes();
        let entropy_bits = entropy.bit_len();
        let checksum_bits = entropy_bits / 32;
        let checksum = sha256(bytes)[0];
        let word_count = (entropy_bits + checksum_bits) / BITS_PER_WORD;

        let bit_at = |i: usize| -> u16 {
            if i < entropy_bits {
                ((bytes[i / 8] >> (7 - i % 8)) & 1) as u16
            } else {
                ((checksum >> (7 - (i - entropy_bits))) & 1) as u16
            }
        };

        let indices = (0..word_count)
            .map(|w| {
                (0..BITS_PER_WORD).fold(0u16, |acc, b| (acc << 1) | bit_at(w * BITS_PER_WORD + b))
            })
            .collect();

        Mnemonic { indices }
    }

    /// Generate a fresh mnemonic from `bits` of entropy drawn from `source`.
    pub fn generate<S: EntropySource + ?Sized>(
        source: &S,
        bits: u32,
    ) -> Result<Self, PrimitivesError> {
        let entropy = source.generate(bits)?;
        Ok(Self::from_entropy(&entropy))
    }

    /// Parse a whitespace-separated sentence.
    ///
    /// Every word must appear in the word list exactly as written; the word
    /// count and checksum are verified.
    pub fn parse(phrase: &str) -> Result<Self, PrimitivesError> {
        let indices = phrase
            .split_whitespace()
            .map(|w| wordlist::index_of(w).ok_or_else(|| PrimitivesError::UnknownWord(w.to_string())))
            .collect::<Result<Vec<u16>, _>>()?;
        Self::from_indices(indices)
    }

    /// Build a mnemonic from raw word indices, verifying the checksum.
    pub fn from_indices(indices: Vec<u16>) -> Result<Self, PrimitivesError> {
        decode_indices(&indices)?;
        Ok(Mnemonic { indices })
    }

    /// Recover the entropy this mnemonic encodes.
    pub fn to_entropy(&self) -> Entropy {
        decode_indices(&self.indices).expect("mnemonic checksum verified on construction")
    }

    /// Derive the 64-byte seed for this mnemonic and `passphrase`.
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        Seed::from_mnemonic(self, passphrase)
    }

    /// Word indices, in order.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of words.
    pub fn word_count(&self) -> usize {
        self.indices.len()
    }

    /// The words, in order.
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indices
            .iter()
            .map(|&i| wordlist::words()[i as usize])
    }

    /// The sentence: words joined by a single space.
    pub fn phrase(&self) -> String {
        self.words().collect::<Vec<_>>().join(" ")
    }
}

impl FromStr for Mnemonic {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phrase())
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &self.indices.len())
            .finish_non_exhaustive()
    }
}

/// Decode word indices back into entropy, verifying the embedded checksum.
///
/// # Returns
/// The entropy, `InvalidWordCount` for a length BIP-39 does not define,
/// `UnknownWord` for an index past the end of the word list, or
/// `ChecksumMismatch` when the trailing bits disagree with SHA-256(entropy).
pub fn decode_indices(indices: &[u16]) -> Result<Entropy, PrimitivesError> {
    if !VALID_WORD_COUNTS.contains(&indices.len()) {
        return Err(PrimitivesError::InvalidWordCount(indices.len()));
    }
    if let Some(bad) = indices.iter().find(|&&i| wordlist::word(i).is_none()) {
        return Err(PrimitivesError::UnknownWord(format!("#{bad}")));
    }

    let total_bits = indices.len() * BITS_PER_WORD;
    let checksum_bits = total_bits / 33;
    let entropy_bits = total_bits - checksum_bits;

    let mut entropy = vec![0u8; entropy_bits / 8];
    let mut checksum = 0u8;
    for i in 0..total_bits {
        let bit = ((indices[i / BITS_PER_WORD] >> (BITS_PER_WORD - 1 - i % BITS_PER_WORD)) & 1) as u8;
        if i < entropy_bits {
            entropy[i / 8] |= bit << (7 - i % 8);
        } else {
            checksum = (checksum << 1) | bit;
        }
    }

    let expected = sha256(&entropy)[0] >> (8 - checksum_bits);
    let result = if expected == checksum {
        Entropy::from_bytes(&entropy)
    } else {
        Err(PrimitivesError::ChecksumMismatch)
    };
    entropy.zeroize();
    result
}
