//! BIP-39 seed derivation.
//!
//! seed = PBKDF2-HMAC-SHA512(password = NFKD(sentence),
//!                           salt = "mnemonic" || NFKD(passphrase),
//!                           rounds = 2048, len = 64)

use std::fmt;

use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::bip39::Mnemonic;
use crate::hash::pbkdf2_sha512;

/// PBKDF2 iteration count fixed by BIP-39.
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Length of a BIP-39 seed in bytes.
pub const SEED_LEN: usize = 64;

const SALT_PREFIX: &str = "mnemonic";

/// A 64-byte BIP-39 seed, the root of HD key derivation. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SEED_LEN],
}

impl Seed {
    /// Derive the seed for a validated mnemonic.
    pub fn from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> Self {
        let sentence = Zeroizing::new(mnemonic.phrase());
        Self::derive(&sentence, passphrase)
    }

    /// Derive a seed from raw sentence text without word-list validation.
    ///
    /// Runs of whitespace collapse to a single space before normalization,
    /// so the result matches [`Seed::from_mnemonic`] for any valid sentence.
    pub fn from_phrase(phrase: &str, passphrase: &str) -> Self {
        let sentence = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
        Self::derive(&sentence, passphrase)
    }

    /// Wrap raw seed bytes, e.g. a BIP-32 test vector seed.
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Seed { bytes }
    }

    /// The seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.bytes
    }

    /// Lowercase hex encoding of the seed.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    fn derive(sentence: &str, passphrase: &str) -> Self {
        let password = Zeroizing::new(sentence.nfkd().collect::<String>());
        let salt = Zeroizing::new(
            SALT_PREFIX
                .chars()
                .chain(passphrase.nfkd())
                .collect::<String>(),
        );
        Seed {
            bytes: pbkdf2_sha512(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS),
        }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}
