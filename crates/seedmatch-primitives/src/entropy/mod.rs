//! Entropy acquisition for mnemonic generation.
//!
//! [`EntropySource`] is the seam between the pipeline and the platform
//! random number generator. [`OsEntropy`] reads the operating system CSPRNG
//! and reports failure as [`PrimitivesError::RngUnavailable`]; there is no
//! fallback to a weaker generator.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::PrimitivesError;

/// Entropy sizes accepted by BIP-39, in bits.
pub const VALID_ENTROPY_BITS: [usize; 5] = [128, 160, 192, 224, 256];

/// Entropy size used for 12-word mnemonics.
pub const DEFAULT_ENTROPY_BITS: u32 = 128;

/// Raw random bytes used as mnemonic source material.
///
/// Always 16, 20, 24, 28 or 32 bytes long. The bytes are wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Entropy {
    bytes: Vec<u8>,
}

impl Entropy {
    /// Wrap existing bytes, checking the length is a valid BIP-39 size.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let bits = bytes.len() * 8;
        if !VALID_ENTROPY_BITS.contains(&bits) {
            return Err(PrimitivesError::InvalidEntropyLength(bits));
        }
        Ok(Entropy {
            bytes: bytes.to_vec(),
        })
    }

    /// Parse entropy from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// The raw entropy bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Entropy length in bits.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Lowercase hex encoding of the entropy.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entropy")
            .field("bits", &self.bit_len())
            .finish_non_exhaustive()
    }
}

/// A source of cryptographically secure random bytes.
///
/// Implementations must be safe to share between worker threads.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrimitivesError>;

    /// Generate `bits` of entropy. `bits` must be one of 128, 160, 192, 224 or 256.
    fn generate(&self, bits: u32) -> Result<Entropy, PrimitivesError> {
        let bits = bits as usize;
        if !VALID_ENTROPY_BITS.contains(&bits) {
            return Err(PrimitivesError::InvalidEntropyLength(bits));
        }
        let mut buf = vec![0u8; bits / 8];
        self.fill_bytes(&mut buf)?;
        let entropy = Entropy::from_bytes(&buf);
        buf.zeroize();
        entropy
    }
}

/// Entropy from the operating system random number generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrimitivesError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| PrimitivesError::RngUnavailable(e.to_string()))
    }
}

impl<T: EntropySource + ?Sized> EntropySource for std::sync::Arc<T> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrimitivesError> {
        (**self).fill_bytes(dest)
    }
}
