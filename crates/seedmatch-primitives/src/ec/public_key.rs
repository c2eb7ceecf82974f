//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization, Hash160 fingerprints,
//! P2PKH address generation and the point tweak used for public-only BIP-32
//! derivation.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::ProjectivePoint;
use std::fmt;

use crate::address::Address;
use crate::ec::private_key::parse_scalar;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key: a non-identity curve point.
#[derive(Clone, Debug)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from SEC1 bytes, compressed (33) or uncompressed (65).
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or `InvalidPublicKey` if the bytes are not
    /// a valid point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize in compressed SEC1 form (BIP-32 `serP`).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the X coordinate.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 form: 0x04 || X || Y.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Compressed key as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed key: RIPEMD160(SHA256(serP(K))).
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// BIP-32 key fingerprint: the first four bytes of [`PublicKey::hash160`].
    pub fn fingerprint(&self) -> [u8; 4] {
        let h = self.hash160();
        [h[0], h[1], h[2], h[3]]
    }

    /// The mainnet P2PKH address of the compressed key.
    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }

    /// Compute `self + tweak·G`.
    ///
    /// # Returns
    /// The tweaked point, or an error if `tweak >= n` or the sum is the
    /// point at infinity.
    pub fn add_tweak(&self, tweak: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let tweak = parse_scalar(tweak)
            .map_err(|_| PrimitivesError::InvalidPublicKey("tweak is not less than the curve order".to_string()))?;
        let point = self.to_projective_point() + ProjectivePoint::GENERATOR * tweak;
        let vk = VerifyingKey::from_affine(point.to_affine())
            .map_err(|_| PrimitivesError::InvalidPublicKey("tweaked point is at infinity".to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn to_projective_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
