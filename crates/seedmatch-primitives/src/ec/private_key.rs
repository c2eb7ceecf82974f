//! secp256k1 private key.
//!
//! Wraps a k256 signing key. Beyond serialization it offers exactly the
//! scalar arithmetic BIP-32 needs: `k_child = (tweak + k_parent) mod n`.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, Scalar};

use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key: a scalar in `[1, n)`.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the scalar is non-zero and below the curve order,
    /// otherwise `InvalidPrivateKey`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|_| PrimitivesError::InvalidPrivateKey("scalar is zero or out of range".to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the scalar as 32 big-endian bytes (BIP-32 `ser256`).
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES_LEN] {
        let mut out = [0u8; PRIVATE_KEY_BYTES_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the scalar as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The public key `point(k) = k·G`.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Compute `(tweak + self) mod n`.
    ///
    /// # Arguments
    /// * `tweak` - A 32-byte big-endian scalar, typically `IL` from BIP-32.
    ///
    /// # Returns
    /// The tweaked key, or `InvalidPrivateKey` if `tweak >= n` or the sum is zero.
    pub fn add_tweak(&self, tweak: &[u8; 32]) -> Result<PrivateKey, PrimitivesError> {
        let tweak = parse_scalar(tweak)?;
        let sum = self.to_scalar() + tweak;
        if bool::from(sum.is_zero()) {
            return Err(PrimitivesError::InvalidPrivateKey(
                "tweaked key is zero".to_string(),
            ));
        }
        Self::from_bytes(&sum.to_repr())
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Interpret 32 bytes as a scalar without reduction.
///
/// Returns `InvalidPrivateKey` when the value is not below the curve order.
pub(crate) fn parse_scalar(bytes: &[u8; 32]) -> Result<Scalar, PrimitivesError> {
    Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(bytes))).ok_or_else(|| {
        PrimitivesError::InvalidPrivateKey("value is not less than the curve order".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// secp256k1 group order n.
    const CURVE_ORDER_HEX: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn order_minus(k: u8) -> [u8; 32] {
        let mut bytes: [u8; 32] = hex::decode(CURVE_ORDER_HEX).unwrap().try_into().unwrap();
        bytes[31] -= k;
        bytes
    }

    fn scalar_bytes(k: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = k;
        bytes
    }

    #[test]
    fn test_bytes_and_hex_roundtrip() {
        let hex_str = "eaf02ca348c524e6392655ba4d29603cd1a7347d9d65cfe93ce1ebffdca22694";
        let key = PrivateKey::from_hex(hex_str).unwrap();
        assert_eq!(key.to_hex(), hex_str);
        assert_eq!(PrivateKey::from_bytes(&key.to_bytes()).unwrap(), key);
    }

    #[test]
    fn test_rejects_out_of_range_scalars() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_hex(CURVE_ORDER_HEX).is_err());
        assert!(PrivateKey::from_bytes(&order_minus(1)).is_ok());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_hex("").is_err());
    }

    #[test]
    fn test_generator_public_key() {
        let one = PrivateKey::from_bytes(&scalar_bytes(1)).unwrap();
        assert_eq!(
            one.pub_key().to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_add_tweak() {
        let two = PrivateKey::from_bytes(&scalar_bytes(2)).unwrap();
        let five = two.add_tweak(&scalar_bytes(3)).unwrap();
        assert_eq!(five.to_bytes(), scalar_bytes(5));
    }

    #[test]
    fn test_add_tweak_wraps_modulo_order() {
        let two = PrivateKey::from_bytes(&scalar_bytes(2)).unwrap();
        // (n - 1) + 2 = 1 mod n
        let one = two.add_tweak(&order_minus(1)).unwrap();
        assert_eq!(one.to_bytes(), scalar_bytes(1));
    }

    #[test]
    fn test_add_tweak_rejects_zero_sum() {
        let one = PrivateKey::from_bytes(&scalar_bytes(1)).unwrap();
        assert!(one.add_tweak(&order_minus(1)).is_err());
    }

    #[test]
    fn test_add_tweak_rejects_tweak_at_or_above_order() {
        let one = PrivateKey::from_bytes(&scalar_bytes(1)).unwrap();
        assert!(one.add_tweak(&order_minus(0)).is_err());
        assert!(one.add_tweak(&[0xff; 32]).is_err());
    }
}
