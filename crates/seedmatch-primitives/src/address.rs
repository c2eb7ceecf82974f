//! Bitcoin P2PKH addresses.
//!
//! An address is `Base58(0x00 || HASH160(compressed_pubkey) || checksum)`
//! where the checksum is the first four bytes of SHA-256d over the first
//! 21 bytes. Only the mainnet version byte is produced or accepted.

use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::ec::PublicKey;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Mainnet P2PKH address version byte.
pub const MAINNET_P2PKH: u8 = 0x00;

/// Decoded length: version + 20-byte hash + 4-byte checksum.
const ADDRESS_BYTES_LEN: usize = 25;

/// A mainnet P2PKH address.
///
/// Holds both the Base58Check text and the 20-byte public key hash it encodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    /// The human-readable Base58Check address string.
    pub address_string: String,
    /// The 20-byte RIPEMD-160(SHA-256(pubkey)) hash.
    pub public_key_hash: [u8; 20],
}

impl Address {
    /// Parse a Base58Check address string.
    ///
    /// # Returns
    /// The decoded address, or `InvalidBase58` (bad characters),
    /// `InvalidAddressLength`, `ChecksumMismatch`, or
    /// `UnsupportedAddressVersion` for anything but a mainnet P2PKH address.
    pub fn from_string(addr: &str) -> Result<Self, PrimitivesError> {
        let decoded = base58::decode(addr)?;
        if decoded.len() != ADDRESS_BYTES_LEN {
            return Err(PrimitivesError::InvalidAddressLength(addr.to_string()));
        }

        let (payload, check) = decoded.split_at(ADDRESS_BYTES_LEN - base58::CHECKSUM_LEN);
        if check != base58::checksum(payload) {
            return Err(PrimitivesError::ChecksumMismatch);
        }
        if payload[0] != MAINNET_P2PKH {
            return Err(PrimitivesError::UnsupportedAddressVersion(payload[0]));
        }

        let mut pkh = [0u8; 20];
        pkh.copy_from_slice(&payload[1..]);

        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash: pkh,
        })
    }

    /// Create an address from a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20]) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(MAINNET_P2PKH);
        payload.extend_from_slice(hash);

        Address {
            address_string: base58::check_encode(&payload),
            public_key_hash: *hash,
        }
    }

    /// Create the address of a public key, using its compressed encoding.
    pub fn from_public_key(pub_key: &PublicKey) -> Self {
        Self::from_public_key_hash(&pub_key.hash160())
    }

    /// Create an address from raw SEC1 public key bytes.
    ///
    /// The bytes are hashed as given, so an uncompressed key yields a
    /// different address than its compressed form.
    pub fn from_public_key_bytes(pub_key: &[u8]) -> Result<Self, PrimitivesError> {
        PublicKey::from_bytes(pub_key)?;
        Ok(Self::from_public_key_hash(&hash160(pub_key)))
    }

    /// The Base58Check text.
    pub fn as_str(&self) -> &str {
        &self.address_string
    }
}

impl FromStr for Address {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PUBLIC_KEY: &str =
        "026cf33373a9f3f6c676b75b543180703df225f7f8edbffedc417718a8ad4e89ce";
    const TEST_PUBLIC_KEY_HASH: &str = "00ac6144c4db7b5790f343cf0477a65fb8a02eb7";
    const TEST_ADDRESS: &str = "114ZWApV4EEU8frr7zygqQcB1V2BodGZuS";

    #[test]
    fn test_from_string_mainnet() {
        let addr = Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr").unwrap();
        assert_eq!(
            hex::encode(addr.public_key_hash),
            "8fe80c75c9560e8b56ed64ea3c26e18d2c52211b"
        );
        assert_eq!(addr.to_string(), "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr");
    }

    #[test]
    fn test_from_public_key() {
        let pk = PublicKey::from_hex(TEST_PUBLIC_KEY).unwrap();
        let addr = pk.to_address();
        assert_eq!(hex::encode(addr.public_key_hash), TEST_PUBLIC_KEY_HASH);
        assert_eq!(addr.as_str(), TEST_ADDRESS);
        assert_eq!(
            Address::from_public_key_bytes(&pk.to_compressed()).unwrap(),
            addr
        );
    }

    #[test]
    fn test_leading_zero_hash_keeps_leading_ones() {
        // Version byte 0x00 and a hash starting with 0x00 give two leading '1's.
        let addr: Address = TEST_ADDRESS.parse().unwrap();
        assert!(addr.as_str().starts_with("11"));
        assert_eq!(addr.public_key_hash[0], 0);
    }

    #[test]
    fn test_decode_reproduces_hash() {
        let hash: [u8; 20] = hex::decode(TEST_PUBLIC_KEY_HASH).unwrap().try_into().unwrap();
        let addr = Address::from_public_key_hash(&hash);
        let decoded = Address::from_string(addr.as_str()).unwrap();
        assert_eq!(decoded.public_key_hash, hash);
        assert_eq!(decoded, addr);
    }

    #[test]
    fn test_rejects_testnet_version() {
        assert!(matches!(
            Address::from_string("mtdruWYVEV1wz5yL7GvpBj4MgifCB7yhPd"),
            Err(PrimitivesError::UnsupportedAddressVersion(0x6f))
        ));
    }

    #[test]
    fn test_rejects_corrupted_checksum() {
        let mut corrupted = TEST_ADDRESS.to_string();
        corrupted.pop();
        corrupted.push('T');
        assert!(matches!(
            Address::from_string(&corrupted),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_length_checked_before_checksum() {
        // 26 bytes with a valid checksum over the first 22.
        let mut payload = vec![MAINNET_P2PKH];
        payload.extend_from_slice(&[0x11; 21]);
        let long = base58::check_encode(&payload);
        assert!(matches!(
            Address::from_string(&long),
            Err(PrimitivesError::InvalidAddressLength(_))
        ));

        let decoded = Address::from_string(TEST_ADDRESS).unwrap();
        assert_eq!(
            base58::check_decode(TEST_ADDRESS).unwrap()[1..],
            decoded.public_key_hash[..]
        );
    }

    #[test]
    fn test_rejects_short_and_malformed() {
        assert!(matches!(
            Address::from_string("ADD8E55"),
            Err(PrimitivesError::InvalidAddressLength(_))
        ));
        assert!(matches!(
            Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFM0"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
    }
}
