//! Base58 encoding and decoding with optional checksum support.
//!
//! Raw Base58 uses Bitcoin's alphabet; Base58Check appends the first four
//! bytes of SHA-256d(payload) and is used for P2PKH addresses and
//! serialized extended keys.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string.
///
/// Leading zero bytes are encoded as leading '1' characters.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// Leading '1' characters decode to leading zero bytes. Characters outside
/// the alphabet (`0`, `O`, `I`, `l`, punctuation) are rejected.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Compute the 4-byte Base58Check checksum of `data`.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256d(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Encode `data || checksum(data)` as Base58 (Base58Check).
pub fn check_encode(data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum(data));
    encode(&payload)
}

/// Decode a Base58Check string, verifying and stripping the checksum.
///
/// # Returns
/// The payload without checksum, `InvalidBase58` for bad characters or
/// short input, or `ChecksumMismatch` when the trailing four bytes disagree.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let split = decoded.len() - CHECKSUM_LEN;
    if decoded[split..] != checksum(&decoded[..split]) {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    decoded.truncate(split);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_empty() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_base58_leading_zeros_map_to_ones() {
        assert_eq!(encode(&[0]), "1");
        assert_eq!(encode(&[0, 0, 0, 0]), "1111");

        let input = hex::decode("000000287FB4CD").unwrap();
        assert_eq!(encode(&input), "111233QC4");
        assert_eq!(decode("111233QC4").unwrap(), input);
    }

    #[test]
    fn test_base58_known_address_bytes() {
        let input = hex::decode("00010966776006953D5567439E5E39F86A0D273BEED61967F6").unwrap();
        assert_eq!(encode(&input), "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM");
        assert_eq!(decode("16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM").unwrap(), input);
    }

    #[test]
    fn test_base58_rejects_ambiguous_characters() {
        for bad in ["0", "O", "I", "l", "1234!@#$%"] {
            assert!(decode(bad).is_err(), "{bad:?} should not decode");
        }
    }

    #[test]
    fn test_check_roundtrip() {
        let payload = hex::decode("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31").unwrap();
        let encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_check_decode_bad_checksum() {
        let mut encoded = check_encode(&[0x80, 0x01, 0x02, 0x03]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(matches!(
            check_decode(&encoded),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_check_decode_too_short() {
        assert!(matches!(
            check_decode("1"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
    }
}
