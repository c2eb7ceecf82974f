//! Hash function primitives used by the derivation pipeline.
//!
//! SHA-256 feeds the BIP-39 checksum, HMAC-SHA512 drives BIP-32 key
//! derivation, PBKDF2-HMAC-SHA512 stretches mnemonics into seeds, and
//! Hash160 / SHA-256d build Base58Check addresses.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Compute SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute double SHA-256 (SHA-256d): SHA-256(SHA-256(data)).
///
/// The first four bytes of this digest are the Base58Check checksum.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// Used for P2PKH addresses and BIP-32 key fingerprints.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Compute HMAC-SHA512 of the input data with the given key.
///
/// # Arguments
/// * `key` - The HMAC key bytes (a chain code, or `"Bitcoin seed"` for the master key).
/// * `data` - The message bytes to authenticate.
///
/// # Returns
/// A 64-byte HMAC-SHA512 tag.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Derive a 64-byte key with PBKDF2-HMAC-SHA512.
///
/// # Arguments
/// * `password` - The password bytes.
/// * `salt` - The salt bytes.
/// * `rounds` - Iteration count.
///
/// # Returns
/// The 64-byte derived key.
pub fn pbkdf2_sha512(password: &[u8], salt: &[u8], rounds: u32) -> [u8; 64] {
    let mut out = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, rounds, &mut out);
    out
}
