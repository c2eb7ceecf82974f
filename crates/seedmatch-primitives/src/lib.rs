//! seedmatch primitives - the deterministic wallet-derivation pipeline.
//!
//! This crate provides every step from randomness to a Bitcoin address:
//! - Secure entropy acquisition
//! - BIP-39 mnemonic encoding/decoding and PBKDF2 seed derivation
//! - BIP-32 hierarchical key derivation along BIP-44 paths (secp256k1)
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC-SHA512)
//! - Base58 / Base58Check encoding and P2PKH addresses
//!
//! Nothing here performs I/O or logging; all derivation is pure.

pub mod hash;
pub mod base58;
pub mod entropy;
pub mod bip39;
pub mod ec;
pub mod bip32;
pub mod address;

mod error;
pub use error::PrimitivesError;

pub use address::Address;
pub use bip32::{ChildNumber, DerivationPath, ExtendedKey, ExtendedPublicKey};
pub use bip39::{Mnemonic, Seed};
pub use entropy::{Entropy, EntropySource, OsEntropy};
