//! BIP-32 hierarchical deterministic keys.
//!
//! Master key generation from a BIP-39 seed, hardened and normal child
//! derivation, and mainnet `xprv`/`xpub` serialization. BIP-44 paths are
//! plain [`DerivationPath`] values.

pub mod extended_key;
pub mod path;

pub use extended_key::{ExtendedKey, ExtendedPublicKey};
pub use path::{ChildNumber, DerivationPath, HARDENED_OFFSET};
