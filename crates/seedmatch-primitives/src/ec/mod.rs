//! Elliptic curve keys on secp256k1.
//!
//! Provides private keys (scalars) with the modular tweak used by BIP-32
//! child derivation, and public keys (points) with compressed SEC1
//! serialization and point tweaking for public-only derivation.

pub mod private_key;
pub mod public_key;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
