#![deny(missing_docs)]

//! seedmatch - complete toolkit.
//!
//! Re-exports the derivation primitives and the scanner for convenient
//! single-crate usage.

pub use seedmatch_primitives as primitives;
pub use seedmatch_scanner as scanner;
