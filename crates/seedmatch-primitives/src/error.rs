/// Unified error type for all primitives operations.
///
/// Covers errors from entropy acquisition, mnemonic decoding, key derivation
/// and address encoding.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("secure random number generator unavailable: {0}")]
    RngUnavailable(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid entropy length: {0} bits (expected 128, 160, 192, 224 or 256)")]
    InvalidEntropyLength(usize),

    #[error("invalid mnemonic word count: {0} (expected 12, 15, 18, 21 or 24)")]
    InvalidWordCount(usize),

    #[error("unknown mnemonic word: {0:?}")]
    UnknownWord(String),

    #[error("invalid master key: seed produced an out of range scalar")]
    InvalidMasterKey,

    #[error("invalid child key at index {index}")]
    InvalidChild { index: u32 },

    #[error("cannot derive hardened child {0} from a public key")]
    HardenedFromPublic(u32),

    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    #[error("unsupported address version byte 0x{0:02x}")]
    UnsupportedAddressVersion(u8),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
