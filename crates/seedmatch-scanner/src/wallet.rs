//! The wallet pipeline: entropy, mnemonic, seed, BIP-44 keys, addresses.

use tracing::warn;

use seedmatch_primitives::bip32::{ChildNumber, DerivationPath, ExtendedKey};
use seedmatch_primitives::entropy::{EntropySource, OsEntropy, DEFAULT_ENTROPY_BITS};
use seedmatch_primitives::{Address, Mnemonic, PrimitivesError};

/// An address together with the path it was derived at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAddress {
    /// Full derivation path from the master key.
    pub path: DerivationPath,
    /// P2PKH address of the compressed public key.
    pub address: Address,
}

/// A generated mnemonic and the addresses derived from it.
#[derive(Debug, Clone)]
pub struct Wallet {
    mnemonic: Mnemonic,
    addresses: Vec<DerivedAddress>,
}

impl Wallet {
    /// The mnemonic.
    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    /// The mnemonic sentence.
    pub fn phrase(&self) -> String {
        self.mnemonic.phrase()
    }

    /// Derived addresses, in index order. Never empty.
    pub fn addresses(&self) -> &[DerivedAddress] {
        &self.addresses
    }

    /// The address at the configured path.
    pub fn first_address(&self) -> &Address {
        &self.addresses[0].address
    }
}

/// Generates wallets along a fixed derivation path.
///
/// The last step of the path is the first address index; further addresses
/// use the following indices on the same chain.
#[derive(Debug, Clone)]
pub struct WalletGenerator<S = OsEntropy> {
    source: S,
    passphrase: String,
    entropy_bits: u32,
    chain: DerivationPath,
    first_index: ChildNumber,
    addresses_per_seed: u32,
}

impl WalletGenerator<OsEntropy> {
    /// A generator using the operating system RNG and the default settings.
    pub fn new() -> Self {
        Self::with_source(OsEntropy)
    }
}

impl Default for WalletGenerator<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EntropySource> WalletGenerator<S> {
    /// A generator drawing entropy from `source`, on path `m/44'/0'/0'/0/0`.
    pub fn with_source(source: S) -> Self {
        // bitcoin_receive() always has five steps.
        let (chain, first_index) = DerivationPath::bitcoin_receive()
            .split_last()
            .unwrap_or_else(|| (DerivationPath::master(), ChildNumber::from_raw(0)));
        Self {
            source,
            passphrase: String::new(),
            entropy_bits: DEFAULT_ENTROPY_BITS,
            chain,
            first_index,
            addresses_per_seed: 1,
        }
    }

    /// Set the BIP-39 passphrase.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = passphrase.into();
        self
    }

    /// Set the entropy size; validated when a wallet is generated.
    pub fn with_entropy_bits(mut self, bits: u32) -> Self {
        self.entropy_bits = bits;
        self
    }

    /// Set the path of the first address. The path must not be empty.
    pub fn with_path(mut self, path: &DerivationPath) -> Result<Self, PrimitivesError> {
        let (chain, first_index) = path.split_last().ok_or_else(|| {
            PrimitivesError::InvalidDerivationPath("path must name at least one step".to_string())
        })?;
        self.chain = chain;
        self.first_index = first_index;
        Ok(self)
    }

    /// Set how many consecutive indices to derive per seed (at least one).
    pub fn with_addresses_per_seed(mut self, count: u32) -> Self {
        self.addresses_per_seed = count.max(1);
        self
    }

    /// Generate a fresh mnemonic and derive its addresses.
    pub fn generate(&self) -> Result<Wallet, PrimitivesError> {
        let mnemonic = Mnemonic::generate(&self.source, self.entropy_bits)?;
        self.derive(mnemonic)
    }

    /// Derive the addresses of an existing mnemonic.
    pub fn derive(&self, mnemonic: Mnemonic) -> Result<Wallet, PrimitivesError> {
        let seed = mnemonic.to_seed(&self.passphrase);
        let master = ExtendedKey::new_master(seed.as_bytes())?;
        let chain_key = master.derive_path(&self.chain)?;
        let addresses = derive_addresses(
            &chain_key,
            &self.chain,
            self.first_index,
            self.addresses_per_seed,
        )?;
        Ok(Wallet {
            mnemonic,
            addresses,
        })
    }
}

/// Derive `count` addresses below `chain_key`, starting at `first`.
///
/// An index whose child key is invalid is skipped with a warning and the
/// next index is used instead.
pub fn derive_addresses(
    chain_key: &ExtendedKey,
    chain: &DerivationPath,
    first: ChildNumber,
    count: u32,
) -> Result<Vec<DerivedAddress>, PrimitivesError> {
    let mut out = Vec::with_capacity(count as usize);
    let mut index = first;
    loop {
        match chain_key.derive_child(index) {
            Ok(key) => out.push(DerivedAddress {
                path: chain.child(index),
                address: key.address(),
            }),
            Err(PrimitivesError::InvalidChild { index: skipped }) => {
                warn!(index = skipped, "invalid child key, trying next index");
            }
            Err(e) => return Err(e),
        }
        if out.len() >= count as usize {
            return Ok(out);
        }
        index = index.next().ok_or_else(|| {
            PrimitivesError::InvalidDerivationPath("child index space exhausted".to_string())
        })?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ZeroEntropy;

    impl EntropySource for ZeroEntropy {
        fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrimitivesError> {
            dest.fill(0);
            Ok(())
        }
    }

    struct NoEntropy;

    impl EntropySource for NoEntropy {
        fn fill_bytes(&self, _dest: &mut [u8]) -> Result<(), PrimitivesError> {
            Err(PrimitivesError::RngUnavailable("unplugged".into()))
        }
    }

    #[test]
    fn test_generate_known_wallet() {
        let wallet = WalletGenerator::with_source(ZeroEntropy).generate().unwrap();
        assert_eq!(
            wallet.phrase(),
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
        assert_eq!(wallet.addresses().len(), 1);
        assert_eq!(
            wallet.first_address().as_str(),
            "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA"
        );
        assert_eq!(wallet.addresses()[0].path, DerivationPath::bitcoin_receive());
    }

    #[test]
    fn test_multiple_addresses_per_seed() {
        let wallet = WalletGenerator::with_source(ZeroEntropy)
            .with_addresses_per_seed(3)
            .generate()
            .unwrap();
        let addrs: Vec<&str> = wallet.addresses().iter().map(|d| d.address.as_str()).collect();
        assert_eq!(
            addrs,
            [
                "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA",
                "1Ak8PffB2meyfYnbXZR9EGfLfFZVpzJvQP",
                "1MNF5RSaabFwcbtJirJwKnDytsXXEsVsNb",
            ]
        );
        assert_eq!(wallet.addresses()[2].path.to_string(), "m/44'/0'/0'/0/2");
    }

    #[test]
    fn test_custom_start_path() {
        let path: DerivationPath = "m/44'/0'/0'/0/1".parse().unwrap();
        let wallet = WalletGenerator::with_source(ZeroEntropy)
            .with_path(&path)
            .unwrap()
            .generate()
            .unwrap();
        assert_eq!(
            wallet.first_address().as_str(),
            "1Ak8PffB2meyfYnbXZR9EGfLfFZVpzJvQP"
        );
        assert!(WalletGenerator::new().with_path(&DerivationPath::master()).is_err());
    }

    #[test]
    fn test_rng_failure_is_fatal() {
        let err = WalletGenerator::with_source(NoEntropy).generate().unwrap_err();
        assert!(matches!(err, PrimitivesError::RngUnavailable(_)));
    }

    #[test]
    fn test_invalid_entropy_bits() {
        let err = WalletGenerator::with_source(ZeroEntropy)
            .with_entropy_bits(100)
            .generate()
            .unwrap_err();
        assert!(matches!(err, PrimitivesError::InvalidEntropyLength(100)));
    }

    #[test]
    fn test_os_wallets_differ() {
        let generator = WalletGenerator::new();
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert_ne!(a.phrase(), b.phrase());
        assert_eq!(a.mnemonic().word_count(), 12);
    }
}
