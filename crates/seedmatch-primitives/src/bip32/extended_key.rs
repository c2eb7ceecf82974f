//! Extended private and public keys.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroizing;

use crate::address::Address;
use crate::base58;
use crate::bip32::path::{ChildNumber, DerivationPath};
use crate::ec::{PrivateKey, PublicKey};
use crate::hash::sha512_hmac;
use crate::PrimitivesError;

/// HMAC key for master key generation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Mainnet `xprv` version bytes.
pub const MAINNET_XPRV: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];

/// Mainnet `xpub` version bytes.
pub const MAINNET_XPUB: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

/// Length of a serialized extended key before the Base58Check checksum.
const SERIALIZED_LEN: usize = 78;

/// Split a 64-byte HMAC output into `(IL, IR)`.
fn split_hmac(i: &[u8; 64]) -> (Zeroizing<[u8; 32]>, [u8; 32]) {
    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = [0u8; 32];
    il.copy_from_slice(&i[..32]);
    ir.copy_from_slice(&i[32..]);
    (il, ir)
}

/// An extended private key: a private scalar plus the chain code and
/// metadata needed to derive children.
///
/// Derivation never mutates; every step returns a new key.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    private_key: PrivateKey,
    chain_code: [u8; 32],
    depth: u8,
    child_number: ChildNumber,
    parent_fingerprint: [u8; 4],
}

impl ExtendedKey {
    /// Generate the master key from a seed (16 to 64 bytes).
    ///
    /// `I = HMAC-SHA512("Bitcoin seed", seed)`; `IL` is the master scalar and
    /// `IR` the chain code.
    ///
    /// # Returns
    /// The master key, or `InvalidMasterKey` if `IL` is zero or not below
    /// the curve order.
    pub fn new_master(seed: &[u8]) -> Result<Self, PrimitivesError> {
        let i = Zeroizing::new(sha512_hmac(MASTER_HMAC_KEY, seed));
        let (il, chain_code) = split_hmac(&i);
        let private_key =
            PrivateKey::from_bytes(&il[..]).map_err(|_| PrimitivesError::InvalidMasterKey)?;
        Ok(ExtendedKey {
            private_key,
            chain_code,
            depth: 0,
            child_number: ChildNumber::from_raw(0),
            parent_fingerprint: [0; 4],
        })
    }

    /// Derive the child key at `child` (BIP-32 `CKDpriv`).
    ///
    /// # Returns
    /// The child key, or `InvalidChild` if `IL >= n` or the child scalar is
    /// zero; the caller should move on to the next index.
    pub fn derive_child(&self, child: ChildNumber) -> Result<ExtendedKey, PrimitivesError> {
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            PrimitivesError::InvalidDerivationPath("maximum depth exceeded".to_string())
        })?;

        let parent_pub = self.private_key.pub_key();
        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if child.is_hardened() {
            data.push(0x00);
            data.extend_from_slice(&self.private_key.to_bytes());
        } else {
            data.extend_from_slice(&parent_pub.to_compressed());
        }
        data.extend_from_slice(&child.raw().to_be_bytes());

        let i = Zeroizing::new(sha512_hmac(&self.chain_code, &data));
        let (il, chain_code) = split_hmac(&i);
        let private_key = self
            .private_key
            .add_tweak(&il)
            .map_err(|_| PrimitivesError::InvalidChild { index: child.raw() })?;

        Ok(ExtendedKey {
            private_key,
            chain_code,
            depth,
            child_number: child,
            parent_fingerprint: parent_pub.fingerprint(),
        })
    }

    /// Derive along `path`, one step at a time, starting from this key.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedKey, PrimitivesError> {
        path.iter()
            .try_fold(self.clone(), |key, child| key.derive_child(child))
    }

    /// The neutered form of this key.
    pub fn to_extended_public_key(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            public_key: self.private_key.pub_key(),
            chain_code: self.chain_code,
            depth: self.depth,
            child_number: self.child_number,
            parent_fingerprint: self.parent_fingerprint,
        }
    }

    /// The private scalar.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The compressed public key for this scalar.
    pub fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }

    /// P2PKH address of this key's compressed public key.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// The 32-byte chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Number of derivation steps from the master key.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The child number this key was derived at; zero for a master key.
    pub fn child_number(&self) -> ChildNumber {
        self.child_number
    }

    /// First four bytes of the parent's Hash160; zero for a master key.
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// This key's own fingerprint, as recorded by its children.
    pub fn fingerprint(&self) -> [u8; 4] {
        self.public_key().fingerprint()
    }

    /// Serialize as a Base58Check `xprv` string.
    pub fn to_xprv(&self) -> String {
        let mut key = [0u8; 33];
        key[1..].copy_from_slice(&self.private_key.to_bytes());
        let bytes = Zeroizing::new(serialize(
            MAINNET_XPRV,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
            &key,
        ));
        base58::check_encode(&bytes[..])
    }

    /// Parse a Base58Check `xprv` string.
    pub fn from_xprv(s: &str) -> Result<Self, PrimitivesError> {
        let raw = Zeroizing::new(base58::check_decode(s)?);
        let parts = deserialize(&raw, MAINNET_XPRV)?;
        if parts.key[0] != 0x00 {
            return Err(PrimitivesError::InvalidExtendedKey(
                "private key data must start with 0x00".to_string(),
            ));
        }
        let private_key = PrivateKey::from_bytes(&parts.key[1..])
            .map_err(|e| PrimitivesError::InvalidExtendedKey(e.to_string()))?;
        Ok(ExtendedKey {
            private_key,
            chain_code: parts.chain_code,
            depth: parts.depth,
            child_number: parts.child_number,
            parent_fingerprint: parts.parent_fingerprint,
        })
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("child_number", &self.child_number)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .finish_non_exhaustive()
    }
}

/// An extended public key: a curve point plus chain code.
///
/// Can derive non-hardened children only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    public_key: PublicKey,
    chain_code: [u8; 32],
    depth: u8,
    child_number: ChildNumber,
    parent_fingerprint: [u8; 4],
}

impl ExtendedPublicKey {
    /// Derive the non-hardened child at `child` (BIP-32 `CKDpub`).
    ///
    /// # Returns
    /// The child key, `HardenedFromPublic` for a hardened index, or
    /// `InvalidChild` if `IL >= n` or the child point is at infinity.
    pub fn derive_child(&self, child: ChildNumber) -> Result<ExtendedPublicKey, PrimitivesError> {
        if child.is_hardened() {
            return Err(PrimitivesError::HardenedFromPublic(child.index()));
        }
        let depth = self.depth.checked_add(1).ok_or_else(|| {
            PrimitivesError::InvalidDerivationPath("maximum depth exceeded".to_string())
        })?;

        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&self.public_key.to_compressed());
        data.extend_from_slice(&child.raw().to_be_bytes());

        let i = sha512_hmac(&self.chain_code, &data);
        let (il, chain_code) = split_hmac(&i);
        let public_key = self
            .public_key
            .add_tweak(&il)
            .map_err(|_| PrimitivesError::InvalidChild { index: child.raw() })?;

        Ok(ExtendedPublicKey {
            public_key,
            chain_code,
            depth,
            child_number: child,
            parent_fingerprint: self.public_key.fingerprint(),
        })
    }

    /// Derive along an all-normal `path`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedPublicKey, PrimitivesError> {
        path.iter()
            .try_fold(self.clone(), |key, child| key.derive_child(child))
    }

    /// The public point.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// P2PKH address of this key.
    pub fn address(&self) -> Address {
        self.public_key.to_address()
    }

    /// The 32-byte chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Number of derivation steps from the master key.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// The child number this key was derived at; zero for a master key.
    pub fn child_number(&self) -> ChildNumber {
        self.child_number
    }

    /// First four bytes of the parent's Hash160; zero for a master key.
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// This key's own fingerprint, as recorded by its children.
    pub fn fingerprint(&self) -> [u8; 4] {
        self.public_key.fingerprint()
    }

    /// Serialize as a Base58Check `xpub` string.
    pub fn to_xpub(&self) -> String {
        let bytes = serialize(
            MAINNET_XPUB,
            self.depth,
            self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
            &self.public_key.to_compressed(),
        );
        base58::check_encode(&bytes)
    }

    /// Parse a Base58Check `xpub` string.
    pub fn from_xpub(s: &str) -> Result<Self, PrimitivesError> {
        let raw = base58::check_decode(s)?;
        let parts = deserialize(&raw, MAINNET_XPUB)?;
        let public_key = PublicKey::from_bytes(&parts.key)
            .map_err(|e| PrimitivesError::InvalidExtendedKey(e.to_string()))?;
        Ok(ExtendedPublicKey {
            public_key,
            chain_code: parts.chain_code,
            depth: parts.depth,
            child_number: parts.child_number,
            parent_fingerprint: parts.parent_fingerprint,
        })
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpub())
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xpub(s)
    }
}

/// Fields shared by the xprv and xpub layouts.
struct Serialized {
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: [u8; 32],
    key: [u8; 33],
}

fn serialize(
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: &[u8; 32],
    key: &[u8; 33],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(SERIALIZED_LEN);
    out.extend_from_slice(&version);
    out.push(depth);
    out.extend_from_slice(&parent_fingerprint);
    out.extend_from_slice(&child_number.raw().to_be_bytes());
    out.extend_from_slice(chain_code);
    out.extend_from_slice(key);
    out
}

fn deserialize(raw: &[u8], version: [u8; 4]) -> Result<Serialized, PrimitivesError> {
    if raw.len() != SERIALIZED_LEN {
        return Err(PrimitivesError::InvalidExtendedKey(format!(
            "expected {} bytes, got {}",
            SERIALIZED_LEN,
            raw.len()
        )));
    }
    if raw[..4] != version {
        return Err(PrimitivesError::InvalidExtendedKey(format!(
            "unexpected version {}",
            hex::encode(&raw[..4])
        )));
    }

    let depth = raw[4];
    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(&raw[5..9]);
    let mut child = [0u8; 4];
    child.copy_from_slice(&raw[9..13]);
    let child_number = ChildNumber::from_raw(u32::from_be_bytes(child));
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&raw[13..45]);
    let mut key = [0u8; 33];
    key.copy_from_slice(&raw[45..78]);

    if depth == 0 && (parent_fingerprint != [0; 4] || child_number.raw() != 0) {
        return Err(PrimitivesError::InvalidExtendedKey(
            "master key with non-zero parent fingerprint or index".to_string(),
        ));
    }

    Ok(Serialized {
        depth,
        parent_fingerprint,
        child_number,
        chain_code,
        key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip32::path::HARDENED_OFFSET;
    use crate::bip39::Seed;

    const TV1_SEED: &str = "000102030405060708090a0b0c0d0e0f";
    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon \
                                 abandon abandon abandon abandon abandon about";

    fn tv1_master() -> ExtendedKey {
        ExtendedKey::new_master(&hex::decode(TV1_SEED).unwrap()).unwrap()
    }

    fn abandon_master() -> ExtendedKey {
        let seed = Seed::from_phrase(ABANDON_ABOUT, "");
        ExtendedKey::new_master(seed.as_bytes()).unwrap()
    }

    #[test]
    fn test_vector_1_master() {
        let m = tv1_master();
        assert_eq!(m.depth(), 0);
        assert_eq!(
            m.to_xprv(),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
        assert_eq!(
            m.to_extended_public_key().to_xpub(),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
    }

    #[test]
    fn test_vector_1_children() {
        let m = tv1_master();
        let m0h = m.derive_child(ChildNumber::hardened(0).unwrap()).unwrap();
        assert_eq!(
            m0h.to_xprv(),
            "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
        );
        assert_eq!(
            m0h.to_extended_public_key().to_xpub(),
            "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw"
        );
        assert_eq!(m0h.parent_fingerprint(), m.fingerprint());

        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let m0h1 = m.derive_path(&path).unwrap();
        assert_eq!(m0h1.depth(), 2);
        assert_eq!(
            m0h1.to_xprv(),
            "xprv9wTYmMFdV23N2TdNG573QoEsfRrWKQgWeibmLntzniatZvR9BmLnvSxqu53Kw1UmYPxLgboyZQaXwTCg8MSY3H2EU4pWcQDnRnrVA1xe8fs"
        );
        assert_eq!(
            m0h1.to_extended_public_key().to_xpub(),
            "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"
        );
    }

    #[test]
    fn test_bip44_receive_addresses() {
        let root = abandon_master();
        assert_eq!(
            root.to_xprv(),
            "xprv9s21ZrQH143K3GJpoapnV8SFfukcVBSfeCficPSGfubmSFDxo1kuHnLisriDvSnRRuL2Qrg5ggqHKNVpxR86QEC8w35uxmGoggxtQTPvfUu"
        );

        let account = root.derive_path(&"m/44'/0'/0'".parse().unwrap()).unwrap();
        assert_eq!(
            account.to_extended_public_key().to_xpub(),
            "xpub6BosfCnifzxcFwrSzQiqu2DBVTshkCXacvNsWGYJVVhhawA7d4R5WSWGFNbi8Aw6ZRc1brxMyWMzG3DSSSSoekkudhUd9yLb6qx39T9nMdj"
        );

        let first = root.derive_path(&DerivationPath::bitcoin_receive()).unwrap();
        assert_eq!(
            first.private_key().to_hex(),
            "e284129cc0922579a535bbf4d1a3b25773090d28c909bc0fed73b5e0222cc372"
        );
        assert_eq!(
            first.public_key().to_hex(),
            "03aaeb52dd7494c361049de67cc680e83ebcbbbdbeb13637d92cd845f70308af5e"
        );
        assert_eq!(first.address().as_str(), "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");

        let expected = [
            "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA",
            "1Ak8PffB2meyfYnbXZR9EGfLfFZVpzJvQP",
            "1MNF5RSaabFwcbtJirJwKnDytsXXEsVsNb",
        ];
        for (i, want) in expected.iter().enumerate() {
            let path = DerivationPath::bip44(0, 0, 0, i as u32).unwrap();
            assert_eq!(root.derive_path(&path).unwrap().address().as_str(), *want);
        }
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let account = abandon_master()
            .derive_path(&"m/44'/0'/0'".parse().unwrap())
            .unwrap();
        let xpub = account.to_extended_public_key();
        let path: DerivationPath = "m/0/2".parse().unwrap();

        let via_private = account.derive_path(&path).unwrap();
        let via_public = xpub.derive_path(&path).unwrap();
        assert_eq!(via_public, via_private.to_extended_public_key());
        assert_eq!(via_public.address().as_str(), "1MNF5RSaabFwcbtJirJwKnDytsXXEsVsNb");
    }

    #[test]
    fn test_public_derivation_rejects_hardened() {
        let xpub = tv1_master().to_extended_public_key();
        let err = xpub
            .derive_child(ChildNumber::from_raw(HARDENED_OFFSET + 5))
            .unwrap_err();
        assert!(matches!(err, PrimitivesError::HardenedFromPublic(5)));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let path = DerivationPath::bitcoin_receive();
        let a = abandon_master().derive_path(&path).unwrap();
        let b = abandon_master().derive_path(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(abandon_master().derive_path(&DerivationPath::master()).unwrap(), abandon_master());
    }

    #[test]
    fn test_xprv_xpub_parse_round_trip() {
        let key = tv1_master()
            .derive_path(&"m/0'/1".parse().unwrap())
            .unwrap();
        assert_eq!(ExtendedKey::from_xprv(&key.to_xprv()).unwrap(), key);

        let xpub = key.to_extended_public_key();
        let parsed: ExtendedPublicKey = xpub.to_string().parse().unwrap();
        assert_eq!(parsed, xpub);
    }

    #[test]
    fn test_parse_rejects_wrong_kind_and_corruption() {
        let m = tv1_master();
        let xpub = m.to_extended_public_key().to_xpub();
        assert!(matches!(
            ExtendedKey::from_xprv(&xpub),
            Err(PrimitivesError::InvalidExtendedKey(_))
        ));
        assert!(matches!(
            ExtendedPublicKey::from_xpub(&m.to_xprv()),
            Err(PrimitivesError::InvalidExtendedKey(_))
        ));
        assert!(ExtendedPublicKey::from_xpub("xpub661MyMwAqRbc").is_err());
    }

    #[test]
    fn test_debug_hides_private_material() {
        let m = tv1_master();
        let dbg = format!("{m:?}");
        assert!(!dbg.contains(&m.private_key().to_hex()));
        assert!(!dbg.contains(&hex::encode(m.chain_code())));
    }
}
