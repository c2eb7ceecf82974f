//! Child numbers and derivation paths.
//!
//! A path is an explicit ordered list of derivation steps, written
//! `m/44'/0'/0'/0/0`. Hardened steps may be marked with `'`, `h` or `H`.

use std::fmt;
use std::str::FromStr;

use crate::PrimitivesError;

/// Indices at or above this value are hardened.
pub const HARDENED_OFFSET: u32 = 1 << 31;

/// BIP-44 purpose level.
pub const BIP44_PURPOSE: u32 = 44;

/// SLIP-44 coin type for Bitcoin.
pub const BITCOIN_COIN_TYPE: u32 = 0;

/// BIP-44 external (receiving) chain.
pub const EXTERNAL_CHAIN: u32 = 0;

/// BIP-44 internal (change) chain.
pub const INTERNAL_CHAIN: u32 = 1;

/// A single BIP-32 child number (`ser32(i)` on the wire).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// A non-hardened child. `index` must be below 2^31.
    pub fn normal(index: u32) -> Result<Self, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::InvalidDerivationPath(format!(
                "index {index} out of range"
            )));
        }
        Ok(ChildNumber(index))
    }

    /// A hardened child `index'`. `index` must be below 2^31.
    pub fn hardened(index: u32) -> Result<Self, PrimitivesError> {
        Self::normal(index).map(|c| ChildNumber(c.0 | HARDENED_OFFSET))
    }

    /// Wrap a raw 32-bit child number, hardened bit included.
    pub const fn from_raw(raw: u32) -> Self {
        ChildNumber(raw)
    }

    /// The raw 32-bit value, hardened bit included.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The index without the hardened bit.
    pub const fn index(self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }

    /// Whether the hardened bit is set.
    pub const fn is_hardened(self) -> bool {
        self.0 >= HARDENED_OFFSET
    }

    /// The next child at the same hardness, or `None` past 2^31 - 1.
    pub fn next(self) -> Option<Self> {
        let index = self.index().checked_add(1).filter(|&i| i < HARDENED_OFFSET)?;
        Some(ChildNumber(index | (self.0 & HARDENED_OFFSET)))
    }
}

impl From<u32> for ChildNumber {
    fn from(raw: u32) -> Self {
        ChildNumber(raw)
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildNumber {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let index: u32 = digits
            .parse()
            .map_err(|_| PrimitivesError::InvalidDerivationPath(format!("bad segment {s:?}")))?;
        if hardened {
            Self::hardened(index)
        } else {
            Self::normal(index)
        }
    }
}

/// An ordered list of derivation steps applied from the master key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath {
    steps: Vec<ChildNumber>,
}

impl DerivationPath {
    /// The empty path `m`.
    pub fn master() -> Self {
        DerivationPath { steps: Vec::new() }
    }

    /// `m/44'/coin'/account'/change/address_index`.
    pub fn bip44(
        coin_type: u32,
        account: u32,
        change: u32,
        address_index: u32,
    ) -> Result<Self, PrimitivesError> {
        Ok(DerivationPath {
            steps: vec![
                ChildNumber::hardened(BIP44_PURPOSE)?,
                ChildNumber::hardened(coin_type)?,
                ChildNumber::hardened(account)?,
                ChildNumber::normal(change)?,
                ChildNumber::normal(address_index)?,
            ],
        })
    }

    /// The first Bitcoin receiving address path, `m/44'/0'/0'/0/0`.
    pub fn bitcoin_receive() -> Self {
        DerivationPath {
            steps: vec![
                ChildNumber(BIP44_PURPOSE | HARDENED_OFFSET),
                ChildNumber(BITCOIN_COIN_TYPE | HARDENED_OFFSET),
                ChildNumber(HARDENED_OFFSET),
                ChildNumber(EXTERNAL_CHAIN),
                ChildNumber(0),
            ],
        }
    }

    /// This path extended by one step.
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut steps = self.steps.clone();
        steps.push(child);
        DerivationPath { steps }
    }

    /// Split off the last step: `(parent path, last step)`.
    pub fn split_last(&self) -> Option<(DerivationPath, ChildNumber)> {
        let (last, rest) = self.steps.split_last()?;
        Some((DerivationPath { steps: rest.to_vec() }, *last))
    }

    /// The steps in order.
    pub fn as_slice(&self) -> &[ChildNumber] {
        &self.steps
    }

    /// Iterate over the steps in order.
    pub fn iter(&self) -> impl Iterator<Item = ChildNumber> + '_ {
        self.steps.iter().copied()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether this is the master path `m`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(steps: Vec<ChildNumber>) -> Self {
        DerivationPath { steps }
    }
}

impl FromStr for DerivationPath {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.trim().split('/');
        if segments.next() != Some("m") {
            return Err(PrimitivesError::InvalidDerivationPath(format!(
                "path must start with 'm': {s:?}"
            )));
        }
        let steps = segments
            .map(ChildNumber::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DerivationPath { steps })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}
