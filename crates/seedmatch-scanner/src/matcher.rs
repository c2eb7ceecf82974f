//! Exact matching of a derived address against a candidate list.
//!
//! Candidate lines are trimmed and compared byte-for-byte with the target.
//! There is no prefix or partial matching. Duplicate lines are preserved so
//! the caller can see how many times an address occurs.

use std::collections::HashMap;

/// Outcome of matching one address against a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The address that was searched for.
    pub target: String,
    /// Every trimmed candidate line equal to `target`, in source order.
    pub matches: Vec<String>,
}

impl MatchResult {
    /// Whether at least one candidate matched.
    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Number of matching lines.
    pub fn count(&self) -> usize {
        self.matches.len()
    }
}

/// Streams a candidate source once, collecting lines equal to the target.
#[derive(Debug, Clone)]
pub struct AddressMatcher {
    target: String,
}

impl AddressMatcher {
    /// Create a matcher for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The address being searched for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether a single candidate line matches after trimming.
    pub fn is_match(&self, line: &str) -> bool {
        line.trim() == self.target
    }

    /// Consume `candidates` once and return every matching line.
    pub fn find<I>(&self, candidates: I) -> MatchResult
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let matches = candidates
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim();
                (line == self.target).then(|| line.to_string())
            })
            .collect();
        self.result(matches)
    }

    /// Like [`find`](Self::find) over a fallible source.
    ///
    /// Stops at the first error and returns it.
    pub fn try_find<I, E>(&self, candidates: I) -> Result<MatchResult, E>
    where
        I: IntoIterator<Item = Result<String, E>>,
    {
        let mut matches = Vec::new();
        for line in candidates {
            let line = line?;
            if self.is_match(&line) {
                matches.push(line.trim().to_string());
            }
        }
        Ok(self.result(matches))
    }

    /// Consume a fallible source once, checking each trimmed line against
    /// every target.
    ///
    /// Returns one result per target in the order given. Repeated targets
    /// each get their own copy of the matches.
    pub fn try_find_all<T, I, E>(targets: &[T], candidates: I) -> Result<Vec<MatchResult>, E>
    where
        T: AsRef<str>,
        I: IntoIterator<Item = Result<String, E>>,
    {
        let mut results: Vec<MatchResult> = targets
            .iter()
            .map(|target| MatchResult {
                target: target.as_ref().to_string(),
                matches: Vec::new(),
            })
            .collect();
        for line in candidates {
            let line = line?;
            let line = line.trim();
            for result in results.iter_mut().filter(|result| result.target == line) {
                result.matches.push(line.to_string());
            }
        }
        Ok(results)
    }

    fn result(&self, matches: Vec<String>) -> MatchResult {
        MatchResult {
            target: self.target.clone(),
            matches,
        }
    }
}

/// A multiset of trimmed candidate lines built in one pass.
///
/// Lets a batch run check each generated address without rescanning the
/// source. [`CandidateIndex::matches`] agrees with [`AddressMatcher::find`]
/// over the same lines.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    counts: HashMap<String, usize>,
    lines: usize,
}

impl CandidateIndex {
    /// Build an index from candidate lines.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut index = Self::default();
        for line in lines {
            index.insert(line.as_ref());
        }
        index
    }

    /// Build an index from a fallible source, stopping at the first error.
    pub fn try_from_lines<I, E>(lines: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<String, E>>,
    {
        let mut index = Self::default();
        for line in lines {
            index.insert(&line?);
        }
        Ok(index)
    }

    fn insert(&mut self, line: &str) {
        *self.counts.entry(line.trim().to_string()).or_insert(0) += 1;
        self.lines += 1;
    }

    /// Whether `address` occurs at least once.
    pub fn contains(&self, address: &str) -> bool {
        self.counts.contains_key(address)
    }

    /// How many lines equal `address`.
    pub fn count(&self, address: &str) -> usize {
        self.counts.get(address).copied().unwrap_or(0)
    }

    /// The same result [`AddressMatcher::find`] would give for `target`.
    pub fn matches(&self, target: &str) -> MatchResult {
        MatchResult {
            target: target.to_string(),
            matches: vec![target.to_string(); self.count(target)],
        }
    }

    /// Number of distinct trimmed lines.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no lines were read.
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Total lines read, duplicates and blanks included.
    pub fn lines_read(&self) -> usize {
        self.lines
    }
}
