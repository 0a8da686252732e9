//! Globally unique names for arrays and objects.
//!
//! A name is generated as `<creator_id>:<monotonic_counter>`; the counter is
//! per-creator and persists for the creator's process lifetime. Names are
//! never reused while any referrer exists (enforced by the store, see
//! `vistle-shm`).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// A globally unique array or object name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Name {
    creator: i32,
    counter: u64,
}

impl Name {
    /// Constructs a name directly; used by the store on allocation and by
    /// the archive loader when re-minting names on load.
    pub fn new(creator: i32, counter: u64) -> Self {
        Name { creator, counter }
    }

    /// The id of the module that minted this name.
    pub fn creator(&self) -> i32 {
        self.creator
    }

    /// The per-creator monotonic counter value.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.creator, self.counter)
    }
}

/// Parses the `<creator_id>:<counter>` textual form, e.g. as read back from
/// an archive directory entry.
impl std::str::FromStr for Name {
    type Err = NameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (creator, counter) = s.split_once(':').ok_or(NameParseError)?;
        let creator = creator.parse().map_err(|_| NameParseError)?;
        let counter = counter.parse().map_err(|_| NameParseError)?;
        Ok(Name { creator, counter })
    }
}

/// Error parsing a [`Name`] from its textual form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameParseError;

impl fmt::Display for NameParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed name, expected \"<creator>:<counter>\"")
    }
}

impl std::error::Error for NameParseError {}

/// Generates monotonically increasing names for one creator (module
/// instance). The counter never resets within a process lifetime.
#[derive(Debug)]
pub struct NameGenerator {
    creator: i32,
    next: AtomicU64,
}

impl NameGenerator {
    /// Creates a generator for the given creator id, starting its counter
    /// at zero.
    pub fn new(creator: i32) -> Self {
        NameGenerator { creator, next: AtomicU64::new(0) }
    }

    /// Mints the next name for this creator.
    pub fn next_name(&self) -> Name {
        let counter = self.next.fetch_add(1, Ordering::Relaxed);
        Name::new(self.creator, counter)
    }

    /// The creator id this generator mints names for.
    pub fn creator(&self) -> i32 {
        self.creator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn names_are_monotonic_per_creator() {
        let gen = NameGenerator::new(17);
        let a = gen.next_name();
        let b = gen.next_name();
        assert_ne!(a, b);
        assert_eq!(a.creator(), 17);
        assert_eq!(b.counter(), a.counter() + 1);
    }

    #[test]
    fn display_and_parse_round_trip() {
        let n = Name::new(3, 42);
        let s = n.to_string();
        assert_eq!(s, "3:42");
        assert_eq!(Name::from_str(&s).unwrap(), n);
    }

    #[test]
    fn rejects_malformed_name() {
        assert!(Name::from_str("not-a-name").is_err());
    }
}
