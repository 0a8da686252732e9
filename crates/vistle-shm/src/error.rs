//! Store-level errors (§4.1, §10.2).

use std::fmt;

use vistle_core::Name;

/// Failure modes of [`crate::Store`] operations.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreError {
    /// `attach` was called for a store id whose owner never created it.
    StoreMissing(String),
    /// `attach` found a store but its ABI version does not match.
    Incompatible { expected: u32, found: u32 },
    /// An `allocate_*` call could not satisfy the request from the pool.
    OutOfSpace { requested_bytes: usize },
    /// `lookup`, `increment`, or `decrement` referenced a name the store
    /// does not know about.
    NotFound(Name),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::StoreMissing(id) => write!(f, "store \"{id}\" does not exist"),
            StoreError::Incompatible { expected, found } => {
                write!(f, "incompatible store ABI: expected version {expected}, found {found}")
            }
            StoreError::OutOfSpace { requested_bytes } => {
                write!(f, "pool allocator out of space for {requested_bytes} bytes")
            }
            StoreError::NotFound(name) => write!(f, "no entry named {name}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        let e = StoreError::OutOfSpace { requested_bytes: 4096 };
        assert!(e.to_string().contains("4096"));
    }
}
