//! Fatal, cross-cutting errors (§10.2): conditions the core considers
//! unrecoverable. Callers are expected to propagate these to the top of
//! their module's execution loop and abort the current run, rather than
//! try to continue in an inconsistent state.

use std::fmt;

/// A condition the core cannot recover from locally.
#[derive(Clone, Debug, PartialEq)]
pub enum FatalError {
    /// An internal invariant was violated (e.g. a schema lookup failed for
    /// a tag that must be in the static registry).
    ConsistencyError(String),
    /// The requested operation has no implementation for this build.
    NotImplemented(&'static str),
    /// The owning process or rank died while this handle was outstanding.
    ParentDied,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::ConsistencyError(msg) => write!(f, "internal consistency error: {msg}"),
            FatalError::NotImplemented(what) => write!(f, "not implemented: {what}"),
            FatalError::ParentDied => write!(f, "parent process died"),
        }
    }
}

impl std::error::Error for FatalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let e = FatalError::ConsistencyError("bad registry entry".into());
        assert!(e.to_string().contains("bad registry entry"));
    }
}
