//! Pipeline protocol errors (§4.3, §7).

use std::fmt;

/// Errors the pipeline protocol can raise while routing objects between
/// ports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// An object's generation regressed relative to the last one accepted
    /// from the same creator on this port.
    OutdatedObject { creator: i32, generation: (i32, i32), last_seen: (i32, i32) },
    /// A type's schema requires a different number of referenced arrays
    /// than was supplied.
    SchemaMismatch { expected: usize, found: usize },
    /// An operation violated a port's declared policy, e.g. a second
    /// producer publishing into a `Single` input that is already occupied.
    PortPolicyViolation(String),
    /// A port name was used that was never created on this module.
    UnknownPort(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::OutdatedObject { creator, generation, last_seen } => write!(
                f,
                "outdated object from creator {creator}: generation {generation:?} is not newer than last seen {last_seen:?}"
            ),
            ProtocolError::SchemaMismatch { expected, found } => {
                write!(f, "schema mismatch: expected {expected} referenced arrays, found {found}")
            }
            ProtocolError::PortPolicyViolation(msg) => write!(f, "port policy violation: {msg}"),
            ProtocolError::UnknownPort(name) => write!(f, "unknown port {name:?}"),
        }
    }
}

impl std::error::Error for ProtocolError {}
