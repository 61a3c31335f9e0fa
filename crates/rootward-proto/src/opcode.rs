//! DNS operation codes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS operation code (RFC 1035 Section 4.1.1).
///
/// Only standard queries (opcode 0) receive a response from this server;
/// other opcodes are parsed so the header round-trips, then ignored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum OpCode {
    /// Standard query - RFC 1035
    Query = 0,

    /// Inverse query (obsolete) - RFC 3425
    IQuery = 1,

    /// Server status request - RFC 1035
    Status = 2,

    /// Zone change notification - RFC 1996
    Notify = 4,

    /// Dynamic update - RFC 2136
    Update = 5,
}

impl OpCode {
    /// Returns the numeric value of the opcode.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Creates an opcode from its numeric value.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl Default for OpCode {
    fn default() -> Self {
        Self::Query
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Query => "QUERY",
            Self::IQuery => "IQUERY",
            Self::Status => "STATUS",
            Self::Notify => "NOTIFY",
            Self::Update => "UPDATE",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for value in [0u8, 1, 2, 4, 5] {
            let opcode = OpCode::from_u8(value).unwrap();
            assert_eq!(opcode.to_u8(), value);
        }
    }

    #[test]
    fn test_reserved_opcode_rejected() {
        assert!(OpCode::from_u8(3).is_none());
        assert!(OpCode::from_u8(15).is_none());
    }
}
