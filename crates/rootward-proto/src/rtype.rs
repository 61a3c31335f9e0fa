//! DNS record types.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record type.
///
/// The record types this server understands natively. Anything else is
/// carried opaquely via [`Type::Other`] so unknown records survive the codec
/// and the cache unchanged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordType {
    /// IPv4 address - RFC 1035
    A = 1,

    /// Authoritative name server - RFC 1035
    NS = 2,

    /// Canonical name (alias) - RFC 1035
    CNAME = 5,

    /// Start of authority - RFC 1035
    SOA = 6,

    /// Domain name pointer - RFC 1035
    PTR = 12,

    /// Mail exchange - RFC 1035
    MX = 15,

    /// Text strings - RFC 1035
    TXT = 16,

    /// IPv6 address - RFC 3596
    AAAA = 28,
}

impl RecordType {
    /// Returns the numeric value of the record type.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::AAAA => "AAAA",
        };
        write!(f, "{s}")
    }
}

/// A record type as carried on the wire: either one we know, or a raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// A record type with a native representation.
    Known(RecordType),

    /// Any other record type, preserved by code.
    Other(u16),
}

impl Type {
    /// Creates a type from its numeric value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        match RecordType::try_from(value) {
            Ok(rtype) => Self::Known(rtype),
            Err(_) => Self::Other(value),
        }
    }

    /// Returns the numeric value of the type.
    #[inline]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Known(rtype) => rtype.to_u16(),
            Self::Other(value) => value,
        }
    }

    /// Returns the record type if it is one we know.
    #[inline]
    pub fn as_known(self) -> Option<RecordType> {
        match self {
            Self::Known(rtype) => Some(rtype),
            Self::Other(_) => None,
        }
    }
}

impl From<RecordType> for Type {
    fn from(rtype: RecordType) -> Self {
        Self::Known(rtype)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(rtype) => write!(f, "{rtype}"),
            Self::Other(value) => write!(f, "TYPE{value}"),
        }
    }
}
