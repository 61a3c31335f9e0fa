//! DNS record classes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record class (RFC 1035 Section 3.2.4).
///
/// In practice everything is IN; the other classes exist so messages using
/// them still round-trip through the codec.
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
#[repr(u16)]
pub enum RecordClass {
    /// Internet - RFC 1035
    IN = 1,

    /// Chaos - RFC 1035
    CH = 3,

    /// Hesiod - RFC 1035
    HS = 4,

    /// Any class (query only) - RFC 1035
    ANY = 255,
}

impl RecordClass {
    /// Returns the numeric value of the class.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
            Self::ANY => "ANY",
        };
        write!(f, "{s}")
    }
}

/// A record class as carried on the wire: either one we know, or a raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    /// A class with a native representation.
    Known(RecordClass),

    /// Any other class, preserved by code.
    Other(u16),
}

impl Class {
    /// Creates a class from its numeric value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        match RecordClass::try_from(value) {
            Ok(rclass) => Self::Known(rclass),
            Err(_) => Self::Other(value),
        }
    }

    /// Returns the numeric value of the class.
    #[inline]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::Known(rclass) => rclass.to_u16(),
            Self::Other(value) => value,
        }
    }

    /// Returns the class if it is one we know.
    #[inline]
    pub fn as_known(self) -> Option<RecordClass> {
        match self {
            Self::Known(rclass) => Some(rclass),
            Self::Other(_) => None,
        }
    }
}

impl From<RecordClass> for Class {
    fn from(rclass: RecordClass) -> Self {
        Self::Known(rclass)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(rclass) => write!(f, "{rclass}"),
            Self::Other(value) => write!(f, "CLASS{value}"),
        }
    }
}
