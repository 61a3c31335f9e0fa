//! DNS response codes (RCODEs).

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS response code (RFC 1035 Section 4.1.1).
///
/// The 4-bit RCODE field in the header indicates the status of a response.
/// Extended response codes require EDNS(0), which this server does not speak.
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
pub enum ResponseCode {
    /// No error condition.
    NoError = 0,

    /// Format error: the server was unable to interpret the query.
    FormErr = 1,

    /// Server failure: the server could not process the query.
    ServFail = 2,

    /// Name error: the queried name does not exist. Meaningful only from
    /// an authoritative server.
    NXDomain = 3,

    /// Not implemented: the server does not support this kind of query.
    NotImp = 4,

    /// Refused: the server declines to answer for policy reasons.
    Refused = 5,
}

impl ResponseCode {
    /// Returns the 4-bit value for the header RCODE field.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Creates a response code from its 4-bit header value.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value & 0x0F).ok()
    }

    /// Returns true if this response indicates success.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Returns true if this is an NXDOMAIN response.
    #[inline]
    pub fn is_nxdomain(self) -> bool {
        matches!(self, Self::NXDomain)
    }

    /// Returns true if this is a server failure.
    #[inline]
    pub fn is_server_error(self) -> bool {
        matches!(self, Self::ServFail)
    }
}

impl Default for ResponseCode {
    fn default() -> Self {
        Self::NoError
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
        };
        write!(f, "{s}")
    }
}
