//! Address record types (A, AAAA).

use crate::error::{Error, Result};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A record - IPv4 address (RFC 1035).
///
/// The RDATA is exactly 4 bytes containing the address in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct A {
    /// The IPv4 address.
    address: Ipv4Addr,
}

impl A {
    /// Creates a new A record.
    #[inline]
    pub const fn new(address: Ipv4Addr) -> Self {
        Self { address }
    }

    /// Returns the IPv4 address.
    #[inline]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Parses an A record from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != 4 {
            return Err(Error::RDataLengthMismatch {
                rtype: "A".to_string(),
                expected: 4,
                actual: data.len(),
            });
        }

        let octets: [u8; 4] = data[..4].try_into().expect("length checked");
        Ok(Self {
            address: Ipv4Addr::from(octets),
        })
    }

    /// Returns the wire format length (always 4).
    #[inline]
    pub const fn wire_len(&self) -> usize {
        4
    }

    /// Writes the A record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.address.octets());
    }
}

impl From<Ipv4Addr> for A {
    fn from(address: Ipv4Addr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// AAAA record - IPv6 address (RFC 3596).
///
/// The RDATA is exactly 16 bytes containing the address in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AAAA {
    /// The IPv6 address.
    address: Ipv6Addr,
}

impl AAAA {
    /// Creates a new AAAA record.
    #[inline]
    pub const fn new(address: Ipv6Addr) -> Self {
        Self { address }
    }

    /// Returns the IPv6 address.
    #[inline]
    pub const fn address(&self) -> Ipv6Addr {
        self.address
    }

    /// Parses an AAAA record from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != 16 {
            return Err(Error::RDataLengthMismatch {
                rtype: "AAAA".to_string(),
                expected: 16,
                actual: data.len(),
            });
        }

        let octets: [u8; 16] = data[..16].try_into().expect("length checked");
        Ok(Self {
            address: Ipv6Addr::from(octets),
        })
    }

    /// Returns the wire format length (always 16).
    #[inline]
    pub const fn wire_len(&self) -> usize {
        16
    }

    /// Writes the AAAA record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.address.octets());
    }
}

impl From<Ipv6Addr> for AAAA {
    fn from(address: Ipv6Addr) -> Self {
        Self::new(address)
    }
}

impl fmt::Display for AAAA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_roundtrip() {
        let a = A::new(Ipv4Addr::new(192, 0, 2, 1));

        let mut buf = BytesMut::new();
        a.write_to(&mut buf);
        assert_eq!(buf.len(), a.wire_len());

        let parsed = A::parse(&buf).unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn test_a_wrong_length() {
        assert!(matches!(
            A::parse(&[1, 2, 3]),
            Err(Error::RDataLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_aaaa_roundtrip() {
        let aaaa = AAAA::new("2001:db8::1".parse().unwrap());

        let mut buf = BytesMut::new();
        aaaa.write_to(&mut buf);

        let parsed = AAAA::parse(&buf).unwrap();
        assert_eq!(parsed, aaaa);
    }
}
