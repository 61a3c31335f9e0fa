//! Name-based record types (NS, CNAME, PTR, MX).

use crate::error::Result;
use crate::name::{Name, NameParser};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// NS record - authoritative name server (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NS {
    /// The name server domain name.
    nsdname: Name,
}

impl NS {
    /// Creates a new NS record.
    #[inline]
    pub fn new(nsdname: Name) -> Self {
        Self { nsdname }
    }

    /// Returns the name server name.
    #[inline]
    pub fn nsdname(&self) -> &Name {
        &self.nsdname
    }

    /// Parses an NS record from wire format.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let (nsdname, _) = NameParser::new(message).parse_name(offset)?;
        Ok(Self { nsdname })
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.nsdname.wire_len()
    }

    /// Writes the NS record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.nsdname.write_wire(buf);
    }
}

impl fmt::Display for NS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nsdname)
    }
}

/// CNAME record - canonical name alias (RFC 1035).
///
/// A resolver encountering a CNAME restarts its query with the canonical
/// name as the new question name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CNAME {
    /// The canonical domain name.
    cname: Name,
}

impl CNAME {
    /// Creates a new CNAME record.
    #[inline]
    pub fn new(cname: Name) -> Self {
        Self { cname }
    }

    /// Returns the canonical name (target).
    #[inline]
    pub fn target(&self) -> &Name {
        &self.cname
    }

    /// Parses a CNAME record from wire format.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let (cname, _) = NameParser::new(message).parse_name(offset)?;
        Ok(Self { cname })
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.cname.wire_len()
    }

    /// Writes the CNAME record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.cname.write_wire(buf);
    }
}

impl fmt::Display for CNAME {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cname)
    }
}

/// PTR record - domain name pointer (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PTR {
    /// The pointed-to domain name.
    ptrdname: Name,
}

impl PTR {
    /// Creates a new PTR record.
    #[inline]
    pub fn new(ptrdname: Name) -> Self {
        Self { ptrdname }
    }

    /// Returns the pointed-to domain name.
    #[inline]
    pub fn ptrdname(&self) -> &Name {
        &self.ptrdname
    }

    /// Parses a PTR record from wire format.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let (ptrdname, _) = NameParser::new(message).parse_name(offset)?;
        Ok(Self { ptrdname })
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.ptrdname.wire_len()
    }

    /// Writes the PTR record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.ptrdname.write_wire(buf);
    }
}

impl fmt::Display for PTR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ptrdname)
    }
}

/// MX record - mail exchange (RFC 1035).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MX {
    /// Preference value (lower is preferred).
    preference: u16,
    /// The mail exchange host.
    exchange: Name,
}

impl MX {
    /// Creates a new MX record.
    #[inline]
    pub fn new(preference: u16, exchange: Name) -> Self {
        Self {
            preference,
            exchange,
        }
    }

    /// Returns the preference value.
    #[inline]
    pub const fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the exchange host name.
    #[inline]
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    /// Parses an MX record from wire format.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        if offset + 2 > message.len() {
            return Err(crate::error::Error::buffer_too_short(
                offset + 2,
                message.len(),
            ));
        }

        let preference = u16::from_be_bytes([message[offset], message[offset + 1]]);
        let (exchange, _) = NameParser::new(message).parse_name(offset + 2)?;

        Ok(Self {
            preference,
            exchange,
        })
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        2 + self.exchange.wire_len()
    }

    /// Writes the MX record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.preference.to_be_bytes());
        self.exchange.write_wire(buf);
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ns_roundtrip() {
        let ns = NS::new(Name::from_str("ns1.example.com.").unwrap());

        let mut buf = BytesMut::new();
        ns.write_to(&mut buf);
        assert_eq!(buf.len(), ns.wire_len());

        let parsed = NS::parse(&buf, 0).unwrap();
        assert_eq!(parsed, ns);
    }

    #[test]
    fn test_mx_roundtrip() {
        let mx = MX::new(10, Name::from_str("mail.example.com.").unwrap());

        let mut buf = BytesMut::new();
        mx.write_to(&mut buf);
        assert_eq!(buf.len(), mx.wire_len());

        let parsed = MX::parse(&buf, 0).unwrap();
        assert_eq!(parsed, mx);
    }
}
