//! Authority record types (SOA).

use crate::error::{Error, Result};
use crate::name::{Name, NameParser};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOA record - start of authority (RFC 1035).
///
/// Marks the start of a zone of authority and carries the zone's timing
/// parameters. This server only passes SOA records through; zone maintenance
/// semantics (refresh, expiry) are out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SOA {
    /// Primary name server for the zone.
    mname: Name,
    /// Mailbox of the person responsible for the zone.
    rname: Name,
    /// Zone serial number.
    serial: u32,
    /// Refresh interval in seconds.
    refresh: u32,
    /// Retry interval in seconds.
    retry: u32,
    /// Expiry limit in seconds.
    expire: u32,
    /// Minimum TTL for negative caching.
    minimum: u32,
}

impl SOA {
    /// Creates a new SOA record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Returns the primary name server.
    #[inline]
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// Returns the zone serial number.
    #[inline]
    pub const fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the negative-caching minimum TTL.
    #[inline]
    pub const fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Parses an SOA record from wire format.
    pub fn parse(message: &[u8], offset: usize) -> Result<Self> {
        let parser = NameParser::new(message);

        let (mname, mname_len) = parser.parse_name(offset)?;
        let (rname, rname_len) = parser.parse_name(offset + mname_len)?;

        let fields_start = offset + mname_len + rname_len;
        if fields_start + 20 > message.len() {
            return Err(Error::buffer_too_short(fields_start + 20, message.len()));
        }

        let read_u32 = |at: usize| {
            u32::from_be_bytes(
                message[at..at + 4]
                    .try_into()
                    .expect("length checked above"),
            )
        };

        Ok(Self {
            mname,
            rname,
            serial: read_u32(fields_start),
            refresh: read_u32(fields_start + 4),
            retry: read_u32(fields_start + 8),
            expire: read_u32(fields_start + 12),
            minimum: read_u32(fields_start + 16),
        })
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.mname.wire_len() + self.rname.wire_len() + 20
    }

    /// Writes the SOA record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.mname.write_wire(buf);
        self.rname.write_wire(buf);
        buf.extend_from_slice(&self.serial.to_be_bytes());
        buf.extend_from_slice(&self.refresh.to_be_bytes());
        buf.extend_from_slice(&self.retry.to_be_bytes());
        buf.extend_from_slice(&self.expire.to_be_bytes());
        buf.extend_from_slice(&self.minimum.to_be_bytes());
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire,
            self.minimum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_soa_roundtrip() {
        let soa = SOA::new(
            Name::from_str("ns1.example.com.").unwrap(),
            Name::from_str("hostmaster.example.com.").unwrap(),
            2024010101,
            7200,
            3600,
            1209600,
            3600,
        );

        let mut buf = BytesMut::new();
        soa.write_to(&mut buf);
        assert_eq!(buf.len(), soa.wire_len());

        let parsed = SOA::parse(&buf, 0).unwrap();
        assert_eq!(parsed, soa);
    }
}
