//! DNS resource records.
//!
//! A resource record (RR) is the fundamental unit of DNS data: a name, type,
//! class, TTL, and record-specific data.

use crate::class::{Class, RecordClass};
use crate::error::{Error, Result};
use crate::name::{Name, NameParser};
use crate::rdata::RData;
use crate::rtype::{RecordType, Type};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// A DNS resource record.
///
/// # Wire Format
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                      NAME                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// /                     RDATA                     /
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// The domain name this record is for.
    name: Name,
    /// The record type.
    rtype: Type,
    /// The record class.
    rclass: Class,
    /// Time to live in seconds.
    ttl: u32,
    /// The record data.
    rdata: RData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: Type, rclass: Class, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Creates a new resource record with known type and class.
    pub fn new_known(
        name: Name,
        rtype: RecordType,
        rclass: RecordClass,
        ttl: u32,
        rdata: RData,
    ) -> Self {
        Self::new(name, Type::Known(rtype), Class::Known(rclass), ttl, rdata)
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: std::net::Ipv4Addr) -> Self {
        Self::new_known(
            name,
            RecordType::A,
            RecordClass::IN,
            ttl,
            RData::A(crate::rdata::A::new(addr)),
        )
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: std::net::Ipv6Addr) -> Self {
        Self::new_known(
            name,
            RecordType::AAAA,
            RecordClass::IN,
            ttl,
            RData::AAAA(crate::rdata::AAAA::new(addr)),
        )
    }

    /// Creates an NS record.
    pub fn ns(name: Name, ttl: u32, nsdname: Name) -> Self {
        Self::new_known(
            name,
            RecordType::NS,
            RecordClass::IN,
            ttl,
            RData::NS(crate::rdata::NS::new(nsdname)),
        )
    }

    /// Creates a CNAME record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::new_known(
            name,
            RecordType::CNAME,
            RecordClass::IN,
            ttl,
            RData::CNAME(crate::rdata::CNAME::new(target)),
        )
    }

    /// Creates an MX record.
    pub fn mx(name: Name, ttl: u32, preference: u16, exchange: Name) -> Self {
        Self::new_known(
            name,
            RecordType::MX,
            RecordClass::IN,
            ttl,
            RData::MX(crate::rdata::MX::new(preference, exchange)),
        )
    }

    /// Creates a TXT record.
    pub fn txt(name: Name, ttl: u32, text: impl Into<Vec<u8>>) -> Self {
        Self::new_known(
            name,
            RecordType::TXT,
            RecordClass::IN,
            ttl,
            RData::TXT(crate::rdata::TXT::from_string(text)),
        )
    }

    /// Returns the record name.
    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    #[inline]
    pub fn rtype(&self) -> Type {
        self.rtype
    }

    /// Returns the record type if known.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        self.rtype.as_known()
    }

    /// Returns the record class.
    #[inline]
    pub fn rclass(&self) -> Class {
        self.rclass
    }

    /// Returns the TTL in seconds.
    #[inline]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the TTL as a Duration.
    #[inline]
    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl))
    }

    /// Returns the record data.
    #[inline]
    pub fn rdata(&self) -> &RData {
        &self.rdata
    }

    /// Returns true if this record has outlived its TTL.
    ///
    /// # Arguments
    ///
    /// * `cached_at` - when the record was inserted
    /// * `now` - the current time
    pub fn is_expired(&self, cached_at: Instant, now: Instant) -> bool {
        now.duration_since(cached_at) > self.ttl_duration()
    }

    /// Returns true if this is a CNAME record.
    #[inline]
    pub fn is_cname(&self) -> bool {
        matches!(self.rtype, Type::Known(RecordType::CNAME))
    }

    /// Returns true if this is an NS record.
    #[inline]
    pub fn is_ns(&self) -> bool {
        matches!(self.rtype, Type::Known(RecordType::NS))
    }

    /// Parses a resource record from wire format.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let parser = NameParser::new(data);
        let (name, name_len) = parser.parse_name(offset)?;

        let fixed_start = offset + name_len;
        if fixed_start + 10 > data.len() {
            return Err(Error::buffer_too_short(fixed_start + 10, data.len()));
        }

        let rtype_value = u16::from_be_bytes([data[fixed_start], data[fixed_start + 1]]);
        let rclass_value = u16::from_be_bytes([data[fixed_start + 2], data[fixed_start + 3]]);
        let ttl = u32::from_be_bytes(
            data[fixed_start + 4..fixed_start + 8]
                .try_into()
                .expect("length checked above"),
        );
        let rdlength = u16::from_be_bytes([data[fixed_start + 8], data[fixed_start + 9]]);

        let rdata_start = fixed_start + 10;
        if rdata_start + rdlength as usize > data.len() {
            return Err(Error::buffer_too_short(
                rdata_start + rdlength as usize,
                data.len(),
            ));
        }

        let rtype = Type::from_u16(rtype_value);
        let rclass = Class::from_u16(rclass_value);

        let rdata = if let Type::Known(known_type) = rtype {
            RData::parse(known_type, data, rdata_start, rdlength)?
        } else {
            RData::Unknown(crate::rdata::Unknown::new(
                rtype_value,
                &data[rdata_start..rdata_start + rdlength as usize],
            ))
        };

        let total_len = name_len + 10 + rdlength as usize;

        Ok((
            Self {
                name,
                rtype,
                rclass,
                ttl,
                rdata,
            },
            total_len,
        ))
    }

    /// Returns the wire format length of this record.
    pub fn wire_len(&self) -> usize {
        self.name.wire_len() + 10 + self.rdata.wire_len()
    }

    /// Writes the record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.name.write_wire(buf);
        buf.extend_from_slice(&self.rtype.to_u16().to_be_bytes());
        buf.extend_from_slice(&self.rclass.to_u16().to_be_bytes());
        buf.extend_from_slice(&self.ttl.to_be_bytes());
        buf.extend_from_slice(&(self.rdata.wire_len() as u16).to_be_bytes());
        self.rdata.write_to(buf);
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.rclass, self.rtype, self.rdata
        )
    }
}

/// Iterator-style parser over a run of resource records.
///
/// Used by the message parser to walk the answer, authority, and additional
/// sections, tracking the byte offset as it goes.
#[derive(Debug)]
pub struct RecordParser<'a> {
    /// The complete message data.
    data: &'a [u8],
    /// Current offset.
    offset: usize,
    /// Records remaining.
    remaining: u16,
}

impl<'a> RecordParser<'a> {
    /// Creates a parser for `count` records starting at `offset`.
    pub fn new(data: &'a [u8], offset: usize, count: u16) -> Self {
        Self {
            data,
            offset,
            remaining: count,
        }
    }

    /// Parses the next record, or returns `None` when the count is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<ResourceRecord>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let (record, consumed) = ResourceRecord::parse(self.data, self.offset)?;
        self.offset += consumed;
        self.remaining -= 1;

        Ok(Some(record))
    }

    /// Returns the current offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    #[test]
    fn test_record_roundtrip() {
        let record = ResourceRecord::a(
            Name::from_str("example.com.").unwrap(),
            3600,
            Ipv4Addr::new(10, 0, 0, 1),
        );

        let mut buf = BytesMut::new();
        record.write_to(&mut buf);
        assert_eq!(buf.len(), record.wire_len());

        let (parsed, consumed) = ResourceRecord::parse(&buf, 0).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn test_unknown_type_roundtrip() {
        let record = ResourceRecord::new(
            Name::from_str("example.com.").unwrap(),
            Type::Other(99),
            Class::Known(RecordClass::IN),
            60,
            RData::Unknown(crate::rdata::Unknown::new(99, &[0xDE, 0xAD])),
        );

        let mut buf = BytesMut::new();
        record.write_to(&mut buf);

        let (parsed, _) = ResourceRecord::parse(&buf, 0).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_expiry() {
        let record = ResourceRecord::a(
            Name::from_str("example.com.").unwrap(),
            10,
            Ipv4Addr::new(10, 0, 0, 1),
        );

        let cached_at = Instant::now();
        assert!(!record.is_expired(cached_at, cached_at));
        assert!(!record.is_expired(cached_at, cached_at + Duration::from_secs(10)));
        assert!(record.is_expired(cached_at, cached_at + Duration::from_secs(11)));
    }

    #[test]
    fn test_record_parser_walks_sections() {
        let mut buf = BytesMut::new();
        let r1 = ResourceRecord::a(
            Name::from_str("a.example.com.").unwrap(),
            60,
            Ipv4Addr::new(10, 0, 0, 1),
        );
        let r2 = ResourceRecord::a(
            Name::from_str("b.example.com.").unwrap(),
            60,
            Ipv4Addr::new(10, 0, 0, 2),
        );
        r1.write_to(&mut buf);
        r2.write_to(&mut buf);

        let mut parser = RecordParser::new(&buf, 0, 2);
        assert_eq!(parser.next().unwrap().unwrap(), r1);
        assert_eq!(parser.next().unwrap().unwrap(), r2);
        assert!(parser.next().unwrap().is_none());
        assert_eq!(parser.offset(), buf.len());
    }

    #[test]
    fn test_record_truncated_rdata() {
        let record = ResourceRecord::a(
            Name::from_str("example.com.").unwrap(),
            60,
            Ipv4Addr::new(10, 0, 0, 1),
        );

        let mut buf = BytesMut::new();
        record.write_to(&mut buf);
        buf.truncate(buf.len() - 2);

        assert!(ResourceRecord::parse(&buf, 0).is_err());
    }
}
