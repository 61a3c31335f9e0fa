//! DNS record data (RDATA) types.
//!
//! One struct per record type, dispatched through the [`RData`] enum:
//!
//! - **Address records**: A, AAAA
//! - **Name records**: NS, CNAME, PTR, MX
//! - **Authority records**: SOA
//! - **Text records**: TXT
//!
//! Unknown record types are preserved as opaque byte sequences.

pub mod address;
pub mod authority;
pub mod name;
pub mod text;
pub mod unknown;

pub use address::{A, AAAA};
pub use authority::SOA;
pub use name::{CNAME, MX, NS, PTR};
pub use text::TXT;
pub use unknown::Unknown;

use crate::error::{Error, Result};
use crate::name::Name;
use crate::rtype::RecordType;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// DNS record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address (A record)
    A(A),

    /// IPv6 address (AAAA record)
    AAAA(AAAA),

    /// Name server (NS record)
    NS(NS),

    /// Canonical name (CNAME record)
    CNAME(CNAME),

    /// Pointer (PTR record)
    PTR(PTR),

    /// Mail exchange (MX record)
    MX(MX),

    /// Start of authority (SOA record)
    SOA(SOA),

    /// Text (TXT record)
    TXT(TXT),

    /// Unknown or unsupported record type (preserved as raw bytes)
    Unknown(Unknown),
}

impl RData {
    /// Parses RDATA from wire format.
    ///
    /// Name-bearing types receive the full message so compression pointers
    /// inside the RDATA resolve correctly.
    pub fn parse(rtype: RecordType, data: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        let rdata_slice = data
            .get(offset..offset + rdlength as usize)
            .ok_or_else(|| Error::buffer_too_short(offset + rdlength as usize, data.len()))?;

        match rtype {
            RecordType::A => Ok(RData::A(A::parse(rdata_slice)?)),
            RecordType::AAAA => Ok(RData::AAAA(AAAA::parse(rdata_slice)?)),
            RecordType::NS => Ok(RData::NS(NS::parse(data, offset)?)),
            RecordType::CNAME => Ok(RData::CNAME(CNAME::parse(data, offset)?)),
            RecordType::PTR => Ok(RData::PTR(PTR::parse(data, offset)?)),
            RecordType::MX => Ok(RData::MX(MX::parse(data, offset)?)),
            RecordType::SOA => Ok(RData::SOA(SOA::parse(data, offset)?)),
            RecordType::TXT => Ok(RData::TXT(TXT::parse(rdata_slice)?)),
        }
    }

    /// Returns the wire format length of this RDATA.
    pub fn wire_len(&self) -> usize {
        match self {
            RData::A(r) => r.wire_len(),
            RData::AAAA(r) => r.wire_len(),
            RData::NS(r) => r.wire_len(),
            RData::CNAME(r) => r.wire_len(),
            RData::PTR(r) => r.wire_len(),
            RData::MX(r) => r.wire_len(),
            RData::SOA(r) => r.wire_len(),
            RData::TXT(r) => r.wire_len(),
            RData::Unknown(r) => r.wire_len(),
        }
    }

    /// Writes this RDATA to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        match self {
            RData::A(r) => r.write_to(buf),
            RData::AAAA(r) => r.write_to(buf),
            RData::NS(r) => r.write_to(buf),
            RData::CNAME(r) => r.write_to(buf),
            RData::PTR(r) => r.write_to(buf),
            RData::MX(r) => r.write_to(buf),
            RData::SOA(r) => r.write_to(buf),
            RData::TXT(r) => r.write_to(buf),
            RData::Unknown(r) => r.write_to(buf),
        }
    }

    /// Returns the IPv4 address if this is an A record.
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            RData::A(a) => Some(a.address()),
            _ => None,
        }
    }

    /// Returns the target name if this is a CNAME record.
    pub fn as_cname(&self) -> Option<&Name> {
        match self {
            RData::CNAME(cname) => Some(cname.target()),
            _ => None,
        }
    }

    /// Returns the name server name if this is an NS record.
    pub fn as_ns(&self) -> Option<&Name> {
        match self {
            RData::NS(ns) => Some(ns.nsdname()),
            _ => None,
        }
    }

    /// Returns the name this RDATA points at, for types that carry one.
    ///
    /// Used by the response composer to chase NS targets and CNAME targets
    /// into the additional section.
    pub fn target_name(&self) -> Option<&Name> {
        match self {
            RData::NS(ns) => Some(ns.nsdname()),
            RData::CNAME(cname) => Some(cname.target()),
            RData::PTR(ptr) => Some(ptr.ptrdname()),
            RData::MX(mx) => Some(mx.exchange()),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(r) => write!(f, "{r}"),
            RData::AAAA(r) => write!(f, "{r}"),
            RData::NS(r) => write!(f, "{r}"),
            RData::CNAME(r) => write!(f, "{r}"),
            RData::PTR(r) => write!(f, "{r}"),
            RData::MX(r) => write!(f, "{r}"),
            RData::SOA(r) => write!(f, "{r}"),
            RData::TXT(r) => write!(f, "{r}"),
            RData::Unknown(r) => write!(f, "{r}"),
        }
    }
}
