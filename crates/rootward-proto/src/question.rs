//! DNS question section.

use crate::class::{Class, RecordClass};
use crate::error::{Error, Result};
use crate::name::{Name, NameParser};
use crate::rtype::{RecordType, Type};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question.
///
/// A typical query carries exactly one question, though the protocol allows
/// multiple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The domain name being queried.
    pub qname: Name,

    /// The type of record being requested.
    pub qtype: Type,

    /// The class of the query (usually IN).
    pub qclass: Class,
}

impl Question {
    /// Creates a new question.
    #[inline]
    pub fn new(qname: Name, qtype: RecordType, qclass: RecordClass) -> Self {
        Self {
            qname,
            qtype: Type::Known(qtype),
            qclass: Class::Known(qclass),
        }
    }

    /// Creates a question for an A record lookup.
    #[inline]
    pub fn a(name: Name) -> Self {
        Self::new(name, RecordType::A, RecordClass::IN)
    }

    /// Creates a question for an MX record lookup.
    #[inline]
    pub fn mx(name: Name) -> Self {
        Self::new(name, RecordType::MX, RecordClass::IN)
    }

    /// Returns the record type if known.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        self.qtype.as_known()
    }

    /// Parses a question from wire format.
    ///
    /// Returns the question and the number of bytes consumed.
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let parser = NameParser::new(data);
        let (qname, name_len) = parser.parse_name(offset)?;

        let qtype_offset = offset + name_len;
        if qtype_offset + 4 > data.len() {
            return Err(Error::buffer_too_short(qtype_offset + 4, data.len()));
        }

        let qtype_value = u16::from_be_bytes([data[qtype_offset], data[qtype_offset + 1]]);
        let qclass_value = u16::from_be_bytes([data[qtype_offset + 2], data[qtype_offset + 3]]);

        Ok((
            Self {
                qname,
                qtype: Type::from_u16(qtype_value),
                qclass: Class::from_u16(qclass_value),
            },
            name_len + 4,
        ))
    }

    /// Returns the wire format length of this question.
    pub fn wire_len(&self) -> usize {
        self.qname.wire_len() + 4
    }

    /// Writes the question to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        self.qname.write_wire(buf);
        buf.extend_from_slice(&self.qtype.to_u16().to_be_bytes());
        buf.extend_from_slice(&self.qclass.to_u16().to_be_bytes());
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}
