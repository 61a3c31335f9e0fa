//! Unknown record type carrier.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An unknown or unsupported record type, preserved as raw bytes.
///
/// Records we cannot interpret still round-trip through the codec and the
/// cache unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unknown {
    /// The numeric record type code.
    type_code: u16,
    /// The raw RDATA bytes.
    data: Vec<u8>,
}

impl Unknown {
    /// Creates a new unknown record.
    pub fn new(type_code: u16, data: &[u8]) -> Self {
        Self {
            type_code,
            data: data.to_vec(),
        }
    }

    /// Returns the numeric record type code.
    #[inline]
    pub const fn type_code(&self) -> u16 {
        self.type_code
    }

    /// Returns the raw RDATA bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the wire format length.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.data.len()
    }

    /// Writes the raw bytes to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.data);
    }
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\# {}", self.data.len())?;
        for byte in &self.data {
            write!(f, " {byte:02x}")?;
        }
        Ok(())
    }
}
