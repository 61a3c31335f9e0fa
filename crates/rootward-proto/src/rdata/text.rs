//! Text record types (TXT).

use crate::error::{Error, Result};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TXT record - text strings (RFC 1035).
///
/// The RDATA is one or more character strings, each prefixed by a length
/// byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TXT {
    /// The character strings.
    strings: Vec<Vec<u8>>,
}

impl TXT {
    /// Creates a TXT record from a single string.
    pub fn from_string(text: impl Into<Vec<u8>>) -> Self {
        let bytes = text.into();
        // Split into 255-byte chunks per the wire format limit.
        let strings = if bytes.is_empty() {
            vec![Vec::new()]
        } else {
            bytes.chunks(255).map(|c| c.to_vec()).collect()
        };
        Self { strings }
    }

    /// Returns the character strings.
    #[inline]
    pub fn strings(&self) -> &[Vec<u8>] {
        &self.strings
    }

    /// Returns the concatenated text, lossily decoded.
    pub fn as_text(&self) -> String {
        self.strings
            .iter()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect()
    }

    /// Parses a TXT record from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut strings = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            let len = data[pos] as usize;
            pos += 1;

            if pos + len > data.len() {
                return Err(Error::invalid_rdata("TXT", "string extends past RDATA"));
            }

            strings.push(data[pos..pos + len].to_vec());
            pos += len;
        }

        if strings.is_empty() {
            return Err(Error::invalid_rdata("TXT", "no character strings"));
        }

        Ok(Self { strings })
    }

    /// Returns the wire format length.
    pub fn wire_len(&self) -> usize {
        self.strings.iter().map(|s| 1 + s.len()).sum()
    }

    /// Writes the TXT record to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        for s in &self.strings {
            buf.extend_from_slice(&[s.len() as u8]);
            buf.extend_from_slice(s);
        }
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.strings.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "\"{}\"", String::from_utf8_lossy(s))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_roundtrip() {
        let txt = TXT::from_string("v=spf1 -all");

        let mut buf = BytesMut::new();
        txt.write_to(&mut buf);
        assert_eq!(buf.len(), txt.wire_len());

        let parsed = TXT::parse(&buf).unwrap();
        assert_eq!(parsed, txt);
        assert_eq!(parsed.as_text(), "v=spf1 -all");
    }

    #[test]
    fn test_txt_long_string_chunked() {
        let long = "x".repeat(300);
        let txt = TXT::from_string(long.clone());

        assert_eq!(txt.strings().len(), 2);
        assert_eq!(txt.as_text(), long);
    }

    #[test]
    fn test_txt_truncated_string_rejected() {
        // Length byte says 5, only 2 bytes follow.
        assert!(TXT::parse(&[5, b'a', b'b']).is_err());
    }
}
