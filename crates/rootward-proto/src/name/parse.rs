//! DNS name parsing from wire format with compression support.
//!
//! Handles both plain label sequences and names using compression pointers
//! (RFC 1035 Section 4.1.4). Pointers must point strictly backwards and the
//! total number of jumps is bounded.

use super::Name;
use crate::error::{Error, Result};
use crate::MAX_NAME_LENGTH;
use smallvec::SmallVec;

/// Maximum number of compression pointer jumps to prevent loops.
const MAX_COMPRESSION_JUMPS: usize = 128;

/// Parser for reading domain names from DNS wire format.
///
/// Holds the complete message buffer so compression pointers can be
/// resolved against earlier offsets.
#[derive(Debug, Clone)]
pub struct NameParser<'a> {
    /// The complete message buffer.
    message: &'a [u8],
}

impl<'a> NameParser<'a> {
    /// Creates a new name parser over the given message buffer.
    #[inline]
    pub const fn new(message: &'a [u8]) -> Self {
        Self { message }
    }

    /// Parses a domain name starting at the given offset.
    ///
    /// Returns the parsed name and the number of bytes consumed from the
    /// starting position (not following compression pointers).
    pub fn parse_name(&self, offset: usize) -> Result<(Name, usize)> {
        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut consumed = 0;
        let mut pos = offset;
        let mut jumps = 0;
        let mut followed_pointer = false;
        let mut label_count = 0u8;

        loop {
            if pos >= self.message.len() {
                return Err(Error::UnexpectedEof { offset: pos });
            }

            let len_byte = self.message[pos];

            // Compression pointer: top two bits set.
            if len_byte >= 0xC0 {
                if pos + 1 >= self.message.len() {
                    return Err(Error::UnexpectedEof { offset: pos + 1 });
                }

                let pointer = u16::from_be_bytes([len_byte & 0x3F, self.message[pos + 1]]);
                let target = pointer as usize;

                // Pointers may only reference earlier parts of the message.
                if target >= pos {
                    return Err(Error::InvalidCompressionPointer {
                        offset: pos,
                        target,
                    });
                }

                if !followed_pointer {
                    consumed = pos - offset + 2;
                    followed_pointer = true;
                }

                jumps += 1;
                if jumps > MAX_COMPRESSION_JUMPS {
                    return Err(Error::TooManyCompressionJumps {
                        max_jumps: MAX_COMPRESSION_JUMPS,
                    });
                }

                pos = target;
                continue;
            }

            // Extended label types (0x40..0xBF) are reserved.
            if len_byte >= 0x40 {
                return Err(Error::invalid_data(
                    pos,
                    format!("invalid label type 0x{len_byte:02X}"),
                ));
            }

            let len = len_byte as usize;

            // Root label terminates the name.
            if len == 0 {
                label_count += 1;
                if !followed_pointer {
                    consumed = pos - offset + 1;
                }
                break;
            }

            if pos + 1 + len > self.message.len() {
                return Err(Error::UnexpectedEof {
                    offset: pos + 1 + len,
                });
            }

            if wire.len() + 1 + len + 1 > MAX_NAME_LENGTH {
                return Err(Error::NameTooLong {
                    length: wire.len() + 1 + len + 1,
                });
            }

            wire.push(len as u8);
            wire.extend_from_slice(&self.message[pos + 1..pos + 1 + len]);
            label_count += 1;

            pos += 1 + len;
        }

        // The root name uses the empty representation.
        if !wire.is_empty() {
            wire.push(0);
        }

        Ok((Name { wire, label_count }, consumed))
    }

    /// Parses a name, discarding the consumed byte count.
    #[inline]
    pub fn parse(&self, offset: usize) -> Result<Name> {
        self.parse_name(offset).map(|(name, _)| name)
    }
}
