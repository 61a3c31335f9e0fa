//! DNS domain name representation and operations.
//!
//! Domain names are stored in uncompressed wire format with inline storage
//! for the common case. Comparison and hashing are case-insensitive per
//! RFC 1035; parsing from messages (including compression pointers) lives in
//! [`parse`].

mod label;
mod parse;

pub use label::{Label, LabelIter};
pub use parse::NameParser;

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use bytes::BytesMut;
use compact_str::CompactString;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use smallvec::SmallVec;

/// A DNS domain name.
///
/// A name is a sequence of labels, each up to 63 bytes, with the whole name
/// at most 255 bytes in wire format. The root name is stored as an empty
/// byte sequence; all other names carry their terminating zero label.
///
/// # Example
///
/// ```rust
/// use rootward_proto::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("www.example.com.").unwrap();
/// assert_eq!(name.label_count(), 4); // www, example, com, root
///
/// // Case-insensitive comparison
/// assert_eq!(Name::from_str("WWW.EXAMPLE.COM.").unwrap(), name);
/// ```
#[derive(Clone)]
pub struct Name {
    /// The raw wire-format representation (without compression).
    wire: SmallVec<[u8; 64]>,
    /// Number of labels (including root).
    label_count: u8,
}

impl Name {
    /// Creates a new empty (root) domain name.
    #[inline]
    pub const fn root() -> Self {
        Self {
            wire: SmallVec::new_const(),
            label_count: 1,
        }
    }

    /// Creates a domain name from a slice of uncompressed wire bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let label_count = Self::validate_wire(slice)?;

        // Normalise the explicit root encoding to the empty representation.
        let wire = if slice.len() == 1 && slice[0] == 0 {
            SmallVec::new()
        } else {
            SmallVec::from_slice(slice)
        };

        Ok(Self { wire, label_count })
    }

    /// Validates wire format and returns the label count.
    fn validate_wire(bytes: &[u8]) -> Result<u8> {
        if bytes.is_empty() {
            // Empty is the root name.
            return Ok(1);
        }

        let mut pos = 0;
        let mut labels = 0u8;
        let mut total_len = 0usize;

        while pos < bytes.len() {
            let len = bytes[pos] as usize;

            if len == 0 {
                // Root label terminates the name.
                labels += 1;
                return Ok(labels);
            }

            // Compression pointers are not allowed in stored names.
            if len >= 0xC0 {
                return Err(Error::invalid_data(
                    pos,
                    "compression pointer in stored name",
                ));
            }

            if len > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong { length: len });
            }

            total_len += 1 + len;
            if total_len > MAX_NAME_LENGTH {
                return Err(Error::NameTooLong { length: total_len });
            }

            pos += 1 + len;
            labels = labels
                .checked_add(1)
                .ok_or(Error::NameTooLong { length: total_len })?;
        }

        Err(Error::unexpected_eof(bytes.len()))
    }

    /// Returns the wire format representation.
    #[inline]
    pub fn as_wire(&self) -> &[u8] {
        &self.wire
    }

    /// Returns the wire format length (including the terminating zero).
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len().max(1)
    }

    /// Returns the number of labels in the name (including root).
    #[inline]
    pub const fn label_count(&self) -> usize {
        self.label_count as usize
    }

    /// Returns true if this is the root domain.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.wire.is_empty()
    }

    /// Returns an iterator over the labels in the name.
    #[inline]
    pub fn labels(&self) -> LabelIter<'_> {
        LabelIter::new(&self.wire)
    }

    /// Returns the parent domain (removes the leftmost label).
    ///
    /// Returns `None` for the root domain.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        let first_label_len = self.wire[0] as usize;
        let parent_start = 1 + first_label_len;
        if parent_start >= self.wire.len() {
            return Some(Self::root());
        }

        Self::from_slice(&self.wire[parent_start..]).ok()
    }

    /// Returns true if this name equals `other` or sits below it.
    ///
    /// Comparison is case-insensitive and label-aligned: `ns1.example.com.`
    /// is a subdomain of `example.com.` but `badexample.com.` is not.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if self.label_count() < other.label_count() {
            return false;
        }

        let self_labels: Vec<_> = self.labels().collect();
        let other_labels: Vec<_> = other.labels().collect();

        for (i, other_label) in other_labels.iter().rev().enumerate() {
            let self_idx = self_labels.len() - 1 - i;
            if !self_labels[self_idx].eq_ignore_ascii_case(other_label) {
                return false;
            }
        }

        true
    }

    /// Converts the name to lowercase in place.
    pub fn to_lowercase(&mut self) {
        for byte in self.wire.iter_mut() {
            if byte.is_ascii_uppercase() {
                *byte = byte.to_ascii_lowercase();
            }
        }
    }

    /// Returns a lowercased copy of the name.
    #[must_use]
    pub fn lowercased(&self) -> Self {
        let mut copy = self.clone();
        copy.to_lowercase();
        copy
    }

    /// Writes the name in wire format to a buffer.
    pub fn write_wire(&self, buf: &mut BytesMut) {
        if self.wire.is_empty() {
            buf.extend_from_slice(&[0]);
        } else {
            buf.extend_from_slice(&self.wire);
        }
    }

    /// Returns the dotted string representation.
    pub fn to_string_representation(&self) -> CompactString {
        let mut result = CompactString::default();

        for label in self.labels() {
            if !label.is_root() {
                result.push_str(label.as_str_lossy().as_ref());
                result.push('.');
            }
        }

        if result.is_empty() {
            result.push('.');
        }

        result
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a domain name from its dotted string form.
    ///
    /// A trailing dot is accepted and implied when absent.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let s = s.strip_suffix('.').unwrap_or(s);

        let mut wire = SmallVec::<[u8; 64]>::new();
        let mut label_count = 1u8; // root

        for part in s.split('.') {
            if part.is_empty() {
                return Err(Error::invalid_data(0, "empty label"));
            }
            if part.len() > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong { length: part.len() });
            }

            for (position, character) in part.chars().enumerate() {
                if !character.is_ascii_alphanumeric()
                    && !matches!(character, '-' | '_' | '*')
                {
                    return Err(Error::InvalidLabelChar {
                        character,
                        position,
                    });
                }
            }

            wire.push(part.len() as u8);
            wire.extend_from_slice(part.as_bytes());
            label_count = label_count
                .checked_add(1)
                .ok_or(Error::NameTooLong { length: s.len() })?;
        }

        wire.push(0);

        if wire.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong { length: wire.len() });
        }

        Ok(Self { wire, label_count })
    }
}

impl PartialEq for Name {
    /// Case-insensitive equality per DNS semantics.
    fn eq(&self, other: &Self) -> bool {
        if self.label_count != other.label_count {
            return false;
        }
        self.labels()
            .zip(other.labels())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            let lower: SmallVec<[u8; 64]> = label
                .as_bytes()
                .iter()
                .map(|b| b.to_ascii_lowercase())
                .collect();
            lower.hash(state);
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_representation())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_representation())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Name::from_str(&s).map_err(D::Error::custom)
    }
}
