//! # Rootward DNS Protocol Library
//!
//! DNS protocol types and wire format codec following RFC 1035.
//!
//! This crate provides the data model shared by the rest of the server:
//! domain names with DNS comparison semantics, the message header, questions,
//! resource records, and whole-message parsing and serialisation. Parsing
//! honours name compression; serialisation emits uncompressed names, and the
//! output of serialisation re-parses to an equal message.
//!
//! ## Example
//!
//! ```rust
//! use rootward_proto::{Message, Name, Question};
//! use std::str::FromStr;
//!
//! let question = Question::a(Name::from_str("example.com.").unwrap());
//! let query = Message::query(question);
//!
//! let wire = query.to_wire();
//! let parsed = Message::parse(&wire).unwrap();
//! assert_eq!(query, parsed);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod class;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod opcode;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rtype;

// Re-exports for convenience
pub use class::{Class, RecordClass};
pub use error::{Error, Result};
pub use header::Header;
pub use message::Message;
pub use name::Name;
pub use opcode::OpCode;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use rtype::{RecordType, Type};

/// Maximum length of a DNS label (63 bytes per RFC 1035).
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum length of a domain name in wire format (255 bytes per RFC 1035).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum size of a UDP datagram we will accept.
pub const MAX_DATAGRAM_SIZE: usize = 65535;
