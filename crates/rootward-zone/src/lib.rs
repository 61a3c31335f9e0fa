//! # Rootward Zone Store
//!
//! Master-file parsing (RFC 1035 Section 5) and the in-memory authoritative
//! zone store. The parser accepts the directives and record types a test
//! network zone needs and yields a flat record list; the store is immutable
//! after load.
//!
//! ## Example
//!
//! ```rust
//! use rootward_zone::parse_zone_str;
//!
//! let zone = "\
//! $ORIGIN example.com.
//! $TTL 3600
//! @       IN  NS  ns1
//! ns1     IN  A   10.0.0.53
//! www     IN  CNAME   @
//! ";
//!
//! let records = parse_zone_str(zone).unwrap();
//! assert_eq!(records.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use rootward_proto::rdata::{self, RData};
use rootward_proto::{Class, Name, RecordClass, RecordType, ResourceRecord, Type};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading a zone.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// The zone file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the zone file could not be parsed.
    #[error("zone file parse error at line {line}: {message}")]
    ParseError {
        /// Line number where the error occurred.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// The zone data is structurally invalid.
    #[error("invalid zone data: {message}")]
    InvalidZone {
        /// Description of the problem.
        message: String,
    },
}

impl ZoneError {
    /// Creates a new parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }
}

/// Result type for zone operations.
pub type Result<T> = std::result::Result<T, ZoneError>;

// ============================================================================
// Zone Store
// ============================================================================

/// The in-memory authoritative zone store.
///
/// Holds every record loaded from the zone file plus the set of owner names,
/// which defines the names this server answers authoritatively: a query name
/// is local when it equals an owner name or sits below one.
#[derive(Debug, Clone)]
pub struct ZoneStore {
    /// Every loaded record, in file order.
    records: Vec<ResourceRecord>,
    /// Lowercased owner names present in the zone.
    names: HashSet<Name>,
}

impl ZoneStore {
    /// Builds a store from a flat record list.
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        let names = records.iter().map(|r| r.name().lowercased()).collect();
        Self { records, names }
    }

    /// Loads a store from a zone file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let records = parse_zone_file(path)?;
        Ok(Self::new(records))
    }

    /// Returns the set of owner names in the zone.
    pub fn local_names(&self) -> &HashSet<Name> {
        &self.names
    }

    /// Returns every loaded record.
    pub fn all_records(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Returns true if this server is authoritative for the given name.
    ///
    /// A name is local when it equals any owner name in the zone or ends
    /// with one as a suffix.
    pub fn is_authoritative_for(&self, name: &Name) -> bool {
        self.names
            .iter()
            .any(|local| name == local || name.is_subdomain_of(local))
    }

    /// Returns the number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the zone is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Zone File Parser
// ============================================================================

/// Parser state carried across lines.
#[derive(Debug)]
struct ParserState {
    /// Current origin (from $ORIGIN).
    origin: Name,
    /// Current default TTL (from $TTL).
    default_ttl: u32,
    /// Last owner name seen (for lines that omit the owner).
    last_owner: Option<Name>,
    /// Current line number for error reporting.
    line_number: usize,
}

impl ParserState {
    fn new() -> Self {
        Self {
            origin: Name::root(),
            default_ttl: 3600,
            last_owner: None,
            line_number: 0,
        }
    }
}

/// Parser for RFC 1035 master file format.
///
/// Supports `$ORIGIN` and `$TTL`, `@` as the current origin, relative names,
/// `;` comments, and parentheses for multi-line records.
#[derive(Debug, Default)]
pub struct ZoneFileParser;

impl ZoneFileParser {
    /// Creates a new zone file parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a zone from a reader into a flat record list.
    pub fn parse<R: Read>(&self, reader: R) -> Result<Vec<ResourceRecord>> {
        let mut state = ParserState::new();
        let mut records = Vec::new();

        let reader = BufReader::new(reader);
        let mut in_parens = false;
        let mut accumulated = String::new();

        for line_result in reader.lines() {
            let line = line_result?;
            state.line_number += 1;

            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            // Strip inline comments.
            let line = line.split(';').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let open_count = line.chars().filter(|&c| c == '(').count();
            let close_count = line.chars().filter(|&c| c == ')').count();

            if in_parens {
                accumulated.push(' ');
                accumulated.push_str(line);
                if close_count > open_count {
                    in_parens = false;
                    let full_line = accumulated.replace(['(', ')'], " ");
                    accumulated.clear();
                    self.parse_line(&full_line, &mut state, &mut records)?;
                }
            } else if open_count > close_count {
                in_parens = true;
                accumulated = line.to_string();
            } else {
                let line = line.replace(['(', ')'], " ");
                self.parse_line(&line, &mut state, &mut records)?;
            }
        }

        if in_parens {
            return Err(ZoneError::InvalidZone {
                message: "unbalanced parentheses at end of file".to_string(),
            });
        }

        debug!(records = records.len(), "zone file parsed");
        Ok(records)
    }

    /// Parses a single logical line.
    fn parse_line(
        &self,
        line: &str,
        state: &mut ParserState,
        records: &mut Vec<ResourceRecord>,
    ) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if line.starts_with('$') {
            return self.parse_directive(line, state);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(());
        }

        let (owner, tokens) = self.parse_owner(&tokens, state)?;
        let (ttl, tokens) = self.parse_ttl(tokens, state.default_ttl);
        let (class, tokens) = self.parse_class(tokens);
        let (rtype, tokens) = self.parse_rtype(tokens, state)?;

        let rdata = self.parse_rdata(rtype, tokens, state)?;

        records.push(ResourceRecord::new(
            owner.clone(),
            Type::Known(rtype),
            Class::Known(class),
            ttl,
            rdata,
        ));

        state.last_owner = Some(owner);
        Ok(())
    }

    /// Parses a `$ORIGIN` or `$TTL` directive.
    fn parse_directive(&self, line: &str, state: &mut ParserState) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let directive = tokens.first().unwrap_or(&"");

        match directive.to_uppercase().as_str() {
            "$ORIGIN" => {
                let name = tokens.get(1).ok_or_else(|| {
                    ZoneError::parse(state.line_number, "$ORIGIN requires a domain name")
                })?;
                state.origin = self.make_absolute(name, state)?;
            }
            "$TTL" => {
                let ttl_str = tokens
                    .get(1)
                    .ok_or_else(|| ZoneError::parse(state.line_number, "$TTL requires a value"))?;
                state.default_ttl = parse_ttl_value(ttl_str).ok_or_else(|| {
                    ZoneError::parse(state.line_number, format!("invalid TTL: {ttl_str}"))
                })?;
            }
            _ => {
                return Err(ZoneError::parse(
                    state.line_number,
                    format!("unknown directive: {directive}"),
                ));
            }
        }

        Ok(())
    }

    /// Splits the owner name off the token list.
    fn parse_owner<'a>(
        &self,
        tokens: &'a [&'a str],
        state: &ParserState,
    ) -> Result<(Name, &'a [&'a str])> {
        let first = tokens
            .first()
            .ok_or_else(|| ZoneError::parse(state.line_number, "empty record line"))?;

        // A leading TTL, class, or type token means the owner was omitted.
        let looks_like_owner = !first.chars().next().is_some_and(|c| c.is_ascii_digit())
            && !first.eq_ignore_ascii_case("IN")
            && !first.eq_ignore_ascii_case("CH")
            && !first.eq_ignore_ascii_case("HS")
            && rtype_from_str(first).is_none();

        if looks_like_owner {
            let owner = self.make_absolute(first, state)?;
            Ok((owner, &tokens[1..]))
        } else {
            let owner = state
                .last_owner
                .clone()
                .unwrap_or_else(|| state.origin.clone());
            Ok((owner, tokens))
        }
    }

    /// Splits an optional TTL off the token list.
    fn parse_ttl<'a>(&self, tokens: &'a [&'a str], default: u32) -> (u32, &'a [&'a str]) {
        if let Some(first) = tokens.first() {
            if first.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                if let Some(ttl) = parse_ttl_value(first) {
                    return (ttl, &tokens[1..]);
                }
            }
        }
        (default, tokens)
    }

    /// Splits an optional class off the token list.
    fn parse_class<'a>(&self, tokens: &'a [&'a str]) -> (RecordClass, &'a [&'a str]) {
        match tokens.first().map(|t| t.to_uppercase()).as_deref() {
            Some("IN") => (RecordClass::IN, &tokens[1..]),
            Some("CH") => (RecordClass::CH, &tokens[1..]),
            Some("HS") => (RecordClass::HS, &tokens[1..]),
            _ => (RecordClass::IN, tokens),
        }
    }

    /// Splits the record type off the token list.
    fn parse_rtype<'a>(
        &self,
        tokens: &'a [&'a str],
        state: &ParserState,
    ) -> Result<(RecordType, &'a [&'a str])> {
        let first = tokens
            .first()
            .ok_or_else(|| ZoneError::parse(state.line_number, "missing record type"))?;

        let rtype = rtype_from_str(first).ok_or_else(|| {
            ZoneError::parse(state.line_number, format!("unknown record type: {first}"))
        })?;

        Ok((rtype, &tokens[1..]))
    }

    /// Parses the RDATA tokens based on record type.
    fn parse_rdata(
        &self,
        rtype: RecordType,
        tokens: &[&str],
        state: &ParserState,
    ) -> Result<RData> {
        match rtype {
            RecordType::A => {
                let addr = tokens
                    .first()
                    .ok_or_else(|| ZoneError::parse(state.line_number, "A record missing address"))?
                    .parse::<Ipv4Addr>()
                    .map_err(|_| ZoneError::parse(state.line_number, "invalid IPv4 address"))?;
                Ok(RData::A(rdata::A::new(addr)))
            }
            RecordType::AAAA => {
                let addr = tokens
                    .first()
                    .ok_or_else(|| {
                        ZoneError::parse(state.line_number, "AAAA record missing address")
                    })?
                    .parse::<Ipv6Addr>()
                    .map_err(|_| ZoneError::parse(state.line_number, "invalid IPv6 address"))?;
                Ok(RData::AAAA(rdata::AAAA::new(addr)))
            }
            RecordType::NS => {
                let target = self.rdata_name(tokens, "NS record missing target", state)?;
                Ok(RData::NS(rdata::NS::new(target)))
            }
            RecordType::CNAME => {
                let target = self.rdata_name(tokens, "CNAME record missing target", state)?;
                Ok(RData::CNAME(rdata::CNAME::new(target)))
            }
            RecordType::PTR => {
                let target = self.rdata_name(tokens, "PTR record missing target", state)?;
                Ok(RData::PTR(rdata::PTR::new(target)))
            }
            RecordType::MX => {
                if tokens.len() < 2 {
                    return Err(ZoneError::parse(
                        state.line_number,
                        "MX record requires preference and exchange",
                    ));
                }
                let preference = tokens[0]
                    .parse::<u16>()
                    .map_err(|_| ZoneError::parse(state.line_number, "invalid MX preference"))?;
                let exchange = self.make_absolute(tokens[1], state)?;
                Ok(RData::MX(rdata::MX::new(preference, exchange)))
            }
            RecordType::TXT => {
                let text = tokens.join(" ");
                let text = text.trim_matches('"').to_string();
                Ok(RData::TXT(rdata::TXT::from_string(text)))
            }
            RecordType::SOA => {
                if tokens.len() < 7 {
                    return Err(ZoneError::parse(
                        state.line_number,
                        "SOA record requires mname, rname, serial, refresh, retry, expire, minimum",
                    ));
                }

                let mname = self.make_absolute(tokens[0], state)?;
                let rname = self.make_absolute(tokens[1], state)?;
                let numbers: Vec<u32> = tokens[2..7]
                    .iter()
                    .map(|t| {
                        parse_ttl_value(t).ok_or_else(|| {
                            ZoneError::parse(state.line_number, format!("invalid SOA field: {t}"))
                        })
                    })
                    .collect::<Result<_>>()?;

                Ok(RData::SOA(rdata::SOA::new(
                    mname, rname, numbers[0], numbers[1], numbers[2], numbers[3], numbers[4],
                )))
            }
        }
    }

    /// Parses a single-name RDATA field.
    fn rdata_name(&self, tokens: &[&str], missing: &str, state: &ParserState) -> Result<Name> {
        let target = tokens
            .first()
            .ok_or_else(|| ZoneError::parse(state.line_number, missing))?;
        self.make_absolute(target, state)
    }

    /// Makes a name absolute against the current origin.
    fn make_absolute(&self, name: &str, state: &ParserState) -> Result<Name> {
        if name == "@" {
            return Ok(state.origin.clone());
        }

        let parsed = if name.ends_with('.') {
            Name::from_str(name)
        } else if state.origin.is_root() {
            Name::from_str(&format!("{name}."))
        } else {
            Name::from_str(&format!("{name}.{}", state.origin))
        };

        parsed
            .map_err(|_| ZoneError::parse(state.line_number, format!("invalid name: {name}")))
    }
}

/// Converts a textual record type to a [`RecordType`].
fn rtype_from_str(s: &str) -> Option<RecordType> {
    match s.to_uppercase().as_str() {
        "A" => Some(RecordType::A),
        "AAAA" => Some(RecordType::AAAA),
        "NS" => Some(RecordType::NS),
        "CNAME" => Some(RecordType::CNAME),
        "SOA" => Some(RecordType::SOA),
        "PTR" => Some(RecordType::PTR),
        "MX" => Some(RecordType::MX),
        "TXT" => Some(RecordType::TXT),
        _ => None,
    }
}

/// Parses a TTL value supporting the s/m/h/d/w time suffixes.
fn parse_ttl_value(s: &str) -> Option<u32> {
    let s = s.to_lowercase();
    let mut total: u32 = 0;
    let mut current: u32 = 0;
    let mut saw_digit = false;

    for c in s.chars() {
        match c {
            '0'..='9' => {
                saw_digit = true;
                current = current.checked_mul(10)?.checked_add(c.to_digit(10)?)?;
            }
            's' => {
                total = total.checked_add(current)?;
                current = 0;
            }
            'm' => {
                total = total.checked_add(current.checked_mul(60)?)?;
                current = 0;
            }
            'h' => {
                total = total.checked_add(current.checked_mul(3600)?)?;
                current = 0;
            }
            'd' => {
                total = total.checked_add(current.checked_mul(86400)?)?;
                current = 0;
            }
            'w' => {
                total = total.checked_add(current.checked_mul(604800)?)?;
                current = 0;
            }
            _ => return None,
        }
    }

    if !saw_digit {
        return None;
    }

    total.checked_add(current)
}

/// Parses a zone file from a path into a flat record list.
pub fn parse_zone_file(path: impl AsRef<Path>) -> Result<Vec<ResourceRecord>> {
    let file = std::fs::File::open(path)?;
    ZoneFileParser::new().parse(file)
}

/// Parses a zone from a string into a flat record list.
pub fn parse_zone_str(content: &str) -> Result<Vec<ResourceRecord>> {
    ZoneFileParser::new().parse(content.as_bytes())
}
