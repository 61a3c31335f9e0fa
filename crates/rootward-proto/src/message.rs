//! DNS message representation.
//!
//! A DNS message is a header, a question section, and three resource record
//! sections (answer, authority, additional).

use crate::error::{Error, Result};
use crate::header::{Header, HEADER_SIZE};
use crate::name::Name;
use crate::opcode::OpCode;
use crate::question::Question;
use crate::rcode::ResponseCode;
use crate::record::{RecordParser, ResourceRecord};
use crate::rtype::RecordType;
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete DNS message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The message header.
    header: Header,
    /// The question section.
    questions: Vec<Question>,
    /// The answer section.
    answers: Vec<ResourceRecord>,
    /// The authority section.
    authority: Vec<ResourceRecord>,
    /// The additional section.
    additional: Vec<ResourceRecord>,
}

impl Message {
    /// Creates a new empty message with the given header.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Creates a recursive query message with a random ID.
    pub fn query(question: Question) -> Self {
        let header = Header::query();

        Self {
            header,
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Creates an iterative query: a given ID, rd clear.
    ///
    /// This is the shape of every question this server sends upstream.
    pub fn iterative_query(id: u16, question: Question) -> Self {
        let mut msg = Self::query(question);
        msg.header.id = id;
        msg.header.set_recursion_desired(false);
        msg
    }

    /// Creates a response message from a query.
    ///
    /// Copies the ID, the RD flag, and the question section.
    pub fn response_from(query: &Message) -> Self {
        let mut header = Header::response_from(&query.header);
        header.qd_count = query.questions.len() as u16;

        Self {
            header,
            questions: query.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    // =========================================================================
    // Header accessors
    // =========================================================================

    /// Returns the message header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Sets the message ID.
    #[inline]
    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    /// Returns the opcode.
    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.header.opcode
    }

    /// Returns the response code.
    #[inline]
    pub fn rcode(&self) -> ResponseCode {
        self.header.rcode
    }

    /// Sets the response code.
    #[inline]
    pub fn set_rcode(&mut self, rcode: ResponseCode) {
        self.header.rcode = rcode;
    }

    /// Returns true if this is a query.
    #[inline]
    pub fn is_query(&self) -> bool {
        self.header.is_query()
    }

    /// Returns true if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Returns true if the response is authoritative.
    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.header.is_authoritative()
    }

    /// Returns true if recursion was requested.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.header.recursion_desired()
    }

    // =========================================================================
    // Section accessors
    // =========================================================================

    /// Returns the question section.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the first question if present.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the additional section.
    #[inline]
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Returns every record across answer, authority, and additional.
    pub fn all_records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }

    // =========================================================================
    // Section mutators
    // =========================================================================

    /// Adds a question.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
        self.header.qd_count = self.questions.len() as u16;
    }

    /// Adds an answer record.
    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answers.push(record);
        self.header.an_count = self.answers.len() as u16;
    }

    /// Adds multiple answer records.
    pub fn add_answers(&mut self, records: impl IntoIterator<Item = ResourceRecord>) {
        self.answers.extend(records);
        self.header.an_count = self.answers.len() as u16;
    }

    /// Adds an authority record.
    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
        self.header.ns_count = self.authority.len() as u16;
    }

    /// Adds multiple authority records.
    pub fn add_authority_records(&mut self, records: impl IntoIterator<Item = ResourceRecord>) {
        self.authority.extend(records);
        self.header.ns_count = self.authority.len() as u16;
    }

    /// Adds an additional record.
    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
        self.header.ar_count = self.additional.len() as u16;
    }

    /// Adds multiple additional records.
    pub fn add_additional_records(&mut self, records: impl IntoIterator<Item = ResourceRecord>) {
        self.additional.extend(records);
        self.header.ar_count = self.additional.len() as u16;
    }

    // =========================================================================
    // Response helpers
    // =========================================================================

    /// Returns true if all three record sections are empty.
    pub fn has_no_records(&self) -> bool {
        self.answers.is_empty() && self.authority.is_empty() && self.additional.is_empty()
    }

    /// Returns true if this is a SERVFAIL response.
    pub fn is_servfail(&self) -> bool {
        self.rcode().is_server_error()
    }

    /// Returns true if this response is a referral: not authoritative, with
    /// NS records in the authority section.
    pub fn is_referral(&self) -> bool {
        !self.is_authoritative() && self.authority.iter().any(ResourceRecord::is_ns)
    }

    /// Returns answer records of a specific type.
    pub fn answers_of_type(&self, rtype: RecordType) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .filter(move |r| r.record_type() == Some(rtype))
    }

    /// Returns the first CNAME target in the answers.
    pub fn cname_target(&self) -> Option<&Name> {
        self.answers.iter().find_map(|r| r.rdata().as_cname())
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    /// Parses a DNS message from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::buffer_too_short(HEADER_SIZE, data.len()));
        }

        let header = Header::parse(data)?;

        let mut offset = HEADER_SIZE;
        let mut questions = Vec::with_capacity(header.qd_count as usize);
        let mut answers = Vec::with_capacity(header.an_count as usize);
        let mut authority = Vec::with_capacity(header.ns_count as usize);
        let mut additional = Vec::with_capacity(header.ar_count as usize);

        for _ in 0..header.qd_count {
            let (question, consumed) = Question::parse(data, offset)?;
            questions.push(question);
            offset += consumed;
        }

        let mut an_parser = RecordParser::new(data, offset, header.an_count);
        while let Some(record) = an_parser.next()? {
            answers.push(record);
        }
        offset = an_parser.offset();

        let mut ns_parser = RecordParser::new(data, offset, header.ns_count);
        while let Some(record) = ns_parser.next()? {
            authority.push(record);
        }
        offset = ns_parser.offset();

        let mut ar_parser = RecordParser::new(data, offset, header.ar_count);
        while let Some(record) = ar_parser.next()? {
            additional.push(record);
        }

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
        })
    }

    /// Returns the wire format length of this message.
    pub fn wire_len(&self) -> usize {
        let mut len = HEADER_SIZE;

        for q in &self.questions {
            len += q.wire_len();
        }
        for r in self.all_records() {
            len += r.wire_len();
        }

        len
    }

    /// Writes the message to wire format.
    pub fn write_to(&self, buf: &mut BytesMut) {
        // Counts are refreshed from the sections before writing.
        let mut header = self.header.clone();
        header.qd_count = self.questions.len() as u16;
        header.an_count = self.answers.len() as u16;
        header.ns_count = self.authority.len() as u16;
        header.ar_count = self.additional.len() as u16;

        header.write_to(buf);

        for q in &self.questions {
            q.write_to(buf);
        }
        for r in &self.answers {
            r.write_to(buf);
        }
        for r in &self.authority {
            r.write_to(buf);
        }
        for r in &self.additional {
            r.write_to(buf);
        }
    }

    /// Converts the message to wire format bytes.
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.write_to(&mut buf);
        buf.freeze()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new(Header::default())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; ->>HEADER<<- {}", self.header)?;

        writeln!(f, ";; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{q}")?;
        }

        if !self.answers.is_empty() {
            writeln!(f, ";; ANSWER SECTION:")?;
            for r in &self.answers {
                writeln!(f, "{r}")?;
            }
        }

        if !self.authority.is_empty() {
            writeln!(f, ";; AUTHORITY SECTION:")?;
            for r in &self.authority {
                writeln!(f, "{r}")?;
            }
        }

        if !self.additional.is_empty() {
            writeln!(f, ";; ADDITIONAL SECTION:")?;
            for r in &self.additional {
                writeln!(f, "{r}")?;
            }
        }

        Ok(())
    }
}
