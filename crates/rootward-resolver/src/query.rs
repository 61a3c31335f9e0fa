//! Per-query resolution state.

use rootward_proto::{Message, Name, Question, ResourceRecord};
use std::net::SocketAddr;
use std::time::Instant;

/// State for one outstanding recursive query.
///
/// The client-facing parts (the original request, the client address, the
/// client-visible id) never change. The rest advances with each iterative
/// step: the CNAME chain grows, the active zone narrows with every referral,
/// and the retransmission fields track the most recent send.
#[derive(Debug, Clone)]
pub struct QueryState {
    /// The original client request, kept for its id and question and to
    /// shape the final reply.
    client_message: Message,
    /// Where the final reply goes.
    client_addr: SocketAddr,
    /// The client-visible id, echoed in the final reply.
    client_id: u16,

    /// CNAME records traversed so far, in chase order.
    cnames: Vec<ResourceRecord>,
    /// The zone suffix responses are currently trusted for.
    active_zone: Name,

    /// When the last iterative request was sent.
    last_sent: Instant,
    /// The last iterative request, for retransmission.
    last_request: Message,
    /// Where the last iterative request went.
    last_server: SocketAddr,
    /// Datagrams sent for the current iterative step.
    attempts: u32,
}

impl QueryState {
    /// Creates the state for a new recursion, recording its first iterative
    /// send.
    pub fn new(
        client_message: Message,
        client_addr: SocketAddr,
        first_request: Message,
        first_server: SocketAddr,
        now: Instant,
    ) -> Self {
        let client_id = client_message.id();

        Self {
            client_message,
            client_addr,
            client_id,
            cnames: Vec::new(),
            active_zone: Name::root(),
            last_sent: now,
            last_request: first_request,
            last_server: first_server,
            attempts: 1,
        }
    }

    /// Returns the original client request.
    pub fn client_message(&self) -> &Message {
        &self.client_message
    }

    /// Returns the client address.
    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    /// Returns the client-visible id.
    pub fn client_id(&self) -> u16 {
        self.client_id
    }

    /// Returns the original client question, if the request carried one.
    pub fn client_question(&self) -> Option<&Question> {
        self.client_message.question()
    }

    /// Returns the CNAME chain traversed so far.
    pub fn cnames(&self) -> &[ResourceRecord] {
        &self.cnames
    }

    /// Appends CNAME records to the chain.
    pub fn push_cnames(&mut self, records: impl IntoIterator<Item = ResourceRecord>) {
        self.cnames.extend(records);
    }

    /// Returns the name resolution is currently after: the last CNAME
    /// target if a chain has been followed, else the original question name.
    pub fn effective_target(&self) -> Option<&Name> {
        self.cnames
            .last()
            .and_then(|r| r.rdata().as_cname())
            .or_else(|| self.client_question().map(|q| &q.qname))
    }

    /// Returns the active zone.
    pub fn active_zone(&self) -> &Name {
        &self.active_zone
    }

    /// Sets the active zone.
    pub fn set_active_zone(&mut self, zone: Name) {
        self.active_zone = zone;
    }

    /// Records a fresh iterative send, resetting the attempt counter.
    pub fn record_send(&mut self, request: Message, server: SocketAddr, now: Instant) {
        self.last_request = request;
        self.last_server = server;
        self.last_sent = now;
        self.attempts = 1;
    }

    /// Records a retransmission of the last request.
    pub fn record_retransmit(&mut self, now: Instant) {
        self.last_sent = now;
        self.attempts += 1;
    }

    /// Returns when the last iterative request was sent.
    pub fn last_sent(&self) -> Instant {
        self.last_sent
    }

    /// Returns the last iterative request.
    pub fn last_request(&self) -> &Message {
        &self.last_request
    }

    /// Returns the last iterative destination.
    pub fn last_server(&self) -> SocketAddr {
        self.last_server
    }

    /// Returns the datagrams sent for the current step.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn state() -> QueryState {
        let client = Message::query(Question::a(name("a.tld")));
        let iterative = Message::iterative_query(77, Question::a(name("a.tld")));
        QueryState::new(
            client,
            "127.0.0.1:5353".parse().unwrap(),
            iterative,
            "127.0.0.1:60053".parse().unwrap(),
            Instant::now(),
        )
    }

    #[test]
    fn test_initial_state() {
        let q = state();

        assert!(q.active_zone().is_root());
        assert!(q.cnames().is_empty());
        assert_eq!(q.attempts(), 1);
        assert_eq!(q.effective_target(), Some(&name("a.tld")));
        assert_eq!(q.client_id(), q.client_message().id());
    }

    #[test]
    fn test_effective_target_follows_chain() {
        let mut q = state();

        q.push_cnames([ResourceRecord::cname(name("a.tld"), 60, name("b.tld"))]);
        assert_eq!(q.effective_target(), Some(&name("b.tld")));

        q.push_cnames([ResourceRecord::cname(name("b.tld"), 60, name("c.tld"))]);
        assert_eq!(q.effective_target(), Some(&name("c.tld")));
    }

    #[test]
    fn test_send_resets_attempts_retransmit_increments() {
        let mut q = state();
        let now = Instant::now();

        q.record_retransmit(now);
        q.record_retransmit(now);
        assert_eq!(q.attempts(), 3);

        let request = Message::iterative_query(78, Question::a(name("b.tld")));
        q.record_send(request, "10.0.0.2:60053".parse().unwrap(), now);
        assert_eq!(q.attempts(), 1);
        assert_eq!(q.last_server(), "10.0.0.2:60053".parse().unwrap());
    }
}
