//! The resolver engine.
//!
//! Drives every query from classification to final reply. The engine is
//! sans-I/O: [`Engine::handle_datagram`] and [`Engine::sweep`] consume bytes
//! and clock readings and return the datagrams to send. The event loop owns
//! the engine and does nothing but shuttle datagrams in and out.
//!
//! ## Query flow
//!
//! A request is classified against the zone store, then the cache, then
//! handed to recursion: a fresh iterative id is drawn, the question is sent
//! to the configured root server with rd clear, and the query parks in the
//! table until responses walk it down the delegation chain. Responses are
//! bailiwick-filtered and absorbed into the cache before any state advances.
//! The timer sweep resends unanswered iterative requests and fails queries
//! that exhaust their attempt budget.

use crate::bailiwick;
use crate::compose::compose_response;
use crate::qlog::QueryLog;
use crate::query::QueryState;
use crate::table::QueryTable;
use crate::ResolverConfig;
use rootward_cache::RecordCache;
use rootward_proto::{Message, Name, OpCode, Question, ResponseCode};
use rootward_zone::ZoneStore;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Longest CNAME chain the final-reply composer will walk through the pool.
const MAX_CNAME_CHAIN: usize = 8;

/// A datagram the event loop should send.
#[derive(Debug, Clone)]
pub struct Transmit {
    /// Destination address.
    pub dest: SocketAddr,
    /// The message to serialise and send.
    pub message: Message,
}

impl Transmit {
    fn new(dest: SocketAddr, message: Message) -> Self {
        Self { dest, message }
    }
}

/// The resolver state machine.
pub struct Engine {
    /// Authoritative records, immutable after load.
    zone: ZoneStore,
    /// Shared TTL-bounded record cache.
    cache: RecordCache,
    /// Outstanding recursive queries by iterative id.
    table: QueryTable,
    /// Per-query trace writer.
    qlog: QueryLog,
    /// Tunables.
    config: ResolverConfig,
    /// Where recursion starts.
    root_server: SocketAddr,
}

impl Engine {
    /// Creates an engine resolving from the given root server.
    pub fn new(zone: ZoneStore, root_ip: Ipv4Addr, config: ResolverConfig) -> Self {
        let root_server = SocketAddr::new(IpAddr::V4(root_ip), config.upstream_port);
        let qlog = QueryLog::new(&config.log_dir);

        info!(
            zone_records = zone.len(),
            %root_server,
            "resolver engine ready"
        );

        Self {
            zone,
            cache: RecordCache::new(),
            table: QueryTable::new(),
            qlog,
            config,
            root_server,
        }
    }

    /// Returns the per-query trace writer.
    pub fn query_log(&self) -> &QueryLog {
        &self.qlog
    }

    /// Returns the record cache.
    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Returns the number of outstanding recursive queries.
    pub fn outstanding(&self) -> usize {
        self.table.len()
    }

    /// Handles one received datagram, returning the datagrams to send.
    ///
    /// Malformed datagrams are dropped with a log entry; they never take
    /// the server down.
    pub fn handle_datagram(&mut self, src: SocketAddr, data: &[u8], now: Instant) -> Vec<Transmit> {
        let message = match Message::parse(data) {
            Ok(message) => message,
            Err(e) => {
                debug!(%src, error = %e, "dropping malformed datagram");
                return Vec::new();
            }
        };

        if message.is_query() {
            self.handle_request(src, message, now)
        } else {
            self.handle_response(src, &message, now)
        }
    }

    // =========================================================================
    // Request handling
    // =========================================================================

    /// Classifies and answers a client request.
    fn handle_request(&mut self, src: SocketAddr, request: Message, now: Instant) -> Vec<Transmit> {
        if request.opcode() != OpCode::Query {
            debug!(%src, opcode = %request.opcode(), "ignoring non-query opcode");
            return Vec::new();
        }

        self.cache.sweep(now);

        let Some(question) = request.question() else {
            debug!(%src, "dropping request without a question");
            return Vec::new();
        };
        let question = question.clone();

        trace!(%src, %question, "request received");

        if self.zone.is_authoritative_for(&question.qname) {
            return self.answer_authoritatively(src, &request);
        }

        if self
            .cache
            .get(&question.qname, question.qtype, now)
            .is_some()
        {
            return self.answer_from_cache(src, &request, now);
        }

        if !request.recursion_desired() {
            debug!(%src, %question, "recursion not desired for non-local name");
            return vec![self.servfail_to(&request, src)];
        }

        self.start_recursion(src, request, now)
    }

    /// Answers from the zone store with the authority bit set.
    fn answer_authoritatively(&self, src: SocketAddr, request: &Message) -> Vec<Transmit> {
        let mut response = compose_response(request, self.zone.all_records(), true);

        if response.answers().is_empty() {
            response.set_rcode(ResponseCode::NXDomain);
        }

        trace!(%src, answers = response.answers().len(), rcode = %response.rcode(), "authoritative answer");
        vec![Transmit::new(src, response)]
    }

    /// Answers from the cache snapshot with the authority bit clear.
    fn answer_from_cache(&self, src: SocketAddr, request: &Message, now: Instant) -> Vec<Transmit> {
        let pool = self.cache.snapshot(now);
        let response = compose_response(request, &pool, false);

        trace!(%src, answers = response.answers().len(), "cache answer");
        vec![Transmit::new(src, response)]
    }

    /// Begins iterative recursion for a client request.
    fn start_recursion(
        &mut self,
        src: SocketAddr,
        request: Message,
        now: Instant,
    ) -> Vec<Transmit> {
        // The question was checked during classification.
        let Some(question) = request.question().cloned() else {
            return Vec::new();
        };

        let iid = self.table.fresh_id();
        let iterative = Message::iterative_query(iid, question.clone());

        self.qlog.append(
            request.id(),
            format!(
                "recursion started for {question}; iterative id {iid:#06x} to root {}",
                self.root_server
            ),
        );

        let query = QueryState::new(request, src, iterative.clone(), self.root_server, now);
        self.table.insert(iid, query);

        debug!(%src, %question, iid, "recursion started");
        vec![Transmit::new(self.root_server, iterative)]
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    /// Advances an outstanding query with an upstream response.
    fn handle_response(
        &mut self,
        src: SocketAddr,
        response: &Message,
        now: Instant,
    ) -> Vec<Transmit> {
        let iid = response.id();

        if self.table.is_retired(iid) {
            trace!(%src, iid, "late duplicate for retired id");
            return Vec::new();
        }

        let Some(query) = self.table.take(iid) else {
            debug!(%src, iid, "response with unknown transaction id");
            return Vec::new();
        };
        self.table.retire(iid);

        let filtered = bailiwick::filter_response(response, query.active_zone());
        for dropped in &filtered.dropped {
            self.qlog.append(
                query.client_id(),
                format!("bailiwick: dropped {dropped} (zone {})", query.active_zone()),
            );
        }

        for record in filtered.message.all_records() {
            self.cache.put(record.clone(), now);
        }

        let message = filtered.message;
        self.qlog.append(
            query.client_id(),
            format!(
                "response from {src}: rcode {}, {} answer / {} authority / {} additional",
                message.rcode(),
                message.answers().len(),
                message.authority().len(),
                message.additional().len()
            ),
        );

        if message.has_no_records() {
            self.qlog
                .append(query.client_id(), "empty response; replying to client");
            return self.final_reply(&query, message.rcode(), now);
        }

        if message.is_authoritative() {
            let wanted = query.client_question().map(|q| q.qtype);
            let answered = wanted
                .map(|qtype| message.answers().iter().any(|r| r.rtype() == qtype))
                .unwrap_or(false);

            if answered {
                self.qlog
                    .append(query.client_id(), "authoritative answer; replying to client");
                return self.final_reply(&query, ResponseCode::NoError, now);
            }

            let all_cnames = !message.answers().is_empty()
                && message.answers().iter().all(|r| r.is_cname());
            if all_cnames {
                return self.chase_cname(query, &message, now);
            }

            return self.fail_query(query, "authoritative answer without usable records");
        }

        if message.is_referral() {
            return self.follow_referral(query, &message, now);
        }

        if message.is_servfail() {
            return self.fail_query(query, "upstream returned SERVFAIL");
        }

        self.fail_query(query, "response matched no dispatch arm")
    }

    /// Restarts resolution at the root for a CNAME target.
    fn chase_cname(&mut self, mut query: QueryState, message: &Message, now: Instant) -> Vec<Transmit> {
        let Some(target) = message.cname_target().cloned() else {
            return self.fail_query(query, "CNAME answer without a target");
        };
        let Some(original) = query.client_question().cloned() else {
            return self.fail_query(query, "query lost its question");
        };

        query.push_cnames(message.answers().iter().cloned());
        query.set_active_zone(Name::root());

        let iid = self.table.fresh_id();
        let question = Question {
            qname: target.clone(),
            qtype: original.qtype,
            qclass: original.qclass,
        };
        let iterative = Message::iterative_query(iid, question);

        self.qlog.append(
            query.client_id(),
            format!("following CNAME to {target}; iterative id {iid:#06x} to root"),
        );

        query.record_send(iterative.clone(), self.root_server, now);
        self.table.insert(iid, query);

        vec![Transmit::new(self.root_server, iterative)]
    }

    /// Descends one delegation level using a referral's glue.
    fn follow_referral(
        &mut self,
        mut query: QueryState,
        message: &Message,
        now: Instant,
    ) -> Vec<Transmit> {
        // The first additional A record naming an NS target carries the next
        // hop; the owning NS record defines the new active zone.
        let next_hop = message.additional().iter().find_map(|glue| {
            let addr = glue.rdata().as_a()?;
            let ns = message
                .authority()
                .iter()
                .find(|ns| ns.rdata().as_ns() == Some(glue.name()))?;
            Some((ns.name().clone(), addr))
        });

        let Some((zone, addr)) = next_hop else {
            return self.fail_query(query, "referral without usable glue");
        };
        let Some(original) = query.client_question().cloned() else {
            return self.fail_query(query, "query lost its question");
        };
        let Some(target) = query.effective_target().cloned() else {
            return self.fail_query(query, "query lost its target");
        };

        query.set_active_zone(zone.clone());

        let iid = self.table.fresh_id();
        let question = Question {
            qname: target,
            qtype: original.qtype,
            qclass: original.qclass,
        };
        let iterative = Message::iterative_query(iid, question);
        let dest = SocketAddr::new(IpAddr::V4(addr), self.config.upstream_port);

        self.qlog.append(
            query.client_id(),
            format!("referral: active zone {zone}; iterative id {iid:#06x} to {dest}"),
        );

        query.record_send(iterative.clone(), dest, now);
        self.table.insert(iid, query);

        vec![Transmit::new(dest, iterative)]
    }

    /// Builds the final reply for a finished recursion.
    ///
    /// The reply answers the client's original question with the traversed
    /// CNAME chain followed by the records for the effective target, drawn
    /// from the cache the recursion just filled. aa stays clear: the answer
    /// was recursed, not served from our zone.
    fn final_reply(&self, query: &QueryState, rcode: ResponseCode, now: Instant) -> Vec<Transmit> {
        let pool = self.cache.snapshot(now);

        let mut reply = Message::response_from(query.client_message());
        reply.header_mut().set_recursion_available(true);
        reply.set_rcode(rcode);

        if let (Some(original), Some(target)) = (query.client_question(), query.effective_target())
        {
            // Walk any remaining CNAMEs through the pool, so a chain the
            // upstream delivered in one response still composes fully.
            let mut chain = query.cnames().to_vec();
            let mut target = target.clone();

            let composed = loop {
                let effective = Message::iterative_query(
                    0,
                    Question {
                        qname: target.clone(),
                        qtype: original.qtype,
                        qclass: original.qclass,
                    },
                );
                let composed = compose_response(&effective, &pool, false);

                if !composed.answers().is_empty() || chain.len() >= MAX_CNAME_CHAIN {
                    break composed;
                }

                let Some(cname) = pool.iter().find(|r| r.is_cname() && r.name() == &target)
                else {
                    break composed;
                };
                let Some(next) = cname.rdata().as_cname().cloned() else {
                    break composed;
                };

                chain.push(cname.clone());
                target = next;
            };

            reply.add_answers(chain);
            reply.add_answers(composed.answers().iter().cloned());
            reply.add_authority_records(composed.authority().iter().cloned());
            reply.add_additional_records(composed.additional().iter().cloned());
        }

        self.qlog.append(
            query.client_id(),
            format!(
                "final reply: rcode {}, {} answers",
                reply.rcode(),
                reply.answers().len()
            ),
        );

        vec![Transmit::new(query.client_addr(), reply)]
    }

    /// Terminates a query with SERVFAIL.
    fn fail_query(&self, query: QueryState, reason: &str) -> Vec<Transmit> {
        self.qlog
            .append(query.client_id(), format!("query failed: {reason}"));
        warn!(client = %query.client_addr(), reason, "query failed");

        vec![self.servfail_to(query.client_message(), query.client_addr())]
    }

    /// Builds a SERVFAIL reply to a request.
    fn servfail_to(&self, request: &Message, dest: SocketAddr) -> Transmit {
        let mut reply = Message::response_from(request);
        reply.header_mut().set_recursion_available(true);
        reply.set_rcode(ResponseCode::ServFail);

        Transmit::new(dest, reply)
    }

    // =========================================================================
    // Timer sweep
    // =========================================================================

    /// Resends aged iterative requests and fails queries past their budget.
    ///
    /// Retransmissions reuse the same iterative id so the eventual response
    /// still matches. A query fails once it has spent its full attempt
    /// budget and its last send has aged out; the client gets SERVFAIL.
    pub fn sweep(&mut self, now: Instant) -> Vec<Transmit> {
        let mut out = Vec::new();
        let mut exhausted = Vec::new();

        for (iid, query) in self.table.iter_mut() {
            let elapsed = now.duration_since(query.last_sent());
            if elapsed <= self.config.retransmit_interval {
                continue;
            }

            if query.attempts() <= self.config.attempt_budget {
                self.qlog.append(
                    query.client_id(),
                    format!(
                        "retransmit {} (attempt {})",
                        query.last_server(),
                        query.attempts() + 1
                    ),
                );
                out.push(Transmit::new(
                    query.last_server(),
                    query.last_request().clone(),
                ));
                query.record_retransmit(now);
            } else {
                exhausted.push(*iid);
            }
        }

        for iid in exhausted {
            if let Some(query) = self.table.take(iid) {
                self.table.retire(iid);
                self.qlog
                    .append(query.client_id(), "attempt budget exhausted; SERVFAIL");
                warn!(client = %query.client_addr(), iid, "query timed out");
                out.push(self.servfail_to(query.client_message(), query.client_addr()));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootward_proto::{RecordClass, RecordType, ResourceRecord};
    use rootward_zone::parse_zone_str;
    use std::str::FromStr;
    use std::time::Duration;

    const CLIENT: &str = "127.0.0.1:5555";
    const ROOT_IP: Ipv4Addr = Ipv4Addr::new(10, 9, 9, 9);

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn client() -> SocketAddr {
        CLIENT.parse().unwrap()
    }

    fn upstream(ip: [u8; 4]) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::from(ip)), 60053)
    }

    fn engine_with_zone(zone_text: &str) -> (Engine, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig {
            log_dir: dir.path().to_path_buf(),
            ..ResolverConfig::default()
        };
        let records = parse_zone_str(zone_text).unwrap();
        (Engine::new(ZoneStore::new(records), ROOT_IP, config), dir)
    }

    fn empty_engine() -> (Engine, tempfile::TempDir) {
        engine_with_zone("")
    }

    /// A client request with the given id, qname, qtype, and rd flag.
    fn request(id: u16, qname: &str, qtype: RecordType, rd: bool) -> Vec<u8> {
        let mut msg = Message::query(Question::new(name(qname), qtype, RecordClass::IN));
        msg.set_id(id);
        msg.header_mut().set_recursion_desired(rd);
        msg.to_wire().to_vec()
    }

    /// An upstream response echoing `query` with the given sections.
    fn upstream_response(
        query: &Message,
        aa: bool,
        rcode: ResponseCode,
        answers: Vec<ResourceRecord>,
        authority: Vec<ResourceRecord>,
        additional: Vec<ResourceRecord>,
    ) -> Vec<u8> {
        let mut msg = Message::response_from(query);
        msg.header_mut().set_authoritative(aa);
        msg.set_rcode(rcode);
        msg.add_answers(answers);
        msg.add_authority_records(authority);
        msg.add_additional_records(additional);
        msg.to_wire().to_vec()
    }

    fn a(owner: &str, last: u8) -> ResourceRecord {
        ResourceRecord::a(name(owner), 3600, Ipv4Addr::new(10, 0, 0, last))
    }

    fn ns(owner: &str, target: &str) -> ResourceRecord {
        ResourceRecord::ns(name(owner), 3600, name(target))
    }

    const ZONE: &str = "\
$ORIGIN example.com.
$TTL 3600
@       IN  NS  ns1
@       IN  A   10.0.0.1
ns1     IN  A   10.0.0.53
";

    // =========================================================================
    // Authoritative and cached paths
    // =========================================================================

    #[test]
    fn authoritative_hit() {
        let (mut engine, _dir) = engine_with_zone(ZONE);
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0x1234, "example.com.", RecordType::A, true), now);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());

        let reply = &out[0].message;
        assert_eq!(reply.id(), 0x1234);
        assert!(reply.is_authoritative());
        assert_eq!(reply.rcode(), ResponseCode::NoError);
        assert_eq!(
            reply.answers()[0].rdata().as_a(),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert!(reply.authority().iter().any(|r| r.is_ns()));
    }

    #[test]
    fn authoritative_nxdomain() {
        let (mut engine, _dir) = engine_with_zone(ZONE);
        let now = Instant::now();

        let out = engine.handle_datagram(
            client(),
            &request(0x1235, "missing.example.com.", RecordType::A, true),
            now,
        );

        assert_eq!(out.len(), 1);
        let reply = &out[0].message;
        assert!(reply.is_authoritative());
        assert_eq!(reply.rcode(), ResponseCode::NXDomain);
        assert!(reply.answers().is_empty());
    }

    #[test]
    fn recursion_disabled_gets_servfail() {
        let (mut engine, _dir) = engine_with_zone(ZONE);
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0x7777, "foo.test.", RecordType::A, false), now);

        // One SERVFAIL to the client, no upstream datagram.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert_eq!(out[0].message.rcode(), ResponseCode::ServFail);
        assert_eq!(engine.outstanding(), 0);
    }

    #[test]
    fn non_query_opcode_ignored() {
        let (mut engine, _dir) = engine_with_zone(ZONE);
        let now = Instant::now();

        let mut msg = Message::query(Question::a(name("example.com.")));
        msg.header_mut().opcode = OpCode::Status;

        let out = engine.handle_datagram(client(), &msg.to_wire(), now);
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_datagram_dropped() {
        let (mut engine, _dir) = engine_with_zone(ZONE);

        let out = engine.handle_datagram(client(), &[0xFF, 0x01, 0x02], Instant::now());
        assert!(out.is_empty());
    }

    // =========================================================================
    // Full recursion (referral descent)
    // =========================================================================

    /// Walks a query through root referral, TLD referral, and the
    /// authoritative answer; returns the final client-bound transmits.
    fn run_full_recursion(engine: &mut Engine, client_id: u16, now: Instant) -> Vec<Transmit> {
        let out = engine.handle_datagram(
            client(),
            &request(client_id, "host.ex.tld.", RecordType::A, true),
            now,
        );

        // Iterative question to the root: rd clear, fresh id.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, SocketAddr::new(IpAddr::V4(ROOT_IP), 60053));
        let step1 = &out[0].message;
        assert!(!step1.recursion_desired());
        assert_ne!(step1.id(), client_id);
        assert_eq!(step1.question().unwrap().qname, name("host.ex.tld."));

        // Root refers to the tld server.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                step1,
                false,
                ResponseCode::NoError,
                vec![],
                vec![ns("tld.", "a.tld.")],
                vec![a("a.tld.", 2)],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, upstream([10, 0, 0, 2]));
        let step2 = &out[0].message;
        assert_ne!(step2.id(), step1.id());
        assert_eq!(step2.question().unwrap().qname, name("host.ex.tld."));

        // The tld server refers to the authoritative server.
        let out = engine.handle_datagram(
            upstream([10, 0, 0, 2]),
            &upstream_response(
                step2,
                false,
                ResponseCode::NoError,
                vec![],
                vec![ns("ex.tld.", "ns.ex.tld.")],
                vec![a("ns.ex.tld.", 3)],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, upstream([10, 0, 0, 3]));
        let step3 = &out[0].message;

        // The authoritative server answers.
        engine.handle_datagram(
            upstream([10, 0, 0, 3]),
            &upstream_response(
                step3,
                true,
                ResponseCode::NoError,
                vec![a("host.ex.tld.", 4)],
                vec![],
                vec![],
            ),
            now,
        )
    }

    #[test]
    fn full_recursion_delivers_answer() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = run_full_recursion(&mut engine, 0xAAAA, now);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());

        let reply = &out[0].message;
        assert_eq!(reply.id(), 0xAAAA);
        assert!(!reply.is_authoritative());
        assert!(reply
            .answers()
            .iter()
            .any(|r| r.rdata().as_a() == Some(Ipv4Addr::new(10, 0, 0, 4))));
        assert_eq!(engine.outstanding(), 0);
    }

    #[test]
    fn warm_cache_serves_same_records() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let first = run_full_recursion(&mut engine, 0xAAAA, now);
        let first_answers: Vec<_> = first[0]
            .message
            .answers()
            .iter()
            .filter(|r| r.record_type() == Some(RecordType::A))
            .cloned()
            .collect();

        // Same question again: answered from cache, no upstream traffic.
        let out = engine.handle_datagram(
            client(),
            &request(0xAB01, "host.ex.tld.", RecordType::A, true),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert_eq!(engine.outstanding(), 0);

        let reply = &out[0].message;
        assert_eq!(reply.id(), 0xAB01);
        assert!(!reply.is_authoritative());

        let cached_answers: Vec<_> = reply
            .answers()
            .iter()
            .filter(|r| r.record_type() == Some(RecordType::A))
            .cloned()
            .collect();
        assert_eq!(cached_answers, first_answers);
    }

    #[test]
    fn out_of_zone_records_dropped_and_not_cached() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = engine.handle_datagram(
            client(),
            &request(0xCC01, "host.ex.tld.", RecordType::A, true),
            now,
        );
        let step1 = out[0].message.clone();

        // Referral to the tld, with a poison A record for an unrelated name.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                &step1,
                false,
                ResponseCode::NoError,
                vec![],
                vec![ns("tld.", "a.tld.")],
                vec![a("a.tld.", 2), a("www.evil.org.", 66)],
            ),
            now,
        );
        assert_eq!(out.len(), 1);

        // The poison never reached the cache.
        assert!(engine
            .cache()
            .get(
                &name("www.evil.org."),
                rootward_proto::Type::Known(RecordType::A),
                now
            )
            .is_none());

        // Second referral, entirely out of the active zone (tld.): the
        // filter strips every record and the now-empty response terminates
        // the recursion with an answerless reply.
        let step2 = out[0].message.clone();
        let out = engine.handle_datagram(
            upstream([10, 0, 0, 2]),
            &upstream_response(
                &step2,
                false,
                ResponseCode::NoError,
                vec![],
                vec![ns("example.org.", "ns.example.org.")],
                vec![a("ns.example.org.", 7)],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert!(out[0].message.answers().is_empty());
        assert_eq!(engine.outstanding(), 0);

        // The stripped records never reached the cache either.
        assert!(engine
            .cache()
            .get(
                &name("ns.example.org."),
                rootward_proto::Type::Known(RecordType::A),
                now
            )
            .is_none());
    }

    // =========================================================================
    // CNAME chase
    // =========================================================================

    #[test]
    fn cname_chase_restarts_at_root() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xBBBB, "a.tld.", RecordType::A, true), now);
        let step1 = out[0].message.clone();

        // Authoritative CNAME answer: chase restarts at the root.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                &step1,
                true,
                ResponseCode::NoError,
                vec![ResourceRecord::cname(name("a.tld."), 300, name("b.tld."))],
                vec![],
                vec![],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, SocketAddr::new(IpAddr::V4(ROOT_IP), 60053));
        let step2 = &out[0].message;
        assert_eq!(step2.question().unwrap().qname, name("b.tld."));
        assert_eq!(
            step2.question().unwrap().qtype,
            rootward_proto::Type::Known(RecordType::A)
        );
        assert_ne!(step2.id(), step1.id());

        // Terminal answer for the target.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                step2,
                true,
                ResponseCode::NoError,
                vec![a("b.tld.", 5)],
                vec![],
                vec![],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());

        let reply = &out[0].message;
        assert_eq!(reply.id(), 0xBBBB);

        // Both the chain and the terminal address are in the answer.
        assert!(reply
            .answers()
            .iter()
            .any(|r| r.rdata().as_cname() == Some(&name("b.tld."))));
        assert!(reply
            .answers()
            .iter()
            .any(|r| r.rdata().as_a() == Some(Ipv4Addr::new(10, 0, 0, 5))));
    }

    // =========================================================================
    // Retransmission and timeout
    // =========================================================================

    #[test]
    fn retransmit_reuses_id_single_reply() {
        let (mut engine, _dir) = empty_engine();
        let t0 = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xDD01, "slow.tld.", RecordType::A, true), t0);
        let step1 = out[0].message.clone();

        // Nothing to do before the interval passes.
        assert!(engine.sweep(t0 + Duration::from_millis(500)).is_empty());

        // Past one second: a retransmission with the same id, same server.
        let out = engine.sweep(t0 + Duration::from_millis(1100));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, SocketAddr::new(IpAddr::V4(ROOT_IP), 60053));
        assert_eq!(out[0].message.id(), step1.id());

        // The response to the original send still matches.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                &step1,
                true,
                ResponseCode::NoError,
                vec![a("slow.tld.", 8)],
                vec![],
                vec![],
            ),
            t0 + Duration::from_millis(1200),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert_eq!(engine.outstanding(), 0);

        // The duplicate (answer to the retransmit) is a no-op.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                &step1,
                true,
                ResponseCode::NoError,
                vec![a("slow.tld.", 8)],
                vec![],
                vec![],
            ),
            t0 + Duration::from_millis(1300),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn seven_sends_then_servfail() {
        let (mut engine, _dir) = empty_engine();
        let t0 = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xEE01, "dead.tld.", RecordType::A, true), t0);
        assert_eq!(out.len(), 1);
        let mut upstream_sends = 1;

        let mut t = t0;
        let mut client_replies = Vec::new();

        // Sweep well past the full budget.
        for _ in 0..12 {
            t += Duration::from_millis(1100);
            for transmit in engine.sweep(t) {
                if transmit.dest == client() {
                    client_replies.push(transmit);
                } else {
                    upstream_sends += 1;
                }
            }
        }

        // 1 initial + 6 retransmissions, then exactly one SERVFAIL.
        assert_eq!(upstream_sends, 7);
        assert_eq!(client_replies.len(), 1);
        assert_eq!(client_replies[0].message.rcode(), ResponseCode::ServFail);
        assert_eq!(client_replies[0].message.id(), 0xEE01);
        assert_eq!(engine.outstanding(), 0);

        // Nothing more happens on later sweeps.
        assert!(engine.sweep(t + Duration::from_secs(5)).is_empty());
    }

    // =========================================================================
    // Retirement and unknown ids
    // =========================================================================

    #[test]
    fn retired_id_is_inert() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xF001, "host.ex.tld.", RecordType::A, true), now);
        let step1 = out[0].message.clone();

        let referral = upstream_response(
            &step1,
            false,
            ResponseCode::NoError,
            vec![],
            vec![ns("tld.", "a.tld.")],
            vec![a("a.tld.", 2)],
        );

        let out = engine.handle_datagram(upstream([10, 9, 9, 9]), &referral, now);
        assert_eq!(out.len(), 1);
        let outstanding_before = engine.outstanding();

        // The same referral again: its id is retired, nothing happens.
        let out = engine.handle_datagram(upstream([10, 9, 9, 9]), &referral, now);
        assert!(out.is_empty());
        assert_eq!(engine.outstanding(), outstanding_before);
    }

    #[test]
    fn unknown_id_dropped() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let bogus = Message::response_from(&Message::query(Question::a(name("x.tld."))));
        let out = engine.handle_datagram(upstream([10, 9, 9, 9]), &bogus.to_wire(), now);

        assert!(out.is_empty());
    }

    // =========================================================================
    // Upstream failure paths
    // =========================================================================

    #[test]
    fn upstream_servfail_forwarded() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xF101, "sad.tld.", RecordType::A, true), now);
        let step1 = out[0].message.clone();

        // SERVFAIL carrying a stray record so it skips the empty-response arm.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                &step1,
                false,
                ResponseCode::ServFail,
                vec![a("sad.tld.", 1)],
                vec![],
                vec![],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert_eq!(out[0].message.rcode(), ResponseCode::ServFail);
        assert_eq!(out[0].message.id(), 0xF101);
    }

    #[test]
    fn empty_response_ends_recursion() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xF201, "void.tld.", RecordType::A, true), now);
        let step1 = out[0].message.clone();

        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(&step1, false, ResponseCode::NXDomain, vec![], vec![], vec![]),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert_eq!(out[0].message.id(), 0xF201);
        assert_eq!(out[0].message.rcode(), ResponseCode::NXDomain);
        assert!(out[0].message.answers().is_empty());
        assert_eq!(engine.outstanding(), 0);
    }

    #[test]
    fn referral_without_glue_fails() {
        let (mut engine, _dir) = empty_engine();
        let now = Instant::now();

        let out = engine.handle_datagram(client(), &request(0xF301, "lame.tld.", RecordType::A, true), now);
        let step1 = out[0].message.clone();

        // NS records but no glue addresses at all.
        let out = engine.handle_datagram(
            upstream([10, 9, 9, 9]),
            &upstream_response(
                &step1,
                false,
                ResponseCode::NoError,
                vec![],
                vec![ns("tld.", "a.tld.")],
                vec![],
            ),
            now,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dest, client());
        assert_eq!(out[0].message.rcode(), ResponseCode::ServFail);
    }
}
