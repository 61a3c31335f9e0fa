//! Response composition.
//!
//! Builds the answer, authority, and additional sections of a reply from a
//! pool of records: the zone store for authoritative answers, the cache for
//! everything else. The composer only selects and arranges records; response
//! codes are the caller's business.

use rootward_proto::{Message, Name, Question, RecordType, ResourceRecord};

/// Composes a reply to `request` from `pool`.
///
/// Sections are filled as follows:
///
/// - **Answer**: every pool record whose owner and type match the question.
///   In authoritative mode a CNAME at the question name also answers, along
///   with the pool records at its target.
/// - **Authority**: skipped for NS questions. Otherwise the question name
///   is walked suffix by suffix and the first suffix owning NS records in
///   the pool contributes all of them (the closest enclosing delegation).
///   The root name never appears in authority.
/// - **Additional**: target addresses for every NS answer, and for CNAME
///   answers when not authoritative.
///
/// The aa bit follows `authoritative`; ra is always set, this server
/// recurses.
pub fn compose_response(request: &Message, pool: &[ResourceRecord], authoritative: bool) -> Message {
    let mut response = Message::response_from(request);
    response.header_mut().set_authoritative(authoritative);
    response.header_mut().set_recursion_available(true);

    let Some(question) = request.question() else {
        return response;
    };

    let answers = select_answers(question, pool, authoritative);
    let authority = select_authority(question, pool);
    let additional = select_additional(&answers, pool, authoritative);

    response.add_answers(answers);
    response.add_authority_records(authority);
    response.add_additional_records(additional);

    response
}

/// Selects the answer section for a question.
fn select_answers(
    question: &Question,
    pool: &[ResourceRecord],
    authoritative: bool,
) -> Vec<ResourceRecord> {
    let mut answers: Vec<ResourceRecord> = pool
        .iter()
        .filter(|r| r.name() == &question.qname && r.rtype() == question.qtype)
        .cloned()
        .collect();

    if authoritative {
        // A CNAME at the question name answers any question type, and drags
        // the records at its target along with it.
        let cnames: Vec<&ResourceRecord> = pool
            .iter()
            .filter(|r| r.name() == &question.qname && r.is_cname() && r.rtype() != question.qtype)
            .collect();

        for cname in cnames {
            answers.push(cname.clone());

            if let Some(target) = cname.rdata().as_cname() {
                answers.extend(
                    pool.iter()
                        .filter(|r| r.name() == target && !r.is_cname())
                        .cloned(),
                );
            }
        }
    }

    answers
}

/// Selects the authority section: NS records of the closest enclosing
/// delegation of the question name.
fn select_authority(question: &Question, pool: &[ResourceRecord]) -> Vec<ResourceRecord> {
    if question.record_type() == Some(RecordType::NS) {
        return Vec::new();
    }

    let mut suffix = Some(question.qname.clone());

    while let Some(current) = suffix {
        if current.is_root() {
            break;
        }

        let ns_records: Vec<ResourceRecord> = pool
            .iter()
            .filter(|r| r.is_ns() && r.name() == &current)
            .cloned()
            .collect();

        if !ns_records.is_empty() {
            return ns_records;
        }

        suffix = current.parent();
    }

    Vec::new()
}

/// Selects the additional section: addresses for the targets the answer
/// section points at.
fn select_additional(
    answers: &[ResourceRecord],
    pool: &[ResourceRecord],
    authoritative: bool,
) -> Vec<ResourceRecord> {
    let mut additional = Vec::new();

    for answer in answers {
        let follow = answer.is_ns() || (answer.is_cname() && !authoritative);
        if !follow {
            continue;
        }

        let Some(target) = answer.rdata().target_name() else {
            continue;
        };

        additional.extend(glue_for(target, pool));
    }

    additional
}

/// Returns the A records at `target`.
fn glue_for(target: &Name, pool: &[ResourceRecord]) -> Vec<ResourceRecord> {
    pool.iter()
        .filter(|r| r.record_type() == Some(RecordType::A) && r.name() == target)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn a(owner: &str, last: u8) -> ResourceRecord {
        ResourceRecord::a(name(owner), 3600, Ipv4Addr::new(10, 0, 0, last))
    }

    fn ns(owner: &str, target: &str) -> ResourceRecord {
        ResourceRecord::ns(name(owner), 3600, name(target))
    }

    fn cname(owner: &str, target: &str) -> ResourceRecord {
        ResourceRecord::cname(name(owner), 3600, name(target))
    }

    #[test]
    fn test_exact_match_answer() {
        let pool = vec![a("example.com", 1), a("other.com", 2)];
        let request = Message::query(Question::a(name("example.com")));

        let response = compose_response(&request, &pool, true);

        assert_eq!(response.answers().len(), 1);
        assert_eq!(
            response.answers()[0].rdata().as_a(),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert!(response.is_authoritative());
        assert!(response.header().recursion_available());
        assert_eq!(response.id(), request.id());
    }

    #[test]
    fn test_authoritative_cname_expansion() {
        let pool = vec![cname("www.example.com", "example.com"), a("example.com", 1)];
        let request = Message::query(Question::a(name("www.example.com")));

        let response = compose_response(&request, &pool, true);

        // The CNAME and its target's address both answer.
        assert_eq!(response.answers().len(), 2);
        assert!(response.answers()[0].is_cname());
        assert_eq!(
            response.answers()[1].rdata().as_a(),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
    }

    #[test]
    fn test_cname_not_expanded_when_not_authoritative() {
        let pool = vec![cname("www.example.com", "example.com"), a("example.com", 1)];
        let request = Message::query(Question::a(name("www.example.com")));

        let response = compose_response(&request, &pool, false);
        assert!(response.answers().is_empty());
        assert!(!response.is_authoritative());
    }

    #[test]
    fn test_authority_closest_enclosing_delegation() {
        let pool = vec![
            a("host.sub.example.com", 1),
            ns("example.com", "ns1.example.com"),
            ns("com", "a.gtld.net"),
        ];
        let request = Message::query(Question::a(name("host.sub.example.com")));

        let response = compose_response(&request, &pool, true);

        // The walk stops at example.com, the first suffix with NS records;
        // the com delegation does not appear.
        assert_eq!(response.authority().len(), 1);
        assert_eq!(response.authority()[0].name(), &name("example.com"));
    }

    #[test]
    fn test_authority_includes_question_name_itself() {
        let pool = vec![a("example.com", 1), ns("example.com", "ns1.example.com")];
        let request = Message::query(Question::a(name("example.com")));

        let response = compose_response(&request, &pool, true);
        assert_eq!(response.authority().len(), 1);
    }

    #[test]
    fn test_no_authority_for_ns_question() {
        let pool = vec![ns("example.com", "ns1.example.com")];
        let request = Message::query(Question::new(
            name("example.com"),
            RecordType::NS,
            rootward_proto::RecordClass::IN,
        ));

        let response = compose_response(&request, &pool, true);

        assert_eq!(response.answers().len(), 1);
        assert!(response.authority().is_empty());
    }

    #[test]
    fn test_additional_carries_ns_glue() {
        let pool = vec![
            ns("example.com", "ns1.example.com"),
            a("ns1.example.com", 53),
        ];
        let request = Message::query(Question::new(
            name("example.com"),
            RecordType::NS,
            rootward_proto::RecordClass::IN,
        ));

        let response = compose_response(&request, &pool, true);

        assert_eq!(response.additional().len(), 1);
        assert_eq!(response.additional()[0].name(), &name("ns1.example.com"));
    }

    #[test]
    fn test_empty_pool_empty_answer() {
        let request = Message::query(Question::a(name("missing.example.com")));
        let response = compose_response(&request, &[], true);

        assert!(response.answers().is_empty());
        assert!(response.authority().is_empty());
        assert!(response.additional().is_empty());
    }
}
