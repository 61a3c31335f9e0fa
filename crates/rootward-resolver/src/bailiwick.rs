//! Bailiwick filtering of untrusted responses.
//!
//! A referral from a `.com` server has no business delivering records for
//! `evil.org`. Before a response touches any state, every record whose owner
//! name falls outside the query's active zone is dropped. The check is the
//! minimal suffix comparison; it rejects unrelated records, not on-path
//! forgery.

use rootward_proto::{Message, Name, ResourceRecord};
use tracing::debug;

/// Returns true if `name` is inside the bailiwick of `zone`: equal to it or
/// ending with it, case-insensitively and label-aligned.
pub fn in_bailiwick(name: &Name, zone: &Name) -> bool {
    name == zone || name.is_subdomain_of(zone)
}

/// The result of filtering a response against an active zone.
#[derive(Debug)]
pub struct Filtered {
    /// The response with only in-zone records remaining.
    pub message: Message,
    /// The records that were dropped.
    pub dropped: Vec<ResourceRecord>,
}

/// Filters a response against the active zone.
///
/// The answer, authority, and additional sections are filtered
/// independently; the header and question are preserved.
pub fn filter_response(response: &Message, zone: &Name) -> Filtered {
    let mut message = Message::new(response.header().clone());
    for question in response.questions() {
        message.add_question(question.clone());
    }

    let mut dropped = Vec::new();

    let mut keep = |record: &ResourceRecord| {
        if in_bailiwick(record.name(), zone) {
            true
        } else {
            debug!(record = %record, zone = %zone, "dropping out-of-bailiwick record");
            dropped.push(record.clone());
            false
        }
    };

    message.add_answers(response.answers().iter().filter(|&r| keep(r)).cloned());
    message.add_authority_records(response.authority().iter().filter(|&r| keep(r)).cloned());
    message.add_additional_records(response.additional().iter().filter(|&r| keep(r)).cloned());

    Filtered { message, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootward_proto::Question;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn test_in_bailiwick() {
        let zone = name("com.");

        assert!(in_bailiwick(&name("com."), &zone));
        assert!(in_bailiwick(&name("example.com."), &zone));
        assert!(in_bailiwick(&name("NS1.EXAMPLE.COM."), &zone));
        assert!(!in_bailiwick(&name("evil.org."), &zone));
        assert!(!in_bailiwick(&name("notcom."), &zone));

        // Everything is inside the root's bailiwick.
        assert!(in_bailiwick(&name("anything.at.all."), &Name::root()));
    }

    #[test]
    fn test_filter_drops_out_of_zone_records() {
        let query = Message::query(Question::a(name("host.example.com")));
        let mut response = Message::response_from(&query);
        response.add_answer(ResourceRecord::a(
            name("host.example.com"),
            60,
            Ipv4Addr::new(10, 0, 0, 1),
        ));
        response.add_authority(ResourceRecord::ns(
            name("example.com"),
            60,
            name("ns1.example.com"),
        ));
        response.add_additional(ResourceRecord::a(
            name("ns1.example.com"),
            60,
            Ipv4Addr::new(10, 0, 0, 53),
        ));
        // Poison attempt: an A record for an unrelated domain.
        response.add_additional(ResourceRecord::a(
            name("www.evil.org"),
            60,
            Ipv4Addr::new(6, 6, 6, 6),
        ));

        let filtered = filter_response(&response, &name("com."));

        assert_eq!(filtered.message.answers().len(), 1);
        assert_eq!(filtered.message.authority().len(), 1);
        assert_eq!(filtered.message.additional().len(), 1);
        assert_eq!(filtered.dropped.len(), 1);
        assert_eq!(filtered.dropped[0].name(), &name("www.evil.org"));
    }

    #[test]
    fn test_filter_preserves_header_and_question() {
        let query = Message::query(Question::a(name("host.example.com")));
        let mut response = Message::response_from(&query);
        response.header_mut().set_authoritative(true);

        let filtered = filter_response(&response, &Name::root());

        assert_eq!(filtered.message.id(), response.id());
        assert!(filtered.message.is_authoritative());
        assert_eq!(filtered.message.question(), response.question());
        assert!(filtered.dropped.is_empty());
    }
}
