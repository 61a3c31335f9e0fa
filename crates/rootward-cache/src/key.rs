//! Cache key implementation.

use rootward_proto::{Name, Question, Type};
use std::hash::{Hash, Hasher};

/// Cache key for DNS records: (lowercased owner name, type).
#[derive(Debug, Clone, Eq)]
pub struct CacheKey {
    /// Domain name (lowercased for lookup).
    name: Name,

    /// Record type.
    rtype: Type,
}

impl CacheKey {
    /// Creates a new cache key.
    pub fn new(name: &Name, rtype: Type) -> Self {
        Self {
            name: name.lowercased(),
            rtype,
        }
    }

    /// Creates a cache key from a question.
    pub fn from_question(question: &Question) -> Self {
        Self::new(&question.qname, question.qtype)
    }

    /// Returns the domain name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Type {
        self.rtype
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.rtype == other.rtype
    }
}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.rtype.to_u16().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootward_proto::RecordType;
    use std::str::FromStr;

    #[test]
    fn test_cache_key_case_insensitive() {
        let key1 = CacheKey::new(
            &Name::from_str("example.com").unwrap(),
            Type::Known(RecordType::A),
        );
        let key2 = CacheKey::new(
            &Name::from_str("EXAMPLE.COM").unwrap(),
            Type::Known(RecordType::A),
        );

        assert_eq!(key1, key2);
    }

    #[test]
    fn test_cache_key_type_distinguishes() {
        let name = Name::from_str("example.com").unwrap();
        let a = CacheKey::new(&name, Type::Known(RecordType::A));
        let ns = CacheKey::new(&name, Type::Known(RecordType::NS));

        assert_ne!(a, ns);
    }
}
