//! Outstanding-query table.
//!
//! UDP has no connection identity, so responses are correlated with queries
//! through the iterative transaction id alone. Every outstanding id lives in
//! exactly one of two places: the active table, or the retired set. A
//! retired id silences late duplicates (a retransmit's original answer
//! arriving after the query already advanced).

use crate::query::QueryState;
use std::collections::{HashMap, HashSet, VecDeque};

/// How many retired ids to remember.
///
/// Old ids are evicted first-in-first-out once the bound is reached; ample
/// for the short-lived processes this server is meant for.
const RETIRED_CAPACITY: usize = 4096;

/// Table of outstanding recursive queries keyed by iterative id.
#[derive(Debug, Default)]
pub struct QueryTable {
    /// Active queries by iterative transaction id.
    active: HashMap<u16, QueryState>,
    /// Ids whose query has advanced or terminated.
    retired: HashSet<u16>,
    /// Retirement order, for eviction.
    retired_order: VecDeque<u16>,
}

impl QueryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a fresh iterative id: random, and unused by both the active
    /// table and the retired set.
    pub fn fresh_id(&self) -> u16 {
        loop {
            let id = rand::random::<u16>();
            if !self.active.contains_key(&id) && !self.retired.contains(&id) {
                return id;
            }
        }
    }

    /// Inserts a query under an iterative id.
    pub fn insert(&mut self, iid: u16, query: QueryState) {
        self.active.insert(iid, query);
    }

    /// Removes and returns the query under an iterative id.
    pub fn take(&mut self, iid: u16) -> Option<QueryState> {
        self.active.remove(&iid)
    }

    /// Returns true if the id has an active query.
    pub fn contains(&self, iid: u16) -> bool {
        self.active.contains_key(&iid)
    }

    /// Returns an iterator over the active queries.
    pub fn values(&self) -> impl Iterator<Item = &QueryState> {
        self.active.values()
    }

    /// Returns a mutable iterator over (id, query) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&u16, &mut QueryState)> {
        self.active.iter_mut()
    }

    /// Returns the active ids.
    pub fn ids(&self) -> Vec<u16> {
        self.active.keys().copied().collect()
    }

    /// Moves an id into the retired set.
    pub fn retire(&mut self, iid: u16) {
        if self.retired.insert(iid) {
            self.retired_order.push_back(iid);
            if self.retired_order.len() > RETIRED_CAPACITY {
                if let Some(evicted) = self.retired_order.pop_front() {
                    self.retired.remove(&evicted);
                }
            }
        }
    }

    /// Returns true if the id has been retired.
    pub fn is_retired(&self, iid: u16) -> bool {
        self.retired.contains(&iid)
    }

    /// Returns the number of active queries.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns true if no queries are active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
