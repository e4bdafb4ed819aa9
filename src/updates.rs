//! Double-buffered annotation store (§4.1). Each refinement pass writes into
//! a "current" buffer while readers see the "advanced" snapshot from the
//! previous pass; `advance()` promotes current into advanced. This is the
//! same before/after split the teacher's engine uses between a round's
//! announcement batch and the RIB it's compared against, generalized to a
//! generic key so the same type serves both routers and interfaces.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::shared::{ASN, OrgId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub asn: ASN,
    pub org: OrgId,
    pub utype: i64,
}

impl Update {
    pub fn new(asn: ASN, org: OrgId, utype: i64) -> Self {
        Update { asn, org, utype }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdatesStore<K: Eq + Hash + Copy> {
    advanced: HashMap<K, Update>,
    current: HashMap<K, Update>,
    changed: HashSet<K>,
}

impl<K: Eq + Hash + Copy> UpdatesStore<K> {
    pub fn new() -> Self {
        UpdatesStore {
            advanced: HashMap::new(),
            current: HashMap::new(),
            changed: HashSet::new(),
        }
    }

    /// Advanced annotation for `key`, or `None` if never annotated.
    pub fn get(&self, key: K) -> Option<Update> {
        self.advanced.get(&key).copied()
    }

    /// Annotated ASN for `key`, or `-1` (§4.1 "abstain"/unknown) if none.
    pub fn asn(&self, key: K) -> ASN {
        self.advanced.get(&key).map(|u| u.asn).unwrap_or(-1)
    }

    /// Write `key`'s annotation into the current buffer. Dropped (no-op) if
    /// `(asn, utype)` already equals the advanced value — `org` does not
    /// gate the drop, since it's derived from `asn` and carries no signal of
    /// its own (§9 design note).
    pub fn put(&mut self, key: K, asn: ASN, org: OrgId, utype: i64) {
        if let Some(existing) = self.advanced.get(&key) {
            if existing.asn == asn && existing.utype == utype {
                return;
            }
        }
        self.current.insert(key, Update::new(asn, org, utype));
        self.changed.insert(key);
    }

    /// Write straight into the advanced snapshot, bypassing the current
    /// buffer and the equality check — for annotators with no subsequent
    /// `advance()` in the same pass (last-hop, VRF/forwarding).
    pub fn put_direct(&mut self, key: K, asn: ASN, org: OrgId, utype: i64) {
        self.advanced.insert(key, Update::new(asn, org, utype));
    }

    /// Merge current into advanced, clear the change set, empty current.
    pub fn advance(&mut self) {
        for (key, update) in self.current.drain() {
            self.advanced.insert(key, update);
        }
        self.changed.clear();
    }

    /// Keys whose current value differs from advanced (set since the last
    /// `advance()`).
    pub fn changes(&self) -> &HashSet<K> {
        &self.changed
    }

    pub fn is_empty(&self) -> bool {
        self.advanced.is_empty() && self.current.is_empty()
    }

    /// Clone of the advanced snapshot, for the refinement driver's
    /// fixed-point/cycle detection (§4.10, §8 Determinism/Termination).
    pub fn snapshot(&self) -> HashMap<K, Update> {
        self.advanced.clone()
    }
}
