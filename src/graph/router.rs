use std::collections::{HashMap, HashSet};

use crate::shared::{ASN, InterfaceId, RouterId};

/// How a VRF successor edge was derived from forwarding-table preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VType {
    ToForward,
    Forwarding,
    Both,
}

impl VType {
    /// Combine two observed vtypes for the same router -> edges that
    /// disagree collapse to `Both`, matching the Python `vrf_heuristics`
    /// loop's running `vtype` accumulator.
    pub fn merge(self, other: VType) -> VType {
        if self == other { self } else { VType::Both }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VrfEdge {
    pub target: RouterId,
    pub vtype: VType,
}

/// A router's successor: either a directly observed next-hop interface, or
/// (for VRF routers) an edge synthesized from forwarding-table analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Succ {
    Interface(InterfaceId),
    Vrf(VrfEdge),
}

impl Succ {
    pub fn as_vrf(&self) -> Option<VrfEdge> {
        match self {
            Succ::Vrf(edge) => Some(*edge),
            Succ::Interface(_) => None,
        }
    }

    pub fn as_interface(&self) -> Option<InterfaceId> {
        match self {
            Succ::Interface(id) => Some(*id),
            Succ::Vrf(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouterData {
    pub name: String,
    pub interfaces: Vec<InterfaceId>,
    pub succ: Vec<Succ>,
    /// For each successor, the origin ASes observed at interfaces on *this*
    /// router before that successor was reached.
    pub origins: HashMap<Succ, HashSet<ASN>>,
    pub dests: HashSet<ASN>,
    pub nexthop: bool,
    pub vrf: bool,
    pub hints: Option<HashSet<ASN>>,
}

impl RouterData {
    pub fn new(name: String) -> Self {
        RouterData {
            name,
            interfaces: Vec::new(),
            succ: Vec::new(),
            origins: HashMap::new(),
            dests: HashSet::new(),
            nexthop: false,
            vrf: false,
            hints: None,
        }
    }

    /// Record an edge from `origin_asn` (the AS seen at the interface this
    /// edge departs from) to `succ`, creating the edge on first sight.
    pub fn add_succ(&mut self, succ: Succ, origin_asn: ASN) {
        if !self.origins.contains_key(&succ) {
            self.succ.push(succ);
        }
        self.origins.entry(succ).or_default().insert(origin_asn);
    }

    pub fn has_succ(&self) -> bool {
        !self.succ.is_empty()
    }
}
