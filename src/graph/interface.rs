use std::collections::{HashMap, HashSet};

use crate::shared::{ASN, OrgId, RouterId};

/// One traceroute-observed interface address.
///
/// Owned by its `Router` (by `InterfaceId`, via the arena in `Graph`); holds
/// only a lookup back-reference to that router, never an ownership edge.
#[derive(Debug, Clone)]
pub struct InterfaceData {
    pub address: String,
    pub asn: ASN,
    pub org: OrgId,
    pub mpls: bool,
    pub vrf: bool,
    /// Predecessor router -> number of traceroute hops observed arriving here.
    pub pred: HashMap<RouterId, u32>,
    pub dests: HashSet<ASN>,
    pub hint: Option<ASN>,
    pub router: RouterId,
}

impl InterfaceData {
    pub fn new(address: String, asn: ASN, org: OrgId, router: RouterId) -> Self {
        InterfaceData {
            address,
            asn,
            org,
            mpls: false,
            vrf: false,
            pred: HashMap::new(),
            dests: HashSet::new(),
            hint: None,
            router,
        }
    }

    pub fn has_pred(&self) -> bool {
        !self.pred.is_empty()
    }
}
