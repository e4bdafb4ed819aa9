//! Arena-based graph model (§3). A `Graph` owns every `Router` and
//! `Interface`; everything else refers to them by the small integer id
//! newtypes `RouterId`/`InterfaceId` rather than by reference, following the
//! owning-`HashMap`/`Vec` arena style of `as_graphs/as_graph/as_graph.rs`
//! rather than the raw-pointer/`unsafe` lifetime trick in the older
//! `as_graph.rs` variant.

pub mod interface;
pub mod router;

pub use interface::InterfaceData;
pub use router::{RouterData, Succ, VType, VrfEdge};

use std::collections::HashMap;

use crate::shared::{ASN, InterfaceId, OrgId, RouterId};

#[derive(Debug, Clone, Default)]
pub struct Graph {
    interfaces: Vec<InterfaceData>,
    routers: Vec<RouterData>,
    /// Address -> interface id, for construction-time lookups.
    by_address: HashMap<String, InterfaceId>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn new_router(&mut self, name: impl Into<String>) -> RouterId {
        let id = RouterId(self.routers.len());
        self.routers.push(RouterData::new(name.into()));
        id
    }

    pub fn add_interface(
        &mut self,
        router: RouterId,
        address: impl Into<String>,
        asn: ASN,
        org: OrgId,
    ) -> InterfaceId {
        let address = address.into();
        let id = InterfaceId(self.interfaces.len());
        self.interfaces
            .push(InterfaceData::new(address.clone(), asn, org, router));
        self.routers[router.0].interfaces.push(id);
        self.by_address.insert(address, id);
        id
    }

    pub fn interface_by_address(&self, address: &str) -> Option<InterfaceId> {
        self.by_address.get(address).copied()
    }

    pub fn router(&self, id: RouterId) -> &RouterData {
        &self.routers[id.0]
    }

    pub fn router_mut(&mut self, id: RouterId) -> &mut RouterData {
        &mut self.routers[id.0]
    }

    pub fn interface(&self, id: InterfaceId) -> &InterfaceData {
        &self.interfaces[id.0]
    }

    pub fn interface_mut(&mut self, id: InterfaceId) -> &mut InterfaceData {
        &mut self.interfaces[id.0]
    }

    pub fn router_ids(&self) -> impl Iterator<Item = RouterId> + '_ {
        (0..self.routers.len()).map(RouterId)
    }

    pub fn interface_ids(&self) -> impl Iterator<Item = InterfaceId> + '_ {
        (0..self.interfaces.len()).map(InterfaceId)
    }

    pub fn routers_with_succ(&self) -> impl Iterator<Item = RouterId> + '_ {
        self.router_ids().filter(move |&r| {
            let router = self.router(r);
            router.has_succ() && !router.vrf
        })
    }

    pub fn vrf_routers(&self) -> impl Iterator<Item = RouterId> + '_ {
        self.router_ids()
            .filter(move |&r| self.router(r).has_succ() && self.router(r).vrf)
    }

    pub fn lasthop_routers(&self) -> impl Iterator<Item = RouterId> + '_ {
        self.router_ids()
            .filter(move |&r| !self.router(r).has_succ())
    }

    pub fn interfaces_with_pred(&self) -> impl Iterator<Item = InterfaceId> + '_ {
        self.interface_ids()
            .filter(move |&i| self.interface(i).has_pred())
    }

    /// Record an edge `from_interface -> succ` on `from_interface`'s router.
    pub fn add_succ(&mut self, from_interface: InterfaceId, succ: Succ) {
        let router = self.interface(from_interface).router;
        let origin_asn = self.interface(from_interface).asn;
        self.router_mut(router).add_succ(succ, origin_asn);
    }

    /// Record that `prouter` was observed immediately before `interface`.
    pub fn add_pred(&mut self, interface: InterfaceId, prouter: RouterId) {
        *self
            .interface_mut(interface)
            .pred
            .entry(prouter)
            .or_insert(0) += 1;
    }

    /// Check the non-VRF/VRF successor-kind invariant from §3. Building a
    /// router with a mixed successor set, or a VRF-flagged router whose
    /// successors aren't all `Succ::Vrf`, is a programmer error and panics
    /// per §7 ("Programmer error" is fatal, not recoverable).
    pub fn validate(&self) {
        for router in &self.routers {
            if router.interfaces.is_empty() {
                panic!("router {:?} owns no interfaces", router.name);
            }
            if router.succ.is_empty() {
                continue;
            }
            let all_vrf = router.succ.iter().all(|s| s.as_vrf().is_some());
            let all_iface = router.succ.iter().all(|s| s.as_interface().is_some());
            if router.vrf && !all_vrf {
                panic!(
                    "router {:?} is flagged vrf but has non-Vrf successors",
                    router.name
                );
            }
            if !router.vrf && !all_iface {
                panic!(
                    "router {:?} is not flagged vrf but has Vrf successors",
                    router.name
                );
            }
        }
    }

    /// Populate `router.dests` from each interface's own destination-AS set,
    /// discarding a likely-relocated-prefix false destination at last-hop
    /// interfaces (§4.6).
    pub fn set_dests(&mut self, bgp: &dyn crate::external::bgp::Bgp) {
        let router_ids: Vec<RouterId> = self.router_ids().collect();
        for rid in router_ids {
            let is_lasthop = !self.router(rid).has_succ();
            let iface_ids = self.router(rid).interfaces.clone();
            let mut dests_to_add: Vec<ASN> = Vec::new();
            for iid in iface_ids {
                let iface = self.interface(iid);
                let mut idests: std::collections::HashSet<ASN> = iface.dests.clone();
                if is_lasthop && !idests.is_empty() && iface.asn > 0 {
                    let origin = iface.asn;
                    if idests.len() == 2 && idests.contains(&origin) {
                        let other = *idests.iter().find(|&&a| a != origin).unwrap();
                        if bgp.conesize(origin) > bgp.conesize(other) && bgp.conesize(other) < 5 {
                            idests.remove(&origin);
                        }
                    }
                }
                dests_to_add.extend(idests);
            }
            self.router_mut(rid).dests.extend(dests_to_add);
        }
    }
}
