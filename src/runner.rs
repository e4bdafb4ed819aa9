//! Consumer-facing row rendering (§6 Outputs). Owns a built `Graph` plus
//! external adapters and a `Config`, runs `graph_refinement`, and exposes
//! one row per interface plus a separate IXP-hop table — the same
//! owns-everything, exposes-a-`run` shape as the teacher's `EngineRunner`,
//! minus the SQLite/diagram side effects (out of scope per §1).

use crate::annotate::{AnnotationResult, graph_refinement};
use crate::config::Config;
use crate::external::{As2Org, Bgp, IxpAsns};
use crate::graph::{Graph, Succ};
use crate::shared::{ASN, InterfaceId, OrgId, RouterId, is_ixp};

/// One row per interface, mirroring the `annotation` table's columns (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRow {
    pub addr: String,
    pub router_id: RouterId,
    pub router_name: String,
    pub router_asn: ASN,
    pub router_org: OrgId,
    pub iface_asn: ASN,
    pub iface_org: OrgId,
    pub router_utype: i64,
    pub iface_utype: i64,
    pub echo: bool,
    pub nexthop: bool,
    pub phop: bool,
}

/// One row per IXP hop, mirroring the `ixp` table (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IxpRow {
    pub addr: String,
    pub router_name: String,
    pub router_asn: ASN,
    pub neighbor_router_asn: ASN,
    pub ixp_id: ASN,
    pub nexthop: bool,
}

pub struct InferenceRunner<'a> {
    pub graph: &'a Graph,
    pub bgp: &'a dyn Bgp,
    pub as2org: &'a dyn As2Org,
    pub ixp: &'a dyn IxpAsns,
    pub config: Config,
}

impl<'a> InferenceRunner<'a> {
    pub fn new(graph: &'a Graph, bgp: &'a dyn Bgp, as2org: &'a dyn As2Org, ixp: &'a dyn IxpAsns, config: Config) -> Self {
        InferenceRunner { graph, bgp, as2org, ixp, config }
    }

    /// Validate the config, run the refinement loop to completion, and
    /// return the two annotation stores plus the rendered row views.
    pub fn run(&self) -> Result<(AnnotationResult, Vec<AnnotationRow>, Vec<IxpRow>), crate::shared::ConfigError> {
        self.config.validate()?;
        let result = graph_refinement(self.graph, self.bgp, self.as2org, self.ixp, &self.config);
        let rows = render_rows(self.graph, &result);
        let ixp_rows = render_ixp_rows(self.graph, &result);
        Ok((result, rows, ixp_rows))
    }
}

/// One annotation row per interface (§6): prefers the interface's own
/// annotation when it agrees with the router's organization, else falls
/// back to the interface's raw (address-derived) ASN/org.
pub fn render_rows(graph: &Graph, result: &AnnotationResult) -> Vec<AnnotationRow> {
    let mut rows = Vec::with_capacity(graph.interface_ids().count());
    for iid in graph.interface_ids() {
        let iface = graph.interface(iid);
        let router_id = iface.router;
        let router = graph.router(router_id);

        let r_update = result.rupdates.get(router_id);
        let (rasn, rorg, rtype) = match r_update {
            Some(u) => (u.asn, u.org, u.utype),
            None => (-1, -1, -1),
        };

        let i_update = result.iupdates.get(iid);
        let (iasn, iorg, itype) = match i_update {
            Some(u) if u.org == rorg => (u.asn, u.org, u.utype),
            _ => (iface.asn, iface.org, if i_update.is_none() { -1 } else { 0 }),
        };

        rows.push(AnnotationRow {
            addr: iface.address.clone(),
            router_id,
            router_name: router.name.clone(),
            router_asn: rasn,
            router_org: rorg,
            iface_asn: iasn,
            iface_org: iorg,
            router_utype: rtype,
            iface_utype: itype,
            echo: false,
            nexthop: router.nexthop,
            phop: iface.has_pred(),
        });
    }
    rows
}

/// One row per IXP hop observed at a router's successor set (§6).
pub fn render_ixp_rows(graph: &Graph, result: &AnnotationResult) -> Vec<IxpRow> {
    let mut rows = Vec::new();
    for router_id in graph.routers_with_succ() {
        let router = graph.router(router_id);
        let conn_asn = result.rupdates.asn(router_id);
        for &succ in &router.succ {
            let Succ::Interface(iid) = succ else { continue };
            let iface = graph.interface(iid);
            if !is_ixp(iface.asn) {
                continue;
            }
            let ixp_id = (iface.asn * -1) - 100;
            rows.push(IxpRow {
                addr: iface.address.clone(),
                router_name: router.name.clone(),
                router_asn: conn_asn,
                neighbor_router_asn: result.rupdates.asn(iface.router),
                ixp_id,
                nexthop: router.nexthop,
            });
        }
    }
    rows
}
