//! Interface annotator (§4.8): fold predecessor-router annotations, weighted
//! by observed hop multiplicity, onto the interface they lead to.

use std::collections::HashMap;

use crate::annotate::helpers::max_num;
use crate::external::{As2Org, Bgp};
use crate::graph::Graph;
use crate::shared::{ASN, InterfaceId, RouterId};
use crate::updates::UpdatesStore;

pub fn annotate_interface(graph: &Graph, iid: InterfaceId, rupdates: &UpdatesStore<RouterId>, bgp: &dyn Bgp) -> (ASN, i64) {
    let iface = graph.interface(iid);

    let mut votes: HashMap<ASN, i64> = HashMap::new();
    for (&prouter, &count) in &iface.pred {
        let a = rupdates.asn(prouter);
        if a > 0 {
            *votes.entry(a).or_insert(0) += count as i64;
        }
    }

    let multi_pred = iface.pred.len() > 1;
    let tied = max_num(&votes);

    if tied.len() == 1 {
        return (tied[0], if multi_pred { 1 } else { 0 });
    }

    let related: Vec<ASN> = tied
        .iter()
        .copied()
        .filter(|&x| x == iface.asn || bgp.rel(x, iface.asn))
        .collect();
    let candidates: &[ASN] = if related.is_empty() { &tied } else { &related };

    let chosen = candidates
        .iter()
        .copied()
        .min_by_key(|&x| (x != iface.asn, -(bgp.conesize(x) as i64), x));

    match chosen {
        None => (-2, 2),
        Some(x) => (x, if candidates.len() == 1 && multi_pred { 1 } else { 2 }),
    }
}

/// Driver: annotate every interface with recorded predecessors. Interfaces
/// with a negative own AS -- IXP sentinels included -- are skipped entirely
/// and never appear in `iupdates` (`algorithm.py`'s `if interface.asn >= 0`).
pub fn annotate_interfaces(
    graph: &Graph,
    interfaces: impl Iterator<Item = InterfaceId>,
    iupdates: &mut UpdatesStore<InterfaceId>,
    rupdates: &UpdatesStore<RouterId>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
) {
    for iid in interfaces {
        let iface = graph.interface(iid);
        if iface.asn < 0 {
            continue;
        }
        let (asn, utype_val) = annotate_interface(graph, iid, rupdates, bgp);
        let org = if asn > 0 { as2org.org(asn) } else { asn };
        iupdates.put(iid, asn, org, utype_val);
    }
}
