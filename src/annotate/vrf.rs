//! VRF router annotator (§4.7). VRF-flagged routers have `VrfEdge`
//! successors instead of interfaces; a direct traceroute hop relayed
//! through a non-VRF successor is trusted over a same-VRF neighbor's own
//! (possibly still-uncertain) annotation.

use std::collections::{HashMap, HashSet};

use crate::annotate::helpers::{max_num, rel_or_same_org};
use crate::config::Config;
use crate::external::{As2Org, Bgp};
use crate::graph::{Graph, Succ, VType, VrfEdge};
use crate::shared::{ASN, RouterId, utype};
use crate::updates::UpdatesStore;

fn vrf_heuristics(graph: &Graph, target: RouterId, origin_asns: &HashSet<ASN>, rupdates: &UpdatesStore<RouterId>) -> ASN {
    let target_router = graph.router(target);
    for &iid in &target_router.interfaces {
        let iface = graph.interface(iid);
        if iface.asn > 0 && origin_asns.contains(&iface.asn) {
            return iface.asn;
        }
    }
    rupdates.asn(target)
}

pub fn annotate_router_vrf(
    graph: &Graph,
    router_id: RouterId,
    rupdates: &UpdatesStore<RouterId>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    _config: &Config,
) -> (ASN, i64) {
    let router = graph.router(router_id);

    let mut origin_counts: HashMap<ASN, i64> = HashMap::new();
    for &iid in &router.interfaces {
        let iface = graph.interface(iid);
        if iface.asn > 0 {
            *origin_counts.entry(iface.asn).or_insert(0) += 1;
        }
    }
    let origin_asns: HashSet<ASN> = origin_counts.keys().copied().collect();

    let mut succs: HashMap<ASN, i64> = HashMap::new();
    let mut nonvrf: HashMap<ASN, i64> = HashMap::new();
    let mut vtypes: HashSet<VType> = HashSet::new();
    for &succ in &router.succ {
        let Succ::Vrf(edge) = succ else { continue };
        vtypes.insert(edge.vtype);
        let candidate = vrf_heuristics(graph, edge.target, &origin_asns, rupdates);
        if candidate <= 0 {
            continue;
        }
        if graph.router(edge.target).vrf {
            *succs.entry(candidate).or_insert(0) += 1;
        } else {
            *nonvrf.entry(candidate).or_insert(0) += 1;
        }
    }

    let using_nonvrf = !nonvrf.is_empty();
    let votes: HashMap<ASN, i64> = if using_nonvrf {
        nonvrf
    } else {
        let mut merged = succs.clone();
        for (&o, &c) in &origin_counts {
            *merged.entry(o).or_insert(0) += c;
        }
        merged
    };

    let total: i64 = votes.values().sum();
    if let Some((&top, &top_v)) = votes.iter().max_by_key(|&(&a, &v)| (v, -a)) {
        if total > 0 && (top_v as f64) >= 0.75 * (total as f64) {
            return finish(top, utype::VOTE_SINGLE, using_nonvrf);
        }
    }

    let votes_rels: HashSet<ASN> = votes
        .keys()
        .copied()
        .filter(|&v| origin_asns.contains(&v) || origin_asns.iter().any(|&o| rel_or_same_org(v, o, bgp, as2org)))
        .collect();

    let (tally, landslide) = if votes_rels.len() < 2 {
        (votes.clone(), None)
    } else {
        let mut folded: HashMap<ASN, i64> = HashMap::new();
        let mut unrelated: HashMap<ASN, i64> = HashMap::new();
        for (&v, &c) in &votes {
            if votes_rels.contains(&v) {
                *folded.entry(v).or_insert(0) += c;
            } else {
                *unrelated.entry(v).or_insert(0) += c;
                if let Some(&target) = votes_rels.iter().find(|&&r| as2org.org(r) == as2org.org(v)) {
                    *folded.entry(target).or_insert(0) += c;
                }
            }
        }
        let best_related = folded.iter().max_by_key(|&(&a, &v)| (v, -a)).map(|(&k, &v)| (k, v));
        let best_unrelated = unrelated.iter().max_by_key(|&(&a, &v)| (v, -a)).map(|(&k, &v)| (k, v));
        let landslide = if router.nexthop {
            match (best_related, best_unrelated) {
                (Some((_, rv)), Some((uu, uv))) if (uv as f64) > 4.0 * (rv as f64) => Some(uu),
                _ => None,
            }
        } else {
            None
        };
        (folded, landslide)
    };

    if let Some(a) = landslide {
        return finish(a, utype::VRF_LANDSLIDE_BIT, using_nonvrf);
    }

    let tied = max_num(&tally);
    if tied.len() == 1 {
        return finish(tied[0], utype::VOTE_SINGLE, using_nonvrf);
    }

    let all_forwarding = !vtypes.is_empty() && vtypes.iter().all(|&v| v == VType::Forwarding);
    let chosen = if all_forwarding {
        *tied.iter().max_by_key(|&&x| (bgp.conesize(x) as i64, x)).unwrap()
    } else {
        *tied.iter().min_by_key(|&&x| (bgp.conesize(x) as i64, -x)).unwrap()
    };
    finish(chosen, utype::VOTE_TIE, using_nonvrf)
}

fn finish(asn: ASN, utype_val: i64, using_nonvrf: bool) -> (ASN, i64) {
    if using_nonvrf {
        (asn, utype_val + utype::VRF_NONVRF_BIT)
    } else {
        (asn, utype_val)
    }
}


/// Driver: annotate every VRF-flagged router, writing straight into the
/// advanced snapshot (no `advance()` follows in the same pass).
pub fn annotate_vrf_routers(
    graph: &Graph,
    routers: impl Iterator<Item = RouterId>,
    rupdates: &mut UpdatesStore<RouterId>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    config: &Config,
) {
    let ids: Vec<RouterId> = routers.collect();
    for router_id in ids {
        let (asn, utype_val) = annotate_router_vrf(graph, router_id, rupdates, bgp, as2org, config);
        let org = if asn > 0 { as2org.org(asn) } else { asn };
        rupdates.put_direct(router_id, asn, org, utype_val);
    }
}
