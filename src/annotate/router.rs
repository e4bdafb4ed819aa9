//! Router annotator (§4.4-4.5): the core vote-fusion heuristic. For every
//! router with at least one successor, gather a candidate ASN from each
//! successor hop, fuse them with the router's own origin evidence, and
//! settle ties deterministically.

use std::collections::{HashMap, HashSet};

use crate::annotate::helpers::{any_rels, isnorelpeer, max_num, multi_customers, rel_or_same_org};
use crate::annotate::hidden::hidden_asn;
use crate::annotate::hints::router_hint;
use crate::annotate::lasthop::annotate_lasthop;
use crate::config::Config;
use crate::external::{As2Org, Bgp, IxpAsns};
use crate::graph::{Graph, Succ};
use crate::shared::{ASN, InterfaceId, OrgId, RouterId, is_ixp, utype};
use crate::updates::UpdatesStore;

/// One successor's candidate contribution (§4.4). `-1` means abstain.
#[allow(clippy::too_many_arguments)]
fn router_heuristics(
    graph: &Graph,
    iface_id: InterfaceId,
    rupdates: &UpdatesStore<RouterId>,
    origin_asns: &HashSet<ASN>,
    origin_orgs: &HashSet<OrgId>,
    dests: &HashSet<ASN>,
    rasn_prev: ASN,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    ixp: &dyn IxpAsns,
    skipua: bool,
) -> ASN {
    let iface = graph.interface(iface_id);
    let s_asn = iface.asn;

    if is_ixp(s_asn) {
        let Some(participants) = ixp.participants(s_asn) else {
            return -1;
        };
        let inter: HashSet<ASN> = participants.intersection(origin_asns).copied().collect();
        return if inter.len() == 1 {
            *inter.iter().next().unwrap()
        } else {
            -1
        };
    }

    if s_asn == 0 {
        if skipua {
            return -1;
        }
        return rupdates.asn(iface.router);
    }

    let succ_router = iface.router;
    let r_update = rupdates.get(succ_router);
    let (mut succ_asn, succ_org) = match r_update {
        Some(u) if u.org == iface.org => (u.asn, u.org),
        _ => (s_asn, iface.org),
    };
    if succ_asn <= 0
        || r_update.is_some_and(|u| u.asn > 0 && u.org != iface.org)
    {
        succ_asn = s_asn;
    }

    // Third-party detection: the successor hop sits in a different
    // organization from every origin. Two independent checks can each
    // flag it as third-party (§4.4 step 4; `algorithm.py:90-132`).
    let rsucc_asn = rupdates.asn(succ_router);
    let outside_origin_orgs = origin_asns.iter().any(|&a| a > 0) && !origin_orgs.contains(&iface.org);
    let mut third = false;
    if outside_origin_orgs {
        if rsucc_asn > 0 {
            let rsucc_org = as2org.org(rsucc_asn);
            let related_to_origin = origin_asns.iter().any(|&o| rel_or_same_org(rsucc_asn, o, bgp, as2org));
            if rsucc_org != succ_org && related_to_origin {
                let s_cone = bgp.conesize(succ_asn);
                let r_cone = bgp.conesize(rsucc_asn);
                third = if !dests.contains(&succ_asn) {
                    s_cone <= r_cone
                } else {
                    !origin_asns.iter().any(|&o| bgp.rel(o, succ_asn)) && bgp.rel(succ_asn, rsucc_asn)
                };
            }
        }

        // Second, independent check (`algorithm.py:125-132`): no origin AS
        // relates to the successor interface AS, but some origin AS
        // relates to the successor *router's* annotation, when the two
        // share an organization. Fires regardless of the branch above.
        if !third && succ_org == as2org.org(rsucc_asn) {
            let no_origin_rel_to_succ = !origin_asns.iter().any(|&o| bgp.rel(o, succ_asn));
            let origin_rel_to_rsucc = origin_asns.iter().any(|&o| bgp.rel(o, rsucc_asn));
            if no_origin_rel_to_succ && origin_rel_to_rsucc {
                third = true;
            }
        }
    }

    if third {
        let covers_all_dests = dests.iter().all(|d| *d == rsucc_asn || bgp.cone(rsucc_asn).contains(d));
        return if covers_all_dests { rsucc_asn } else { -1 };
    }

    succ_asn
}

struct FusedVotes {
    tally: HashMap<ASN, i64>,
    sasn_origins: HashMap<ASN, HashSet<ASN>>,
}

/// Annotate a single non-VRF router with a successor set. Returns `None`
/// when the router has no successors at all — the caller falls through to
/// the last-hop annotator.
#[allow(clippy::too_many_arguments)]
pub fn annotate_router(
    graph: &Graph,
    router_id: RouterId,
    rupdates: &UpdatesStore<RouterId>,
    iupdates: &UpdatesStore<InterfaceId>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    ixp: &dyn IxpAsns,
    config: &Config,
    first_iteration: bool,
) -> (ASN, i64) {
    let router = graph.router(router_id);

    let mut origin_counts: HashMap<ASN, i64> = HashMap::new();
    let mut origin_orgs: HashSet<OrgId> = HashSet::new();
    for &iid in &router.interfaces {
        let iface = graph.interface(iid);
        if iface.asn > 0 {
            *origin_counts.entry(iface.asn).or_insert(0) += 1;
            origin_orgs.insert(iface.org);
        }
    }
    let origin_asns: HashSet<ASN> = origin_counts.keys().copied().collect();
    let dests = &router.dests;
    let rasn_prev = rupdates.asn(router_id);

    // Raw successor-interface ASN multiset (`algorithm.py:211`'s `sorigins`):
    // every successor's own ASN, independent of what `router_heuristics`
    // ends up voting. Used by the overlap override and the T3/T4 tiebreak
    // key below, never by the vote tally itself.
    let mut sorigins: HashMap<ASN, i64> = HashMap::new();
    for &succ in &router.succ {
        if let Succ::Interface(iid) = succ {
            *sorigins.entry(graph.interface(iid).asn).or_insert(0) += 1;
        }
    }

    let mut succs: HashMap<ASN, i64> = HashMap::new();
    let mut sasn_origins: HashMap<ASN, HashSet<ASN>> = HashMap::new();
    for &succ in &router.succ {
        let Succ::Interface(iid) = succ else {
            continue;
        };
        let candidate = router_heuristics(
            graph,
            iid,
            rupdates,
            &origin_asns,
            &origin_orgs,
            dests,
            rasn_prev,
            bgp,
            as2org,
            ixp,
            config.skipua,
        );
        if candidate <= 0 {
            continue;
        }
        *succs.entry(candidate).or_insert(0) += 1;
        let hop_origins = router.origins.get(&succ).cloned().unwrap_or_default();
        sasn_origins.entry(candidate).or_default().extend(hop_origins);
    }

    if succs.is_empty() {
        return annotate_lasthop(router, &origin_counts, bgp, as2org, config.strict);
    }

    // Peer-tie shortcut (§4.5 step 4).
    if origin_counts.len() == 1 && succs.len() == 1 {
        let &a = origin_counts.keys().next().unwrap();
        let &s = succs.keys().next().unwrap();
        if origin_counts[&a] == succs[&s]
            && (bgp.peer_rel(a, s) || (isnorelpeer(a, &config.norelpeer) && !bgp.rel(a, s)))
        {
            return (s, utype::IASN_SUCC_HALF);
        }
    }

    // Single-successor-org shortcut (§4.5 step 5): customer-cone descent.
    {
        let mut by_org: HashMap<OrgId, Vec<ASN>> = HashMap::new();
        for &s in succs.keys() {
            by_org.entry(as2org.org(s)).or_default().push(s);
        }
        if by_org.len() == 1 || succs.len() == 1 {
            let s = if succs.len() == 1 {
                *succs.keys().next().unwrap()
            } else {
                let members = by_org.values().next().unwrap();
                *members.iter().max_by_key(|&&a| (bgp.conesize(a) as i64, -a)).unwrap()
            };
            let empty = HashSet::new();
            let s_origins = sasn_origins.get(&s).unwrap_or(&empty);
            if !s_origins.contains(&s) && multi_customers(s_origins, bgp).contains(&s) {
                return (s, utype::SINGLE_SUCC_4);
            }
        }
    }

    // Multi-peer exception (§4.5 step 6).
    if succs.len() > 1 && origin_counts.len() == 1 {
        let &a = origin_counts.keys().next().unwrap();
        if !succs.contains_key(&a) {
            let mut peer_orgs: HashSet<OrgId> = HashSet::new();
            let mut all_orgs: HashSet<OrgId> = HashSet::new();
            for &s in succs.keys() {
                all_orgs.insert(as2org.org(s));
                if bgp.peer_rel(a, s) || (isnorelpeer(a, &config.norelpeer) && !bgp.rel(a, s)) {
                    peer_orgs.insert(as2org.org(s));
                }
            }
            let frac = peer_orgs.len() as f64 / all_orgs.len().max(1) as f64;
            let max_succ_votes = *succs.values().max().unwrap_or(&0);
            let a_votes = origin_counts[&a];
            if frac >= 0.85 && (a_votes as f64) > (max_succ_votes as f64) / 2.0 {
                return if first_iteration {
                    (-1, utype::ALLPEER_SUCC)
                } else {
                    (a, utype::ALLPEER_SUCC)
                };
            }
        }
    }

    let fused = fuse_votes(&succs, &origin_counts, &origin_asns, bgp, as2org);
    let tied = max_num(&fused.tally);

    let (mut asn, mut utype_val) = if tied.len() == 1 {
        (tied[0], utype::VOTE_SINGLE)
    } else {
        resolve_tie(
            graph,
            router_id,
            &tied,
            &succs,
            &sasn_origins,
            &sorigins,
            dests,
            iupdates,
            &config.norelpeer,
            bgp,
        )
    };

    // Overlap override (§4.5 step 10). The overlap set is the router's own
    // origin ASNs intersected with the raw successor-interface ASNs
    // (`sorigins`, not the post-heuristic `succs` votes) -- `algorithm.py:374-380`.
    if !origin_counts.contains_key(&asn) {
        let sorigin_keys: HashSet<ASN> = sorigins.keys().copied().collect();
        let overlap: HashSet<ASN> = origin_asns.intersection(&sorigin_keys).copied().collect();
        if overlap.len() == 1 {
            let o = *overlap.iter().next().unwrap();
            let total: i64 = sorigins.values().sum();
            let asn_votes = *succs.get(&asn).unwrap_or(&0);
            if (asn_votes as f64) < (2.0 * total as f64 / 3.0) && as2org.org(o) != as2org.org(asn) {
                asn = o;
                utype_val += utype::OVERLAP_OVERRIDE_BIT;
            }
        }
    }

    // Hidden-AS fallback (§4.5 step 11).
    if !origin_counts.is_empty()
        && !origin_counts.contains_key(&asn)
        && !any_rels(asn, &origin_asns, bgp)
    {
        let vote_keys: HashSet<ASN> = fused.tally.keys().copied().collect();
        if dests.is_disjoint(&vote_keys) {
            let candidates: Vec<ASN> = dests
                .iter()
                .copied()
                .filter(|d| origin_counts.contains_key(d) || any_rels(*d, &origin_asns, bgp))
                .collect();
            if candidates.len() == 1 {
                return (candidates[0], utype::DEST_REL_SHORTCIRCUIT);
            }
        }
        let (h_asn, h_utype) = hidden_asn(
            &origin_counts,
            asn,
            utype_val,
            &fused.tally,
            bgp,
            as2org,
            config.strict,
            config.hidden_reverse,
        );
        return (h_asn, h_utype);
    }

    (asn, utype_val)
}

/// Vote fusion (§4.5 step 7): `succs + I`, collapsed to related voters when
/// no single AS holds an outright majority.
fn fuse_votes(
    succs: &HashMap<ASN, i64>,
    origin_counts: &HashMap<ASN, i64>,
    origin_asns: &HashSet<ASN>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
) -> FusedVotes {
    let mut votes: HashMap<ASN, i64> = succs.clone();
    for (&o, &c) in origin_counts {
        *votes.entry(o).or_insert(0) += c;
    }
    let total: i64 = votes.values().sum();
    if let Some((&top, &top_v)) = votes.iter().max_by_key(|&(&a, &v)| (v, -a)) {
        if total > 0 && (top_v as f64) >= 0.75 * (total as f64) {
            return FusedVotes {
                tally: HashMap::from([(top, top_v)]),
                sasn_origins: HashMap::new(),
            };
        }
    }

    let votes_rels: HashSet<ASN> = votes
        .keys()
        .copied()
        .filter(|&v| origin_asns.contains(&v) || origin_asns.iter().any(|&o| rel_or_same_org(v, o, bgp, as2org)))
        .collect();

    let tally = if votes_rels.len() <= origin_counts.len() {
        votes
    } else {
        let mut folded: HashMap<ASN, i64> = HashMap::new();
        for (&v, &c) in &votes {
            if votes_rels.contains(&v) {
                *folded.entry(v).or_insert(0) += c;
            } else if let Some(&target) = votes_rels.iter().find(|&&r| as2org.org(r) == as2org.org(v)) {
                *folded.entry(target).or_insert(0) += c;
            }
        }
        if folded.is_empty() { votes } else { folded }
    };

    FusedVotes {
        tally,
        sasn_origins: HashMap::new(),
    }
}

/// Deterministic tiebreakers (§4.5 step 9), tried in order.
#[allow(clippy::too_many_arguments)]
fn resolve_tie(
    graph: &Graph,
    router_id: RouterId,
    tied: &[ASN],
    succs: &HashMap<ASN, i64>,
    sasn_origins: &HashMap<ASN, HashSet<ASN>>,
    sorigins: &HashMap<ASN, i64>,
    dests: &HashSet<ASN>,
    iupdates: &UpdatesStore<InterfaceId>,
    norelpeer: &HashSet<ASN>,
    bgp: &dyn Bgp,
) -> (ASN, i64) {
    let router = graph.router(router_id);
    let tied_set: HashSet<ASN> = tied.iter().copied().collect();

    // T0/T1: a router with exactly one successor edge and `nexthop` set
    // either abstains (the successor interface has no annotation yet and
    // the lone hop looks like a peer or unrelated AS) or adopts the
    // successor interface's own settled annotation, when several
    // predecessors already agree on it.
    if router.succ.len() == 1 && router.nexthop {
        if let Succ::Interface(iid) = router.succ[0] {
            let isucc_asn = graph.interface(iid).asn;
            let sasn = iupdates.asn(iid);
            if router.interfaces.len() == 1 && sasn == -1 {
                let rasn = graph.interface(router.interfaces[0]).asn;
                if bgp.peer_rel(rasn, isucc_asn) || (isnorelpeer(rasn, norelpeer) && !bgp.rel(rasn, isucc_asn)) {
                    return (-1, utype::ABSTAIN_BIT);
                }
            }
            if sasn != -1 && succs.contains_key(&sasn) && tied_set.contains(&sasn) {
                let multi_pred = graph.interface(iid).pred.len() > 1;
                if multi_pred {
                    return (sasn, utype::VOTE_TIE + utype::PRED_MULTIPLICITY_BIT);
                }
            }
        }
    }

    // T2: a single successor that is itself a destination, while the
    // router's own (single) interface is not, and there's no direct
    // provider/customer tie to break it.
    if router.succ.len() == 1 && router.interfaces.len() == 1 {
        if let Succ::Interface(iid) = router.succ[0] {
            let sasn = {
                let a = iupdates.asn(iid);
                if a == -1 { graph.interface(iid).asn } else { a }
            };
            let rasn = graph.interface(router.interfaces[0]).asn;
            let reltype = bgp.reltype(rasn, sasn);
            if reltype != 1 && reltype != 2 && dests.contains(&sasn) && !dests.contains(&rasn) {
                return (sasn, utype::VOTE_TIE + utype::T2_BIT);
            }
        }
    }

    // T3/T4: containment — prefer an AS that is both its own origin and a
    // raw successor-interface ASN (`sorigins`, not the post-heuristic vote),
    // then one that is a destination, then smaller cone, then larger ASN.
    let empty = HashSet::new();
    let chosen = tied
        .iter()
        .copied()
        .min_by_key(|&x| {
            let contained = sasn_origins.get(&x).unwrap_or(&empty).contains(&x) && sorigins.contains_key(&x);
            (!contained, !dests.contains(&x), bgp.conesize(x) as i64, -x)
        })
        .expect("tied set is non-empty");
    (chosen, utype::VOTE_TIE + utype::T3_BIT)
}

/// Driver for §4.10: annotate every router with at least one successor.
pub fn annotate_routers(
    graph: &Graph,
    routers: impl Iterator<Item = RouterId>,
    rupdates: &mut UpdatesStore<RouterId>,
    iupdates: &UpdatesStore<InterfaceId>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    ixp: &dyn IxpAsns,
    config: &Config,
    first_iteration: bool,
) {
    for router_id in routers {
        let mut result = (-1, -1);
        if config.usehints && graph.router(router_id).hints.is_some() {
            let (asn, utype_val) = router_hint(graph, router_id, bgp, as2org, config.use_provider);
            if asn > 0 {
                result = (asn, utype_val);
            }
        }
        if result.0 <= 0 {
            result = annotate_router(
                graph,
                router_id,
                rupdates,
                iupdates,
                bgp,
                as2org,
                ixp,
                config,
                first_iteration,
            );
        }
        let (asn, utype_val) = result;
        let org = if asn > 0 { as2org.org(asn) } else { asn };
        rupdates.put(router_id, asn, org, utype_val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::as2org::As2OrgTable;
    use crate::external::bgp::TestBgp;
    use crate::external::ixp_asns::IxpParticipantTable;

    /// Builds `origin_router` with one interface at `origin_asn`, plus one
    /// successor interface per entry of `succ_asns`, each on its own fresh
    /// downstream router. Returns `(graph, origin_router, succ_interfaces)`.
    fn router_with_succs(origin_asn: ASN, succ_asns: &[ASN]) -> (Graph, RouterId, Vec<InterfaceId>) {
        let mut graph = Graph::new();
        let origin_router = graph.new_router("origin");
        let origin_iface = graph.add_interface(origin_router, "10.0.0.1", origin_asn, origin_asn);
        let mut succ_ifaces = Vec::new();
        for (i, &asn) in succ_asns.iter().enumerate() {
            let downstream = graph.new_router(format!("downstream{i}"));
            let iface = graph.add_interface(downstream, format!("10.0.1.{i}"), asn, asn);
            graph.add_succ(origin_iface, Succ::Interface(iface));
            succ_ifaces.push(iface);
        }
        (graph, origin_router, succ_ifaces)
    }

    /// §8 scenario 1: interfaces {asn=100}, two successors both asn=200
    /// (200 is a customer of 100) -> `(200, VOTE_SINGLE)`.
    #[test]
    fn clean_majority() {
        let (graph, origin_router, _) = router_with_succs(100, &[200, 200]);
        let bgp = TestBgp::new().provider_customer(100, 200);
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();
        let rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, utype_val) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, true);
        assert_eq!(asn, 200);
        assert_eq!(utype_val, utype::VOTE_SINGLE);
    }

    /// §8 scenario 2: iasn=1000, three successors (300, 400, 500), all
    /// peers of 1000, votes[1000]=1 and each succ=1 -> `(1000, ALLPEER_SUCC)`
    /// once past the first iteration (the first pass abstains by design,
    /// mirroring `algorithm.py`'s `first` flag).
    #[test]
    fn multi_peer_exception() {
        let (graph, origin_router, _) = router_with_succs(1000, &[300, 400, 500]);
        let bgp = TestBgp::new().peer(1000, 300).peer(1000, 400).peer(1000, 500);
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();
        let rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, utype_val) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, false);
        assert_eq!(asn, 1000);
        assert_eq!(utype_val, utype::ALLPEER_SUCC);
    }

    #[test]
    fn multi_peer_exception_abstains_on_first_iteration() {
        let (graph, origin_router, _) = router_with_succs(1000, &[300, 400, 500]);
        let bgp = TestBgp::new().peer(1000, 300).peer(1000, 400).peer(1000, 500);
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();
        let rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, _) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, true);
        assert_eq!(asn, -1);
    }

    /// §8 scenario 3: dests = {10, 20, 30} ⊂ cone(200); the successor
    /// interface is asn=300 (a different org), its router already
    /// annotated 200; 300 is unrelated to the router's own origin. Expect
    /// the router to end up annotated 200, not 300.
    #[test]
    fn third_party_address_detection() {
        let (mut graph, origin_router, succ_ifaces) = router_with_succs(1000, &[300]);
        graph.router_mut(origin_router).dests = HashSet::from([10, 20, 30]);

        let bgp = TestBgp::new()
            .provider_customer(1000, 200)
            .provider_customer(200, 10)
            .provider_customer(200, 20)
            .provider_customer(200, 30);
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();

        let downstream_router = graph.interface(succ_ifaces[0]).router;
        let mut rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        rupdates.put(downstream_router, 200, 200, 0);
        rupdates.advance();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, _) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, false);
        assert_eq!(asn, 200);
    }

    /// §8 scenario 4: I = {1000}, no direct relationship to the tentative
    /// successor AS 9000, but `customers(1000) ∩ providers(9000) = {5000}`
    /// -> the hidden-AS fallback returns 5000 with `HIDDEN_INTER` set.
    #[test]
    fn hidden_as_fallback() {
        let (graph, origin_router, _) = router_with_succs(1000, &[9000]);
        let bgp = TestBgp::new().provider_customer(1000, 5000).provider_customer(5000, 9000);
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();
        let rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, utype_val) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, false);
        assert_eq!(asn, 5000);
        assert!(utype_val >= utype::HIDDEN_INTER);
    }

    /// §8 scenario 6: candidates {A=100, B=200, C=300}; only A is in
    /// router.dests and B, C are both in cone(A) -> `(A, VOTE_TIE + 36000)`.
    /// The origin interface's own ASN is `0` ("unknown") so it contributes
    /// no vote of its own and doesn't interfere with the three-way tie.
    #[test]
    fn tie_broken_by_containment() {
        let (mut graph, origin_router, _) = router_with_succs(0, &[100, 200, 300]);
        graph.router_mut(origin_router).dests = HashSet::from([100]);

        let bgp = TestBgp::new().provider_customer(100, 200).provider_customer(100, 300);
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();
        let rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, utype_val) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, false);
        assert_eq!(asn, 100);
        assert_eq!(utype_val, utype::VOTE_TIE + utype::T3_BIT);
    }

    /// Overlap override (§8): the overlap set is a singleton `{o}` in a
    /// different org from the tentative pick, and `succs[asn] < 2/3` of
    /// total successor votes -> the output must be `o` with the
    /// `1_000_000` bit set.
    #[test]
    fn overlap_override_replaces_tentative_pick() {
        // Single origin AS 10. One successor is a pass-through back to AS
        // 10 itself (the overlap candidate: its own hop-origin is 10, and
        // 10 is also one of the router's own origin ASNs). Two other
        // candidates, 88 and 77, each get 3 votes and tie for the vote-fused
        // winner, with 88 winning the tiebreak on ASN ordering. Neither 88
        // nor 77 has any BGP relation to 10, so fuse_votes can't fold them
        // together -- the overlap check then finds 10 as the lone
        // self-referential origin and, since 88's 3 votes are under 2/3 of
        // the 7 raw successor votes, replaces the tentative pick with 10.
        let mut graph = Graph::new();
        let origin_router = graph.new_router("origin");
        let origin_iface = graph.add_interface(origin_router, "10.0.0.1", 10, 10);

        let downstream_low = graph.new_router("low");
        let succ_low = graph.add_interface(downstream_low, "10.0.1.1", 10, 10);
        graph.add_succ(origin_iface, Succ::Interface(succ_low));

        for i in 0..3 {
            let downstream_x = graph.new_router(format!("x{i}"));
            let succ_x = graph.add_interface(downstream_x, format!("10.0.2.{i}"), 88, 88);
            graph.add_succ(origin_iface, Succ::Interface(succ_x));
        }
        for i in 0..3 {
            let downstream_z = graph.new_router(format!("z{i}"));
            let succ_z = graph.add_interface(downstream_z, format!("10.0.3.{i}"), 77, 77);
            graph.add_succ(origin_iface, Succ::Interface(succ_z));
        }

        let bgp = TestBgp::new();
        let as2org = As2OrgTable::new();
        let ixp = IxpParticipantTable::new();
        let config = Config::new();
        let rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

        let (asn, utype_val) =
            annotate_router(&graph, origin_router, &rupdates, &iupdates, &bgp, &as2org, &ixp, &config, false);
        assert_eq!(asn, 10);
        assert!(utype_val & utype::OVERLAP_OVERRIDE_BIT != 0);
    }
}
