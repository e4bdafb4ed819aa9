//! Last-hop annotator (§4.6): a router with no observed successors has only
//! its own interfaces' origins and destination-AS evidence to draw on.
//! `Graph::set_dests` (graph/mod.rs) has already discarded the common
//! reallocated-prefix false destination before this runs.

use std::collections::{HashMap, HashSet};

use crate::annotate::helpers::{multi_customers, multi_providers, rel_or_same_org};
use crate::config::Config;
use crate::external::{As2Org, Bgp};
use crate::graph::{Graph, RouterData};
use crate::shared::{ASN, RouterId, utype};
use crate::updates::UpdatesStore;

/// Tie-break key used throughout this module: prefer more votes, then
/// smaller cone, then larger ASN.
fn vote_key(origin_counts: &HashMap<ASN, i64>, bgp: &dyn Bgp, asn: ASN) -> (i64, i64, ASN) {
    (origin_counts.get(&asn).copied().unwrap_or(0), -(bgp.conesize(asn) as i64), asn)
}

pub fn annotate_lasthop(
    router: &RouterData,
    origin_counts: &HashMap<ASN, i64>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    strict: bool,
) -> (ASN, i64) {
    let dests = &router.dests;
    let origins: HashSet<ASN> = origin_counts.keys().copied().collect();

    if dests.is_empty() || dests.iter().all(|&d| d <= 0) {
        return annotate_lasthop_nodests(origin_counts, bgp, as2org);
    }

    let intersection: HashSet<ASN> = origins.intersection(dests).copied().collect();
    if !intersection.is_empty() {
        let best = if intersection.len() == 1 {
            *intersection.iter().next().unwrap()
        } else {
            *intersection
                .iter()
                .min_by_key(|&&x| (bgp.conesize(x) as i64, -x))
                .unwrap()
        };
        return (best, utype::HEAPED);
    }

    let rels: HashSet<ASN> = dests
        .iter()
        .copied()
        .filter(|&d| origins.iter().any(|&i| bgp.rel(i, d)))
        .collect();
    if !rels.is_empty() {
        if rels.len() >= 4 {
            let best = origins
                .iter()
                .copied()
                .max_by_key(|&o| (rels.iter().filter(|&&d| bgp.rel(o, d)).count(), -o))
                .unwrap();
            return (best, utype::HEAPED);
        }
        let largest = *rels.iter().max_by_key(|&&x| (bgp.conesize(x) as i64, -x)).unwrap();
        let outside = dests
            .iter()
            .filter(|&&d| d != largest && !bgp.cone(largest).contains(&d))
            .count();
        if outside > 4 {
            let best = origins
                .iter()
                .copied()
                .max_by_key(|&o| (rels.iter().filter(|&&d| bgp.rel(o, d)).count(), -o))
                .unwrap();
            return (best, utype::HEAPED);
        }
        return (largest, utype::HEAPED);
    }

    annotate_lasthop_norels(origin_counts, dests, bgp, as2org, strict)
}

fn annotate_lasthop_nodests(origin_counts: &HashMap<ASN, i64>, bgp: &dyn Bgp, as2org: &dyn As2Org) -> (ASN, i64) {
    if origin_counts.is_empty() {
        return (-1, utype::NO_ORIGIN);
    }
    if origin_counts.len() == 1 {
        let &a = origin_counts.keys().next().unwrap();
        return (a, utype::SINGLE_ORIGIN);
    }

    let origins: Vec<ASN> = origin_counts.keys().copied().collect();
    let candidates: Vec<ASN> = origins
        .iter()
        .copied()
        .filter(|&o| origins.iter().all(|&other| other == o || rel_or_same_org(o, other, bgp, as2org)))
        .collect();
    if !candidates.is_empty() {
        let best = candidates
            .into_iter()
            .max_by_key(|&o| vote_key(origin_counts, bgp, o))
            .unwrap();
        return (best, utype::ALLRELS);
    }

    let mut inter: Option<HashSet<ASN>> = None;
    for &o in &origins {
        let c = bgp.customers(o);
        inter = Some(match inter {
            None => c,
            Some(prev) => prev.intersection(&c).copied().collect(),
        });
    }
    if let Some(set) = inter {
        if set.len() == 1 {
            return (*set.iter().next().unwrap(), utype::CUSTOMER_INTERSECTION);
        }
    }

    let best = origins
        .into_iter()
        .max_by_key(|&o| vote_key(origin_counts, bgp, o))
        .unwrap();
    (best, utype::MOST_FREQUENT_ORIGIN)
}

fn annotate_lasthop_norels(
    origin_counts: &HashMap<ASN, i64>,
    dests: &HashSet<ASN>,
    bgp: &dyn Bgp,
    _as2org: &dyn As2Org,
    strict: bool,
) -> (ASN, i64) {
    if strict {
        let best = origin_counts
            .keys()
            .copied()
            .max_by_key(|&o| vote_key(origin_counts, bgp, o))
            .unwrap_or(-1);
        return (best, utype::NODEST);
    }

    if !origin_counts.is_empty() {
        let origins: HashSet<ASN> = origin_counts.keys().copied().collect();
        let positive_dests: HashSet<ASN> = dests.iter().copied().filter(|&d| d > 0).collect();

        let d = multi_providers(&positive_dests, bgp)
            .intersection(&multi_customers(&origins, bgp))
            .copied()
            .collect::<HashSet<_>>();
        if d.len() == 1 {
            return (*d.iter().next().unwrap(), utype::PROVIDER_CUSTOMER_INTERSECTION);
        }

        let u = multi_customers(&positive_dests, bgp)
            .intersection(&multi_providers(&origins, bgp))
            .copied()
            .collect::<HashSet<_>>();
        if u.len() == 1 {
            return (*u.iter().next().unwrap(), utype::CUSTOMER_PROVIDER_INTERSECTION);
        }
    }

    let best = dests
        .iter()
        .copied()
        .filter(|&d| d > 0)
        .max_by_key(|&d| (bgp.conesize(d) as i64, d))
        .unwrap_or(-1);
    (best, utype::MISSING_NOINTER)
}

/// Driver: annotate every last-hop router (no successors, never change
/// across iterations) once, writing straight into the advanced snapshot
/// before the refinement loop begins.
pub fn annotate_lasthops(
    graph: &Graph,
    routers: impl Iterator<Item = RouterId>,
    rupdates: &mut UpdatesStore<RouterId>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    config: &Config,
) {
    let ids: Vec<RouterId> = routers.collect();
    for router_id in ids {
        let router = graph.router(router_id);
        let mut origin_counts: HashMap<ASN, i64> = HashMap::new();
        for &iid in &router.interfaces {
            let iface = graph.interface(iid);
            if iface.asn > 0 {
                *origin_counts.entry(iface.asn).or_insert(0) += 1;
            }
        }
        let (asn, utype_val) = annotate_lasthop(router, &origin_counts, bgp, as2org, config.strict);
        let org = if asn > 0 { as2org.org(asn) } else { asn };
        rupdates.put_direct(router_id, asn, org, utype_val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::as2org::As2OrgTable;
    use crate::external::bgp::TestBgp;
    use crate::graph::RouterData;

    fn router_with_dests(dests: impl IntoIterator<Item = ASN>) -> RouterData {
        let mut r = RouterData::new("r".to_string());
        r.dests = dests.into_iter().collect();
        r
    }

    /// §8 scenario 5: three interfaces {10, 20, 30}, no dests, 10 related
    /// to both 20 and 30 -> expect `(10, 3)` (ALLRELS).
    #[test]
    fn nodests_allrels_picks_the_universally_related_origin() {
        let bgp = TestBgp::new().provider_customer(10, 20).provider_customer(10, 30);
        let as2org = As2OrgTable::new();
        let router = router_with_dests([]);
        let origin_counts = HashMap::from([(10, 1), (20, 1), (30, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 10);
        assert_eq!(utype_val, utype::ALLRELS);
    }

    #[test]
    fn nodests_single_origin_returns_it_directly() {
        let bgp = TestBgp::new();
        let as2org = As2OrgTable::new();
        let router = router_with_dests([]);
        let origin_counts = HashMap::from([(100, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 100);
        assert_eq!(utype_val, utype::SINGLE_ORIGIN);
    }

    #[test]
    fn nodests_zero_origins_is_unknown() {
        let bgp = TestBgp::new();
        let as2org = As2OrgTable::new();
        let router = router_with_dests([]);
        let origin_counts: HashMap<ASN, i64> = HashMap::new();
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, -1);
        assert_eq!(utype_val, utype::NO_ORIGIN);
    }

    #[test]
    fn nodests_customer_intersection_when_unrelated_origins() {
        let bgp = TestBgp::new().provider_customer(10, 999).provider_customer(20, 999);
        let as2org = As2OrgTable::new();
        let router = router_with_dests([]);
        let origin_counts = HashMap::from([(10, 1), (20, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 999);
        assert_eq!(utype_val, utype::CUSTOMER_INTERSECTION);
    }

    /// Dests invariant (§8): `I ∩ dests = {a}` picks `a` with `HEAPED`.
    #[test]
    fn heaped_when_intersection_is_a_singleton() {
        let bgp = TestBgp::new();
        let as2org = As2OrgTable::new();
        let router = router_with_dests([10, 77]);
        let origin_counts = HashMap::from([(10, 1), (88, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 10);
        assert_eq!(utype_val, utype::HEAPED);
    }

    #[test]
    fn heaped_picks_smallest_cone_when_intersection_has_multiple() {
        let bgp = TestBgp::new().provider_customer(10, 1).provider_customer(10, 2).provider_customer(20, 1);
        let as2org = As2OrgTable::new();
        let router = router_with_dests([10, 20]);
        let origin_counts = HashMap::from([(10, 1), (20, 1)]);
        // cone(10) = {10,1,2} (size 3), cone(20) = {20,1} (size 2) -> smaller wins.
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 20);
        assert_eq!(utype_val, utype::HEAPED);
    }

    #[test]
    fn rels_branch_prefers_largest_cone_dest_when_coverage_is_tight() {
        // No direct I ∩ dests overlap, but dests relate to an origin.
        let bgp = TestBgp::new().provider_customer(10, 500).provider_customer(500, 501);
        let as2org = As2OrgTable::new();
        let router = router_with_dests([500]);
        let origin_counts = HashMap::from([(10, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 500);
        assert_eq!(utype_val, utype::HEAPED);
    }

    #[test]
    fn norels_strict_picks_most_voted_origin() {
        let bgp = TestBgp::new();
        let as2org = As2OrgTable::new();
        let router = router_with_dests([900]);
        let origin_counts = HashMap::from([(10, 3), (20, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, true);
        assert_eq!(asn, 10);
        assert_eq!(utype_val, utype::NODEST);
    }

    #[test]
    fn norels_nonstrict_provider_customer_intersection() {
        // providers(900) = {777}, customers(10) = {777} -> singleton overlap.
        let bgp = TestBgp::new().provider_customer(10, 777).provider_customer(777, 900);
        let as2org = As2OrgTable::new();
        let router = router_with_dests([900]);
        let origin_counts = HashMap::from([(10, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, false);
        assert_eq!(asn, 777);
        assert_eq!(utype_val, utype::PROVIDER_CUSTOMER_INTERSECTION);
    }

    #[test]
    fn norels_nonstrict_falls_back_to_largest_cone_dest() {
        let bgp = TestBgp::new().provider_customer(500, 1).provider_customer(500, 2);
        let as2org = As2OrgTable::new();
        let router = router_with_dests([500, 600]);
        let origin_counts = HashMap::from([(10, 1)]);
        let (asn, utype_val) = annotate_lasthop(&router, &origin_counts, &bgp, &as2org, false);
        assert_eq!(asn, 500);
        assert_eq!(utype_val, utype::MISSING_NOINTER);
    }
}
