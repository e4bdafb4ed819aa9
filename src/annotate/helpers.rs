//! Pure helper predicates over external data, shared by every annotator
//! (§4.2). Small enough to stay free functions rather than methods on `Bgp`
//! itself, the way the teacher keeps `GaoRexford`-adjacent helpers as plain
//! functions alongside `ASGraph` rather than inherent methods.

use std::collections::{HashMap, HashSet};

use crate::external::Bgp;
use crate::shared::ASN;

pub fn multi_customers(asns: &HashSet<ASN>, bgp: &dyn Bgp) -> HashSet<ASN> {
    let mut out = HashSet::new();
    for &a in asns {
        out.extend(bgp.customers(a));
    }
    out
}

pub fn multi_peers(asns: &HashSet<ASN>, bgp: &dyn Bgp) -> HashSet<ASN> {
    let mut out = HashSet::new();
    for &a in asns {
        out.extend(bgp.peers(a));
    }
    out
}

pub fn multi_providers(asns: &HashSet<ASN>, bgp: &dyn Bgp) -> HashSet<ASN> {
    let mut out = HashSet::new();
    for &a in asns {
        out.extend(bgp.providers(a));
    }
    out
}

/// `true` iff `a` has some BGP relationship (any kind) to a member of `s`.
pub fn any_rels(a: ASN, s: &HashSet<ASN>, bgp: &dyn Bgp) -> bool {
    s.iter().any(|&b| bgp.rel(a, b))
}

pub fn isnorelpeer(a: ASN, norelpeer: &HashSet<ASN>) -> bool {
    norelpeer.contains(&a)
}

/// `true` iff `a` and `b` are in the same organization, by `As2Org::org`.
pub fn same_org(a: ASN, b: ASN, as2org: &dyn crate::external::As2Org) -> bool {
    as2org.org(a) == as2org.org(b)
}

/// `true` iff `a` relates to `b` directly, or shares an organization with
/// `b` (the "direct or same-org" relation tested throughout §4).
pub fn rel_or_same_org(a: ASN, b: ASN, bgp: &dyn Bgp, as2org: &dyn crate::external::As2Org) -> bool {
    bgp.rel(a, b) || same_org(a, b, as2org)
}

/// All ASNs tied for the maximum value in `votes`, sorted ascending by ASN
/// so iteration order of the source map can never leak into the result.
pub fn max_num(votes: &HashMap<ASN, i64>) -> Vec<ASN> {
    let Some(&best) = votes.values().max() else {
        return Vec::new();
    };
    let mut tied: Vec<ASN> = votes
        .iter()
        .filter(|&(_, &v)| v == best)
        .map(|(&k, _)| k)
        .collect();
    tied.sort_unstable();
    tied
}

/// Single winner from `max_num`, with a caller-supplied tiebreak closure
/// over the tied set (closures are expected to end the comparator key in
/// the bare ASN per §9's determinism rule).
pub fn pick_best(votes: &HashMap<ASN, i64>, mut tiebreak: impl FnMut(ASN) -> (i64, i64)) -> Option<ASN> {
    let tied = max_num(votes);
    tied.into_iter().min_by_key(|&a| tiebreak(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::bgp::TestBgp;
    use crate::external::{As2Org, as2org::As2OrgTable};

    #[test]
    fn multi_customers_unions_across_the_set() {
        let bgp = TestBgp::new().provider_customer(100, 200).provider_customer(300, 400);
        let out = multi_customers(&HashSet::from([100, 300]), &bgp);
        assert_eq!(out, HashSet::from([200, 400]));
    }

    #[test]
    fn multi_peers_and_providers_union() {
        let bgp = TestBgp::new().peer(100, 200).provider_customer(300, 100);
        assert_eq!(multi_peers(&HashSet::from([100]), &bgp), HashSet::from([200]));
        assert_eq!(multi_providers(&HashSet::from([100]), &bgp), HashSet::from([300]));
    }

    #[test]
    fn any_rels_true_iff_some_member_related() {
        let bgp = TestBgp::new().provider_customer(100, 200);
        assert!(any_rels(100, &HashSet::from([200, 999]), &bgp));
        assert!(!any_rels(100, &HashSet::from([999]), &bgp));
    }

    #[test]
    fn isnorelpeer_checks_membership() {
        let set = HashSet::from([42]);
        assert!(isnorelpeer(42, &set));
        assert!(!isnorelpeer(7, &set));
    }

    #[test]
    fn same_org_and_rel_or_same_org() {
        let mut as2org = As2OrgTable::new();
        as2org.insert(100, 1);
        as2org.insert(101, 1);
        as2org.insert(200, 2);
        let bgp = TestBgp::new();
        assert!(same_org(100, 101, &as2org));
        assert!(!same_org(100, 200, &as2org));
        assert!(rel_or_same_org(100, 101, &bgp, &as2org));
        assert!(!rel_or_same_org(100, 200, &bgp, &as2org));
    }

    #[test]
    fn max_num_breaks_ties_by_ascending_asn() {
        let votes = HashMap::from([(300, 2), (100, 2), (200, 1)]);
        assert_eq!(max_num(&votes), vec![100, 300]);
    }

    #[test]
    fn max_num_empty_on_no_votes() {
        let votes: HashMap<ASN, i64> = HashMap::new();
        assert!(max_num(&votes).is_empty());
    }

    #[test]
    fn pick_best_applies_tiebreak_over_tied_set() {
        let votes = HashMap::from([(100, 5), (200, 5), (300, 1)]);
        // Prefer 200 arbitrarily via the tiebreak closure.
        let chosen = pick_best(&votes, |a| if a == 200 { (0, 0) } else { (1, a) });
        assert_eq!(chosen, Some(200));
    }
}
