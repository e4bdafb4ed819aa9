//! Hint-based router override (§6 `usehints`/`use_provider`). A router can
//! carry an externally supplied set of candidate ASNs (`router.hints`) —
//! how those hints are populated (naming heuristics, regex over router
//! names) is out of scope for the core per DESIGN.md; this module only
//! consumes them when present. Utype values here carry the `0xff00`/
//! `0xfe00` "decided by hint" bit families from §6's bit-exact
//! compatibility note.

use std::collections::{HashMap, HashSet};

use crate::external::{As2Org, Bgp};
use crate::graph::{Graph, Succ};
use crate::shared::{ASN, RouterId, utype};

const HINT_EXACT: i64 = 0xff00;
const HINT_SUCC: i64 = 0xff02;
const HINT_DEST: i64 = 0xff04;
const HINT_PROVIDER: i64 = 0xff08;
const HINT_ORG_EXACT: i64 = 0xfe00;
const HINT_ORG_SUCC: i64 = 0xfe02;
const HINT_ORG_DEST: i64 = 0xfe04;

/// Hidden-provider fallback: a single provider of either a successor ASN or
/// a destination ASN that also appears in the router's hint set.
fn hidden_provider_hint(graph: &Graph, router_id: RouterId, bgp: &dyn Bgp) -> (ASN, i64) {
    let router = graph.router(router_id);
    let Some(hints) = &router.hints else {
        return (-1, -1);
    };
    let sasns: HashSet<ASN> = router
        .succ
        .iter()
        .filter_map(|s| match s {
            Succ::Interface(iid) => {
                let a = graph.interface(*iid).asn;
                (a > 0).then_some(a)
            }
            Succ::Vrf(_) => None,
        })
        .collect();
    let mut providers: HashSet<ASN> = HashSet::new();
    for &a in sasns.iter().chain(router.dests.iter()) {
        providers.extend(bgp.providers(a));
    }
    let inter: HashSet<ASN> = providers.intersection(hints).copied().collect();
    if inter.len() == 1 {
        (*inter.iter().next().unwrap(), HINT_PROVIDER)
    } else {
        (-1, -1)
    }
}

/// `router_hint` (Python `annotate_router_hint`): returns `(0, utype)` —
/// never a positive ASN — when the hint set gives no usable evidence, so
/// the caller falls through to the ordinary router annotator.
pub fn router_hint(
    graph: &Graph,
    router_id: RouterId,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    use_provider: bool,
) -> (ASN, i64) {
    let router = graph.router(router_id);
    let Some(hints) = router.hints.clone() else {
        return (0, 0);
    };
    let mut utype_val: i64 = 0;

    let mut sasns: HashMap<ASN, i64> = HashMap::new();
    for s in &router.succ {
        if let Succ::Interface(iid) = s {
            let a = graph.interface(*iid).asn;
            if a > 0 {
                *sasns.entry(a).or_insert(0) += 1;
            }
        }
    }
    let possible: HashSet<ASN> = sasns.keys().copied().chain(router.dests.iter().copied()).collect();

    if possible.is_empty() && hints.len() == 1 {
        return (*hints.iter().next().unwrap(), HINT_EXACT);
    }

    let intersection: HashSet<ASN> = possible.intersection(&hints).copied().collect();
    if intersection.len() == 1 {
        if hints.iter().any(|h| sasns.contains_key(h)) {
            utype_val |= HINT_SUCC;
        }
        if !hints.is_disjoint(&router.dests) {
            utype_val |= HINT_DEST;
        }
        return (*intersection.iter().next().unwrap(), utype_val);
    } else if intersection.len() > 2 {
        return (-1, utype_val);
    }

    let posorgs: HashSet<_> = possible.iter().map(|&a| as2org.org(a)).collect();
    let hintorgs: HashSet<_> = hints.iter().map(|&a| as2org.org(a)).collect();
    let interorgs: HashSet<_> = posorgs.intersection(&hintorgs).copied().collect();
    if !interorgs.is_empty() {
        if hintorgs.iter().any(|o| sasns.keys().any(|&a| as2org.org(a) == *o)) {
            utype_val |= HINT_ORG_SUCC;
        }
        if hintorgs.iter().any(|o| router.dests.iter().any(|&d| as2org.org(d) == *o)) {
            utype_val |= HINT_ORG_DEST;
        }
        return (*hints.iter().min().unwrap(), utype_val | HINT_ORG_EXACT);
    }

    if use_provider {
        let (asn, ut) = hidden_provider_hint(graph, router_id, bgp);
        if asn > 0 {
            return (asn, ut);
        }
    }

    (0, utype_val)
}

pub fn is_hint_utype(ut: i64) -> bool {
    utype::is_hint(ut)
}
