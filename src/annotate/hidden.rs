//! Hidden-AS search (§4.3): given a candidate annotation with no direct
//! relationship to any router origin, look for a single intermediary AS the
//! BGP customer/provider graph can justify, instead of admitting a
//! relationship-free guess.

use std::collections::HashMap;

use crate::annotate::helpers::{multi_customers, multi_providers};
use crate::external::{As2Org, Bgp};
use crate::shared::{ASN, utype};

pub fn hidden_asn(
    origin_counts: &HashMap<ASN, i64>,
    asn: ASN,
    base_utype: i64,
    votes: &HashMap<ASN, i64>,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    strict: bool,
    hidden_reverse: bool,
) -> (ASN, i64) {
    let origins: std::collections::HashSet<ASN> = origin_counts.keys().copied().collect();

    let providers_of_asn = bgp.providers(asn);
    let d: std::collections::HashSet<ASN> = multi_customers(&origins, bgp)
        .intersection(&providers_of_asn)
        .copied()
        .collect();

    let mut int_asn = if d.len() == 1 {
        d.into_iter().next()
    } else {
        None
    };

    if int_asn.is_none() && hidden_reverse {
        let customers_of_asn = bgp.customers(asn);
        let u: std::collections::HashSet<ASN> = multi_providers(&origins, bgp)
            .intersection(&customers_of_asn)
            .copied()
            .collect();
        if u.len() == 1 {
            int_asn = u.into_iter().next();
        }
    }

    if let Some(ia) = int_asn {
        let ia_org = as2org.org(ia);
        let intersects_a_vote = votes.keys().any(|&v| as2org.org(v) == ia_org);
        if intersects_a_vote {
            (asn, utype::HIDDEN_NOINTER + base_utype)
        } else {
            (ia, utype::HIDDEN_INTER + base_utype)
        }
    } else if strict {
        let best = most_voted_origin(origin_counts, bgp);
        match best {
            Some(origin) => (origin, utype::HIDDEN_NOINTER + base_utype),
            None => (asn, base_utype),
        }
    } else {
        (asn, base_utype)
    }
}

/// Origin with the highest occurrence count; ties broken by smaller
/// conesize, then larger ASN.
fn most_voted_origin(origin_counts: &HashMap<ASN, i64>, bgp: &dyn Bgp) -> Option<ASN> {
    let &best_count = origin_counts.values().max()?;
    origin_counts
        .iter()
        .filter(|&(_, &c)| c == best_count)
        .map(|(&a, _)| a)
        .min_by_key(|&a| (bgp.conesize(a) as i64, -a))
}
