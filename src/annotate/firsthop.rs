//! First-hop annotator (§4.9): a monitor-local fixup using per-source
//! traceroute counters at the very first hop, rather than router
//! predecessors. Writes to a side cache, never to `iupdates`; runs once
//! after the refinement loop finishes, only for interfaces `iupdates`
//! never annotated.

use std::collections::HashMap;

use crate::external::Bgp;
use crate::graph::Graph;
use crate::shared::{ASN, InterfaceId};
use crate::updates::UpdatesStore;

/// Per-interface counts of the AS observed at traceroute sources reaching
/// it as their first hop. Populated by the monitor/ingestion layer
/// (out of scope here); this module only consumes it.
pub type FirstHopCounters = HashMap<InterfaceId, HashMap<ASN, u32>>;

pub fn annotate_firsthops(
    graph: &Graph,
    counters: &FirstHopCounters,
    iupdates: &UpdatesStore<InterfaceId>,
    bgp: &dyn Bgp,
) -> HashMap<InterfaceId, (ASN, i64)> {
    let mut caches = HashMap::new();

    for (&iid, counts) in counters {
        if iupdates.asn(iid) != -1 {
            continue;
        }
        let iface = graph.interface(iid);

        let &best_count = match counts.values().max() {
            Some(c) => c,
            None => continue,
        };
        let mut tied: Vec<ASN> = counts
            .iter()
            .filter(|&(_, &c)| c == best_count)
            .map(|(&a, _)| a)
            .collect();
        tied.sort_unstable();

        let result = if tied.len() == 1 {
            (tied[0], if counts.len() > 1 { 1 } else { 0 })
        } else {
            let related: Vec<ASN> = tied
                .iter()
                .copied()
                .filter(|&x| x == iface.asn || bgp.rel(x, iface.asn))
                .collect();
            let candidates: &[ASN] = if related.is_empty() { &tied } else { &related };
            match candidates
                .iter()
                .copied()
                .min_by_key(|&x| (x != iface.asn, -(bgp.conesize(x) as i64), x))
            {
                None => (-2, 2),
                Some(x) => (x, if candidates.len() == 1 && counts.len() > 1 { 1 } else { 2 }),
            }
        };
        caches.insert(iid, result);
    }

    caches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::bgp::TestBgp;

    fn one_router_graph(iface_asn: ASN) -> (Graph, InterfaceId) {
        let mut graph = Graph::new();
        let router = graph.new_router("r");
        let iface = graph.add_interface(router, "10.0.0.1", iface_asn, iface_asn);
        (graph, iface)
    }

    #[test]
    fn single_source_count_wins_outright() {
        let (graph, iface) = one_router_graph(100);
        let bgp = TestBgp::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();
        let counters = FirstHopCounters::from([(iface, HashMap::from([(100, 5)]))]);
        let caches = annotate_firsthops(&graph, &counters, &iupdates, &bgp);
        assert_eq!(caches.get(&iface), Some(&(100, 0)));
    }

    #[test]
    fn multiple_sources_same_winning_asn_gets_utype_one() {
        let (graph, iface) = one_router_graph(100);
        let bgp = TestBgp::new();
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();
        let counters = FirstHopCounters::from([(iface, HashMap::from([(100, 5), (200, 1)]))]);
        let caches = annotate_firsthops(&graph, &counters, &iupdates, &bgp);
        assert_eq!(caches.get(&iface), Some(&(100, 1)));
    }

    #[test]
    fn skips_interfaces_already_annotated_by_the_main_pass() {
        let (graph, iface) = one_router_graph(100);
        let bgp = TestBgp::new();
        let mut iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();
        iupdates.put(iface, 100, 100, 0);
        iupdates.advance();
        let counters = FirstHopCounters::from([(iface, HashMap::from([(200, 5)]))]);
        let caches = annotate_firsthops(&graph, &counters, &iupdates, &bgp);
        assert!(caches.get(&iface).is_none());
    }

    #[test]
    fn tie_prefers_own_asn_then_larger_cone() {
        let (graph, iface) = one_router_graph(300);
        let bgp = TestBgp::new().provider_customer(300, 301);
        let iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();
        let counters = FirstHopCounters::from([(iface, HashMap::from([(300, 2), (200, 2)]))]);
        let caches = annotate_firsthops(&graph, &counters, &iupdates, &bgp);
        assert_eq!(caches.get(&iface).map(|&(a, _)| a), Some(300));
    }
}
