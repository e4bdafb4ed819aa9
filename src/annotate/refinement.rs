//! Refinement driver (§4.10): sequences router annotation, VRF-router
//! annotation, and interface annotation into iteration passes, advancing
//! each `UpdatesStore` between phases, until the (router-map, interface-map)
//! snapshot pair recurs — a fixed point or the endpoint of a short limit
//! cycle (§8 Termination).

use std::collections::HashMap;

use crate::annotate::firsthop::{FirstHopCounters, annotate_firsthops};
use crate::annotate::interface::annotate_interfaces;
use crate::annotate::lasthop::annotate_lasthops;
use crate::annotate::progress::Progress;
use crate::annotate::router::annotate_routers;
use crate::annotate::vrf::annotate_vrf_routers;
use crate::config::Config;
use crate::external::{As2Org, Bgp, IxpAsns};
use crate::graph::Graph;
use crate::shared::{ASN, InterfaceId, RouterId};
use crate::updates::{Update, UpdatesStore};

/// Owns the two `UpdatesStore`s produced by a run. `rupdates`/`iupdates`
/// expose the stable public name from §4.1; `firsthop_cache` is the side
/// cache §4.9 writes to instead of `iupdates`.
pub struct AnnotationResult {
    pub rupdates: UpdatesStore<RouterId>,
    pub iupdates: UpdatesStore<InterfaceId>,
    pub firsthop_cache: HashMap<InterfaceId, (ASN, i64)>,
    pub iterations_run: usize,
}

type Snapshot = (HashMap<RouterId, Update>, HashMap<InterfaceId, Update>);

/// Runs the full refinement loop over `graph` per §4.10/§5. `graph.set_dests`
/// must already have been called (router `dests` are read throughout).
pub fn graph_refinement(
    graph: &Graph,
    bgp: &dyn Bgp,
    as2org: &dyn As2Org,
    ixp: &dyn IxpAsns,
    config: &Config,
) -> AnnotationResult {
    let mut rupdates: UpdatesStore<RouterId> = UpdatesStore::new();
    let mut iupdates: UpdatesStore<InterfaceId> = UpdatesStore::new();

    let routers: Vec<RouterId> = graph.routers_with_succ().collect();
    let lasthop_routers: Vec<RouterId> = graph.lasthop_routers().collect();
    let vrf_routers: Vec<RouterId> = graph.vrf_routers().collect();
    let interfaces: Vec<InterfaceId> = graph.interfaces_with_pred().collect();

    // Last-hop routers have no succ and never change across iterations, so
    // they're annotated once, straight into the advanced snapshot, before
    // the fixed-point loop begins (mirrors the VRF-router direct-write path).
    if !lasthop_routers.is_empty() {
        annotate_lasthops(graph, lasthop_routers.iter().copied(), &mut rupdates, bgp, as2org, config);
    }

    let mut previous_snapshots: Vec<Snapshot> = Vec::new();
    let mut iterations_run = 0;

    for iteration in 0..config.max_iterations {
        let pb = Progress::new(routers.len() as u64, "Annotating routers");
        annotate_routers(
            graph,
            routers.iter().copied(),
            &mut rupdates,
            &iupdates,
            bgp,
            as2org,
            ixp,
            config,
            iteration == 0,
        );
        pb.finish();
        rupdates.advance();

        if !vrf_routers.is_empty() {
            annotate_vrf_routers(graph, vrf_routers.iter().copied(), &mut rupdates, bgp, as2org, config);
        }

        let pb = Progress::new(interfaces.len() as u64, "Annotating interfaces");
        annotate_interfaces(graph, interfaces.iter().copied(), &mut iupdates, &rupdates, bgp, as2org);
        pb.finish();
        iupdates.advance();

        iterations_run = iteration + 1;

        let snapshot: Snapshot = (rupdates.snapshot(), iupdates.snapshot());
        if previous_snapshots.contains(&snapshot) {
            break;
        }
        previous_snapshots.push(snapshot);
    }

    AnnotationResult {
        rupdates,
        iupdates,
        firsthop_cache: HashMap::new(),
        iterations_run,
    }
}

/// Run the monitor-local first-hop fixup (§4.9) after the main refinement
/// loop, for interfaces `iupdates` never annotated.
pub fn run_firsthop(result: &mut AnnotationResult, graph: &Graph, counters: &FirstHopCounters, bgp: &dyn Bgp) {
    result.firsthop_cache = annotate_firsthops(graph, counters, &result.iupdates, bgp);
}
