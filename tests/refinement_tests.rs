//! End-to-end refinement-driver tests (§8): determinism, termination,
//! idempotence and monotone-evidence properties that only show up once a
//! whole graph is run through `graph_refinement`, not at the single-router
//! unit-test level already covered under `src/annotate/router.rs`.

use bdrmapit::annotate::graph_refinement;
use bdrmapit::annotate::interface::annotate_interfaces;
use bdrmapit::annotate::router::annotate_routers;
use bdrmapit::config::Config;
use bdrmapit::external::as2org::As2OrgTable;
use bdrmapit::external::bgp::TestBgp;
use bdrmapit::external::ixp_asns::IxpParticipantTable;
use bdrmapit::{Graph, Succ};

/// A small three-router chain: `origin` (asn 100) -> `mid` (asn 200, a
/// customer of 100) -> `last` (no successors, one interface at asn 300,
/// a customer of 200). `last` has no destinations so it falls through to
/// the no-dests last-hop branch.
fn build_chain_graph() -> Graph {
    let mut graph = Graph::new();

    let origin_router = graph.new_router("origin");
    let origin_iface = graph.add_interface(origin_router, "10.0.0.1", 100, 100);

    let mid_router = graph.new_router("mid");
    let mid_in = graph.add_interface(mid_router, "10.0.1.1", 200, 200);
    let mid_out = graph.add_interface(mid_router, "10.0.1.2", 200, 200);
    graph.add_succ(origin_iface, Succ::Interface(mid_in));
    graph.add_pred(mid_in, origin_router);

    let last_router = graph.new_router("last");
    let last_iface = graph.add_interface(last_router, "10.0.2.1", 300, 300);
    graph.add_succ(mid_out, Succ::Interface(last_iface));
    graph.add_pred(last_iface, mid_router);

    graph.validate();
    graph
}

fn bgp() -> TestBgp {
    TestBgp::new().provider_customer(100, 200).provider_customer(200, 300)
}

#[test]
fn determinism_across_repeated_runs() {
    let mut graph = build_chain_graph();
    let bgp = bgp();
    graph.set_dests(&bgp);
    let as2org = As2OrgTable::new();
    let ixp = IxpParticipantTable::new();
    let config = Config::new();

    let first = graph_refinement(&graph, &bgp, &as2org, &ixp, &config);
    let second = graph_refinement(&graph, &bgp, &as2org, &ixp, &config);

    assert_eq!(first.iterations_run, second.iterations_run);
    for rid in graph.router_ids() {
        assert_eq!(first.rupdates.get(rid), second.rupdates.get(rid));
    }
    for iid in graph.interface_ids() {
        assert_eq!(first.iupdates.get(iid), second.iupdates.get(iid));
    }
}

#[test]
fn termination_within_max_iterations() {
    let mut graph = build_chain_graph();
    let bgp = bgp();
    graph.set_dests(&bgp);
    let as2org = As2OrgTable::new();
    let ixp = IxpParticipantTable::new();
    let config = Config::new().with_max_iterations(10);

    let result = graph_refinement(&graph, &bgp, &as2org, &ixp, &config);
    assert!(result.iterations_run <= config.max_iterations);
    assert!(result.iterations_run >= 1);
}

#[test]
fn idempotent_extra_pass_after_convergence_produces_no_changes() {
    // §8 Idempotence, exercised at full-graph granularity: once
    // `graph_refinement` has converged, manually driving one more
    // router-then-interface pass over its own output must not record any
    // changes.
    let mut graph = build_chain_graph();
    let bgp = bgp();
    graph.set_dests(&bgp);
    let as2org = As2OrgTable::new();
    let ixp = IxpParticipantTable::new();
    let config = Config::new();

    let mut result = graph_refinement(&graph, &bgp, &as2org, &ixp, &config);

    let all_non_vrf: Vec<_> = graph.routers_with_succ().chain(graph.lasthop_routers()).collect();
    annotate_routers(
        &graph,
        all_non_vrf.into_iter(),
        &mut result.rupdates,
        &result.iupdates,
        &bgp,
        &as2org,
        &ixp,
        &config,
        false,
    );
    assert!(
        result.rupdates.changes().is_empty(),
        "router pass on an already-converged graph must not change anything"
    );

    result.rupdates.advance();
    let interfaces: Vec<_> = graph.interfaces_with_pred().collect();
    annotate_interfaces(&graph, interfaces.into_iter(), &mut result.iupdates, &result.rupdates, &bgp, &as2org);
    assert!(
        result.iupdates.changes().is_empty(),
        "interface pass on an already-converged graph must not change anything"
    );
}

#[test]
fn every_interface_and_router_gets_a_total_annotation() {
    // §7: inference is total — every input yields an (asn, utype) pair,
    // even when the real answer is "unknown" (-1 / -2).
    let mut graph = build_chain_graph();
    let bgp = bgp();
    graph.set_dests(&bgp);
    let as2org = As2OrgTable::new();
    let ixp = IxpParticipantTable::new();
    let config = Config::new();

    let result = graph_refinement(&graph, &bgp, &as2org, &ixp, &config);
    for rid in graph.router_ids() {
        if graph.router(rid).has_succ() || !graph.router(rid).interfaces.is_empty() {
            assert!(result.rupdates.get(rid).is_some(), "router {:?} never annotated", rid);
        }
    }
    for iid in graph.interfaces_with_pred() {
        assert!(result.iupdates.get(iid).is_some(), "interface {:?} never annotated", iid);
    }
}

#[test]
fn monotone_evidence_single_predecessor_propagates_router_annotation() {
    // §8 Monotone evidence: an interface with exactly one predecessor
    // whose router annotation is `a` ends up annotated `a` (it shares `a`'s
    // organization here), with utype 0 (single predecessor).
    let mut graph = build_chain_graph();
    let bgp = bgp();
    graph.set_dests(&bgp);
    let as2org = As2OrgTable::new();
    let ixp = IxpParticipantTable::new();
    let config = Config::new();

    let result = graph_refinement(&graph, &bgp, &as2org, &ixp, &config);

    let mid_in = graph.interface_by_address("10.0.1.1").unwrap();
    let origin_router = graph.interface(graph.interface_by_address("10.0.0.1").unwrap()).router;
    let origin_asn = result.rupdates.asn(origin_router);

    let mid_in_annotation = result.iupdates.get(mid_in).unwrap();
    if origin_asn > 0 {
        // `annotate_interface`'s single-predecessor branch (§4.8 step 2)
        // wins outright regardless of relation to the interface's own AS.
        assert_eq!(mid_in_annotation.asn, origin_asn);
        assert_eq!(mid_in_annotation.utype, 0);
    } else {
        // No usable predecessor vote -> ambiguous (§8's "-2" clause).
        assert_eq!(mid_in_annotation.asn, -2);
    }
}
