//! Runs the annotation engine over a handful of small, illustrative graphs
//! built in-process and prints the resulting rows — the same "build a
//! couple of scenarios and print what happened" shape as the teacher's
//! `main.rs`, minus the BGP-propagation simulation itself.

use bdrmapit::config::Config;
use bdrmapit::external::{As2OrgTable, TestBgp};
use bdrmapit::graph::{Graph, Succ, VType, VrfEdge};
use bdrmapit::runner::InferenceRunner;
use bdrmapit::{AnnotationRow, IxpRow};

struct NoIxps;
impl bdrmapit::external::IxpAsns for NoIxps {
    fn participants(&self, _ixp_sentinel: bdrmapit::ASN) -> Option<&std::collections::HashSet<bdrmapit::ASN>> {
        None
    }
}

fn main() {
    println!("bdrmapit-rs - router/interface AS-ownership inference\n");

    run_clean_majority_example();
    println!("\n{}\n", "=".repeat(80));
    run_vrf_example();
}

/// A three-router chain: origin AS 100 -> one hop -> customer AS 200,
/// traversed twice. §8 scenario 1: expect a clean majority vote for 200.
fn run_clean_majority_example() {
    println!("Example 1: clean-majority router vote");
    println!("--------------------------------------");

    let mut graph = Graph::new();
    let origin = graph.new_router("origin");
    let oi = graph.add_interface(origin, "10.0.0.1", 100, 100);
    let next1 = graph.new_router("next-a");
    let n1i = graph.add_interface(next1, "10.0.0.2", 200, 200);
    let next2 = graph.new_router("next-b");
    let n2i = graph.add_interface(next2, "10.0.0.3", 200, 200);

    graph.add_succ(oi, Succ::Interface(n1i));
    graph.add_succ(oi, Succ::Interface(n2i));
    graph.add_pred(n1i, origin);
    graph.add_pred(n2i, origin);
    graph.validate();

    let bgp = TestBgp::new().provider_customer(100, 200);
    let as2org = As2OrgTable::new();
    let ixp = NoIxps;
    graph.set_dests(&bgp);

    let runner = InferenceRunner::new(&graph, &bgp, &as2org, &ixp, Config::new());
    let (result, rows, _ixp_rows) = runner.run().expect("valid config");
    println!("converged after {} iteration(s)", result.iterations_run);
    print_rows(&rows);
}

/// A VRF router forwarding between two directly-observed neighbors.
fn run_vrf_example() {
    println!("Example 2: VRF forwarding router");
    println!("---------------------------------");

    let mut graph = Graph::new();
    let right = graph.new_router("right");
    let ri = graph.add_interface(right, "10.1.0.2", 300, 300);
    let vrf_router = graph.new_router("vrf-core");
    graph.router_mut(vrf_router).vrf = true;
    let vi = graph.add_interface(vrf_router, "10.1.0.3", 0, 0);

    graph.add_succ(
        vi,
        Succ::Vrf(VrfEdge { target: right, vtype: VType::Forwarding }),
    );
    graph.add_pred(ri, vrf_router);
    graph.validate();

    let bgp = TestBgp::new();
    let as2org = As2OrgTable::new();
    let ixp = NoIxps;
    graph.set_dests(&bgp);

    let runner = InferenceRunner::new(&graph, &bgp, &as2org, &ixp, Config::new());
    let (result, rows, _ixp_rows) = runner.run().expect("valid config");
    println!("converged after {} iteration(s)", result.iterations_run);
    print_rows(&rows);
}

fn print_rows(rows: &[AnnotationRow]) {
    for row in rows {
        println!(
            "  {addr:<14} router={router:<10} r_asn={rasn:<6} r_utype={rutype:<10} i_asn={iasn:<6} i_utype={iutype}",
            addr = row.addr,
            router = row.router_name,
            rasn = row.router_asn,
            rutype = row.router_utype,
            iasn = row.iface_asn,
            iutype = row.iface_utype,
        );
    }
}

#[allow(dead_code)]
fn print_ixp_rows(rows: &[IxpRow]) {
    for row in rows {
        println!(
            "  {addr:<14} router={router} asn={asn} neighbor_asn={neighbor} ixp={ixp}",
            addr = row.addr,
            router = row.router_name,
            asn = row.router_asn,
            neighbor = row.neighbor_router_asn,
            ixp = row.ixp_id,
        );
    }
}
