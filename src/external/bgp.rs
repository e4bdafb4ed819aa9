//! `Bgp`: relationship predicates and customer cones (§6). The concrete
//! `CaidaBgpTable` loader understands the CAIDA `as-rel2` line shape
//! (`asn1|asn2|rel_code`, `-1`=provider-customer, `0`=peer-peer) the same
//! way `as_graph_generators/caida.rs` does; cone computation generalizes
//! `ASGraph::calculate_provider_cone` (there, computed only for Tier-1 ASes)
//! to every AS that appears in the relationship table.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::shared::ASN;

pub trait Bgp: Send + Sync {
    fn rel(&self, a: ASN, b: ASN) -> bool {
        self.peer_rel(a, b) || self.provider_rel(a, b) || self.customer_rel(a, b)
    }
    /// `true` iff `b` is a provider of `a`.
    fn provider_rel(&self, a: ASN, b: ASN) -> bool;
    /// `true` iff `b` is a customer of `a`.
    fn customer_rel(&self, a: ASN, b: ASN) -> bool;
    fn peer_rel(&self, a: ASN, b: ASN) -> bool;
    /// `1` if `b` is a provider of `a`, `2` if `b` is a customer of `a`,
    /// `0` if they're peers, `-1` if unrelated.
    fn reltype(&self, a: ASN, b: ASN) -> i32 {
        if self.provider_rel(a, b) {
            1
        } else if self.customer_rel(a, b) {
            2
        } else if self.peer_rel(a, b) {
            0
        } else {
            -1
        }
    }
    fn providers(&self, a: ASN) -> HashSet<ASN>;
    fn peers(&self, a: ASN) -> HashSet<ASN>;
    fn customers(&self, a: ASN) -> HashSet<ASN>;
    fn conesize(&self, a: ASN) -> usize {
        self.cone(a).len()
    }
    fn cone(&self, a: ASN) -> &HashSet<ASN>;
}

fn empty_set() -> &'static HashSet<ASN> {
    static EMPTY: OnceLock<HashSet<ASN>> = OnceLock::new();
    EMPTY.get_or_init(HashSet::new)
}

#[derive(Debug, Clone, Default)]
pub struct CaidaBgpTable {
    providers: HashMap<ASN, HashSet<ASN>>,
    customers: HashMap<ASN, HashSet<ASN>>,
    peers: HashMap<ASN, HashSet<ASN>>,
    cone: HashMap<ASN, HashSet<ASN>>,
}

impl CaidaBgpTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a cached `as-rel2` file under `cache_dir`, fetching and
    /// decompressing it from CAIDA first if it isn't already cached.
    pub fn load_or_fetch(cache_dir: &std::path::Path, days_ago: i64) -> Result<Self, crate::shared::AdapterLoadError> {
        let path = crate::external::source::fetch_as_rel2(cache_dir, days_ago)?;
        let text = std::fs::read_to_string(&path)
            .map_err(|e| crate::shared::AdapterLoadError(format!("reading {}: {}", path.display(), e)))?;
        Self::load_from_str(&text)
    }

    fn add_provider_customer(&mut self, provider: ASN, customer: ASN) {
        self.customers.entry(provider).or_default().insert(customer);
        self.providers.entry(customer).or_default().insert(provider);
        self.providers.entry(provider).or_default();
        self.customers.entry(customer).or_default();
    }

    fn add_peer(&mut self, a: ASN, b: ASN) {
        self.peers.entry(a).or_default().insert(b);
        self.peers.entry(b).or_default().insert(a);
    }

    /// Lines of the form `<asn1>|<asn2>|<rel_code>`; `#`-prefixed comment
    /// lines (as in the CAIDA `as-rel2` format) are ignored.
    pub fn load_from_str(text: &str) -> Result<Self, crate::shared::AdapterLoadError> {
        let mut table = CaidaBgpTable::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() < 3 {
                return Err(crate::shared::AdapterLoadError(format!(
                    "line {}: expected asn1|asn2|rel_code",
                    lineno + 1
                )));
            }
            let asn1: ASN = parts[0].trim().parse().map_err(|e| {
                crate::shared::AdapterLoadError(format!("line {}: bad asn1: {}", lineno + 1, e))
            })?;
            let asn2: ASN = parts[1].trim().parse().map_err(|e| {
                crate::shared::AdapterLoadError(format!("line {}: bad asn2: {}", lineno + 1, e))
            })?;
            let rel: i32 = parts[2].trim().parse().map_err(|e| {
                crate::shared::AdapterLoadError(format!("line {}: bad rel code: {}", lineno + 1, e))
            })?;
            match rel {
                -1 => table.add_provider_customer(asn1, asn2),
                0 => table.add_peer(asn1, asn2),
                other => {
                    return Err(crate::shared::AdapterLoadError(format!(
                        "line {}: unknown relationship code {}",
                        lineno + 1,
                        other
                    )));
                }
            }
        }
        table.compute_cones();
        Ok(table)
    }

    fn compute_cones(&mut self) {
        let asns: Vec<ASN> = self
            .providers
            .keys()
            .chain(self.customers.keys())
            .chain(self.peers.keys())
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let mut cones: HashMap<ASN, HashSet<ASN>> = HashMap::new();
        for asn in asns {
            let mut visiting = HashSet::new();
            Self::cone_of(asn, &self.customers, &mut cones, &mut visiting);
        }
        self.cone = cones;
    }

    /// Recursive customer-descent cone, memoized; a cycle in the
    /// relationship data (malformed input) stops descent rather than
    /// recursing forever.
    fn cone_of(
        asn: ASN,
        customers: &HashMap<ASN, HashSet<ASN>>,
        cones: &mut HashMap<ASN, HashSet<ASN>>,
        visiting: &mut HashSet<ASN>,
    ) -> HashSet<ASN> {
        if let Some(existing) = cones.get(&asn) {
            return existing.clone();
        }
        if visiting.contains(&asn) {
            return HashSet::from([asn]);
        }
        visiting.insert(asn);
        let mut cone = HashSet::from([asn]);
        if let Some(kids) = customers.get(&asn) {
            for &kid in kids {
                let sub = Self::cone_of(kid, customers, cones, visiting);
                cone.extend(sub);
            }
        }
        visiting.remove(&asn);
        cones.insert(asn, cone.clone());
        cone
    }
}

impl Bgp for CaidaBgpTable {
    fn provider_rel(&self, a: ASN, b: ASN) -> bool {
        self.providers.get(&a).is_some_and(|s| s.contains(&b))
    }

    fn customer_rel(&self, a: ASN, b: ASN) -> bool {
        self.customers.get(&a).is_some_and(|s| s.contains(&b))
    }

    fn peer_rel(&self, a: ASN, b: ASN) -> bool {
        self.peers.get(&a).is_some_and(|s| s.contains(&b))
    }

    fn providers(&self, a: ASN) -> HashSet<ASN> {
        self.providers.get(&a).cloned().unwrap_or_default()
    }

    fn peers(&self, a: ASN) -> HashSet<ASN> {
        self.peers.get(&a).cloned().unwrap_or_default()
    }

    fn customers(&self, a: ASN) -> HashSet<ASN> {
        self.customers.get(&a).cloned().unwrap_or_default()
    }

    fn cone(&self, a: ASN) -> &HashSet<ASN> {
        self.cone.get(&a).unwrap_or_else(|| empty_set())
    }
}

/// In-memory test double built directly from relationship triples, for unit
/// tests that want to state "100 is a customer of 200" without a file.
#[derive(Debug, Clone, Default)]
pub struct TestBgp {
    inner: CaidaBgpTable,
}

impl TestBgp {
    pub fn new() -> Self {
        TestBgp {
            inner: CaidaBgpTable::new(),
        }
    }

    pub fn provider_customer(mut self, provider: ASN, customer: ASN) -> Self {
        self.inner.add_provider_customer(provider, customer);
        self.inner.compute_cones();
        self
    }

    pub fn peer(mut self, a: ASN, b: ASN) -> Self {
        self.inner.add_peer(a, b);
        self.inner.compute_cones();
        self
    }
}

impl Bgp for TestBgp {
    fn provider_rel(&self, a: ASN, b: ASN) -> bool {
        self.inner.provider_rel(a, b)
    }
    fn customer_rel(&self, a: ASN, b: ASN) -> bool {
        self.inner.customer_rel(a, b)
    }
    fn peer_rel(&self, a: ASN, b: ASN) -> bool {
        self.inner.peer_rel(a, b)
    }
    fn providers(&self, a: ASN) -> HashSet<ASN> {
        self.inner.providers(a)
    }
    fn peers(&self, a: ASN) -> HashSet<ASN> {
        self.inner.peers(a)
    }
    fn customers(&self, a: ASN) -> HashSet<ASN> {
        self.inner.customers(a)
    }
    fn cone(&self, a: ASN) -> &HashSet<ASN> {
        self.inner.cone(a)
    }
}
