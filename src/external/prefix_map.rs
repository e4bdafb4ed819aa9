//! `PrefixMap`: address -> ASN, with negative sentinels for IXP and private
//! space (§6). Implemented as a longest-prefix-match binary trie, the same
//! shape as `route_validator.rs::ROASNode` but keyed on plain ASN instead of
//! a set of ROAs, fronted by an `lru` cache for repeated lookups (the
//! corpus already depends on `lru` for exactly this kind of cache).

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Mutex;

use ipnetwork::IpNetwork;
use lru::LruCache;

use crate::shared::ASN;

pub trait PrefixMap: Send + Sync {
    fn asn(&self, addr: &str) -> ASN;
}

struct TrieNode {
    asn: Option<ASN>,
    children: [Option<Box<TrieNode>>; 2],
}

impl TrieNode {
    fn new() -> Self {
        TrieNode {
            asn: None,
            children: [None, None],
        }
    }
}

/// One binary trie per address family, indexed by the address's bits
/// (most significant bit first).
struct BitTrie {
    root: TrieNode,
}

impl BitTrie {
    fn new() -> Self {
        BitTrie {
            root: TrieNode::new(),
        }
    }

    fn insert(&mut self, bits: u128, prefix_len: u8, asn: ASN) {
        let mut node = &mut self.root;
        for i in 0..prefix_len {
            let bit = ((bits >> (127 - i)) & 1) as usize;
            node = node.children[bit].get_or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.asn = Some(asn);
    }

    /// Longest matching prefix, or `None` if the address is not covered.
    fn lookup(&self, bits: u128, addr_width: u8) -> Option<ASN> {
        let mut node = &self.root;
        let mut best = node.asn;
        for i in 0..addr_width {
            let bit = ((bits >> (127 - i)) & 1) as usize;
            match &node.children[bit] {
                Some(child) => {
                    node = child;
                    if node.asn.is_some() {
                        best = node.asn;
                    }
                }
                None => break,
            }
        }
        best
    }
}

/// left-justify an address's bits into the top of a `u128` so both IPv4 and
/// IPv6 can walk the same bit-indexed trie.
fn to_bits(net: &IpNetwork) -> (u128, u8) {
    match net {
        IpNetwork::V4(n) => ((u32::from(n.ip()) as u128) << 96, n.prefix()),
        IpNetwork::V6(n) => (u128::from(n.ip()), n.prefix()),
    }
}

fn addr_to_bits(addr: &IpAddr) -> (u128, u8) {
    match addr {
        IpAddr::V4(v4) => ((u32::from(*v4) as u128) << 96, 32),
        IpAddr::V6(v6) => (u128::from(*v6), 128),
    }
}

/// A prefix -> ASN table built once and queried read-only during inference
/// and graph construction.
pub struct PrefixTrie {
    v4: BitTrie,
    v6: BitTrie,
    cache: Mutex<LruCache<String, ASN>>,
}

impl PrefixTrie {
    pub fn new() -> Self {
        PrefixTrie {
            v4: BitTrie::new(),
            v6: BitTrie::new(),
            cache: Mutex::new(LruCache::new(std::num::NonZeroUsize::new(1 << 16).unwrap())),
        }
    }

    pub fn insert(&mut self, prefix: IpNetwork, asn: ASN) {
        let (bits, len) = to_bits(&prefix);
        match prefix {
            IpNetwork::V4(_) => self.v4.insert(bits, len, asn),
            IpNetwork::V6(_) => self.v6.insert(bits, len, asn),
        }
    }

    /// Parse `asn1|asn2...` is not this format; lines are
    /// `<prefix>|<asn>`, e.g. `192.0.2.0/24|64500` or `100::/32|-100` for an
    /// IXP sentinel prefix.
    pub fn load_from_str(text: &str) -> Result<Self, crate::shared::AdapterLoadError> {
        let mut trie = PrefixTrie::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '|');
            let prefix_str = parts.next().unwrap_or("");
            let asn_str = parts.next().ok_or_else(|| {
                crate::shared::AdapterLoadError(format!("line {}: missing ASN field", lineno + 1))
            })?;
            let prefix = IpNetwork::from_str(prefix_str).map_err(|e| {
                crate::shared::AdapterLoadError(format!("line {}: bad prefix: {}", lineno + 1, e))
            })?;
            let asn: ASN = asn_str.trim().parse().map_err(|e| {
                crate::shared::AdapterLoadError(format!("line {}: bad asn: {}", lineno + 1, e))
            })?;
            trie.insert(prefix, asn);
        }
        Ok(trie)
    }
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixMap for PrefixTrie {
    fn asn(&self, addr: &str) -> ASN {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(&asn) = cache.get(addr) {
                return asn;
            }
        }
        let asn = match IpAddr::from_str(addr) {
            Ok(ip) => {
                let (bits, width) = addr_to_bits(&ip);
                let trie = if ip.is_ipv4() { &self.v4 } else { &self.v6 };
                trie.lookup(bits, width).unwrap_or(0)
            }
            Err(_) => 0,
        };
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(addr.to_string(), asn);
        }
        asn
    }
}

/// In-memory test double: exact-address map, defaulting to `0` (unknown).
pub struct TestPrefixMap {
    pub table: std::collections::HashMap<String, ASN>,
}

impl TestPrefixMap {
    pub fn new() -> Self {
        TestPrefixMap {
            table: std::collections::HashMap::new(),
        }
    }

    pub fn with(mut self, addr: impl Into<String>, asn: ASN) -> Self {
        self.table.insert(addr.into(), asn);
        self
    }
}

impl Default for TestPrefixMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixMap for TestPrefixMap {
    fn asn(&self, addr: &str) -> ASN {
        self.table.get(addr).copied().unwrap_or(0)
    }
}
