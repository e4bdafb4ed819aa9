//! `As2Org`: ASN -> organization id, organization -> sibling ASN set.
//! File-loadable from a simplified `asn|org_id` table. An ASN absent from
//! the table is its own singleton organization (§7 data-error policy) — not
//! an error, since partial AS2Org coverage is the normal case.

use std::collections::HashMap;

use crate::shared::{ASN, AdapterLoadError, OrgId};

pub trait As2Org: Send + Sync {
    fn org(&self, asn: ASN) -> OrgId;
    fn siblings(&self, asn: ASN) -> std::collections::HashSet<ASN>;
}

#[derive(Debug, Clone, Default)]
pub struct As2OrgTable {
    org_of: HashMap<ASN, OrgId>,
    members_of: HashMap<OrgId, std::collections::HashSet<ASN>>,
}

impl As2OrgTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a cached AS2Org table under `cache_dir`, fetching the
    /// newest one linked from the CAIDA index page first if needed.
    pub fn load_or_fetch(cache_dir: &std::path::Path) -> Result<Self, AdapterLoadError> {
        let path = crate::external::source::fetch_as2org_latest(cache_dir)?;
        let text = std::fs::read_to_string(&path)
            .map_err(|e| AdapterLoadError(format!("reading {}: {}", path.display(), e)))?;
        Self::load_from_str(&text)
    }

    pub fn insert(&mut self, asn: ASN, org: OrgId) {
        self.org_of.insert(asn, org);
        self.members_of.entry(org).or_default().insert(asn);
    }

    /// Lines of the form `<asn>|<org_id>`.
    pub fn load_from_str(text: &str) -> Result<Self, AdapterLoadError> {
        let mut table = As2OrgTable::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '|');
            let asn: ASN = parts
                .next()
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|e| AdapterLoadError(format!("line {}: bad asn: {}", lineno + 1, e)))?;
            let org: OrgId = parts
                .next()
                .ok_or_else(|| AdapterLoadError(format!("line {}: missing org id", lineno + 1)))?
                .trim()
                .parse()
                .map_err(|e| AdapterLoadError(format!("line {}: bad org id: {}", lineno + 1, e)))?;
            table.insert(asn, org);
        }
        Ok(table)
    }
}

impl As2Org for As2OrgTable {
    fn org(&self, asn: ASN) -> OrgId {
        self.org_of.get(&asn).copied().unwrap_or(asn)
    }

    fn siblings(&self, asn: ASN) -> std::collections::HashSet<ASN> {
        let org = self.org(asn);
        self.members_of
            .get(&org)
            .cloned()
            .unwrap_or_else(|| std::collections::HashSet::from([asn]))
    }
}
