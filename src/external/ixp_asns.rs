//! `IxpAsns`: IXP sentinel ASN -> set of participant ASNs (§6).

use std::collections::{HashMap, HashSet};

use crate::shared::{ASN, AdapterLoadError};

pub trait IxpAsns: Send + Sync {
    fn participants(&self, ixp_sentinel: ASN) -> Option<&HashSet<ASN>>;
}

#[derive(Debug, Clone, Default)]
pub struct IxpParticipantTable {
    table: HashMap<ASN, HashSet<ASN>>,
}

impl IxpParticipantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sentinel: ASN, participants: HashSet<ASN>) {
        self.table.insert(sentinel, participants);
    }

    /// Lines of the form `<sentinel>|<asn>,<asn>,<asn>`.
    pub fn load_from_str(text: &str) -> Result<Self, AdapterLoadError> {
        let mut table = IxpParticipantTable::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '|');
            let sentinel: ASN = parts
                .next()
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|e| AdapterLoadError(format!("line {}: bad sentinel: {}", lineno + 1, e)))?;
            let rest = parts
                .next()
                .ok_or_else(|| AdapterLoadError(format!("line {}: missing participants", lineno + 1)))?;
            let mut participants = HashSet::new();
            for asn_str in rest.split(',') {
                let asn_str = asn_str.trim();
                if asn_str.is_empty() {
                    continue;
                }
                let asn: ASN = asn_str
                    .parse()
                    .map_err(|e| AdapterLoadError(format!("line {}: bad asn: {}", lineno + 1, e)))?;
                participants.insert(asn);
            }
            table.insert(sentinel, participants);
        }
        Ok(table)
    }
}

impl IxpAsns for IxpParticipantTable {
    fn participants(&self, ixp_sentinel: ASN) -> Option<&HashSet<ASN>> {
        self.table.get(&ixp_sentinel)
    }
}
