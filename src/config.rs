//! Inference configuration (§6 "Config flags recognized"). A plain
//! builder-with-`with_*` struct, the same shape as the teacher's
//! `ScenarioConfig`/`EngineRunConfig`, validated once at construction rather
//! than threaded through every call as loose booleans.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::shared::{ASN, ConfigError};

/// Mirrors `Config` field-for-field; exists so a config file can omit any
/// subset of fields and fall back to `Config::new()`'s defaults, the way
/// `EngineRunConfig::to_json` treats its builder fields as optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    strict: Option<bool>,
    skipua: Option<bool>,
    hidden_reverse: Option<bool>,
    norelpeer: Option<HashSet<ASN>>,
    max_iterations: Option<usize>,
    usehints: Option<bool>,
    use_provider: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Refuse to annotate with an unrelated AS when no better evidence
    /// exists (§4.3, §4.6). Default on.
    pub strict: bool,
    /// Skip successors with an unknown (`0`) origin instead of inheriting
    /// the successor router's current annotation (§4.4 step 2).
    pub skipua: bool,
    /// Enable the provider-of-origin branch of the hidden-AS search (§4.3
    /// step 2).
    pub hidden_reverse: bool,
    /// ASNs the operator has flagged as peer-like even absent a BGP peer
    /// relationship (§4.2 `isnorelpeer`).
    pub norelpeer: HashSet<ASN>,
    /// Bound on `graph_refinement` iterations (§4.10, §5).
    pub max_iterations: usize,
    /// Enable hint-based router overrides and the hidden-provider hint in
    /// first-hop/last-hop (§6). The hint-population mechanism itself is out
    /// of scope (see DESIGN.md); this only gates consumption of
    /// `router.hints`/`interface.hint` when present.
    pub usehints: bool,
    pub use_provider: bool,
}

/// Default location for fetched CAIDA artifacts, mirroring
/// `CAIDAASGraphCollector::new(cache_dir)`'s caller-supplied cache
/// directory but defaulted the way a CLI would via `dirs`.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("bdrmapit")
}

impl Config {
    pub fn new() -> Self {
        Config {
            strict: true,
            skipua: false,
            hidden_reverse: false,
            norelpeer: HashSet::new(),
            max_iterations: 10,
            usehints: false,
            use_provider: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_skipua(mut self, skipua: bool) -> Self {
        self.skipua = skipua;
        self
    }

    pub fn with_hidden_reverse(mut self, hidden_reverse: bool) -> Self {
        self.hidden_reverse = hidden_reverse;
        self
    }

    pub fn with_norelpeer(mut self, norelpeer: HashSet<ASN>) -> Self {
        self.norelpeer = norelpeer;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_usehints(mut self, usehints: bool) -> Self {
        self.usehints = usehints;
        self
    }

    pub fn with_use_provider(mut self, use_provider: bool) -> Self {
        self.use_provider = use_provider;
        self
    }

    /// Parse a JSON config file (§6 CLI surface: "invocation takes a config
    /// file"), validating the result before returning it. An unparseable
    /// file is a "Configuration error" (§7) — it surfaces as one message,
    /// not a panic.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|e| ConfigError(format!("invalid config: {e}")))?;
        let defaults = Config::new();
        let cfg = Config {
            strict: file.strict.unwrap_or(defaults.strict),
            skipua: file.skipua.unwrap_or(defaults.skipua),
            hidden_reverse: file.hidden_reverse.unwrap_or(defaults.hidden_reverse),
            norelpeer: file.norelpeer.unwrap_or(defaults.norelpeer),
            max_iterations: file.max_iterations.unwrap_or(defaults.max_iterations),
            usehints: file.usehints.unwrap_or(defaults.usehints),
            use_provider: file.use_provider.unwrap_or(defaults.use_provider),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fail-fast validation (§7 "Configuration error"): `max_iterations`
    /// must be positive or the refinement driver could never run a single
    /// router/interface pass, and `use_provider`/`hidden_reverse` without
    /// `usehints` is nonsensical since there would be no hints to consume.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError("max_iterations must be at least 1".to_string()));
        }
        if self.use_provider && !self.usehints {
            return Err(ConfigError(
                "use_provider requires usehints to be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::new();
        assert!(cfg.strict);
        assert!(!cfg.skipua);
        assert!(!cfg.hidden_reverse);
        assert_eq!(cfg.max_iterations, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_iterations() {
        let cfg = Config::new().with_max_iterations(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_use_provider_without_hints() {
        let cfg = Config::new().with_use_provider(true);
        assert!(cfg.validate().is_err());
        let cfg = cfg.with_usehints(true);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_fills_in_defaults() {
        let cfg = Config::from_json_str(r#"{"strict": false, "max_iterations": 3}"#).unwrap();
        assert!(!cfg.strict);
        assert_eq!(cfg.max_iterations, 3);
        assert!(!cfg.skipua);
    }

    #[test]
    fn from_json_rejects_invalid_combination() {
        let err = Config::from_json_str(r#"{"use_provider": true}"#);
        assert!(err.is_err());
    }
}
