//! Configuration loading and representation.
//!
//! Values come from environment variables; unset or empty variables fall back to
//! defaults. `TraceConfig::from_lookup` takes any key lookup so tests do not touch
//! the process environment.

use std::path::PathBuf;

use thiserror::Error;

use agritrace_core::ContractAddress;

use crate::adapter::EventQueryAdapter;
use crate::provenance::{ProvenanceReconstructor, SelectionPolicy};

pub const CONTRACT_ADDRESS_VAR: &str = "AGRITRACE_CONTRACT_ADDRESS";
pub const SELECTION_VAR: &str = "AGRITRACE_SELECTION";
pub const LEDGER_FILE_VAR: &str = "AGRITRACE_LEDGER_FILE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Settings for provenance reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceConfig {
    /// Supply-chain contract whose stage events are queried. Without it no stage
    /// selector can be built and every stage is reported unavailable.
    pub contract_address: Option<ContractAddress>,
    pub selection_policy: SelectionPolicy,
    /// JSON ledger snapshot to serve queries from (offline inspection).
    pub ledger_file: Option<PathBuf>,
}

impl TraceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let contract_address = get(CONTRACT_ADDRESS_VAR)
            .map(|v| v.trim().parse::<ContractAddress>())
            .transpose()
            .map_err(|e| ConfigError::Invalid {
                key: CONTRACT_ADDRESS_VAR,
                message: e.to_string(),
            })?;

        let selection_policy = get(SELECTION_VAR)
            .map(|v| v.parse::<SelectionPolicy>())
            .transpose()
            .map_err(|e| ConfigError::Invalid {
                key: SELECTION_VAR,
                message: e.to_string(),
            })?
            .unwrap_or_default();

        let ledger_file = get(LEDGER_FILE_VAR).map(PathBuf::from);

        Ok(Self {
            contract_address,
            selection_policy,
            ledger_file,
        })
    }

    /// Build a reconstructor over `connection` with these settings.
    pub fn reconstructor<C>(&self, connection: C) -> ProvenanceReconstructor<C> {
        ProvenanceReconstructor::new(EventQueryAdapter::new(connection, self.contract_address))
            .with_policy(self.selection_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = TraceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TraceConfig::default());
        assert_eq!(config.selection_policy, SelectionPolicy::EarliestPosition);
    }

    #[test]
    fn reads_all_values() {
        let config = TraceConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_VAR, "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            (SELECTION_VAR, "first"),
            (LEDGER_FILE_VAR, "/var/lib/agritrace/ledger.json"),
        ]))
        .unwrap();

        assert_eq!(
            config.contract_address.map(|a| a.to_string()),
            Some("0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string())
        );
        assert_eq!(config.selection_policy, SelectionPolicy::FirstInIterationOrder);
        assert_eq!(config.ledger_file, Some(PathBuf::from("/var/lib/agritrace/ledger.json")));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = TraceConfig::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, "  ")])).unwrap();
        assert_eq!(config.contract_address, None);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = TraceConfig::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, "0x12")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: CONTRACT_ADDRESS_VAR, .. }));

        let err = TraceConfig::from_lookup(lookup(&[(SELECTION_VAR, "random")])).unwrap_err();
        assert!(err.to_string().starts_with("invalid AGRITRACE_SELECTION"));
    }

    #[test]
    fn builds_reconstructor_with_configured_policy() {
        let config = TraceConfig {
            selection_policy: SelectionPolicy::FirstInIterationOrder,
            ..TraceConfig::default()
        };
        let reconstructor = config.reconstructor(crate::ledger::InMemoryLedger::new());
        assert_eq!(reconstructor.policy(), SelectionPolicy::FirstInIterationOrder);
        assert_eq!(reconstructor.adapter().contract(), None);
    }
}
