use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateError;

/// Settings for an [`AggregateRegistry`](crate::aggregate::AggregateRegistry).
///
/// - `case_sensitive`: when false, names are ASCII-lowercased in both catalogs.
/// - `legacy_fallback`: consult the legacy registry when the catalog misses.
/// - `register_builtins`: preload count/sum/avg/min/max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub case_sensitive: bool,
    pub legacy_fallback: bool,
    pub register_builtins: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { case_sensitive: false, legacy_fallback: true, register_builtins: true }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// No built-ins and no legacy fallback.
    pub fn bare() -> Self {
        Self { case_sensitive: false, legacy_fallback: false, register_builtins: false }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn legacy_fallback(mut self, yes: bool) -> Self {
        self.legacy_fallback = yes;
        self
    }

    pub fn register_builtins(mut self, yes: bool) -> Self {
        self.register_builtins = yes;
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, AggregateError> {
        serde_json::from_str(text).map_err(|e| AggregateError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AggregateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AggregateError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_keys_take_defaults() {
        let c = RegistryConfig::from_json_str(r#"{ "case_sensitive": true }"#).unwrap();
        assert!(c.case_sensitive);
        assert!(c.legacy_fallback);
        assert!(c.register_builtins);
        assert_eq!(RegistryConfig::from_json_str("{}").unwrap(), RegistryConfig::default());
    }

    #[test]
    fn bad_json_is_a_config_error() {
        let err = RegistryConfig::from_json_str("{ case_sensitive: ").unwrap_err();
        assert!(matches!(err, AggregateError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "legacy_fallback": false, "register_builtins": false }}"#).unwrap();
        let c = RegistryConfig::from_file(file.path()).unwrap();
        assert_eq!(c, RegistryConfig::new().legacy_fallback(false).register_builtins(false));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = RegistryConfig::from_file(&path).unwrap_err();
        match err {
            AggregateError::Config(msg) => assert!(msg.contains("nope.json")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
