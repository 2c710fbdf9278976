//! Configuration for the extraction pipeline.

use crate::errors::{ConfigError, SourceSaverError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Labels of UI actions that surface as query signatures but are not searches.
pub const DEFAULT_BLACKLIST: [&str; 9] = [
    "Подробный анализ",
    "Краткий пересказ",
    "Рецензия",
    "Дебаты",
    "Обучающее видео",
    "Слайды докладчика",
    "Вопросы",
    "Оглавление",
    "Audio Overview",
];

/// Tunables for the four extraction stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Longest trimmed string leaf that is still re-parsed as embedded JSON.
    #[serde(default = "default_max_embedded_len")]
    pub max_embedded_len: usize,
    /// Nesting depth past which embedded expansion stops for a branch.
    #[serde(default = "default_max_expand_depth")]
    pub max_expand_depth: usize,
    /// Total embedded re-parses allowed per extraction call.
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    /// Depth bound for the query-signature search.
    #[serde(default = "default_signature_depth_limit")]
    pub signature_depth_limit: usize,
    /// Levels below an array node inspected for link lists.
    #[serde(default = "default_link_scan_depth")]
    pub link_scan_depth: usize,
    /// Labels dropped in addition to [`DEFAULT_BLACKLIST`], which always applies.
    #[serde(default, alias = "blacklist")]
    pub extra_blacklist: Vec<String>,
}

fn default_max_embedded_len() -> usize {
    2_000_000
}

fn default_max_expand_depth() -> usize {
    64
}

fn default_max_expansions() -> usize {
    10_000
}

fn default_signature_depth_limit() -> usize {
    12
}

fn default_link_scan_depth() -> usize {
    2
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_embedded_len: default_max_embedded_len(),
            max_expand_depth: default_max_expand_depth(),
            max_expansions: default_max_expansions(),
            signature_depth_limit: default_signature_depth_limit(),
            link_scan_depth: default_link_scan_depth(),
            extra_blacklist: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    /// Creates a new extraction configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads overrides from a JSON document; missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, SourceSaverError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads overrides from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceSaverError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Sets the embedded-document length ceiling.
    #[must_use]
    pub fn with_max_embedded_len(mut self, len: usize) -> Self {
        self.max_embedded_len = len;
        self
    }

    /// Sets the expansion depth bound.
    #[must_use]
    pub fn with_max_expand_depth(mut self, depth: usize) -> Self {
        self.max_expand_depth = depth;
        self
    }

    /// Sets the total expansion budget.
    #[must_use]
    pub fn with_max_expansions(mut self, count: usize) -> Self {
        self.max_expansions = count;
        self
    }

    /// Sets the signature search depth bound.
    #[must_use]
    pub fn with_signature_depth_limit(mut self, depth: usize) -> Self {
        self.signature_depth_limit = depth;
        self
    }

    /// Sets the link-list scan window.
    #[must_use]
    pub fn with_link_scan_depth(mut self, depth: usize) -> Self {
        self.link_scan_depth = depth;
        self
    }

    /// Adds a label to the blacklist.
    #[must_use]
    pub fn with_blacklisted(mut self, label: impl Into<String>) -> Self {
        self.extra_blacklist.push(label.into());
        self
    }

    /// Every label that is dropped: the fixed set first, then the extras.
    pub fn blacklist(&self) -> impl Iterator<Item = &str> {
        DEFAULT_BLACKLIST
            .iter()
            .copied()
            .chain(self.extra_blacklist.iter().map(String::as_str))
    }

    /// Checks that every ceiling leaves room for work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_embedded_len < 2 {
            return Err(ConfigError::new(
                "max_embedded_len",
                "must allow at least a two-character document",
            ));
        }
        if self.max_expand_depth == 0 {
            return Err(ConfigError::new("max_expand_depth", "must be greater than zero"));
        }
        if self.max_expansions == 0 {
            return Err(ConfigError::new("max_expansions", "must be greater than zero"));
        }
        if self.signature_depth_limit == 0 {
            return Err(ConfigError::new(
                "signature_depth_limit",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.max_embedded_len, 2_000_000);
        assert_eq!(config.signature_depth_limit, 12);
        assert_eq!(config.link_scan_depth, 2);
        assert!(config.extra_blacklist.is_empty());
        assert_eq!(config.blacklist().count(), 9);
        assert!(config.blacklist().any(|l| l == "Audio Overview"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = ExtractionConfig::from_json_str(r#"{"max_expansions": 5}"#).unwrap();
        assert_eq!(config.max_expansions, 5);
        assert_eq!(config.max_expand_depth, 64);
        assert!(config.extra_blacklist.is_empty());
    }

    #[test]
    fn test_from_json_rejects_zero_depth() {
        let err = ExtractionConfig::from_json_str(r#"{"max_expand_depth": 0}"#).unwrap_err();
        assert!(matches!(err, SourceSaverError::Config(ref e) if e.field == "max_expand_depth"));
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        let err = ExtractionConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SourceSaverError::Serialization(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extra_blacklist": ["Also this"]}"#).unwrap();

        let config = ExtractionConfig::from_json_file(&path).unwrap();
        assert_eq!(config.extra_blacklist, vec!["Also this".to_string()]);
    }

    #[test]
    fn test_blacklist_override_only_adds_labels() {
        let config = ExtractionConfig::from_json_str(r#"{"blacklist": ["Only this"]}"#).unwrap();
        let labels: Vec<&str> = config.blacklist().collect();

        for label in DEFAULT_BLACKLIST {
            assert!(labels.contains(&label), "missing fixed label {label}");
        }
        assert_eq!(labels.last(), Some(&"Only this"));
        assert_eq!(labels.len(), 10);
    }

    #[test]
    fn test_builder_setters() {
        let config = ExtractionConfig::new()
            .with_max_embedded_len(100)
            .with_link_scan_depth(1)
            .with_blacklisted("Extra");
        assert_eq!(config.max_embedded_len, 100);
        assert_eq!(config.link_scan_depth, 1);
        assert_eq!(config.blacklist().last(), Some("Extra"));
    }
}
