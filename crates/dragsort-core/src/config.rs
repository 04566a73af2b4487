#![forbid(unsafe_code)]

//! Sortable group configuration.
//!
//! A [`SortableConfig`] carries the two knobs a sortable group exposes: the
//! class applied to drop candidates and the [`SessionPolicy`]. With the
//! `config` feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! # dragsort.toml
//! target_class = "droptarget"
//! session_policy = "clear_on_end"
//! ```
//!
//! ```rust,ignore
//! let config = SortableConfig::from_toml_file("dragsort.toml")?.validated()?;
//! ```
//!
//! Missing fields fall back to [`SortableConfig::default`].

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::session::SessionPolicy;

/// Class applied to a candidate element while a compatible drag hovers it.
pub const DEFAULT_TARGET_CLASS: &str = "droptarget";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SortableConfig {
    /// Class name added to drop candidates, removed on drag-leave or drop.
    pub target_class: String,
    /// Whether drop/drag-end closes the drag session.
    pub session_policy: SessionPolicy,
}

impl Default for SortableConfig {
    fn default() -> Self {
        Self {
            target_class: DEFAULT_TARGET_CLASS.to_owned(),
            session_policy: SessionPolicy::default(),
        }
    }
}

impl SortableConfig {
    #[must_use]
    pub fn with_target_class(mut self, class: impl Into<String>) -> Self {
        self.target_class = class.into();
        self
    }

    #[must_use]
    pub fn with_session_policy(mut self, policy: SessionPolicy) -> Self {
        self.session_policy = policy;
        self
    }

    /// Validate the configuration.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.target_class.is_empty() {
            errors.push("target_class must not be empty".into());
        } else if self.target_class.chars().any(char::is_whitespace) {
            errors.push(format!(
                "target_class must be a single class name, got {:?}",
                self.target_class
            ));
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Run [`validate`](Self::validate), turning problems into an error.
    #[cfg(feature = "config")]
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Errors from loading a [`SortableConfig`].
#[cfg(feature = "config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
    #[error("invalid sortable config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_droptarget_and_clears_on_end() {
        let config = SortableConfig::default();
        assert_eq!(config.target_class, "droptarget");
        assert_eq!(config.session_policy, SessionPolicy::ClearOnEnd);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn empty_and_multi_word_classes_are_rejected() {
        let empty = SortableConfig::default().with_target_class("");
        assert_eq!(empty.validate().len(), 1);

        let spaced = SortableConfig::default().with_target_class("drop target");
        let errors = spaced.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("single class name"), "{errors:?}");
    }

    #[cfg(feature = "config")]
    mod loading {
        use super::*;
        use std::io::Write;

        #[test]
        fn toml_overrides_and_defaults() {
            let config = SortableConfig::from_toml_str(r#"session_policy = "retain""#)
                .expect("valid toml");
            assert_eq!(config.session_policy, SessionPolicy::Retain);
            assert_eq!(config.target_class, DEFAULT_TARGET_CLASS);
        }

        #[test]
        fn json_round_trip() {
            let config = SortableConfig::default().with_target_class("hover");
            let json = serde_json::to_string(&config).expect("serialize");
            let parsed = SortableConfig::from_json_str(&json).expect("parse");
            assert_eq!(parsed, config);
        }

        #[test]
        fn unknown_policy_is_a_parse_error() {
            let err = SortableConfig::from_toml_str(r#"session_policy = "sometimes""#)
                .expect_err("unknown variant");
            assert!(matches!(err, ConfigError::Toml(_)));
        }

        #[test]
        fn validated_reports_invalid_class() {
            let err = SortableConfig::from_json_str(r#"{"target_class": ""}"#)
                .expect("parse")
                .validated()
                .expect_err("empty class");
            assert!(matches!(err, ConfigError::Invalid(ref e) if e.len() == 1));
        }

        #[test]
        fn loads_from_file() {
            let mut file = tempfile::NamedTempFile::new().expect("tempfile");
            writeln!(file, "target_class = \"is-target\"").expect("write");
            let config = SortableConfig::from_toml_file(file.path()).expect("load");
            assert_eq!(config.target_class, "is-target");
        }

        #[test]
        fn missing_file_is_io_error() {
            let err = SortableConfig::from_json_file("/nonexistent/dragsort.json")
                .expect_err("missing file");
            assert!(matches!(err, ConfigError::Io(_)));
        }
    }
}
