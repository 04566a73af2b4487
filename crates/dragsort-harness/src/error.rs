use std::io;
use std::path::PathBuf;

use dragsort_core::{ConfigError, SortableError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scenario TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sortable(#[from] SortableError),

    #[error("unknown list: {0}")]
    UnknownList(String),

    #[error("unknown scalar element: {0}")]
    UnknownScalar(String),

    #[error("list {list} has no element at index {index}")]
    UnknownElement { list: String, index: usize },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("{count} list(s) differ from the expected order")]
    Mismatch { count: usize },

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl HarnessError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidScenario(message.into())
    }

    /// Process exit code: 1 for an order mismatch, 2 for anything that kept
    /// the scenario from running.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Mismatch { .. } => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_exits_with_one_everything_else_two() {
        assert_eq!(HarnessError::Mismatch { count: 2 }.exit_code(), 1);
        assert_eq!(HarnessError::UnknownList("todo".into()).exit_code(), 2);
        assert_eq!(HarnessError::invalid("no lists").exit_code(), 2);
    }

    #[test]
    fn io_error_names_the_path() {
        let err = HarnessError::Io {
            path: PathBuf::from("missing.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read missing.toml: gone");
    }

    #[test]
    fn sortable_errors_pass_through_unchanged() {
        let inner = SortableError::invalid_binding("title");
        let err = HarnessError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
    }
}
