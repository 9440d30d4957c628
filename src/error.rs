use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Produced by the companion-discovery helpers of [`crate::index::ProjectIndex`].
///
/// Both variants mean "no companion file"; they are kept apart so callers and
/// tests can tell a genuinely missing file from one that could not be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoveryError {
    /// No candidate file declares the requested tag.
    NotFound { tag: String },
    /// At least one candidate could not be read and none matched.
    Io { path: PathBuf, message: String },
}

impl DiscoveryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiscoveryError::NotFound { .. })
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::NotFound { tag } => write!(f, "no file declares {}", tag),
            DiscoveryError::Io { path, message } => {
                write!(f, "failed to read {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Error kind for project configuration loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigErrorKind {
    Missing,
    Io,
    Syntax,
    InvalidPattern,
}

/// Produced by [`crate::config::ProjectConfig::try_load`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Why a single correction was not written.
#[derive(Clone, Debug, PartialEq)]
pub enum CorrectionError {
    /// `enable_auto_fix` is off.
    Disabled,
    /// The correction's confidence is under the configured threshold.
    BelowThreshold { confidence: f64, threshold: f64 },
    /// Writing the target, its backup, or a stub failed.
    Io { path: PathBuf, message: String },
}

impl fmt::Display for CorrectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionError::Disabled => write!(f, "auto-fix is disabled"),
            CorrectionError::BelowThreshold {
                confidence,
                threshold,
            } => write!(
                f,
                "confidence {:.2} is below threshold {:.2}",
                confidence, threshold
            ),
            CorrectionError::Io { path, message } => {
                write!(f, "failed to write {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for CorrectionError {}
