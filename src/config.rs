//! Project-level configuration read from `.moai/config/config.json`.
//!
//! Loading never fails the engine: a missing or malformed document falls back
//! to [`ProjectConfig::default`], which assumes a Python project.

use crate::error::{ConfigError, ConfigErrorKind};
use crate::types::{AutoCorrectionConfig, PolicyValidationConfig};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the project config relative to the project root.
pub const CONFIG_PATH: &str = ".moai/config/config.json";

/// Paths the engine never validates or indexes.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/.git/**",
    "**/.claude/**",
    "**/.moai/docs/**",
    "**/.moai/reports/**",
    "**/.moai/analysis/**",
    "**/docs/generated/**",
    "**/templates/**",
    "**/examples/**",
    "**/node_modules/**",
    "**/target/**",
    "**/__pycache__/**",
    "**/*.backup",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        ProjectSection {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "python".to_string()
}

/// The subset of the project config document the engine reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
    /// Extra glob patterns added to [`DEFAULT_EXCLUDE_PATTERNS`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_patterns: Vec<String>,
    #[serde(default)]
    pub tag_policy: PolicyValidationConfig,
    #[serde(default)]
    pub auto_correction: AutoCorrectionConfig,
}

impl ProjectConfig {
    /// Reads `<root>/.moai/config/config.json`, falling back to the default on any error.
    pub fn load(root: &Path) -> ProjectConfig {
        match Self::try_load(root) {
            Ok(config) => config,
            Err(e) => {
                if e.kind != ConfigErrorKind::Missing {
                    tracing::warn!(error = %e, "ignoring unreadable project config");
                }
                ProjectConfig::default()
            }
        }
    }

    pub fn try_load(root: &Path) -> Result<ProjectConfig, ConfigError> {
        let path = root.join(CONFIG_PATH);
        let text = fs::read_to_string(&path).map_err(|e| ConfigError {
            kind: if e.kind() == std::io::ErrorKind::NotFound {
                ConfigErrorKind::Missing
            } else {
                ConfigErrorKind::Io
            },
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|mut e| {
            e.path = path;
            e
        })
    }

    pub fn from_json(text: &str) -> Result<ProjectConfig, ConfigError> {
        let config: ProjectConfig = serde_json::from_str(text).map_err(|e| ConfigError {
            kind: ConfigErrorKind::Syntax,
            path: PathBuf::from(CONFIG_PATH),
            message: e.to_string(),
        })?;
        // Surface bad user globs here rather than silently dropping them later.
        for pattern in &config.excluded_patterns {
            Glob::new(pattern).map_err(|e| ConfigError {
                kind: ConfigErrorKind::InvalidPattern,
                path: PathBuf::from(CONFIG_PATH),
                message: format!("invalid excluded pattern '{}': {}", pattern, e),
            })?;
        }
        Ok(config)
    }

    pub fn language(&self) -> &str {
        &self.project.language
    }

    /// Default excludes plus the configured ones, compiled.
    pub fn exclude_set(&self) -> ExcludeSet {
        ExcludeSet::new(
            DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .copied()
                .chain(self.excluded_patterns.iter().map(String::as_str)),
        )
    }
}

/// Compiled exclude globs, matched against project-relative paths.
#[derive(Clone, Debug)]
pub struct ExcludeSet {
    set: GlobSet,
}

impl ExcludeSet {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::debug!(pattern, error = %e, "skipping invalid exclude pattern"),
            }
        }
        let set = builder.build().unwrap_or_else(|_| GlobSet::empty());
        ExcludeSet { set }
    }

    /// True if `path` (relative or absolute) falls under an excluded pattern.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }

    /// True if `dir` or everything inside it is excluded, so a walk can prune it.
    ///
    /// `**/node_modules/**` matches the files under `node_modules`, not the
    /// directory itself; a placeholder child stands in for its contents.
    pub fn is_excluded_dir(&self, dir: &Path) -> bool {
        self.set.is_match(dir) || self.set.is_match(dir.join("_"))
    }
}

impl Default for ExcludeSet {
    fn default() -> Self {
        ProjectConfig::default().exclude_set()
    }
}
