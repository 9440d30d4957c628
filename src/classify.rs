//! Path classification: code vs. test vs. everything else, and the domain a
//! code file belongs to.
//!
//! The engine only consumes these answers; projects with other layouts plug
//! in their own [`DirectoryClassifier`].

use crate::config::ProjectConfig;
use std::path::{Component, Path};

/// Extensions treated as source code regardless of project language.
pub const KNOWN_CODE_EXTENSIONS: &[&str] = &[
    "py", "pyi", "js", "jsx", "mjs", "cjs", "ts", "tsx", "go", "rs", "java", "kt", "kts", "swift",
    "dart", "rb", "php", "c", "h", "cpp", "hpp", "cc", "cs", "scala", "lua", "sql", "sh",
];

/// Directory names whose contents are never code.
pub const NON_CODE_DIRS: &[&str] = &[
    "docs",
    "doc",
    "tests",
    "test",
    "__tests__",
    "templates",
    "examples",
    ".moai",
    ".claude",
    ".github",
    "node_modules",
];

const TEST_DIRS: &[&str] = &["tests", "test", "__tests__"];

/// Extension point for deciding what a path is.
///
/// Paths are project-relative when the engine calls in.
pub trait DirectoryClassifier {
    /// True if the path is a source file that must carry a `@CODE:` tag.
    fn is_code_file(&self, path: &Path) -> bool;

    /// True if the path is a test file.
    fn is_test_file(&self, path: &Path) -> bool;

    /// Upper-case domain for a code file, or `None` when none can be derived.
    fn extract_domain(&self, path: &Path) -> Option<String> {
        extract_domain_from_path(path)
    }
}

/// Default classifier driven by the project language.
#[derive(Clone, Debug)]
pub struct LanguageClassifier {
    code_extensions: Vec<String>,
}

impl LanguageClassifier {
    pub fn new(language: &str) -> Self {
        let code_extensions: &[&str] = match language.to_ascii_lowercase().as_str() {
            "python" => &["py", "pyi"],
            "javascript" => &["js", "jsx", "mjs", "cjs"],
            "typescript" => &["ts", "tsx", "js", "jsx", "mjs", "cjs"],
            "go" => &["go"],
            "rust" => &["rs"],
            "java" => &["java"],
            "kotlin" => &["kt", "kts"],
            "swift" => &["swift"],
            "dart" | "flutter" => &["dart"],
            "ruby" => &["rb"],
            "php" => &["php"],
            "c" | "cpp" | "c++" => &["c", "h", "cpp", "hpp", "cc"],
            "csharp" | "c#" => &["cs"],
            _ => KNOWN_CODE_EXTENSIONS,
        };
        LanguageClassifier {
            code_extensions: code_extensions.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.language())
    }

    pub fn code_extensions(&self) -> &[String] {
        &self.code_extensions
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::from_config(&ProjectConfig::default())
    }
}

impl DirectoryClassifier for LanguageClassifier {
    fn is_code_file(&self, path: &Path) -> bool {
        let Some(ext) = extension(path) else {
            return false;
        };
        if !self.code_extensions.iter().any(|e| *e == ext) {
            return false;
        }
        if self.is_test_file(path) {
            return false;
        }
        !dir_segments(path).any(|seg| NON_CODE_DIRS.contains(&seg))
    }

    fn is_test_file(&self, path: &Path) -> bool {
        if dir_segments(path).any(|seg| TEST_DIRS.contains(&seg)) {
            return true;
        }
        let name = file_name(path).unwrap_or_default();
        let stem = file_stem(path).unwrap_or_default();
        name.starts_with("test_")
            || stem.ends_with("_test")
            || name.contains(".test.")
            || name.contains(".spec.")
    }
}

/// True if the extension is one of [`KNOWN_CODE_EXTENSIONS`].
pub fn has_code_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| KNOWN_CODE_EXTENSIONS.contains(&ext.as_str()))
}

/// Derives a tag domain from a code file path.
///
/// In priority order:
/// 1. test files (a `tests` segment or a `test_` file name) have no domain;
/// 2. under `src/`, the directory right after `src`;
/// 3. otherwise the immediate parent directory;
/// 4. a file with no usable parent falls back to its stem, accepted only if
///    it is letters and hyphens.
///
/// Names are upper-cased with `_` turned into `-`.
pub fn extract_domain_from_path(path: &Path) -> Option<String> {
    let segments: Vec<&str> = normal_segments(path).collect();
    let (file, dirs) = segments.split_last()?;

    if dirs.contains(&"tests") || file.starts_with("test_") {
        return None;
    }

    if let Some(pos) = dirs.iter().position(|d| *d == "src") {
        if let Some(dir) = dirs.get(pos + 1) {
            return normalize_domain(dir);
        }
    } else if let Some(parent) = dirs.last() {
        return normalize_domain(parent);
    }

    let stem = file_stem(path)?;
    let domain = stem.to_uppercase().replace('_', "-");
    if !domain.is_empty() && domain.chars().all(|c| c.is_ascii_uppercase() || c == '-') {
        Some(domain)
    } else {
        None
    }
}

fn normalize_domain(name: &str) -> Option<String> {
    let domain = name.to_uppercase().replace('_', "-");
    let valid = !domain.is_empty()
        && !domain.starts_with('-')
        && domain
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    valid.then_some(domain)
}

fn normal_segments(path: &Path) -> impl Iterator<Item = &str> {
    path.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    })
}

fn dir_segments(path: &Path) -> impl Iterator<Item = &str> {
    normal_segments(path.parent().unwrap_or(Path::new("")))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|n| n.to_str())
}
