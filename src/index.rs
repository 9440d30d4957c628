//! Read-only index of project files.
//!
//! The index is built once by the caller and shared by the validator and the
//! corrector. Paths are stored relative to the project root; file content is
//! read on first access and cached. An index can also be assembled in memory
//! with [`ProjectIndex::from_files`], which never touches the filesystem.

use crate::classify::DirectoryClassifier;
use crate::config::ExcludeSet;
use crate::enums::TagKind;
use crate::error::DiscoveryError;
use crate::tags::{contains_tag, find_tags};
use crate::types::Tag;
use globset::Glob;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Where SPEC documents live, in lookup order. `{id}` is `DOMAIN-NNN`.
pub const SPEC_CANDIDATE_PATTERNS: &[&str] = &[
    ".moai/specs/SPEC-{id}/spec.md",
    ".moai/specs/SPEC-{id}/*.md",
    ".moai/specs/**/*.md",
];

#[derive(Debug, Default)]
struct IndexedFile {
    content: OnceLock<Result<String, DiscoveryError>>,
}

impl IndexedFile {
    fn loaded(content: Result<String, DiscoveryError>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(content);
        IndexedFile { content: cell }
    }
}

/// Snapshot of the files in a project.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    root: Option<PathBuf>,
    files: BTreeMap<PathBuf, IndexedFile>,
}

impl ProjectIndex {
    /// Walks `root`, skipping excluded paths. Content is not read yet.
    pub fn scan(root: impl Into<PathBuf>, excludes: &ExcludeSet) -> ProjectIndex {
        let root = root.into();
        let mut files = BTreeMap::new();
        let walker = WalkDir::new(&root).follow_links(false).into_iter();
        for entry in walker.filter_entry(|e| {
            e.depth() == 0
                || e
                    .path()
                    .strip_prefix(&root)
                    .map(|rel| {
                        if e.file_type().is_dir() {
                            !excludes.is_excluded_dir(rel)
                        } else {
                            !excludes.is_excluded(rel)
                        }
                    })
                    .unwrap_or(true)
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&root) {
                files.insert(rel.to_path_buf(), IndexedFile::default());
            }
        }
        tracing::debug!(root = %root.display(), files = files.len(), "indexed project");
        ProjectIndex {
            root: Some(root),
            files,
        }
    }

    /// In-memory index over `(relative path, content)` pairs.
    pub fn from_files<I, P, S>(files: I) -> ProjectIndex
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let mut index = ProjectIndex::default();
        for (path, content) in files {
            index.insert(path, content);
        }
        index
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Adds or replaces a file with known content.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path: PathBuf = path.into();
        let path = self.relative(&path);
        self.files
            .insert(path, IndexedFile::loaded(Ok(content.into())));
    }

    /// Records a file whose content cannot be read.
    pub fn insert_unreadable(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        let path: PathBuf = path.into();
        let path = self.relative(&path);
        let err = DiscoveryError::Io {
            path: path.clone(),
            message: message.into(),
        };
        self.files.insert(path, IndexedFile::loaded(Err(err)));
    }

    /// Drops the cached content of `path` so the next read goes to disk again.
    pub fn refresh(&mut self, path: &Path) {
        let path = self.relative(path);
        self.files.insert(path, IndexedFile::default());
    }

    /// `path` relative to the index root when it lies under it, otherwise unchanged.
    pub fn relative(&self, path: &Path) -> PathBuf {
        let stripped = match &self.root {
            Some(root) => path.strip_prefix(root).unwrap_or(path),
            None => path,
        };
        stripped
            .strip_prefix("./")
            .unwrap_or(stripped)
            .to_path_buf()
    }

    /// `path` resolved against the root, for filesystem access.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// True if the file is indexed or, for a disk-backed index, exists now.
    pub fn exists(&self, path: &Path) -> bool {
        let rel = self.relative(path);
        if self.files.contains_key(&rel) {
            return true;
        }
        self.root.is_some() && self.absolute(&rel).is_file()
    }

    /// Content of an indexed file, read from disk on first access.
    pub fn read(&self, path: &Path) -> Result<&str, DiscoveryError> {
        let rel = self.relative(path);
        let Some(file) = self.files.get(&rel) else {
            return Err(DiscoveryError::NotFound {
                tag: rel.display().to_string(),
            });
        };
        file.content
            .get_or_init(|| self.load(&rel))
            .as_deref()
            .map_err(Clone::clone)
    }

    fn load(&self, rel: &Path) -> Result<String, DiscoveryError> {
        let Some(root) = &self.root else {
            return Err(DiscoveryError::NotFound {
                tag: rel.display().to_string(),
            });
        };
        // Binary files are scanned like any other text.
        fs::read(root.join(rel))
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|e| DiscoveryError::Io {
                path: rel.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// First SPEC document that declares `@SPEC:<id>` for the tag's id.
    pub fn find_spec_file(&self, tag: &Tag) -> Result<PathBuf, DiscoveryError> {
        let spec_tag = tag.with_kind(TagKind::Spec);
        let id = tag.id();
        let mut failure = None;
        for pattern in SPEC_CANDIDATE_PATTERNS {
            let glob = match Glob::new(&pattern.replace("{id}", &id)) {
                Ok(glob) => glob.compile_matcher(),
                Err(_) => continue,
            };
            let candidates = self.paths().filter(|p| glob.is_match(p));
            if let Some(found) = self.first_declaring(candidates, &spec_tag, &mut failure) {
                return Ok(found);
            }
        }
        Err(failure.unwrap_or(DiscoveryError::NotFound {
            tag: spec_tag.to_string(),
        }))
    }

    /// First code file that declares `@CODE:<id>`.
    pub fn find_code_file(
        &self,
        tag: &Tag,
        classifier: &dyn DirectoryClassifier,
    ) -> Result<PathBuf, DiscoveryError> {
        let code_tag = tag.with_kind(TagKind::Code);
        let mut failure = None;
        let candidates = self.paths().filter(|p| classifier.is_code_file(p));
        self.first_declaring(candidates, &code_tag, &mut failure)
            .ok_or_else(|| {
                failure.unwrap_or(DiscoveryError::NotFound {
                    tag: code_tag.to_string(),
                })
            })
    }

    /// First test file that declares `@TEST:<id>`.
    pub fn find_test_file(
        &self,
        tag: &Tag,
        classifier: &dyn DirectoryClassifier,
    ) -> Result<PathBuf, DiscoveryError> {
        let test_tag = tag.with_kind(TagKind::Test);
        let mut failure = None;
        let candidates = self.paths().filter(|p| classifier.is_test_file(p));
        self.first_declaring(candidates, &test_tag, &mut failure)
            .ok_or_else(|| {
                failure.unwrap_or(DiscoveryError::NotFound {
                    tag: test_tag.to_string(),
                })
            })
    }

    fn first_declaring<'a>(
        &self,
        candidates: impl Iterator<Item = &'a Path>,
        tag: &Tag,
        failure: &mut Option<DiscoveryError>,
    ) -> Option<PathBuf> {
        for path in candidates {
            match self.read(path) {
                Ok(content) if contains_tag(content, tag) => return Some(path.to_path_buf()),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "candidate unreadable");
                    failure.get_or_insert(e);
                }
            }
        }
        None
    }

    /// Sequence numbers already used by any tag kind for `domain`, project-wide.
    pub fn existing_numbers(&self, domain: &str) -> BTreeSet<u32> {
        let mut numbers = BTreeSet::new();
        for path in self.paths() {
            let Ok(content) = self.read(path) else {
                continue;
            };
            numbers.extend(
                find_tags(content)
                    .into_iter()
                    .filter(|m| m.tag.domain == domain)
                    .map(|m| m.tag.sequence),
            );
        }
        numbers
    }
}
