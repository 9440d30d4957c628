//! Auto-correction of policy violations.
//!
//! Generation is side-effect free: every fix is a text transform
//! `(content) -> content`, folded left to right over the violations of one
//! file, plus any stub files the fix wants created. Nothing touches disk until
//! [`AutoCorrector::apply_corrections`].

use crate::classify::{DirectoryClassifier, has_code_extension};
use crate::enums::*;
use crate::error::CorrectionError;
use crate::index::ProjectIndex;
use crate::stubs::{spec_stub, test_stub};
use crate::tags::{parse_tag, tag_spans};
use crate::types::*;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Confidence of a duplicate-tag removal.
pub const DUPLICATE_REMOVAL_CONFIDENCE: f64 = 0.95;

/// Confidence of a fix that creates a SPEC or TEST stub.
pub const STUB_CONFIDENCE: f64 = 0.8;

/// Highest sequence number that still fits the three-digit tag format.
pub const MAX_SEQUENCE: u32 = 999;

pub struct AutoCorrector<'a> {
    config: AutoCorrectionConfig,
    index: &'a ProjectIndex,
    classifier: &'a dyn DirectoryClassifier,
}

impl<'a> AutoCorrector<'a> {
    pub fn new(
        config: AutoCorrectionConfig,
        index: &'a ProjectIndex,
        classifier: &'a dyn DirectoryClassifier,
    ) -> Self {
        AutoCorrector {
            config,
            index,
            classifier,
        }
    }

    pub fn config(&self) -> &AutoCorrectionConfig {
        &self.config
    }

    /// One correction per fixable violation, grouped by file.
    ///
    /// Each file is read once; corrections to the same file are chained so
    /// the second starts from the first's output. Files that cannot be read
    /// are skipped.
    pub fn generate_corrections(&self, violations: &[PolicyViolation]) -> Vec<AutoCorrection> {
        let mut groups: Vec<(PathBuf, Vec<&PolicyViolation>)> = Vec::new();
        for v in violations {
            match groups.iter_mut().find(|(path, _)| *path == v.file_path) {
                Some((_, group)) => group.push(v),
                None => groups.push((v.file_path.clone(), vec![v])),
            }
        }

        let mut corrections = Vec::new();
        for (path, group) in groups {
            let Some(content) = self.read_target(&path) else {
                continue;
            };
            corrections.extend(self.correct_content(&path, &content, &group));
        }
        corrections
    }

    /// Folds `violations` over `content` without reading anything from disk.
    pub fn correct_content(
        &self,
        file_path: &Path,
        content: &str,
        violations: &[&PolicyViolation],
    ) -> Vec<AutoCorrection> {
        let mut current = content.to_string();
        let mut corrections = Vec::new();
        for violation in violations {
            if let Some(correction) = self.correction_for(file_path, &current, violation) {
                current = correction.corrected_content.clone();
                corrections.push(correction);
            }
        }
        corrections
    }

    fn correction_for(
        &self,
        file_path: &Path,
        content: &str,
        violation: &PolicyViolation,
    ) -> Option<AutoCorrection> {
        match violation.violation_type {
            ViolationType::MissingTags => self.fix_missing_tag(file_path, content),
            ViolationType::DuplicateTags if self.config.remove_duplicates => {
                let literal = violation.tag.as_deref()?;
                Some(AutoCorrection::new(
                    file_path,
                    content,
                    remove_duplicate_tag(content, literal),
                    format!("Remove repeated occurrences of {}", literal),
                    DUPLICATE_REMOVAL_CONFIDENCE,
                ))
            }
            ViolationType::NoSpecReference if self.config.create_missing_specs => {
                self.fix_spec_reference(file_path, content, &violation.parsed_tag()?)
            }
            ViolationType::ChainBreak if self.config.create_missing_tests => {
                // Only the CODE side of a broken chain has a stub to offer.
                let tag = violation.parsed_tag().filter(|t| t.kind == TagKind::Code)?;
                self.fix_chain_break(file_path, content, &tag)
            }
            _ => None,
        }
    }

    fn fix_missing_tag(&self, file_path: &Path, content: &str) -> Option<AutoCorrection> {
        let Some(suggestion) = self.suggest_tag_for_code_file(file_path) else {
            tracing::debug!(path = %file_path.display(), "no domain derivable, skipping tag insertion");
            return None;
        };
        Some(AutoCorrection::new(
            file_path,
            content,
            insert_tag_comment(content, file_path, &suggestion.tag),
            format!("Insert {}", suggestion.tag),
            suggestion.confidence,
        ))
    }

    fn fix_spec_reference(
        &self,
        file_path: &Path,
        content: &str,
        tag: &Tag,
    ) -> Option<AutoCorrection> {
        let stub = spec_stub(tag);
        let corrected = append_spec_reference(content, &tag.to_string(), &stub.path);
        let mut correction = AutoCorrection::new(
            file_path,
            content,
            corrected,
            format!("Create {} and reference it from {}", stub.path.display(), tag),
            STUB_CONFIDENCE,
        );
        if !self.index.exists(&stub.path) {
            correction = correction.with_stub(stub);
        }
        Some(correction)
    }

    fn fix_chain_break(&self, file_path: &Path, content: &str, tag: &Tag) -> Option<AutoCorrection> {
        let stub = test_stub(tag);
        if self.index.exists(&stub.path) {
            tracing::debug!(path = %stub.path.display(), "test stub path taken, not overwriting");
            return None;
        }
        Some(
            AutoCorrection::new(
                file_path,
                content,
                content,
                format!("Create {} for {}", stub.path.display(), tag),
                STUB_CONFIDENCE,
            )
            .with_stub(stub),
        )
    }

    /// Proposes the next free `@CODE:` tag for a code file, with a confidence score.
    ///
    /// Returns `None` for test files and paths with no derivable domain.
    pub fn suggest_tag_for_code_file(&self, file_path: &Path) -> Option<TagSuggestion> {
        let rel = self.index.relative(file_path);
        let domain = self.classifier.extract_domain(&rel)?;
        // No lock: two concurrent callers can compute the same number.
        let number = next_available_number(&self.index.existing_numbers(&domain));
        let confidence = tag_confidence(&rel, &domain);
        Some(TagSuggestion {
            tag: Tag::new(TagKind::Code, domain, number),
            confidence,
        })
    }

    /// Writes every correction at or above the threshold.
    ///
    /// Returns true only if all of them were written. Corrections already
    /// written stay written when a later one fails.
    ///
    /// Corrections to one file are chained, so each carries the edits of the
    /// ones before it. Once a content change to a file is not written, later
    /// content changes to that file are not written either.
    pub fn apply_corrections(&self, corrections: &[AutoCorrection]) -> bool {
        if !self.config.enable_auto_fix {
            tracing::debug!(count = corrections.len(), "auto-fix disabled, nothing applied");
            return false;
        }
        let mut backed_up = HashSet::new();
        let mut held_back: HashSet<PathBuf> = HashSet::new();
        let mut all_applied = true;
        for correction in corrections {
            let changes = correction.changes_content();
            if changes && held_back.contains(&correction.file_path) {
                tracing::warn!(
                    path = %correction.file_path.display(),
                    description = %correction.description,
                    "correction builds on an unapplied one, skipping"
                );
                all_applied = false;
                continue;
            }
            let backup = self.config.backup_before_fix
                && changes
                && !backed_up.contains(&correction.file_path);
            match self.write_correction(correction, backup) {
                Ok(()) => {
                    if backup {
                        backed_up.insert(correction.file_path.clone());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        path = %correction.file_path.display(),
                        error = %e,
                        "correction not applied"
                    );
                    if changes {
                        held_back.insert(correction.file_path.clone());
                    }
                    all_applied = false;
                }
            }
        }
        all_applied
    }

    /// Writes one correction, backing up the original first if configured.
    pub fn apply_correction(&self, correction: &AutoCorrection) -> Result<(), CorrectionError> {
        let backup = self.config.backup_before_fix && correction.changes_content();
        self.write_correction(correction, backup)
    }

    fn write_correction(
        &self,
        correction: &AutoCorrection,
        backup: bool,
    ) -> Result<(), CorrectionError> {
        if !self.config.enable_auto_fix {
            return Err(CorrectionError::Disabled);
        }
        if correction.confidence < self.config.confidence_threshold {
            return Err(CorrectionError::BelowThreshold {
                confidence: correction.confidence,
                threshold: self.config.confidence_threshold,
            });
        }

        let target = self.index.absolute(&correction.file_path);
        if backup {
            write_file(&backup_path(&target), &correction.original_content)?;
        }
        for stub in &correction.stub_files {
            let path = self.index.absolute(&stub.path);
            if path.exists() {
                tracing::debug!(path = %path.display(), "stub already exists, leaving it");
                continue;
            }
            write_file(&path, &stub.content)?;
            tracing::info!(path = %path.display(), "created stub");
        }
        if correction.changes_content() {
            write_file(&target, &correction.corrected_content)?;
        }
        tracing::info!(
            path = %correction.file_path.display(),
            confidence = correction.confidence,
            description = %correction.description,
            "applied correction"
        );
        Ok(())
    }

    fn read_target(&self, path: &Path) -> Option<String> {
        if self.index.root().is_some() {
            let abs = self.index.absolute(path);
            return match fs::read(&abs) {
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    tracing::debug!(path = %abs.display(), error = %e, "cannot read correction target");
                    None
                }
            };
        }
        match self.index.read(path) {
            Ok(content) => Some(content.to_string()),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "correction target not indexed");
                None
            }
        }
    }
}

/// Smallest unused number in `1..=999`, or one past the maximum once the range is full.
pub fn next_available_number(existing: &BTreeSet<u32>) -> u32 {
    (1..=MAX_SEQUENCE)
        .find(|n| !existing.contains(n))
        .unwrap_or_else(|| existing.last().map_or(1, |max| max + 1))
}

/// Confidence that `domain` is the right domain for `path`.
///
/// 0.5 base, +0.2 under `src/`, +0.2 when the file stem names the domain,
/// +0.1 for a known code extension.
pub fn tag_confidence(path: &Path, domain: &str) -> f64 {
    // Tenths, to keep 0.8 an exact 0.8.
    let mut score = 5u32;
    let under_src = path
        .components()
        .any(|c| matches!(c, Component::Normal(s) if s == "src"));
    if under_src {
        score += 2;
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_uppercase()
        .replace('_', "-");
    if !domain.is_empty() && stem.contains(domain) {
        score += 2;
    }
    if has_code_extension(path) {
        score += 1;
    }
    f64::from(score.min(10)) / 10.0
}

// ─── Text transforms ────────────────────────────────────────────────────────

/// Line comment syntax for a file: `(open, close)`.
pub fn comment_syntax(path: &Path) -> (&'static str, &'static str) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "py" | "pyi" | "rb" | "sh" | "bash" | "yaml" | "yml" | "toml" | "r" | "pl" => ("#", ""),
        "sql" | "lua" | "hs" => ("--", ""),
        "md" | "html" | "htm" | "xml" | "vue" | "svelte" => ("<!--", " -->"),
        "css" => ("/*", " */"),
        _ => ("//", ""),
    }
}

fn comment_prefixes(open: &str) -> &'static [&'static str] {
    match open {
        "#" => &["#"],
        "--" => &["--"],
        "<!--" => &["<!--"],
        _ => &["//", "/*", "*"],
    }
}

fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") { "\r\n" } else { "\n" }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Inserts `tag` as a comment line at the first eligible position.
///
/// After a shebang, after a leading Python docstring, otherwise before the
/// first line that is neither blank nor a comment.
pub fn insert_tag_comment(content: &str, path: &Path, tag: &Tag) -> String {
    let (open, close) = comment_syntax(path);
    let eol = line_ending(content);
    let tag_line = format!("{} {}{}{}", open, tag, close, eol);
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let at = insertion_line(&lines, comment_prefixes(open));

    let mut out = String::with_capacity(content.len() + tag_line.len() + 1);
    for line in &lines[..at] {
        out.push_str(line);
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    out.push_str(&tag_line);
    for line in &lines[at..] {
        out.push_str(line);
    }
    out
}

fn insertion_line(lines: &[&str], comment_prefixes: &[&str]) -> usize {
    let start = match lines.first() {
        Some(first) if first.starts_with("#!") => 1,
        _ => 0,
    };

    if let Some(end) = docstring_end(lines, start) {
        return end + 1;
    }

    lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !comment_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .map_or(start, |(i, _)| i)
}

/// Index of the closing line of a docstring opening at the first non-blank line.
fn docstring_end(lines: &[&str], start: usize) -> Option<usize> {
    let (open_at, first) = lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, line)| !line.trim().is_empty())?;
    let trimmed = first.trim();
    let quote = ["\"\"\"", "'''"]
        .into_iter()
        .find(|q| trimmed.starts_with(q))?;
    if trimmed.len() >= 6 && trimmed[3..].contains(quote) {
        return Some(open_at);
    }
    lines
        .iter()
        .enumerate()
        .skip(open_at + 1)
        .find(|(_, line)| line.contains(quote))
        .map(|(i, _)| i)
}

/// Keeps the first occurrence of `literal` and removes the rest.
///
/// Occurrences are matched as tags, so a longer tag that merely contains the
/// literal text is left alone. A line left with nothing but comment markers
/// is dropped entirely; other lines only lose the tag text.
pub fn remove_duplicate_tag(content: &str, literal: &str) -> String {
    let Some(target) = parse_tag(literal) else {
        return content.to_string();
    };
    let mut out = String::with_capacity(content.len());
    let mut kept = false;
    for line in content.split_inclusive('\n') {
        let (body, eol) = split_line_ending(line);
        let spans = tag_spans(body, &target);
        if spans.is_empty() {
            out.push_str(line);
            continue;
        }
        let keeps_first = !kept;
        let mut residue = String::with_capacity(body.len());
        let mut last = 0;
        for (start, end) in spans {
            if kept {
                residue.push_str(&body[last..start]);
            } else {
                kept = true;
                residue.push_str(&body[last..end]);
            }
            last = end;
        }
        residue.push_str(&body[last..]);
        if !keeps_first && is_bare_comment(&residue) {
            continue;
        }
        out.push_str(&residue);
        out.push_str(eol);
    }
    out
}

fn is_bare_comment(text: &str) -> bool {
    text.trim()
        .trim_matches(|c: char| c.is_whitespace() || "#/*-<>!;".contains(c))
        .is_empty()
}

/// Appends `| SPEC: <path>` to the first line carrying `code_tag`.
///
/// Lines that already cite a SPEC are left alone. The suffix goes before a
/// closing `-->` or `*/` when the tag sits in a block comment.
pub fn append_spec_reference(content: &str, code_tag: &str, spec_path: &Path) -> String {
    let Some(target) = parse_tag(code_tag) else {
        return content.to_string();
    };
    let reference = format!(" | SPEC: {}", spec_path.display());
    let mut out = String::with_capacity(content.len() + reference.len());
    let mut done = false;
    for line in content.split_inclusive('\n') {
        if done || tag_spans(line, &target).is_empty() {
            out.push_str(line);
            continue;
        }
        done = true;
        let (body, eol) = split_line_ending(line);
        if body.contains("SPEC:") && !body.contains("@SPEC:") {
            out.push_str(line);
            continue;
        }
        let trimmed = body.trim_end();
        let close = ["-->", "*/"].into_iter().find(|c| trimmed.ends_with(c));
        match close {
            Some(close) => {
                let head = trimmed[..trimmed.len() - close.len()].trim_end();
                out.push_str(head);
                out.push_str(&reference);
                out.push(' ');
                out.push_str(close);
            }
            None => {
                out.push_str(trimmed);
                out.push_str(&reference);
            }
        }
        out.push_str(eol);
    }
    out
}

fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

fn write_file(path: &Path, content: &str) -> Result<(), CorrectionError> {
    let io_err = |e: std::io::Error| CorrectionError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)
}
