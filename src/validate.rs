//! Policy validation of file content against the TAG rules.
//!
//! Returns **all** violations found, never an error. Discovery failures count
//! as "companion absent" and a validator past its timeout returns nothing, so
//! a write hook is never stalled by the engine.

use crate::classify::DirectoryClassifier;
use crate::config::ExcludeSet;
use crate::enums::*;
use crate::error::DiscoveryError;
use crate::index::ProjectIndex;
use crate::stubs::{spec_stub_path, test_stub_path};
use crate::tags::{duplicated_tags, extract_tags};
use crate::types::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Validates proposed or modified file content.
///
/// Holds the timeout clock, started at construction. A validator is meant
/// to serve one batch of hook calls; use [`PolicyValidator::restart_clock`]
/// to reuse it for another.
pub struct PolicyValidator<'a> {
    config: PolicyValidationConfig,
    index: &'a ProjectIndex,
    classifier: &'a dyn DirectoryClassifier,
    excludes: ExcludeSet,
    started: Instant,
}

impl<'a> PolicyValidator<'a> {
    pub fn new(
        config: PolicyValidationConfig,
        index: &'a ProjectIndex,
        classifier: &'a dyn DirectoryClassifier,
    ) -> Self {
        PolicyValidator {
            config,
            index,
            classifier,
            excludes: ExcludeSet::default(),
            started: Instant::now(),
        }
    }

    pub fn with_excludes(mut self, excludes: ExcludeSet) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn config(&self) -> &PolicyValidationConfig {
        &self.config
    }

    pub fn restart_clock(&mut self) {
        self.started = Instant::now();
    }

    /// Creation checks for paths not yet in the project, modification checks otherwise.
    pub fn validate(&self, file_path: &Path, content: &str) -> Vec<PolicyViolation> {
        if self.index.exists(file_path) {
            self.validate_after_modification(file_path, content)
        } else {
            self.validate_before_creation(file_path, content)
        }
    }

    /// Checks content about to be written to a new file.
    pub fn validate_before_creation(&self, file_path: &Path, content: &str) -> Vec<PolicyViolation> {
        let Some(rel) = self.gate(file_path) else {
            return Vec::new();
        };
        if self.index.exists(&rel) {
            return Vec::new();
        }

        let tags = extract_tags(content);
        let mut violations = Vec::new();

        if self.classifier.is_code_file(&rel) {
            if !tags.has(TagKind::Code) {
                specless_code(&rel, &mut violations);
            } else if self.config.require_spec_before_code {
                self.spec_reference(&rel, &tags, &mut violations);
            }
        }

        if self.classifier.is_test_file(&rel) {
            self.test_without_code(&rel, &tags, ViolationLevel::High, &mut violations);
        }

        violations
    }

    /// Checks content of a file that already exists.
    pub fn validate_after_modification(
        &self,
        file_path: &Path,
        content: &str,
    ) -> Vec<PolicyViolation> {
        let Some(rel) = self.gate(file_path) else {
            return Vec::new();
        };

        let tags = extract_tags(content);
        let mut violations = Vec::new();

        if self.classifier.is_code_file(&rel) && !tags.has(TagKind::Code) {
            missing_tags(&rel, &mut violations);
        }

        if self.config.require_test_for_code {
            self.code_without_test(&rel, &tags, &mut violations);
        }

        if self.classifier.is_test_file(&rel) {
            self.test_without_code(&rel, &tags, ViolationLevel::Medium, &mut violations);
        }

        if !self.config.allow_duplicate_tags {
            duplicate_tags(&rel, content, &mut violations);
        }

        violations
    }

    /// Project-relative path if the file is subject to validation at all.
    fn gate(&self, file_path: &Path) -> Option<PathBuf> {
        let elapsed = self.started.elapsed();
        if elapsed > self.config.validation_timeout {
            tracing::warn!(
                path = %file_path.display(),
                ?elapsed,
                "validation timeout exceeded, skipping"
            );
            return None;
        }
        let rel = self.index.relative(file_path);
        if !self.validates_extension(&rel) {
            tracing::debug!(path = %rel.display(), "extension not validated");
            return None;
        }
        if self.excludes.is_excluded(&rel) {
            tracing::debug!(path = %rel.display(), "path excluded");
            return None;
        }
        Some(rel)
    }

    fn validates_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.config
            .file_types_to_validate
            .iter()
            .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    // ─── Creation rules ─────────────────────────────────────────────────────

    fn spec_reference(&self, path: &Path, tags: &TagMap, violations: &mut Vec<PolicyViolation>) {
        for tag in unique(tags.get(TagKind::Code)) {
            if found(self.index.find_spec_file(tag), tag) {
                continue;
            }
            let action = if self.config.strict_mode {
                ViolationAction::Block
            } else {
                ViolationAction::Warn
            };
            violations.push(PolicyViolation {
                level: ViolationLevel::High,
                violation_type: ViolationType::NoSpecReference,
                tag: Some(tag.to_string()),
                message: format!(
                    "{} has no SPEC document declaring {}",
                    tag,
                    tag.with_kind(TagKind::Spec)
                ),
                file_path: path.to_path_buf(),
                action,
                guidance: format!(
                    "Write the SPEC first at {} (it must contain {}), or let auto-correction create a stub.",
                    spec_stub_path(tag).display(),
                    tag.with_kind(TagKind::Spec)
                ),
                auto_fix_possible: true,
            });
        }
    }

    fn test_without_code(
        &self,
        path: &Path,
        tags: &TagMap,
        level: ViolationLevel,
        violations: &mut Vec<PolicyViolation>,
    ) {
        for tag in unique(tags.get(TagKind::Test)) {
            if found(self.index.find_code_file(tag, self.classifier), tag) {
                continue;
            }
            violations.push(PolicyViolation {
                level,
                violation_type: ViolationType::ChainBreak,
                tag: Some(tag.to_string()),
                message: format!(
                    "{} has no code file declaring {}",
                    tag,
                    tag.with_kind(TagKind::Code)
                ),
                file_path: path.to_path_buf(),
                action: ViolationAction::Warn,
                guidance: format!(
                    "Tag the implementation under test with {} to close the SPEC -> CODE -> TEST chain.",
                    tag.with_kind(TagKind::Code)
                ),
                auto_fix_possible: false,
            });
        }
    }

    // ─── Modification rules ─────────────────────────────────────────────────

    fn code_without_test(&self, path: &Path, tags: &TagMap, violations: &mut Vec<PolicyViolation>) {
        for tag in unique(tags.get(TagKind::Code)) {
            if found(self.index.find_test_file(tag, self.classifier), tag) {
                continue;
            }
            violations.push(PolicyViolation {
                level: ViolationLevel::Medium,
                violation_type: ViolationType::ChainBreak,
                tag: Some(tag.to_string()),
                message: format!(
                    "{} has no test file declaring {}",
                    tag,
                    tag.with_kind(TagKind::Test)
                ),
                file_path: path.to_path_buf(),
                action: ViolationAction::Suggest,
                guidance: format!(
                    "Add tests tagged {} (for example {}).",
                    tag.with_kind(TagKind::Test),
                    test_stub_path(tag).display()
                ),
                auto_fix_possible: true,
            });
        }
    }
}

fn specless_code(path: &Path, violations: &mut Vec<PolicyViolation>) {
    violations.push(PolicyViolation {
        level: ViolationLevel::Critical,
        violation_type: ViolationType::SpeclessCode,
        tag: None,
        message: "new code file carries no @CODE tag".to_string(),
        file_path: path.to_path_buf(),
        action: ViolationAction::Block,
        guidance: "Write a SPEC under .moai/specs/ first, then add an @CODE:DOMAIN-NNN tag \
                   referencing it at the top of this file."
            .to_string(),
        auto_fix_possible: false,
    });
}

fn missing_tags(path: &Path, violations: &mut Vec<PolicyViolation>) {
    violations.push(PolicyViolation {
        level: ViolationLevel::High,
        violation_type: ViolationType::MissingTags,
        tag: None,
        message: "code file carries no @CODE tag".to_string(),
        file_path: path.to_path_buf(),
        action: ViolationAction::Suggest,
        guidance: "Add an @CODE:DOMAIN-NNN tag near the top of the file; \
                   auto-correction can suggest the next free number."
            .to_string(),
        auto_fix_possible: true,
    });
}

fn duplicate_tags(path: &Path, content: &str, violations: &mut Vec<PolicyViolation>) {
    for literal in duplicated_tags(content) {
        violations.push(PolicyViolation {
            level: ViolationLevel::Medium,
            violation_type: ViolationType::DuplicateTags,
            message: format!("{} appears more than once", literal),
            tag: Some(literal),
            file_path: path.to_path_buf(),
            action: ViolationAction::Warn,
            guidance: "Keep the first occurrence of the tag and remove the rest.".to_string(),
            auto_fix_possible: true,
        });
    }
}

/// Collapses a discovery result to "present?", logging why it is absent.
fn found(result: Result<PathBuf, DiscoveryError>, tag: &Tag) -> bool {
    match result {
        Ok(_) => true,
        Err(e @ DiscoveryError::Io { .. }) => {
            tracing::debug!(tag = %tag, error = %e, "treating unreadable companion as absent");
            false
        }
        Err(DiscoveryError::NotFound { .. }) => false,
    }
}

fn unique(tags: &[Tag]) -> Vec<&Tag> {
    let mut out: Vec<&Tag> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
