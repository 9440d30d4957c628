//! TAG traceability policy engine.
//!
//! Enforces a spec-before-code discipline over `@SPEC:`, `@CODE:`, `@TEST:`
//! and `@DOC:` annotations. A write hook hands the engine a path and the
//! content about to land there; the engine reports violations and can
//! propose, and optionally apply, corrections:
//!
//! ```text
//! (path, content) → validate → [PolicyViolation] → generate_corrections → [AutoCorrection]
//!                                                 → apply_corrections → files on disk
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use tag_policy::{PolicyEngine, ProjectIndex, ViolationType};
//!
//! let index = ProjectIndex::from_files([(".moai/specs/SPEC-AUTH-001/spec.md", "# @SPEC:AUTH-001")]);
//! let engine = PolicyEngine::with_index(index);
//!
//! let violations = engine.validate_before_creation(Path::new("src/auth/service.py"), "def login(): pass\n");
//! assert_eq!(violations[0].violation_type, ViolationType::SpeclessCode);
//! assert!(violations[0].should_block_operation());
//! ```

pub mod classify;
pub mod config;
pub mod correct;
pub mod enums;
pub mod error;
pub mod index;
pub mod report;
pub mod stubs;
pub mod tags;
pub mod types;
pub mod validate;

pub use classify::{DirectoryClassifier, LanguageClassifier};
pub use config::{ExcludeSet, ProjectConfig};
pub use correct::AutoCorrector;
pub use enums::*;
pub use error::*;
pub use index::ProjectIndex;
pub use report::create_validation_report;
pub use tags::extract_tags;
pub use types::*;
pub use validate::PolicyValidator;

use std::path::{Path, PathBuf};

/// Validator, corrector and the project snapshot they share, behind one value.
///
/// Each validation call gets a fresh [`PolicyValidator`], so the validation
/// timeout applies per call.
pub struct PolicyEngine {
    index: ProjectIndex,
    classifier: Box<dyn DirectoryClassifier>,
    excludes: ExcludeSet,
    validation: PolicyValidationConfig,
    correction: AutoCorrectionConfig,
}

impl PolicyEngine {
    /// Loads `.moai/config/config.json` under `root` (or defaults) and indexes the project.
    pub fn open(root: impl Into<PathBuf>) -> PolicyEngine {
        let root = root.into();
        let config = ProjectConfig::load(&root);
        let excludes = config.exclude_set();
        let index = ProjectIndex::scan(&root, &excludes);
        Self::new(&config, index, Box::new(LanguageClassifier::from_config(&config)))
    }

    pub fn new(
        config: &ProjectConfig,
        index: ProjectIndex,
        classifier: Box<dyn DirectoryClassifier>,
    ) -> PolicyEngine {
        PolicyEngine {
            index,
            classifier,
            excludes: config.exclude_set(),
            validation: config.tag_policy.clone(),
            correction: config.auto_correction.clone(),
        }
    }

    /// Default configuration over a prepared index.
    pub fn with_index(index: ProjectIndex) -> PolicyEngine {
        let config = ProjectConfig::default();
        Self::new(&config, index, Box::new(LanguageClassifier::from_config(&config)))
    }

    pub fn with_validation_config(mut self, config: PolicyValidationConfig) -> Self {
        self.validation = config;
        self
    }

    pub fn with_correction_config(mut self, config: AutoCorrectionConfig) -> Self {
        self.correction = config;
        self
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut ProjectIndex {
        &mut self.index
    }

    pub fn validator(&self) -> PolicyValidator<'_> {
        PolicyValidator::new(self.validation.clone(), &self.index, self.classifier.as_ref())
            .with_excludes(self.excludes.clone())
    }

    pub fn corrector(&self) -> AutoCorrector<'_> {
        AutoCorrector::new(self.correction.clone(), &self.index, self.classifier.as_ref())
    }

    pub fn validate_before_creation(&self, file_path: &Path, content: &str) -> Vec<PolicyViolation> {
        self.validator().validate_before_creation(file_path, content)
    }

    pub fn validate_after_modification(
        &self,
        file_path: &Path,
        content: &str,
    ) -> Vec<PolicyViolation> {
        self.validator()
            .validate_after_modification(file_path, content)
    }

    pub fn generate_corrections(&self, violations: &[PolicyViolation]) -> Vec<AutoCorrection> {
        self.corrector().generate_corrections(violations)
    }

    /// Corrections for content that is not on disk yet, e.g. a file about to be created.
    pub fn generate_corrections_for(
        &self,
        file_path: &Path,
        content: &str,
        violations: &[PolicyViolation],
    ) -> Vec<AutoCorrection> {
        let relevant: Vec<&PolicyViolation> = violations
            .iter()
            .filter(|v| self.index.relative(&v.file_path) == self.index.relative(file_path))
            .collect();
        self.corrector()
            .correct_content(file_path, content, &relevant)
    }

    /// Applies corrections and re-reads the touched files into a disk-backed index.
    pub fn apply_corrections(&mut self, corrections: &[AutoCorrection]) -> bool {
        let applied = self.corrector().apply_corrections(corrections);
        if self.index.root().is_some() {
            let touched = corrections
                .iter()
                .flat_map(|c| std::iter::once(&c.file_path).chain(c.stub_files.iter().map(|s| &s.path)))
                .cloned()
                .collect::<Vec<_>>();
            for path in touched {
                if self.index.absolute(&path).is_file() {
                    self.index.refresh(&path);
                }
            }
        }
        applied
    }

    pub fn suggest_tag_for_code_file(&self, file_path: &Path) -> Option<TagSuggestion> {
        self.corrector().suggest_tag_for_code_file(file_path)
    }

    pub fn create_validation_report(&self, violations: &[PolicyViolation]) -> String {
        report::create_validation_report(violations)
    }
}
