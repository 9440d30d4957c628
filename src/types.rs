use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::enums::*;

// ─── Tag ────────────────────────────────────────────────────────────────────

/// One `@KIND:DOMAIN-NNN` occurrence.
///
/// `domain` is the upper-case feature segment (`AUTH`, `AUTH-API`) and
/// `sequence` the trailing number. Together they form the tag id
/// (`AUTH-001`) that names a SPEC directory and links the chain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub kind: TagKind,
    pub domain: String,
    pub sequence: u32,
}

impl Tag {
    pub fn new(kind: TagKind, domain: impl Into<String>, sequence: u32) -> Self {
        Tag {
            kind,
            domain: domain.into(),
            sequence,
        }
    }

    /// `DOMAIN-NNN`, the part after the colon.
    pub fn id(&self) -> String {
        format!("{}-{:03}", self.domain, self.sequence)
    }

    /// The same id under another kind, e.g. the `@SPEC:` partner of a `@CODE:` tag.
    pub fn with_kind(&self, kind: TagKind) -> Tag {
        Tag {
            kind,
            domain: self.domain.clone(),
            sequence: self.sequence,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}:{}-{:03}", self.kind, self.domain, self.sequence)
    }
}

/// Tags extracted from one file, bucketed by kind in order of appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMap {
    pub spec: Vec<Tag>,
    pub code: Vec<Tag>,
    pub test: Vec<Tag>,
    pub doc: Vec<Tag>,
}

impl TagMap {
    pub fn get(&self, kind: TagKind) -> &[Tag] {
        match kind {
            TagKind::Spec => &self.spec,
            TagKind::Code => &self.code,
            TagKind::Test => &self.test,
            TagKind::Doc => &self.doc,
        }
    }

    pub fn push(&mut self, tag: Tag) {
        match tag.kind {
            TagKind::Spec => self.spec.push(tag),
            TagKind::Code => self.code.push(tag),
            TagKind::Test => self.test.push(tag),
            TagKind::Doc => self.doc.push(tag),
        }
    }

    pub fn has(&self, kind: TagKind) -> bool {
        !self.get(kind).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        TagKind::ALL.iter().all(|k| !self.has(*k))
    }

    pub fn len(&self) -> usize {
        TagKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }
}

// ─── PolicyViolation ────────────────────────────────────────────────────────

/// A single rule violation found in a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub level: ViolationLevel,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub message: String,
    pub file_path: PathBuf,
    pub action: ViolationAction,
    pub guidance: String,
    pub auto_fix_possible: bool,
}

impl PolicyViolation {
    /// True when the caller should refuse the write.
    pub fn should_block_operation(&self) -> bool {
        self.level == ViolationLevel::Critical || self.action == ViolationAction::Block
    }

    pub fn is_auto_fixable(&self) -> bool {
        self.auto_fix_possible
    }

    /// The offending tag parsed back into a [`Tag`], if it is well formed.
    pub fn parsed_tag(&self) -> Option<Tag> {
        self.tag.as_deref().and_then(crate::tags::parse_tag)
    }
}

// ─── AutoCorrection ─────────────────────────────────────────────────────────

/// Corrections under this confidence are flagged for human review.
pub const REVIEW_CONFIDENCE: f64 = 0.9;

/// A new file a correction creates next to its target (SPEC or TEST stub).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubFile {
    pub path: PathBuf,
    pub content: String,
}

/// A proposed rewrite of one file, produced from one violation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoCorrection {
    pub file_path: PathBuf,
    pub original_content: String,
    pub corrected_content: String,
    pub description: String,
    pub confidence: f64,
    pub requires_review: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stub_files: Vec<StubFile>,
}

impl AutoCorrection {
    pub fn new(
        file_path: impl Into<PathBuf>,
        original_content: impl Into<String>,
        corrected_content: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        AutoCorrection {
            file_path: file_path.into(),
            original_content: original_content.into(),
            corrected_content: corrected_content.into(),
            description: description.into(),
            confidence,
            requires_review: confidence < REVIEW_CONFIDENCE,
            stub_files: Vec::new(),
        }
    }

    pub fn with_stub(mut self, stub: StubFile) -> Self {
        self.stub_files.push(stub);
        self
    }

    /// True when applying the correction would change the target file.
    pub fn changes_content(&self) -> bool {
        self.original_content != self.corrected_content
    }
}

/// Result of [`crate::correct::AutoCorrector::suggest_tag_for_code_file`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub tag: Tag,
    pub confidence: f64,
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Extensions checked by default, without the leading dot.
pub const DEFAULT_FILE_TYPES: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "go", "rs", "java", "kt", "swift", "dart", "rb", "php", "c",
    "cpp", "h", "cs", "md",
];

/// Rule switches for [`crate::validate::PolicyValidator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyValidationConfig {
    pub strict_mode: bool,
    pub require_spec_before_code: bool,
    pub require_test_for_code: bool,
    pub allow_duplicate_tags: bool,
    /// Seconds on the wire.
    #[serde(
        serialize_with = "serialize_seconds",
        deserialize_with = "deserialize_seconds"
    )]
    pub validation_timeout: Duration,
    pub file_types_to_validate: Vec<String>,
}

impl Default for PolicyValidationConfig {
    fn default() -> Self {
        PolicyValidationConfig {
            strict_mode: false,
            require_spec_before_code: true,
            require_test_for_code: true,
            allow_duplicate_tags: false,
            validation_timeout: Duration::from_secs(5),
            file_types_to_validate: DEFAULT_FILE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Switches for [`crate::correct::AutoCorrector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCorrectionConfig {
    pub enable_auto_fix: bool,
    pub confidence_threshold: f64,
    pub create_missing_specs: bool,
    pub create_missing_tests: bool,
    pub remove_duplicates: bool,
    pub backup_before_fix: bool,
}

impl Default for AutoCorrectionConfig {
    fn default() -> Self {
        AutoCorrectionConfig {
            enable_auto_fix: false,
            confidence_threshold: 0.8,
            create_missing_specs: false,
            create_missing_tests: false,
            remove_duplicates: true,
            backup_before_fix: true,
        }
    }
}

fn serialize_seconds<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64())
}

fn deserialize_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(|e| {
        serde::de::Error::custom(format!(
            "validation_timeout must be a non-negative number of seconds, got {}: {}",
            secs, e
        ))
    })
}
