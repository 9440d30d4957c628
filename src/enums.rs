//! Closed enumerations used throughout the policy engine.
//!
//! Wire names follow the hook protocol: violation levels and types are
//! upper-case (`CRITICAL`, `SPECLESS_CODE`), actions are lower-case (`block`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four traceability artifact kinds a tag can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagKind {
    Spec,
    Code,
    Test,
    Doc,
}

impl TagKind {
    pub const ALL: [TagKind; 4] = [TagKind::Spec, TagKind::Code, TagKind::Test, TagKind::Doc];

    /// The literal used between `@` and `:` in tag text.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Spec => "SPEC",
            TagKind::Code => "CODE",
            TagKind::Test => "TEST",
            TagKind::Doc => "DOC",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SPEC" => Some(TagKind::Spec),
            "CODE" => Some(TagKind::Code),
            "TEST" => Some(TagKind::Test),
            "DOC" => Some(TagKind::Doc),
            _ => None,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violation severity. Ordered so that `Critical` sorts first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl ViolationLevel {
    pub const ALL: [ViolationLevel; 4] = [
        ViolationLevel::Critical,
        ViolationLevel::High,
        ViolationLevel::Medium,
        ViolationLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationLevel::Critical => "CRITICAL",
            ViolationLevel::High => "HIGH",
            ViolationLevel::Medium => "MEDIUM",
            ViolationLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for ViolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule a violation was raised by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    SpeclessCode,
    MissingTags,
    ChainBreak,
    DuplicateTags,
    FormatInvalid,
    NoSpecReference,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::SpeclessCode => "SPECLESS_CODE",
            ViolationType::MissingTags => "MISSING_TAGS",
            ViolationType::ChainBreak => "CHAIN_BREAK",
            ViolationType::DuplicateTags => "DUPLICATE_TAGS",
            ViolationType::FormatInvalid => "FORMAT_INVALID",
            ViolationType::NoSpecReference => "NO_SPEC_REFERENCE",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller is asked to do about a violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationAction {
    Block,
    Warn,
    Suggest,
}

impl ViolationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationAction::Block => "block",
            ViolationAction::Warn => "warn",
            ViolationAction::Suggest => "suggest",
        }
    }
}

impl fmt::Display for ViolationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
