//! SPEC and TEST stub documents created by the corrector.

use crate::enums::TagKind;
use crate::types::{StubFile, Tag};
use serde::Serialize;
use std::path::PathBuf;

/// Front matter of a generated SPEC document.
#[derive(Debug, Serialize)]
struct SpecFrontMatter<'a> {
    id: &'a str,
    version: &'a str,
    status: &'a str,
    priority: &'a str,
}

/// `.moai/specs/SPEC-<id>/spec.md`
pub fn spec_stub_path(tag: &Tag) -> PathBuf {
    PathBuf::from(format!(".moai/specs/SPEC-{}/spec.md", tag.id()))
}

/// `tests/test_<id lower-cased>.py`
pub fn test_stub_path(tag: &Tag) -> PathBuf {
    PathBuf::from(format!("tests/test_{}.py", tag.id().to_lowercase()))
}

/// A SPEC document declaring `@SPEC:<id>` with the canonical sections.
pub fn spec_stub(tag: &Tag) -> StubFile {
    let id = tag.id();
    let spec = tag.with_kind(TagKind::Spec);
    let code = tag.with_kind(TagKind::Code);
    let test = tag.with_kind(TagKind::Test);
    let front = SpecFrontMatter {
        id: &id,
        version: "0.0.1",
        status: "draft",
        priority: "medium",
    };
    let front_matter = match serde_saphyr::to_string(&front) {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::debug!(error = %e, "front matter serialization failed, using plain form");
            format!("id: {}\nversion: 0.0.1\nstatus: draft\npriority: medium\n", id)
        }
    };
    let front_matter = front_matter.trim_end();

    let content = format!(
        r#"---
{front_matter}
---

# {id}

## Requirements

- [ ] Describe what this feature must do.

## Implementation Guide

- SPEC: {spec}
- CODE: {code}
- TEST: {test}

## Acceptance Criteria

- [ ] Behaviour is covered by tests carrying the TEST tag
- [ ] Implementation carries the CODE tag
- [ ] Documentation is updated

## History

- v0.0.1: stub generated from an existing code reference
"#
    );
    StubFile {
        path: spec_stub_path(tag),
        content,
    }
}

/// A Python test module declaring `@TEST:<id>` with three placeholder tests.
pub fn test_stub(tag: &Tag) -> StubFile {
    let id = tag.id();
    let test = tag.with_kind(TagKind::Test);
    let code = tag.with_kind(TagKind::Code);
    let spec_path = spec_stub_path(tag);
    let class = id
        .split('-')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let lower = s.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<String>();

    let content = format!(
        r#"# {test} | SPEC: {spec_path} | CODE: {code}
"""Tests for {id}."""

import pytest


class Test{class}:
    def test_basic_functionality(self):
        pytest.skip("not implemented yet")

    def test_edge_cases(self):
        pytest.skip("not implemented yet")

    def test_error_handling(self):
        pytest.skip("not implemented yet")
"#,
        spec_path = spec_path.display(),
    );
    StubFile {
        path: test_stub_path(tag),
        content,
    }
}
