//! Human-readable violation summaries for hook output.

use crate::enums::ViolationLevel;
use crate::types::PolicyViolation;
use std::fmt::Write;

/// Renders `violations` grouped by level, most severe first.
pub fn create_validation_report(violations: &[PolicyViolation]) -> String {
    if violations.is_empty() {
        return "TAG policy: no violations found.\n".to_string();
    }

    let blocking = violations
        .iter()
        .filter(|v| v.should_block_operation())
        .count();
    let fixable = violations.iter().filter(|v| v.is_auto_fixable()).count();

    let mut out = String::new();
    let _ = writeln!(out, "TAG policy report");
    let _ = writeln!(out, "=================");
    let _ = writeln!(
        out,
        "{} violation(s): {} blocking, {} auto-fixable",
        violations.len(),
        blocking,
        fixable
    );

    for level in ViolationLevel::ALL {
        let group: Vec<&PolicyViolation> =
            violations.iter().filter(|v| v.level == level).collect();
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", level, group.len());
        for v in group {
            let _ = write!(out, "  - [{}] {}", v.violation_type, v.file_path.display());
            if let Some(tag) = &v.tag {
                let _ = write!(out, " {}", tag);
            }
            let _ = writeln!(out, ": {}", v.message);
            let _ = writeln!(out, "    action: {}", v.action);
            let _ = writeln!(out, "    guidance: {}", v.guidance);
        }
    }
    out
}
