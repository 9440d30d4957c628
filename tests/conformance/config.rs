use std::fs;
use std::path::Path;
use std::time::Duration;
use tag_policy::*;

fn write_config(root: &Path, json: &str) {
    let path = root.join(config::CONFIG_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, json).unwrap();
}

#[test]
fn missing_config_falls_back_to_python() {
    let dir = tempfile::tempdir().unwrap();
    let config = ProjectConfig::load(dir.path());
    assert_eq!(config.language(), "python");
    assert_eq!(config, ProjectConfig::default());

    let err = ProjectConfig::try_load(dir.path()).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Missing);
}

#[test]
fn reads_project_language() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), r#"{"project": {"language": "typescript", "name": "demo"}}"#);
    let config = ProjectConfig::load(dir.path());
    assert_eq!(config.language(), "typescript");
    assert_eq!(config.tag_policy, PolicyValidationConfig::default());
}

#[test]
fn malformed_config_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "{ not json");
    assert_eq!(ProjectConfig::load(dir.path()), ProjectConfig::default());

    let err = ProjectConfig::try_load(dir.path()).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Syntax);
    assert!(err.path.ends_with(config::CONFIG_PATH));
}

#[test]
fn project_section_without_language_defaults_to_python() {
    let config = ProjectConfig::from_json(r#"{"project": {}}"#).unwrap();
    assert_eq!(config.language(), "python");
}

#[test]
fn policy_sections_override_defaults() {
    let config = ProjectConfig::from_json(
        r#"{
            "tag_policy": {"strict_mode": true, "validation_timeout": 2.5},
            "auto_correction": {"enable_auto_fix": true, "confidence_threshold": 0.9}
        }"#,
    )
    .unwrap();
    assert!(config.tag_policy.strict_mode);
    assert_eq!(config.tag_policy.validation_timeout, Duration::from_millis(2500));
    assert!(config.tag_policy.require_spec_before_code);
    assert!(config.auto_correction.enable_auto_fix);
    assert_eq!(config.auto_correction.confidence_threshold, 0.9);
    assert!(config.auto_correction.remove_duplicates);
}

#[test]
fn negative_timeout_is_rejected() {
    let err = ProjectConfig::from_json(r#"{"tag_policy": {"validation_timeout": -1}}"#).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Syntax);
}

#[test]
fn invalid_exclude_pattern_is_rejected() {
    let err = ProjectConfig::from_json(r#"{"excluded_patterns": ["src/[oops"]}"#).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::InvalidPattern);
}

#[test]
fn default_excludes() {
    let excludes = ExcludeSet::default();
    assert!(excludes.is_excluded(Path::new(".claude/hooks/pre.py")));
    assert!(excludes.is_excluded(Path::new(".moai/docs/guide.md")));
    assert!(excludes.is_excluded(Path::new(".moai/reports/sync.md")));
    assert!(excludes.is_excluded(Path::new(".moai/analysis/a.md")));
    assert!(excludes.is_excluded(Path::new("src/templates/page.py")));
    assert!(excludes.is_excluded(Path::new("examples/demo.py")));
    assert!(excludes.is_excluded(Path::new("docs/generated/api.md")));
    assert!(!excludes.is_excluded(Path::new(".moai/specs/SPEC-AUTH-001/spec.md")));
    assert!(!excludes.is_excluded(Path::new("src/auth/service.py")));
}

#[test]
fn excluded_directories_are_pruned_whole() {
    let excludes = ExcludeSet::default();
    assert!(excludes.is_excluded_dir(Path::new("node_modules")));
    assert!(excludes.is_excluded_dir(Path::new(".git")));
    assert!(excludes.is_excluded_dir(Path::new("web/node_modules")));
    assert!(excludes.is_excluded_dir(Path::new("target")));
    assert!(!excludes.is_excluded(Path::new("node_modules")));
    assert!(!excludes.is_excluded_dir(Path::new("src")));
    assert!(!excludes.is_excluded_dir(Path::new(".moai/specs")));
}

#[test]
fn configured_excludes_extend_defaults() {
    let config = ProjectConfig::from_json(r#"{"excluded_patterns": ["**/vendor/**"]}"#).unwrap();
    let excludes = config.exclude_set();
    assert!(excludes.is_excluded(Path::new("vendor/lib/x.py")));
    assert!(excludes.is_excluded(Path::new(".claude/x.py")));
}

#[test]
fn validation_config_serializes_timeout_as_seconds() {
    let value = serde_json::to_value(PolicyValidationConfig::default()).unwrap();
    assert_eq!(value["validation_timeout"], serde_json::json!(5.0));
}
