use std::path::Path;
use tag_policy::classify::*;

fn domain(path: &str) -> Option<String> {
    extract_domain_from_path(Path::new(path))
}

#[test]
fn domain_from_src_subdirectory() {
    assert_eq!(domain("src/auth/service.py").as_deref(), Some("AUTH"));
    assert_eq!(domain("src/auth/nested/deep.py").as_deref(), Some("AUTH"));
    assert_eq!(domain("backend/src/billing/api.py").as_deref(), Some("BILLING"));
}

#[test]
fn domain_normalizes_underscores() {
    assert_eq!(domain("src/user_profile/models.py").as_deref(), Some("USER-PROFILE"));
}

#[test]
fn domain_from_parent_outside_src() {
    assert_eq!(domain("app/billing/invoice.py").as_deref(), Some("BILLING"));
}

#[test]
fn domain_from_bare_file_stem() {
    assert_eq!(domain("random.py").as_deref(), Some("RANDOM"));
    assert_eq!(domain("user_auth.py").as_deref(), Some("USER-AUTH"));
    assert_eq!(domain("src/service.py").as_deref(), Some("SERVICE"));
}

#[test]
fn bare_stem_must_be_letters_and_hyphens() {
    assert_eq!(domain("module2.py"), None);
}

#[test]
fn test_files_have_no_domain() {
    assert_eq!(domain("tests/test_auth.py"), None);
    assert_eq!(domain("tests/auth/helpers.py"), None);
    assert_eq!(domain("test_auth.py"), None);
    assert_eq!(domain("src/auth/test_service.py"), None);
}

#[test]
fn python_classifier_code_files() {
    let c = LanguageClassifier::new("python");
    assert!(c.is_code_file(Path::new("service.py")));
    assert!(c.is_code_file(Path::new("src/auth/service.py")));
    assert!(!c.is_code_file(Path::new("docs/conf.py")));
    assert!(!c.is_code_file(Path::new("tests/test_auth.py")));
    assert!(!c.is_code_file(Path::new("templates/module.py")));
    assert!(!c.is_code_file(Path::new("README.md")));
    assert!(!c.is_code_file(Path::new("web/app.js")));
}

#[test]
fn typescript_classifier_accepts_js_and_ts() {
    let c = LanguageClassifier::new("TypeScript");
    assert!(c.is_code_file(Path::new("src/app.ts")));
    assert!(c.is_code_file(Path::new("src/app.js")));
    assert!(!c.is_code_file(Path::new("src/app.py")));
}

#[test]
fn unknown_language_accepts_any_code_extension() {
    let c = LanguageClassifier::new("cobol");
    assert!(c.is_code_file(Path::new("src/main.go")));
    assert!(c.is_code_file(Path::new("src/main.rs")));
}

#[test]
fn test_file_detection() {
    let c = LanguageClassifier::default();
    assert!(c.is_test_file(Path::new("tests/test_auth.py")));
    assert!(c.is_test_file(Path::new("test_auth.py")));
    assert!(c.is_test_file(Path::new("pkg/auth_test.go")));
    assert!(c.is_test_file(Path::new("web/app.test.ts")));
    assert!(c.is_test_file(Path::new("web/app.spec.ts")));
    assert!(!c.is_test_file(Path::new("src/auth/service.py")));
    assert!(!c.is_test_file(Path::new("src/latest.py")));
}

#[test]
fn code_extension_lookup() {
    assert!(has_code_extension(Path::new("a.py")));
    assert!(has_code_extension(Path::new("a.TS")));
    assert!(!has_code_extension(Path::new("a.md")));
    assert!(!has_code_extension(Path::new("Makefile")));
}
