use tag_policy::tags::*;
use tag_policy::*;

#[test]
fn extracts_all_four_kinds() {
    let text = "# @SPEC:AUTH-001 @CODE:AUTH-001\n// @TEST:AUTH-001 <!-- @DOC:AUTH-001 -->\n";
    let tags = extract_tags(text);
    for kind in TagKind::ALL {
        assert_eq!(tags.get(kind).len(), 1, "expected one {} tag", kind);
        assert_eq!(tags.get(kind)[0].domain, "AUTH");
        assert_eq!(tags.get(kind)[0].sequence, 1);
    }
    assert_eq!(tags.len(), 4);
}

#[test]
fn hyphenated_domain_keeps_all_segments() {
    let tags = extract_tags("@CODE:USER-API-042");
    assert_eq!(tags.code.len(), 1);
    assert_eq!(tags.code[0].domain, "USER-API");
    assert_eq!(tags.code[0].sequence, 42);
    assert_eq!(tags.code[0].id(), "USER-API-042");
}

#[test]
fn matching_is_case_sensitive() {
    assert!(extract_tags("@code:AUTH-001").is_empty());
    assert!(extract_tags("@CODE:auth-001").is_empty());
}

#[test]
fn sequence_must_have_three_digits() {
    assert!(extract_tags("@CODE:AUTH-01").is_empty());
    assert!(extract_tags("@CODE:AUTH").is_empty());
}

#[test]
fn unknown_kinds_are_ignored() {
    assert!(extract_tags("@IMPL:AUTH-001 @FEATURE:AUTH-001").is_empty());
}

#[test]
fn repeated_tags_are_all_kept() {
    let tags = extract_tags("@CODE:AUTH-001\n@CODE:AUTH-001\n");
    assert_eq!(tags.code.len(), 2);
}

#[test]
fn find_tags_reports_spans() {
    let text = "x @CODE:AUTH-001 y";
    let found = find_tags(text);
    assert_eq!(found.len(), 1);
    assert_eq!(&text[found[0].start..found[0].end], "@CODE:AUTH-001");
}

#[test]
fn counts_literal_occurrences() {
    let counts = count_occurrences("@CODE:A-001 x @CODE:A-001 @TEST:A-001");
    assert_eq!(counts.get("@CODE:A-001"), Some(&2));
    assert_eq!(counts.get("@TEST:A-001"), Some(&1));
    assert_eq!(counts.len(), 2);
}

#[test]
fn duplicated_tags_in_first_seen_order() {
    let text = "@TEST:B-002 @CODE:A-001 @TEST:B-002 @CODE:A-001 @DOC:C-003";
    assert_eq!(duplicated_tags(text), vec!["@TEST:B-002", "@CODE:A-001"]);
}

#[test]
fn parse_tag_requires_a_whole_tag() {
    assert_eq!(
        parse_tag("@CODE:AUTH-001"),
        Some(Tag::new(TagKind::Code, "AUTH", 1))
    );
    assert_eq!(
        parse_tag("  @SPEC:AUTH-002 "),
        Some(Tag::new(TagKind::Spec, "AUTH", 2))
    );
    assert_eq!(parse_tag("see @CODE:AUTH-001"), None);
    assert_eq!(parse_tag("@CODE:AUTH-1"), None);
}

#[test]
fn tag_display_pads_sequence() {
    assert_eq!(Tag::new(TagKind::Code, "AUTH", 7).to_string(), "@CODE:AUTH-007");
    assert_eq!(
        Tag::new(TagKind::Code, "AUTH", 7).with_kind(TagKind::Test).to_string(),
        "@TEST:AUTH-007"
    );
}

#[test]
fn contains_tag_matches_exact_literal() {
    let tag = Tag::new(TagKind::Spec, "AUTH", 1);
    assert!(contains_tag("# @SPEC:AUTH-001 title", &tag));
    assert!(!contains_tag("# @SPEC:AUTH-002 title", &tag));
    assert!(!contains_tag("# @CODE:AUTH-001", &tag));
    assert!(!contains_tag("# @SPEC:AUTH-001-002", &tag));
}

#[test]
fn spans_cover_only_the_exact_tag() {
    let tag = Tag::new(TagKind::Code, "AUTH", 1);
    let text = "@CODE:AUTH-001-002 @CODE:AUTH-001";
    assert_eq!(tag_spans(text, &tag), vec![(19, 33)]);
    assert_eq!(&text[19..33], "@CODE:AUTH-001");
}
