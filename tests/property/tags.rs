use proptest::prelude::*;
use tag_policy::tags::{find_tags, parse_tag};
use tag_policy::*;

fn arb_kind() -> impl Strategy<Value = TagKind> {
    prop::sample::select(TagKind::ALL.to_vec())
}

/// Upper-case domains, optionally with one hyphenated sub-domain.
fn arb_domain() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9]{0,5}(-[A-Z][A-Z0-9]{0,3})?"
}

fn arb_tag() -> impl Strategy<Value = Tag> {
    (arb_kind(), arb_domain(), 0u32..1000).prop_map(|(k, d, n)| Tag::new(k, d, n))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn display_parses_back(tag in arb_tag()) {
        prop_assert_eq!(parse_tag(&tag.to_string()), Some(tag));
    }

    #[test]
    fn tag_found_in_surrounding_text(tag in arb_tag(), before in "[a-z #/]{0,12}", after in "[a-z ]{0,12}") {
        let text = format!("{}{} {}", before, tag, after);
        let map = extract_tags(&text);
        prop_assert_eq!(map.get(tag.kind), std::slice::from_ref(&tag));
        prop_assert_eq!(map.len(), 1);
    }

    #[test]
    fn match_offsets_slice_the_literal(tag in arb_tag(), pad in "[a-z ]{0,8}") {
        let literal = tag.to_string();
        let text = format!("{}{}\n", pad, literal);
        let found = find_tags(&text);
        prop_assert_eq!(found.len(), 1);
        prop_assert_eq!(&text[found[0].start..found[0].end], literal.as_str());
    }

    // Lower-case ids are never tags.
    #[test]
    fn lower_case_rejected(domain in "[a-z]{1,6}", n in 0u32..1000) {
        let text = format!("@CODE:{}-{:03}", domain, n);
        prop_assert!(parse_tag(&text).is_none());
        prop_assert!(extract_tags(&text).is_empty());
    }
}
