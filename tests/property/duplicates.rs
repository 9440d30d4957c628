use proptest::prelude::*;
use tag_policy::correct::remove_duplicate_tag;
use tag_policy::tags::{duplicated_tags, parse_tag, tag_spans};
use tag_policy::Tag;

const LITERAL: &str = "@CODE:AUTH-001";

fn target() -> Tag {
    parse_tag(LITERAL).unwrap()
}

/// Occurrences of `tag` as a tag, not as a substring of a longer one.
fn count(text: &str, tag: &Tag) -> usize {
    tag_spans(text, tag).len()
}

fn arb_line() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "# @CODE:AUTH-001",
        "x = 1  # @CODE:AUTH-001",
        "# @CODE:AUTH-002",
        "# @CODE:AUTH-001-002",
        "y = 2  # @CODE:AUTH-001-002 @CODE:AUTH-001",
        "import os",
        "# note",
        "",
    ])
}

fn arb_content() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 0..12).prop_map(|lines| {
        lines.iter().map(|l| format!("{}\n", l)).collect::<String>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn at_most_one_occurrence_left(content in arb_content()) {
        let out = remove_duplicate_tag(&content, LITERAL);
        let before = count(&content, &target());
        prop_assert_eq!(count(&out, &target()), before.min(1));
        prop_assert!(!duplicated_tags(&out).iter().any(|t| t == LITERAL));
    }

    #[test]
    fn first_occurrence_stays_put(content in arb_content()) {
        let out = remove_duplicate_tag(&content, LITERAL);
        prop_assert_eq!(
            tag_spans(&out, &target()).first().copied(),
            tag_spans(&content, &target()).first().copied()
        );
    }

    #[test]
    fn other_tags_survive(content in arb_content()) {
        let out = remove_duplicate_tag(&content, LITERAL);
        for other in ["@CODE:AUTH-002", "@CODE:AUTH-001-002"] {
            let tag = parse_tag(other).unwrap();
            prop_assert_eq!(count(&out, &tag), count(&content, &tag));
        }
    }

    #[test]
    fn idempotent(content in arb_content()) {
        let once = remove_duplicate_tag(&content, LITERAL);
        prop_assert_eq!(remove_duplicate_tag(&once, LITERAL), once.clone());
    }
}
