#![no_main]

use libfuzzer_sys::fuzz_target;
use tag_policy::tags::{find_tags, parse_tag};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    for m in find_tags(&s) {
        // Every match must re-parse to the same tag from its own span.
        let literal = &s[m.start..m.end];
        assert_eq!(parse_tag(literal).as_ref(), Some(&m.tag));
    }
});
