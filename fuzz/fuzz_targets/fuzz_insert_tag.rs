#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::path::Path;
use tag_policy::correct::insert_tag_comment;
use tag_policy::{Tag, TagKind, extract_tags};

const PATHS: &[&str] = &["a.py", "a.js", "README.md", "q.sql", "s.css", "Makefile"];

#[derive(Arbitrary, Debug)]
struct Input {
    content: String,
    path: u8,
    sequence: u16,
}

fuzz_target!(|input: Input| {
    let tag = Tag::new(TagKind::Code, "FUZZ", u32::from(input.sequence % 1000));
    let path = Path::new(PATHS[usize::from(input.path) % PATHS.len()]);
    let out = insert_tag_comment(&input.content, path, &tag);
    assert!(extract_tags(&out).get(TagKind::Code).contains(&tag));
});
