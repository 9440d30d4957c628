#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tag_policy::correct::remove_duplicate_tag;

#[derive(Arbitrary, Debug)]
struct Input {
    content: String,
    domain_len: u8,
    sequence: u16,
}

fuzz_target!(|input: Input| {
    let domain = "A".repeat(usize::from(input.domain_len % 8) + 1);
    let literal = format!("@CODE:{}-{:03}", domain, input.sequence % 1000);
    let out = remove_duplicate_tag(&input.content, &literal);
    let _ = remove_duplicate_tag(&out, &literal);
});
