#![no_main]

use libfuzzer_sys::fuzz_target;
use tag_policy::ProjectConfig;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(config) = ProjectConfig::from_json(&s) {
        let _ = config.exclude_set();
    }
});
