//! Fuzz target for class directory name parsing.
//!
//! Feeds arbitrary UTF-8 names to the parser and checks that the parsed
//! labels are always substrings of the input.

#![no_main]

use imgsplit::dataset::class_spec::fuzz_parse_class_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let spec = fuzz_parse_class_name(name);
    assert!(name.contains(spec.source_label.as_str()));
    assert!(name.contains(spec.merged_label.as_str()));
});
