#![no_main]

use libfuzzer_sys::fuzz_target;
use patchward_signature::normalize::{collapse_whitespace, normalize_java, normalize_python};

fuzz_target!(|data: &[u8]| {
    // 정규화 함수는 &str을 받으므로 UTF-8 변환 필요
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    for strip_comments in [false, true] {
        let _ = normalize_java(body, strip_comments);
        let _ = normalize_python(body, strip_comments);
    }

    let collapsed = collapse_whitespace(body);
    assert!(!collapsed.starts_with(' ') && !collapsed.ends_with(' '));
});
