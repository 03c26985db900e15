#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use patchward_malice::path::{resolve, resolve_from};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    base: String,
    target: String,
}

fuzz_target!(|input: FuzzInput| {
    let base = resolve(&input.base);
    if let Some(reason) = base.escape {
        // 탈출한 경로는 구성 요소로 되돌아가면 안 됨
        assert!(!base.is_contained(), "escape {reason} reported as contained");
        return;
    }

    let resolved = resolve_from(base.parent(), &input.target);
    if resolved.is_contained() {
        assert!(
            resolved.components.iter().all(|c| c != ".." && c != "." && !c.is_empty()),
            "contained resolution kept a relative component: {resolved}"
        );
    }
});
