#![no_main]

use std::io::Write;
use std::ops::ControlFlow;

use libfuzzer_sys::fuzz_target;
use patchward_malice::{ArchiveKind, ArchiveWalker};

const KINDS: [ArchiveKind; 3] = [ArchiveKind::Zip, ArchiveKind::Tar, ArchiveKind::TarGz];

fuzz_target!(|data: &[u8]| {
    let Ok(mut file) = tempfile::NamedTempFile::new() else {
        return;
    };
    if file.write_all(data).is_err() {
        return;
    }

    // 엔트리 수 제한을 작게 두어 반복 시간을 제한
    let walker = ArchiveWalker::new(64);
    for kind in KINDS {
        let mut visited = 0usize;
        let result = walker.walk_kind(file.path(), kind, |_| {
            visited += 1;
            ControlFlow::Continue(())
        });
        if let Ok(summary) = result {
            assert_eq!(summary.entries_visited, visited);
            assert!(visited <= walker.max_entries());
        }
    }
});
