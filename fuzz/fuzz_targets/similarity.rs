#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use patchward_signature::SimilarityAlgorithm;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ngram_size: u8,
    left: String,
    right: String,
}

fuzz_target!(|input: FuzzInput| {
    // 레벤슈타인은 O(n*m) -- 입력 길이 제한
    if input.left.len() > 2048 || input.right.len() > 2048 {
        return;
    }
    let ngram_size = usize::from(input.ngram_size % 8) + 1;

    for algorithm in SimilarityAlgorithm::ALL {
        let similarity = algorithm.build(ngram_size);
        let score = similarity.calculate_similarity(&input.left, &input.right);
        assert!(
            (0.0..=1.0).contains(&score),
            "{algorithm} out of range: {score}"
        );

        let reversed = similarity.calculate_similarity(&input.right, &input.left);
        assert!((score - reversed).abs() < 1e-9, "{algorithm} is not symmetric");

        let identity = similarity.calculate_similarity(&input.left, &input.left);
        assert!((identity - 1.0).abs() < 1e-9, "{algorithm} identity is {identity}");
    }
});
