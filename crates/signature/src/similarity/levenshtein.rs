//! Levenshtein 편집 거리 유사도

use super::{StringSimilarity, clamp_score};

/// `1 - distance / max(len)` (문자 단위)
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Levenshtein {
    /// 두 문자 시퀀스의 편집 거리를 계산합니다.
    ///
    /// 두 행만 유지하므로 메모리는 `O(min(len))`입니다.
    pub fn distance(left: &str, right: &str) -> usize {
        let a: Vec<char> = left.chars().collect();
        let b: Vec<char> = right.chars().collect();
        // 짧은 쪽을 열로 사용
        let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        if short.is_empty() {
            return long.len();
        }

        let mut prev: Vec<usize> = (0..=short.len()).collect();
        let mut curr = vec![0usize; short.len() + 1];

        for (i, lc) in long.iter().enumerate() {
            curr[0] = i + 1;
            for (j, sc) in short.iter().enumerate() {
                let cost = usize::from(lc != sc);
                curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        prev[short.len()]
    }
}

impl StringSimilarity for Levenshtein {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn calculate_similarity(&self, left: &str, right: &str) -> f64 {
        if left == right {
            return 1.0;
        }
        let max_len = left.chars().count().max(right.chars().count());
        if max_len == 0 {
            return 1.0;
        }
        let distance = Self::distance(left, right);
        clamp_score(1.0 - distance as f64 / max_len as f64)
    }
}
