//! 문자 n-gram Dice 계수

use std::collections::HashMap;

use super::{StringSimilarity, clamp_score};

/// 문자 n-gram 다중집합에 대한 Dice 계수
///
/// 어느 한쪽이 `n`보다 짧으면 n-gram을 만들 수 없으므로 완전 일치 여부로 판정합니다.
#[derive(Debug, Clone, Copy)]
pub struct NGram {
    n: usize,
}

impl NGram {
    /// n-gram 크기를 지정하여 생성합니다. 0은 1로 올립니다.
    pub fn new(n: usize) -> Self {
        Self { n: n.max(1) }
    }

    /// n-gram 크기
    pub fn n(&self) -> usize {
        self.n
    }

    fn grams(chars: &[char], n: usize) -> HashMap<&[char], usize> {
        let mut counts = HashMap::new();
        for window in chars.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for NGram {
    fn default() -> Self {
        Self::new(2)
    }
}

impl StringSimilarity for NGram {
    fn name(&self) -> &'static str {
        "ngram"
    }

    fn calculate_similarity(&self, left: &str, right: &str) -> f64 {
        if left == right {
            return 1.0;
        }
        let a: Vec<char> = left.chars().collect();
        let b: Vec<char> = right.chars().collect();
        if a.len() < self.n || b.len() < self.n {
            return 0.0;
        }

        let ga = Self::grams(&a, self.n);
        let gb = Self::grams(&b, self.n);
        let total = (a.len() - self.n + 1) + (b.len() - self.n + 1);
        let shared: usize = ga
            .iter()
            .map(|(gram, count)| gb.get(gram).map_or(0, |other| (*count).min(*other)))
            .sum();

        clamp_score(2.0 * shared as f64 / total as f64)
    }
}
