//! 토큰 다중집합(가중) Jaccard 계수

use std::collections::HashMap;

use super::{StringSimilarity, clamp_score};

/// 토큰 다중집합의 `Σ min(a, b) / Σ max(a, b)`
///
/// 토큰은 식별자(영숫자와 `_`)의 연속 또는 공백이 아닌 단일 구두점 문자입니다.
/// 출현 횟수를 세므로 같은 문장이 반복된 본문(`f(); f();`와 `f();`)도 다르게 평가됩니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl TokenJaccard {
    /// 입력을 토큰으로 분리합니다.
    pub fn tokenize(input: &str) -> Vec<&str> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (i, c) in input.char_indices() {
            if c.is_alphanumeric() || c == '_' {
                if start.is_none() {
                    start = Some(i);
                }
                continue;
            }
            if let Some(s) = start.take() {
                tokens.push(&input[s..i]);
            }
            if !c.is_whitespace() {
                tokens.push(&input[i..i + c.len_utf8()]);
            }
        }
        if let Some(s) = start {
            tokens.push(&input[s..]);
        }
        tokens
    }

    fn counts(input: &str) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for token in Self::tokenize(input) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }
}

impl StringSimilarity for TokenJaccard {
    fn name(&self) -> &'static str {
        "jaccard"
    }

    fn calculate_similarity(&self, left: &str, right: &str) -> f64 {
        if left == right {
            return 1.0;
        }
        let a = Self::counts(left);
        let b = Self::counts(right);

        let mut shared = 0usize;
        let mut total = 0usize;
        for (token, &count) in &a {
            let other = b.get(token).copied().unwrap_or(0);
            shared += count.min(other);
            total += count.max(other);
        }
        total += b
            .iter()
            .filter(|(token, _)| !a.contains_key(*token))
            .map(|(_, &count)| count)
            .sum::<usize>();

        if total == 0 {
            // 공백만 다른 입력
            return 1.0;
        }
        clamp_score(shared as f64 / total as f64)
    }
}
