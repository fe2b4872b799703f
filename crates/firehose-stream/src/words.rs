//! 만료되는 단어 빈도 인덱스.
//!
//! 단어마다 등장 시각 목록을 유지하고, 빈도를 조회할 때 만료된 시각을 잘라냅니다.
//! 별도 타이머 없이 조회 시점에만 정리하므로 메모리는 윈도우 안의 활성 단어로 제한됩니다.

use std::collections::{HashMap, HashSet};

/// 다섯 글자 이상이지만 의미가 약한 단어.
const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "could", "every", "first", "found", "great", "large", "never",
    "other", "place", "point", "right", "small", "sound", "still", "their", "there", "these",
    "thing", "think", "three", "water", "where", "which", "world", "would", "people", "should",
    "because", "between", "choose", "always", "literally", "through", "basically", "really",
    "being", "those", "going", "might", "during", "another", "while", "getting", "makes",
    "seemed", "since", "looks", "doing", "gonna", "looking", "though",
];

/// 네 글자 이하지만 추적하는 단어.
const SHORT_ALLOW_WORDS: &[&str] = &[
    "love", "hate", "sad", "bad", "cool", "fuck", "shit", "damn", "good", "kind", "man",
];

const MIN_WORD_LEN: usize = 5;

/// 토큰 구분자: 유니코드 공백과 BOM(U+FEFF).
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// 소문자로 정규화된 토큰이 추적 대상인지 판정합니다.
pub fn is_tracked_word(word: &str) -> bool {
    (word.len() >= MIN_WORD_LEN || SHORT_ALLOW_WORDS.contains(&word))
        && word.chars().all(|c| c == '#' || c.is_ascii_lowercase())
        && !STOP_WORDS.contains(&word)
}

/// 단어 → 등장 시각 목록.
#[derive(Debug, Clone, Default)]
pub struct WordAnalyzer {
    occurrences: HashMap<String, Vec<i64>>,
}

impl WordAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 본문 하나를 기록합니다. 같은 단어가 여러 번 나와도 포스트당 한 번만 셉니다.
    pub fn update_word_frequencies(&mut self, text: &str, timestamp: i64) {
        let lowered = text.to_lowercase();
        let words: HashSet<&str> = lowered
            .split(is_separator)
            .filter(|word| is_tracked_word(word))
            .collect();

        for word in words {
            self.occurrences
                .entry(word.to_string())
                .or_default()
                .push(timestamp);
        }
    }

    /// `now - window_ms`보다 새로운 등장만 남기고 단어별 빈도를 반환합니다.
    ///
    /// 빈 목록이 된 단어는 인덱스에서 삭제됩니다.
    pub fn word_frequencies(&mut self, now: i64, window_ms: i64) -> HashMap<String, usize> {
        let cutoff = now - window_ms;
        let mut frequencies = HashMap::with_capacity(self.occurrences.len());

        self.occurrences.retain(|word, timestamps| {
            timestamps.retain(|&ts| ts > cutoff);
            if timestamps.is_empty() {
                return false;
            }
            frequencies.insert(word.clone(), timestamps.len());
            true
        });

        frequencies
    }

    /// 인덱스를 비웁니다 (필터 변경 시).
    pub fn clear(&mut self) {
        self.occurrences.clear();
    }

    /// 현재 인덱스에 남아 있는 단어 수 (정리 전 기준).
    pub fn tracked_words(&self) -> usize {
        self.occurrences.len()
    }
}
