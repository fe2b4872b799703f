//! 윈도우 통계 스냅샷.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 소비자에게 전달되는 집계 스냅샷.
///
/// 윈도우 합계 필드는 설정된 윈도우 길이 기준이며 60초로 고정되어 있지 않습니다.
/// 직렬화 시에는 기존 소비자 호환을 위해 `messagesPerMinute` / `bytesPerMinute` 이름을 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// 최근 1초 동안의 메시지 수
    pub messages_per_second: usize,
    /// 윈도우 안의 메시지 수
    #[serde(rename = "messagesPerMinute")]
    pub messages_per_window: usize,
    /// 최근 1초 동안의 바이트 합
    pub bytes_per_second: usize,
    /// 윈도우 안의 바이트 합
    #[serde(rename = "bytesPerMinute")]
    pub bytes_per_window: usize,
    /// 윈도우 안의 단어별 등장 포스트 수
    pub word_frequencies: HashMap<String, usize>,
}

impl StatsSnapshot {
    /// 빈도 상위 `n`개 단어 (빈도 내림차순, 같으면 사전순).
    pub fn top_words(&self, n: usize) -> Vec<(&str, usize)> {
        let mut words: Vec<(&str, usize)> = self
            .word_frequencies
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
            .collect();

        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        words.truncate(n);
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(words: &[(&str, usize)]) -> StatsSnapshot {
        StatsSnapshot {
            word_frequencies: words
                .iter()
                .map(|(w, c)| (w.to_string(), *c))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_top_words_ordering() {
        let snapshot = snapshot_with(&[("happy", 2), ("octopus", 5), ("ocean", 2), ("love", 1)]);

        assert_eq!(
            snapshot.top_words(3),
            vec![("octopus", 5), ("happy", 2), ("ocean", 2)]
        );
    }

    #[test]
    fn test_top_words_empty() {
        assert!(StatsSnapshot::default().top_words(10).is_empty());
    }

    #[test]
    fn test_wire_names() {
        let snapshot = StatsSnapshot {
            messages_per_second: 1,
            messages_per_window: 5,
            bytes_per_second: 100,
            bytes_per_window: 500,
            word_frequencies: HashMap::new(),
        };

        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["messagesPerSecond"], 1);
        assert_eq!(value["messagesPerMinute"], 5);
        assert_eq!(value["bytesPerSecond"], 100);
        assert_eq!(value["bytesPerMinute"], 500);
        assert!(value["wordFrequencies"].as_object().unwrap().is_empty());
    }
}
