//! 터미널 출력 형식.

use std::fmt::Write;

use firehose_core::{format_bytes, PostEvent, StatsSnapshot};

/// 표시할 포스트를 고르는 단어 선택.
///
/// 비어 있으면 모든 포스트를 표시합니다. 집계에는 영향을 주지 않는 소비자 쪽 필터입니다.
#[derive(Debug, Clone, Default)]
pub struct WordSelection {
    words: Vec<String>,
}

impl WordSelection {
    pub fn new<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// 본문에 선택 단어 중 하나라도 포함되면 true. 본문이 없으면 false.
    pub fn accepts(&self, event: &PostEvent) -> bool {
        if self.words.is_empty() {
            return true;
        }

        match event.text() {
            Some(text) => {
                let lowered = text.to_lowercase();
                self.words.iter().any(|w| lowered.contains(w.as_str()))
            }
            None => false,
        }
    }
}

/// 포스트 한 줄 표시. 본문이 없는 이벤트는 표시하지 않습니다.
pub fn format_post(event: &PostEvent) -> Option<String> {
    let text = event.text()?;
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    Some(match event.key() {
        Some(key) => format!("[{}] {}", key, text),
        None => text,
    })
}

/// 주기 리포트.
pub fn render_report(stats: &StatsSnapshot, top: usize, window_secs: u64) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "── {} msg/s · {}/s │ {} msg/{}s · {}",
        stats.messages_per_second,
        format_bytes(stats.bytes_per_second as u64),
        stats.messages_per_window,
        window_secs,
        format_bytes(stats.bytes_per_window as u64),
    );

    let words = stats.top_words(top);
    if words.is_empty() {
        let _ = writeln!(out, "   (no words tracked yet)");
    } else {
        for (rank, (word, count)) in words.iter().enumerate() {
            let _ = writeln!(out, "   {:>2}. {:<24} {}", rank + 1, word, count);
        }
    }

    out
}
