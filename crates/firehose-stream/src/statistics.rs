//! 슬라이딩 윈도우 통계.
//!
//! 도착 기록(타임스탬프, 바이트 크기)을 전체/필터 두 로그에 쌓고, 조회할 때마다
//! 만료된 기록을 제거한 뒤 네 가지 카운터를 처음부터 다시 계산합니다.
//! 누적 카운터를 유지하지 않으므로 윈도우 길이를 바꿔도 보정이 필요 없습니다.

use std::collections::VecDeque;

/// "최근 1초" 판정 기준 (밀리초).
const SECOND_MS: i64 = 1000;

/// 도착 기록 하나.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalRecord {
    /// 수신 시각 (epoch 밀리초)
    pub timestamp: i64,
    /// 원본 페이로드의 UTF-8 바이트 길이
    pub size: usize,
}

/// 수신 순서대로 쌓이는 도착 로그.
#[derive(Debug, Clone, Default)]
pub struct ArrivalLog {
    records: VecDeque<ArrivalRecord>,
}

impl ArrivalLog {
    pub fn push(&mut self, timestamp: i64, size: usize) {
        self.records.push_back(ArrivalRecord { timestamp, size });
    }

    /// `cutoff` 이하 타임스탬프를 모두 제거합니다.
    ///
    /// wall clock이 뒤로 갈 수 있으므로 앞쪽만 보지 않고 전체를 검사합니다.
    pub fn evict(&mut self, cutoff: i64) {
        self.records.retain(|record| record.timestamp > cutoff);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn counters(&self, now: i64) -> WindowCounters {
        let mut counters = WindowCounters {
            messages_per_window: self.records.len(),
            ..Default::default()
        };

        for record in &self.records {
            counters.bytes_per_window += record.size;
            if now - record.timestamp < SECOND_MS {
                counters.messages_per_second += 1;
                counters.bytes_per_second += record.size;
            }
        }

        counters
    }
}

/// 한 번의 통계 계산 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounters {
    pub messages_per_second: usize,
    pub messages_per_window: usize,
    pub bytes_per_second: usize,
    pub bytes_per_window: usize,
}

/// 전체/필터 두 시리즈의 윈도우 통계.
#[derive(Debug, Clone)]
pub struct WindowStatistics {
    window_ms: i64,
    all: ArrivalLog,
    filtered: ArrivalLog,
}

impl WindowStatistics {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            all: ArrivalLog::default(),
            filtered: ArrivalLog::default(),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// 다음 만료 처리부터 적용됩니다. 기존 기록은 건드리지 않습니다.
    pub fn set_timeout(&mut self, window_ms: i64) {
        self.window_ms = window_ms;
    }

    /// 전체 로그에는 항상, 필터 로그에는 `was_included`일 때만 기록합니다.
    pub fn record_message(&mut self, timestamp: i64, byte_size: usize, was_included: bool) {
        self.all.push(timestamp, byte_size);
        if was_included {
            self.filtered.push(timestamp, byte_size);
        }
    }

    /// 필터 시리즈를 비웁니다 (필터 변경 시).
    pub fn clear_filtered(&mut self) {
        self.filtered.clear();
    }

    /// 두 로그를 모두 만료 처리한 뒤 선택한 시리즈의 카운터를 계산합니다.
    pub fn calculate_stats(&mut self, now: i64, use_filtered: bool) -> WindowCounters {
        let cutoff = now - self.window_ms;
        self.all.evict(cutoff);
        self.filtered.evict(cutoff);

        let log = if use_filtered { &self.filtered } else { &self.all };
        log.counters(now)
    }

    pub fn all(&self) -> &ArrivalLog {
        &self.all
    }

    pub fn filtered(&self) -> &ArrivalLog {
        &self.filtered
    }
}
