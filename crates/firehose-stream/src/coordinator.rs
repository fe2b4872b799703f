//! 스트림 코디네이터.
//!
//! 수신 메시지 하나를 Filter → Statistics → WordAnalyzer 순서로 흘려보내고,
//! 스냅샷 간격(debounce)에 맞춰 소비자에게 결과를 전달합니다.
//! 모든 상태 변경은 메시지 핸들러 안에서 동기적으로 일어납니다.
//!
//! # 전달 규칙
//!
//! 스냅샷 차례인 메시지:
//! - 포함된 이벤트 → `(event, stats)`
//! - 포함되지 않았고 필터가 없으면 독립적으로 다시 추첨, 성공 시 `(event, stats)`
//! - 그 외 → `(None, stats)`
//!
//! 스냅샷 차례가 아닌 메시지는 포함된 이벤트만 `(event, None)`으로 즉시 전달합니다.

use firehose_core::{PostEvent, StatsSnapshot, StreamConfig};
use tracing::{debug, info};

use crate::consumer::StreamConsumer;
use crate::error::StreamResult;
use crate::sampler::{MessageFilter, RandomSource, SampleSource};
use crate::statistics::WindowStatistics;
use crate::words::WordAnalyzer;

/// 기본 스냅샷 간격 (밀리초).
pub const DEFAULT_DEBOUNCE_MS: i64 = 100;

/// 연결 하나에 대한 집계 상태와 소비자.
pub struct StreamCoordinator<C, S = RandomSource> {
    filter: MessageFilter,
    statistics: WindowStatistics,
    words: WordAnalyzer,
    consumer: C,
    source: S,
    debounce_ms: i64,
    last_stats_update: Option<i64>,
}

impl<C: StreamConsumer> StreamCoordinator<C, RandomSource> {
    /// 엔트로피 시드 난수로 코디네이터를 만듭니다.
    pub fn new(consumer: C, window_secs: u64, fraction: f64) -> Self {
        Self::with_source(consumer, RandomSource::from_entropy(), window_secs, fraction)
    }

    /// 설정 값으로 코디네이터를 만듭니다. 필터도 함께 적용됩니다.
    pub fn from_config(consumer: C, config: &StreamConfig) -> Self {
        let mut coordinator = Self::new(consumer, config.window_secs, config.fraction);
        coordinator.set_debounce_ms(config.debounce_ms);
        if !config.filter.is_empty() {
            coordinator.set_filter(&config.filter);
        }
        coordinator
    }
}

impl<C: StreamConsumer, S: SampleSource> StreamCoordinator<C, S> {
    /// 난수 공급원을 주입해 코디네이터를 만듭니다.
    pub fn with_source(consumer: C, source: S, window_secs: u64, fraction: f64) -> Self {
        Self {
            filter: MessageFilter::new(fraction),
            statistics: WindowStatistics::new(secs_to_ms(window_secs)),
            words: WordAnalyzer::new(),
            consumer,
            source,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            last_stats_update: None,
        }
    }

    pub fn set_debounce_ms(&mut self, debounce_ms: u64) {
        self.debounce_ms = i64::try_from(debounce_ms).unwrap_or(i64::MAX);
    }

    /// 윈도우 길이(초) 변경. 기존 데이터는 지우지 않습니다.
    pub fn set_timeout(&mut self, window_secs: u64) {
        info!(window_secs, "Window length changed");
        self.statistics.set_timeout(secs_to_ms(window_secs));
    }

    /// 샘플링 비율 변경. 기존 데이터는 지우지 않습니다.
    pub fn set_fraction(&mut self, fraction: f64) {
        info!(fraction, "Sample fraction changed");
        self.filter.set_fraction(fraction);
    }

    /// 필터 변경. 필터 시리즈와 단어 인덱스는 이전 필터 기준이므로 비웁니다.
    pub fn set_filter(&mut self, term: &str) {
        info!(filter = %term, "Text filter changed");
        self.filter.set_filter(term);
        self.statistics.clear_filtered();
        self.words.clear();
    }

    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }

    pub fn window_ms(&self) -> i64 {
        self.statistics.window_ms()
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    /// 메시지 하나를 처리합니다.
    ///
    /// 디코딩에 실패하면 아무것도 기록하지 않고 에러를 돌려줍니다.
    /// 호출자는 에러를 기록하고 다음 메시지로 넘어가면 됩니다.
    pub fn handle_message(&mut self, raw: &str, now: i64) -> StreamResult<()> {
        let event = PostEvent::from_json(raw)?;
        let byte_size = raw.len();

        let included = self.filter.should_include(&event, &mut self.source);
        self.statistics.record_message(now, byte_size, included);

        if included {
            if let Some(text) = event.text() {
                self.words.update_word_frequencies(text, now);
            }
        }

        if self.snapshot_due(now) {
            let stats = self.snapshot(now);
            self.last_stats_update = Some(now);

            if included || self.filter.resample(&mut self.source) {
                self.consumer.on_message(Some(event), Some(stats));
            } else {
                self.consumer.on_message(None, Some(stats));
            }
        } else if included {
            self.consumer.on_message(Some(event), None);
        }

        Ok(())
    }

    /// 현재 시점의 통계 스냅샷을 계산합니다 (만료 처리 포함).
    ///
    /// 필터가 활성이면 필터 시리즈, 아니면 전체 시리즈를 사용합니다.
    pub fn snapshot(&mut self, now: i64) -> StatsSnapshot {
        let window_ms = self.statistics.window_ms();
        let word_frequencies = self.words.word_frequencies(now, window_ms);
        let counters = self.statistics.calculate_stats(now, self.filter.is_active());

        debug!(
            messages_per_window = counters.messages_per_window,
            words = word_frequencies.len(),
            "Snapshot computed"
        );

        StatsSnapshot {
            messages_per_second: counters.messages_per_second,
            messages_per_window: counters.messages_per_window,
            bytes_per_second: counters.bytes_per_second,
            bytes_per_window: counters.bytes_per_window,
            word_frequencies,
        }
    }

    fn snapshot_due(&self, now: i64) -> bool {
        match self.last_stats_update {
            Some(last) => now - last >= self.debounce_ms,
            None => true,
        }
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)
}
