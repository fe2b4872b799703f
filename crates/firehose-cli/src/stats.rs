//! 모니터 세션 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 한 번의 `watch` 세션 동안 소비자가 받은 업데이트 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// 받은 이벤트 수 (샘플/필터 통과)
    pub events: usize,
    /// 화면에 표시한 이벤트 수
    pub shown: usize,
    /// 받은 통계 스냅샷 수
    pub snapshots: usize,
    /// 거부된 제어 명령 수
    pub rejected_commands: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SessionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 표시 비율 계산 (%)
    pub fn shown_rate(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            (self.shown as f64 / self.events as f64) * 100.0
        }
    }

    /// 초당 이벤트 수
    pub fn events_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.events as f64 / secs
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            events = self.events,
            shown = self.shown,
            snapshots = self.snapshots,
            rejected_commands = self.rejected_commands,
            shown_rate = format!("{:.1}%", self.shown_rate()),
            events_per_sec = format!("{:.2}", self.events_per_sec()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "Session finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_on_empty_session() {
        let stats = SessionStats::new();
        assert_eq!(stats.shown_rate(), 0.0);
        assert_eq!(stats.events_per_sec(), 0.0);
    }

    #[test]
    fn test_rates() {
        let stats = SessionStats {
            events: 40,
            shown: 10,
            elapsed: Duration::from_secs(20),
            ..Default::default()
        };

        assert!((stats.shown_rate() - 25.0).abs() < f64::EPSILON);
        assert!((stats.events_per_sec() - 2.0).abs() < f64::EPSILON);
    }
}
