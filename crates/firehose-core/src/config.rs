//! 설정 관리.
//!
//! 설정은 세 단계로 쌓입니다: serde 기본값 → TOML 파일(선택) → `FIREHOSE_` 환경 변수.
//! 엔진은 값을 보정하지 않으므로 범위 검증은 여기서 끝내야 합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FirehoseError, FirehoseResult};

/// 기본 구독 주소 (Bluesky Jetstream, 포스트 컬렉션만).
pub const DEFAULT_JETSTREAM_URL: &str =
    "wss://jetstream2.us-west.bsky.network/subscribe?wantedCollections=app.bsky.feed.post";

/// 허용되는 최대 윈도우 길이 (초).
pub const MAX_WINDOW_SECS: u64 = 300;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 스트림 설정
    pub stream: StreamConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 스트림/집계 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// WebSocket 구독 주소
    pub url: String,
    /// 통계/단어 빈도 윈도우 길이 (초)
    pub window_secs: u64,
    /// 샘플링 비율 (0, 1]
    pub fraction: f64,
    /// 대소문자 무시 부분 문자열 필터 (빈 문자열이면 비활성)
    pub filter: String,
    /// 통계 스냅샷 최소 간격 (밀리초)
    pub debounce_ms: u64,
    /// 소비자 채널 용량
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_JETSTREAM_URL.to_string(),
            window_secs: 60,
            fraction: 0.01,
            filter: String::new(),
            debounce_ms: 100,
            channel_capacity: 1024,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 경로가 주어지면 파일은 반드시 존재해야 합니다.
    pub fn load(path: Option<&Path>) -> FirehoseResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FIREHOSE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 모든 값이 허용 범위 안에 있는지 검사합니다.
    pub fn validate(&self) -> FirehoseResult<()> {
        let stream = &self.stream;

        if stream.url.trim().is_empty() {
            return Err(FirehoseError::Config("stream.url이 비어 있습니다".to_string()));
        }
        validate_window_secs(stream.window_secs).map_err(into_config_error)?;
        validate_fraction(stream.fraction).map_err(into_config_error)?;
        if stream.channel_capacity == 0 {
            return Err(FirehoseError::Config(
                "stream.channel_capacity는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

/// 샘플링 비율 검증: (0, 1] 범위만 허용합니다.
pub fn validate_fraction(fraction: f64) -> FirehoseResult<f64> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(fraction)
    } else {
        Err(FirehoseError::InvalidInput(format!(
            "fraction은 (0, 1] 범위여야 합니다: {}",
            fraction
        )))
    }
}

/// 윈도우 길이 검증: 1..=300초만 허용합니다.
pub fn validate_window_secs(secs: u64) -> FirehoseResult<u64> {
    if (1..=MAX_WINDOW_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(FirehoseError::InvalidInput(format!(
            "window는 1..={} 초 범위여야 합니다: {}",
            MAX_WINDOW_SECS, secs
        )))
    }
}

fn into_config_error(err: FirehoseError) -> FirehoseError {
    match err {
        FirehoseError::InvalidInput(msg) => FirehoseError::Config(msg),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stream.window_secs, 60);
        assert_eq!(config.stream.debounce_ms, 100);
        assert!(config.stream.filter.is_empty());
    }

    #[test]
    fn test_validate_fraction() {
        assert!(validate_fraction(1.0).is_ok());
        assert!(validate_fraction(0.01).is_ok());
        assert!(validate_fraction(0.0).is_err());
        assert!(validate_fraction(1.5).is_err());
        assert!(validate_fraction(-0.1).is_err());
        assert!(validate_fraction(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_window_secs() {
        assert!(validate_window_secs(1).is_ok());
        assert!(validate_window_secs(300).is_ok());
        assert!(validate_window_secs(0).is_err());
        assert!(validate_window_secs(301).is_err());
    }

    #[test]
    fn test_invalid_config_reports_config_error() {
        let mut config = AppConfig::default();
        config.stream.fraction = 2.0;

        assert!(matches!(config.validate(), Err(FirehoseError::Config(_))));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[stream]\nwindow_secs = 30\nfraction = 0.5\nfilter = \"rust\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.stream.window_secs, 30);
        assert_eq!(config.stream.fraction, 0.5);
        assert_eq!(config.stream.filter, "rust");
        assert_eq!(config.stream.url, DEFAULT_JETSTREAM_URL);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/firehose.toml")));
        assert!(matches!(result, Err(FirehoseError::Config(_))));
    }
}
