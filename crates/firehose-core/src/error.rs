//! 공통 에러 타입.
//!
//! 설정 경계와 이벤트 디코딩에서 발생하는 에러를 정의합니다.
//! 스트림 전송 계층의 에러는 `firehose-stream`의 `StreamError`가 담당합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum FirehoseError {
    /// 설정 에러 (로드 실패 또는 범위를 벗어난 값)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (런타임 파라미터 변경 명령 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type FirehoseResult<T> = Result<T, FirehoseError>;

impl FirehoseError {
    /// 사용자가 값을 고쳐 다시 시도할 수 있는 에러인지 확인합니다.
    pub fn is_user_error(&self) -> bool {
        matches!(self, FirehoseError::Config(_) | FirehoseError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for FirehoseError {
    fn from(err: serde_json::Error) -> Self {
        FirehoseError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for FirehoseError {
    fn from(err: config::ConfigError) -> Self {
        FirehoseError::Config(err.to_string())
    }
}
