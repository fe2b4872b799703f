//! 스트림 에러 타입.

use thiserror::Error;

/// 스트림/전송 계층 에러.
#[derive(Debug, Error)]
pub enum StreamError {
    /// WebSocket 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// 연결 끊김
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 페이로드 파싱 에러 (해당 메시지만 버림)
    #[error("Parse error: {0}")]
    Parse(String),

    /// 제어 채널이 닫힘 (스트림 태스크 종료)
    #[error("Control channel closed")]
    ChannelClosed,
}

/// 스트림 작업을 위한 Result 타입.
pub type StreamResult<T> = Result<T, StreamError>;

impl StreamError {
    /// 외부 재연결 정책이 다시 시도해 볼 만한 에러인지 확인.
    ///
    /// 엔진 자신은 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::WebSocket(_) | StreamError::Disconnected(_))
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Parse(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for StreamError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        StreamError::WebSocket(err.to_string())
    }
}
