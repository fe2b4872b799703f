//! 실시간 포스트 스트림 집계 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 샘플링 + 텍스트 필터 (`MessageFilter`)
//! - 슬라이딩 윈도우 통계 (`WindowStatistics`)
//! - 만료되는 단어 빈도 인덱스 (`WordAnalyzer`)
//! - 메시지별 파이프라인과 스냅샷 디바운스 (`StreamCoordinator`)
//! - Jetstream WebSocket 전송 (`connect`, `drive`)

pub mod connection;
pub mod consumer;
pub mod coordinator;
pub mod error;
pub mod sampler;
pub mod statistics;
pub mod words;

pub use connection::{connect, drive, ControlCommand, DriveOutcome, StreamHandle};
pub use consumer::{ChannelConsumer, ConnectionStatus, StreamConsumer, StreamUpdate};
pub use coordinator::{StreamCoordinator, DEFAULT_DEBOUNCE_MS};
pub use error::*;
pub use sampler::{MessageFilter, RandomSource, SampleSource};
pub use statistics::{ArrivalLog, ArrivalRecord, WindowCounters, WindowStatistics};
pub use words::{is_tracked_word, WordAnalyzer};
