//! # Firehose Core
//!
//! 실시간 포스트 스트림 모니터의 핵심 타입을 제공합니다.
//!
//! 이 크레이트는 스트림 엔진과 CLI가 함께 사용하는 기본 요소를 제공합니다:
//! - 원본 이벤트 래퍼 (`PostEvent`)
//! - 윈도우 통계 스냅샷 (`StatsSnapshot`)
//! - 설정 관리 및 경계 검증
//! - 로깅 인프라
//! - 에러 타입

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
