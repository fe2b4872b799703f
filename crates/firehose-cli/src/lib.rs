//! Jetstream 포스트 파이어호스 터미널 모니터.
//!
//! 이 crate는 `firehose` 바이너리의 구성 요소를 제공합니다:
//! - stdin 제어 명령 파싱 (필터, 샘플링 비율, 윈도우 길이)
//! - 포스트/통계 리포트 출력 형식
//! - 세션 통계 요약

pub mod control;
pub mod display;
pub mod stats;

pub use control::{parse_input, ControlInput};
pub use display::{format_post, render_report, WordSelection};
pub use stats::SessionStats;
