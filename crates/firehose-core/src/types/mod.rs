//! 스트림 엔진과 소비자가 공유하는 타입.

mod bytes;
mod event;
mod snapshot;

pub use bytes::*;
pub use event::*;
pub use snapshot::*;
