//! 소비자 콜백.

use firehose_core::{PostEvent, StatsSnapshot};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// 연결 상태 알림.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// 연결됨
    Connected,
    /// 서버가 연결을 닫음
    Closed,
    /// 요청에 따라 연결을 끊음
    Disconnected,
    /// 소켓 에러 (재연결은 호출자 책임)
    Error(String),
}

/// 메시지마다 호출되는 소비자.
///
/// `(이벤트 | 없음, 통계 | 없음)` 형태로 호출됩니다. 이벤트의 소유권은 소비자로 넘어갑니다.
pub trait StreamConsumer: Send {
    fn on_message(&mut self, event: Option<PostEvent>, stats: Option<StatsSnapshot>);

    fn on_connection(&mut self, _status: ConnectionStatus) {}
}

impl<F> StreamConsumer for F
where
    F: FnMut(Option<PostEvent>, Option<StatsSnapshot>) + Send,
{
    fn on_message(&mut self, event: Option<PostEvent>, stats: Option<StatsSnapshot>) {
        self(event, stats)
    }
}

/// 채널로 전달되는 스트림 업데이트.
#[derive(Debug, Clone)]
pub enum StreamUpdate {
    Message {
        event: Option<PostEvent>,
        stats: Option<StatsSnapshot>,
    },
    Status(ConnectionStatus),
}

/// 상태 알림 전용으로 비워 두는 채널 슬롯 수.
///
/// 연결당 종료 상태(`Closed`/`Disconnected`/`Error`)는 한 번만 발생하고
/// `Connected`는 채널이 비어 있을 때 보내지므로 한 칸이면 충분합니다.
const STATUS_RESERVE: usize = 1;

/// bounded mpsc 채널로 업데이트를 넘기는 소비자.
///
/// 받는 쪽이 밀리면 메시지 업데이트를 버립니다. 업스트림으로 역압을 걸지 않습니다.
/// 상태 알림은 예약 슬롯을 사용하므로 메시지 적체로 유실되지 않습니다.
pub struct ChannelConsumer {
    tx: mpsc::Sender<StreamUpdate>,
    dropped: u64,
}

impl ChannelConsumer {
    /// 메시지 `capacity`개와 상태 예약 슬롯을 가진 채널을 만듭니다.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StreamUpdate>) {
        let (tx, rx) = mpsc::channel(capacity + STATUS_RESERVE);
        (Self { tx, dropped: 0 }, rx)
    }

    /// 지금까지 버린 메시지 업데이트 수.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl StreamConsumer for ChannelConsumer {
    fn on_message(&mut self, event: Option<PostEvent>, stats: Option<StatsSnapshot>) {
        // 송신자는 이 소비자 하나뿐이라 capacity 확인 후 try_send 사이에 줄어들지 않음
        if self.tx.capacity() <= STATUS_RESERVE {
            self.dropped += 1;
            debug!(dropped = self.dropped, "Consumer lagging, update dropped");
            return;
        }

        if let Err(e) = self.tx.try_send(StreamUpdate::Message { event, stats }) {
            self.dropped += 1;
            debug!(dropped = self.dropped, "Update dropped: {}", e);
        }
    }

    fn on_connection(&mut self, status: ConnectionStatus) {
        if let Err(e) = self.tx.try_send(StreamUpdate::Status(status)) {
            warn!("Connection status not delivered: {}", e);
        }
    }
}
