//! Jetstream WebSocket 연결.
//!
//! 연결 하나당 태스크 하나가 코디네이터를 소유하고, 수신 메시지와 제어 명령을
//! 같은 루프에서 순서대로 처리합니다. 파라미터 변경은 다음 메시지부터 반영됩니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use firehose_stream::{connect, ChannelConsumer, StreamCoordinator};
//!
//! let (consumer, mut updates) = ChannelConsumer::channel(1024);
//! let coordinator = StreamCoordinator::new(consumer, 60, 0.01);
//! let handle = connect(url, coordinator).await?;
//!
//! handle.set_filter("rust").await?;
//! while let Some(update) = updates.recv().await {
//!     // ...
//! }
//! handle.disconnect().await?;
//! ```

use chrono::Utc;
use futures::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, warn, Instrument};

use crate::consumer::{ConnectionStatus, StreamConsumer};
use crate::coordinator::StreamCoordinator;
use crate::error::{StreamError, StreamResult};
use crate::sampler::SampleSource;

type WsError = tokio_tungstenite::tungstenite::Error;

const CONTROL_CHANNEL_CAPACITY: usize = 32;

/// 실행 중인 스트림에 보내는 제어 명령.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// 윈도우 길이 (초)
    SetTimeout(u64),
    /// 샘플링 비율
    SetFraction(f64),
    /// 텍스트 필터 (빈 문자열이면 해제)
    SetFilter(String),
    /// 연결 종료
    Disconnect,
}

/// 수신 루프가 끝난 이유.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// `Disconnect` 명령 또는 핸들 drop
    Requested,
    /// 서버가 닫았거나 스트림이 끝남
    Closed,
    /// 소켓 에러
    Failed(String),
}

/// 실행 중인 스트림 핸들.
pub struct StreamHandle {
    control_tx: mpsc::Sender<ControlCommand>,
    task: JoinHandle<DriveOutcome>,
}

impl StreamHandle {
    pub async fn send(&self, command: ControlCommand) -> StreamResult<()> {
        self.control_tx
            .send(command)
            .await
            .map_err(|_| StreamError::ChannelClosed)
    }

    pub async fn set_timeout(&self, window_secs: u64) -> StreamResult<()> {
        self.send(ControlCommand::SetTimeout(window_secs)).await
    }

    pub async fn set_fraction(&self, fraction: f64) -> StreamResult<()> {
        self.send(ControlCommand::SetFraction(fraction)).await
    }

    pub async fn set_filter(&self, term: impl Into<String>) -> StreamResult<()> {
        self.send(ControlCommand::SetFilter(term.into())).await
    }

    /// 연결을 닫고 태스크 종료를 기다립니다.
    ///
    /// 반환 이후에는 소비자 콜백이 더 이상 호출되지 않습니다.
    pub async fn disconnect(self) -> StreamResult<DriveOutcome> {
        // 이미 끝난 태스크면 채널이 닫혀 있을 수 있음
        let _ = self.control_tx.send(ControlCommand::Disconnect).await;
        self.task
            .await
            .map_err(|e| StreamError::Disconnected(e.to_string()))
    }
}

/// WebSocket에 연결하고 수신 태스크를 시작합니다.
///
/// 재연결은 하지 않습니다. 연결이 끊기면 소비자가 `ConnectionStatus`로 알림을 받습니다.
pub async fn connect<C, S>(
    url: &str,
    coordinator: StreamCoordinator<C, S>,
) -> StreamResult<StreamHandle>
where
    C: StreamConsumer + 'static,
    S: SampleSource + 'static,
{
    info!("Connecting to Jetstream: {}", url);

    let (ws_stream, _) = connect_async(url).await?;

    info!("Connected to Jetstream");

    let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
    let span = firehose_core::stream_span!("jetstream", url);

    let task = tokio::spawn(
        async move {
            let (mut write, read) = ws_stream.split();
            let mut coordinator = coordinator;
            coordinator
                .consumer_mut()
                .on_connection(ConnectionStatus::Connected);

            let outcome = drive(read, &mut coordinator, control_rx).await;

            if outcome == DriveOutcome::Requested {
                if let Err(e) = write.close().await {
                    debug!("Close frame not sent: {}", e);
                }
                info!("Disconnected from Jetstream");
            }

            outcome
        }
        .instrument(span),
    );

    Ok(StreamHandle { control_tx, task })
}

/// 수신 스트림이 끝나거나 종료 요청이 올 때까지 메시지를 처리합니다.
///
/// 메시지 타임스탬프는 수신 시점의 wall clock(epoch 밀리초)입니다.
/// 디코딩에 실패한 메시지는 버리고 계속 진행합니다.
pub async fn drive<R, C, S>(
    mut read: R,
    coordinator: &mut StreamCoordinator<C, S>,
    mut control_rx: mpsc::Receiver<ControlCommand>,
) -> DriveOutcome
where
    R: Stream<Item = Result<Message, WsError>> + Unpin,
    C: StreamConsumer,
    S: SampleSource,
{
    loop {
        tokio::select! {
            biased;

            command = control_rx.recv() => {
                match command {
                    Some(ControlCommand::Disconnect) => {
                        coordinator.consumer_mut().on_connection(ConnectionStatus::Disconnected);
                        return DriveOutcome::Requested;
                    }
                    Some(command) => apply_command(coordinator, command),
                    None => {
                        // 핸들이 drop되면 연결을 유지할 주체가 없음
                        coordinator.consumer_mut().on_connection(ConnectionStatus::Disconnected);
                        return DriveOutcome::Requested;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_payload(coordinator, &text);
                    }
                    Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                        Ok(text) => handle_payload(coordinator, text),
                        Err(e) => debug!("Dropping non UTF-8 binary frame: {}", e),
                    },
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // Pong은 tungstenite에서 자동으로 처리됨
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("WebSocket closed by server: {:?}", frame);
                        coordinator.consumer_mut().on_connection(ConnectionStatus::Closed);
                        return DriveOutcome::Closed;
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        coordinator
                            .consumer_mut()
                            .on_connection(ConnectionStatus::Error(e.to_string()));
                        return DriveOutcome::Failed(e.to_string());
                    }
                    None => {
                        warn!("WebSocket stream ended");
                        coordinator.consumer_mut().on_connection(ConnectionStatus::Closed);
                        return DriveOutcome::Closed;
                    }
                }
            }
        }
    }
}

fn handle_payload<C: StreamConsumer, S: SampleSource>(
    coordinator: &mut StreamCoordinator<C, S>,
    text: &str,
) {
    let now = Utc::now().timestamp_millis();
    if let Err(e) = coordinator.handle_message(text, now) {
        debug!("Dropping malformed payload: {}", e);
    }
}

fn apply_command<C: StreamConsumer, S: SampleSource>(
    coordinator: &mut StreamCoordinator<C, S>,
    command: ControlCommand,
) {
    match command {
        ControlCommand::SetTimeout(secs) => coordinator.set_timeout(secs),
        ControlCommand::SetFraction(fraction) => coordinator.set_fraction(fraction),
        ControlCommand::SetFilter(term) => coordinator.set_filter(&term),
        ControlCommand::Disconnect => {}
    }
}
