//! 수신 루프 통합 테스트.
//!
//! 실제 소켓 대신 메시지 스트림을 주입해 `drive`의 처리 순서와 종료 조건을 검증합니다.

use firehose_core::{PostEvent, StatsSnapshot};
use firehose_stream::{
    drive, ConnectionStatus, ControlCommand, DriveOutcome, StreamConsumer, StreamCoordinator,
};
use futures::stream;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, protocol::Message};

// ============================================================================
// 헬퍼
// ============================================================================

#[derive(Default)]
struct Recorder {
    deliveries: Vec<(Option<PostEvent>, Option<StatsSnapshot>)>,
    statuses: Vec<ConnectionStatus>,
}

impl Recorder {
    fn events(&self) -> usize {
        self.deliveries.iter().filter(|(e, _)| e.is_some()).count()
    }
}

impl StreamConsumer for Recorder {
    fn on_message(&mut self, event: Option<PostEvent>, stats: Option<StatsSnapshot>) {
        self.deliveries.push((event, stats));
    }

    fn on_connection(&mut self, status: ConnectionStatus) {
        self.statuses.push(status);
    }
}

fn post(text: &str) -> Result<Message, tungstenite::Error> {
    let raw = json!({
        "did": "did:plc:drive",
        "kind": "commit",
        "commit": { "rkey": "k", "record": { "text": text } }
    })
    .to_string();
    Ok(Message::Text(raw.into()))
}

fn unfiltered() -> StreamCoordinator<Recorder> {
    StreamCoordinator::new(Recorder::default(), 60, 1.0)
}

// ============================================================================
// 테스트
// ============================================================================

#[tokio::test]
async fn test_drive_processes_until_stream_ends() {
    let mut coordinator = unfiltered();
    let (_tx, rx) = mpsc::channel(4);
    let messages = stream::iter(vec![
        post("octopus in the ocean"),
        Ok(Message::Text("{not json".to_string().into())),
        Ok(Message::Ping(Vec::new().into())),
        post("another octopus"),
    ]);

    let outcome = drive(messages, &mut coordinator, rx).await;

    assert_eq!(outcome, DriveOutcome::Closed);
    let recorder = coordinator.consumer();
    assert_eq!(recorder.events(), 2);
    assert!(recorder.deliveries[0].1.is_some());
    assert_eq!(recorder.statuses, vec![ConnectionStatus::Closed]);

    let stats = coordinator.snapshot(chrono::Utc::now().timestamp_millis());
    assert_eq!(stats.messages_per_window, 2);
    assert_eq!(stats.word_frequencies.get("octopus"), Some(&2));
}

#[tokio::test]
async fn test_pending_commands_apply_before_next_message() {
    let mut coordinator = unfiltered();
    let (tx, rx) = mpsc::channel(4);
    tx.send(ControlCommand::SetFilter("squid".to_string()))
        .await
        .unwrap();

    let messages = stream::iter(vec![post("octopus only")]);
    drive(messages, &mut coordinator, rx).await;

    assert_eq!(coordinator.filter().filter_term(), "squid");
    let recorder = coordinator.consumer();
    assert_eq!(recorder.events(), 0);
    let stats = recorder.deliveries[0].1.as_ref().unwrap();
    assert_eq!(stats.messages_per_window, 0);
}

#[tokio::test]
async fn test_binary_frames_are_decoded() {
    let mut coordinator = unfiltered();
    let (_tx, rx) = mpsc::channel(4);
    let raw = json!({ "commit": { "record": { "text": "binary octopus" } } }).to_string();
    let messages = stream::iter(vec![Ok(Message::Binary(raw.into_bytes().into()))]);

    drive(messages, &mut coordinator, rx).await;

    assert_eq!(coordinator.consumer().events(), 1);
}

#[tokio::test]
async fn test_disconnect_command_stops_loop() {
    let mut coordinator = unfiltered();
    let (tx, rx) = mpsc::channel(4);
    tx.send(ControlCommand::SetTimeout(30)).await.unwrap();
    tx.send(ControlCommand::Disconnect).await.unwrap();

    let outcome = drive(stream::pending(), &mut coordinator, rx).await;

    assert_eq!(outcome, DriveOutcome::Requested);
    assert_eq!(coordinator.window_ms(), 30_000);
    assert_eq!(
        coordinator.consumer().statuses,
        vec![ConnectionStatus::Disconnected]
    );
}

#[tokio::test]
async fn test_dropped_handle_stops_loop() {
    let mut coordinator = unfiltered();
    let (tx, rx) = mpsc::channel::<ControlCommand>(4);
    drop(tx);

    let outcome = drive(stream::pending(), &mut coordinator, rx).await;

    assert_eq!(outcome, DriveOutcome::Requested);
    assert!(coordinator.consumer().deliveries.is_empty());
}

#[tokio::test]
async fn test_server_close_ends_processing() {
    let mut coordinator = unfiltered();
    let (_tx, rx) = mpsc::channel(4);
    let messages = stream::iter(vec![
        post("before close"),
        Ok(Message::Close(None)),
        post("after close"),
    ]);

    let outcome = drive(messages, &mut coordinator, rx).await;

    assert_eq!(outcome, DriveOutcome::Closed);
    assert_eq!(coordinator.consumer().events(), 1);
}

#[tokio::test]
async fn test_socket_error_is_reported() {
    let mut coordinator = unfiltered();
    let (_tx, rx) = mpsc::channel(4);
    let messages = stream::iter(vec![
        post("hello there"),
        Err(tungstenite::Error::ConnectionClosed),
    ]);

    let outcome = drive(messages, &mut coordinator, rx).await;

    assert!(matches!(outcome, DriveOutcome::Failed(_)));
    assert!(matches!(
        coordinator.consumer().statuses.as_slice(),
        [ConnectionStatus::Error(_)]
    ));
}
