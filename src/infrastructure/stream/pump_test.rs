use anyhow::Result;
use async_trait::async_trait;
use eventsource_stream::Event as SseEvent;
use futures::stream;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::pump;
use crate::domain::models::Event;
use crate::domain::models::StreamEvent;
use crate::domain::models::StreamOutcome;
use crate::domain::models::StreamStatus;
use crate::domain::services::ChatState;
use crate::domain::services::ProgressStore;
use crate::domain::services::StreamGuard;
use crate::infrastructure::stream::Ticker;

struct ChannelTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            futures::future::pending::<()>().await;
        }
    }
}

fn ticker(ticks: usize) -> ChannelTicker {
    let (tx, rx) = mpsc::unbounded_channel::<()>();
    for _ in 0..ticks {
        tx.send(()).unwrap();
    }
    return ChannelTicker { rx };
}

fn sse(data: &str) -> Result<SseEvent, String> {
    return Ok(SseEvent {
        event: "message".to_string(),
        data: data.to_string(),
        id: "".to_string(),
        retry: None,
    });
}

fn transport_error() -> Result<SseEvent, String> {
    return Err("connection reset".to_string());
}

fn held_open(
    items: Vec<Result<SseEvent, String>>,
) -> impl Stream<Item = Result<SseEvent, String>> + Unpin {
    return stream::iter(items).chain(stream::pending());
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    return events;
}

fn ends(events: &[Event]) -> Vec<StreamOutcome> {
    return events
        .iter()
        .filter_map(|e| match e {
            Event::StreamEnd(outcome) => return Some(*outcome),
            _ => return None,
        })
        .collect();
}

fn messages(events: &[Event]) -> Vec<StreamEvent> {
    return events
        .iter()
        .filter_map(|e| match e {
            Event::StreamMessage(frame) => return Some(frame.event.clone()),
            _ => return None,
        })
        .collect();
}

#[tokio::test]
async fn it_streams_until_done() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let cancel = CancellationToken::new();
    let events = held_open(vec![
        sse(r#"{"type":"text","content":"Hel"}"#),
        sse(r#"{"type":"text","content":"lo"}"#),
        sse("[DONE]"),
        sse(r#"{"type":"text","content":"ignored"}"#),
    ]);

    let status = pump(events, ticker(0), StreamGuard::default(), tx, cancel.clone()).await;

    assert_eq!(status, StreamStatus::Completed);
    assert!(cancel.is_cancelled());

    let received = drain(&mut rx);
    assert_eq!(
        messages(&received),
        vec![
            StreamEvent::Text("Hel".to_string()),
            StreamEvent::Text("lo".to_string())
        ]
    );
    assert_eq!(ends(&received), vec![StreamOutcome::completed()]);

    let progress = ProgressStore::default();
    let mut state = ChatState::new(progress, false);
    for event in received {
        match event {
            Event::StreamMessage(frame) => {
                state.handle_stream_frame(frame);
            }
            Event::StreamEnd(outcome) => {
                state.handle_stream_end(outcome);
            }
            _ => {}
        }
    }
    assert_eq!(state.transcript.len(), 1);
    assert_eq!(state.transcript.messages()[0].content, "Hello");

    return Ok(());
}

#[tokio::test]
async fn it_offers_resend_when_body_ends_early() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let events = stream::iter(vec![sse(r#"{"type":"text","content":"Hi"}"#)]);

    let status = pump(
        events,
        ticker(0),
        StreamGuard::default(),
        tx,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(status, StreamStatus::Errored);
    assert_eq!(
        ends(&drain(&mut rx)),
        vec![StreamOutcome::failed(StreamStatus::Errored)]
    );
}

#[tokio::test]
async fn it_offers_resend_when_connection_drops() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let events = stream::iter(vec![
        sse(r#"{"type":"text","content":"Hel"}"#),
        transport_error(),
    ]);

    let status = pump(
        events,
        ticker(0),
        StreamGuard::default(),
        tx,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(status, StreamStatus::Errored);
    let received = drain(&mut rx);
    assert_eq!(
        messages(&received),
        vec![StreamEvent::Text("Hel".to_string())]
    );
    let outcomes = ends(&received);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, StreamStatus::Errored);
    assert!(outcomes[0].can_resend);

    let progress = ProgressStore::default();
    let mut state = ChatState::new(progress, false);
    for event in received {
        match event {
            Event::StreamMessage(frame) => {
                state.handle_stream_frame(frame);
            }
            Event::StreamEnd(outcome) => {
                state.handle_stream_end(outcome);
            }
            _ => {}
        }
    }
    assert!(state.can_resend);
    assert_eq!(state.transcript.messages()[0].content, "Hel");
}

#[tokio::test]
async fn it_skips_malformed_frames() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let events = held_open(vec![
        sse("{\"type\":\"text\","),
        sse(r#"{"type":"text","content":"ok"}"#),
        sse("[DONE]"),
    ]);

    let status = pump(
        events,
        ticker(0),
        StreamGuard::default(),
        tx,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(status, StreamStatus::Completed);
    assert_eq!(
        messages(&drain(&mut rx)),
        vec![StreamEvent::Text("ok".to_string())]
    );
}

#[tokio::test]
async fn it_skips_non_message_events() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let ping = Ok(SseEvent {
        event: "ping".to_string(),
        data: r#"{"type":"text","content":"no"}"#.to_string(),
        id: "".to_string(),
        retry: None,
    });
    let events = held_open(vec![ping, sse("[DONE]")]);

    pump(
        events,
        ticker(0),
        StreamGuard::default(),
        tx,
        CancellationToken::new(),
    )
    .await;

    assert!(messages(&drain(&mut rx)).is_empty());
}

#[tokio::test]
async fn it_tolerates_a_few_transport_errors() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let events = held_open(vec![
        transport_error(),
        transport_error(),
        transport_error(),
        sse(r#"{"type":"text","content":"still here"}"#),
        sse("[DONE]"),
    ]);

    let status = pump(
        events,
        ticker(0),
        StreamGuard::default(),
        tx,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(status, StreamStatus::Completed);
    let received = drain(&mut rx);
    assert_eq!(messages(&received).len(), 1);
    assert!(!received.iter().any(|e| return matches!(e, Event::StreamError(_))));
}

#[tokio::test]
async fn it_gives_up_after_fourth_transport_error() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let cancel = CancellationToken::new();
    let events = held_open(vec![
        transport_error(),
        transport_error(),
        transport_error(),
        transport_error(),
        sse(r#"{"type":"text","content":"late"}"#),
        sse("[DONE]"),
    ]);

    let status = pump(events, ticker(0), StreamGuard::default(), tx, cancel.clone()).await;

    assert_eq!(status, StreamStatus::Errored);
    assert!(cancel.is_cancelled());

    let received = drain(&mut rx);
    assert!(messages(&received).is_empty());
    assert_eq!(
        ends(&received),
        vec![StreamOutcome {
            status: StreamStatus::Errored,
            can_resend: true,
        }]
    );
    assert!(matches!(received[0], Event::StreamError(_)));
}

#[tokio::test]
async fn it_times_out_without_activity() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let cancel = CancellationToken::new();
    let events = held_open(vec![]);

    let status = pump(
        events,
        ticker(301),
        StreamGuard::new(300, 3),
        tx,
        cancel.clone(),
    )
    .await;

    assert_eq!(status, StreamStatus::TimedOut);
    assert!(cancel.is_cancelled());
    assert_eq!(
        ends(&drain(&mut rx)),
        vec![StreamOutcome {
            status: StreamStatus::TimedOut,
            can_resend: true,
        }]
    );
}

#[tokio::test]
async fn it_stops_silently_when_cancelled() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let cancel = CancellationToken::new();
    let events = held_open(vec![sse(r#"{"type":"text","content":"Hi"}"#)]);

    let task = tokio::spawn(pump(
        events,
        ticker(0),
        StreamGuard::default(),
        tx,
        cancel.clone(),
    ));
    let first = rx.recv().await;
    assert!(matches!(first, Some(Event::StreamMessage(_))));

    cancel.cancel();
    let status = task.await?;

    assert_eq!(status, StreamStatus::Streaming);
    assert!(rx.recv().await.is_none());

    return Ok(());
}
