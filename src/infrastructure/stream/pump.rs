#[cfg(test)]
#[path = "pump_test.rs"]
mod tests;

use std::fmt::Display;

use eventsource_stream::Event as SseEvent;
use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::Ticker;
use crate::domain::models::Event;
use crate::domain::models::StreamFrame;
use crate::domain::models::StreamOutcome;
use crate::domain::models::StreamStatus;
use crate::domain::services::StreamGuard;

const DONE: &str = "[DONE]";

fn handle_sse(
    sse: SseEvent,
    guard: &mut StreamGuard,
    tx: &mpsc::UnboundedSender<Event>,
) -> Option<StreamOutcome> {
    if sse.data.trim() == DONE {
        return guard.complete();
    }

    if !sse.event.is_empty() && sse.event != "message" {
        tracing::debug!(event = sse.event, "Skipping non-message stream event");
        return None;
    }

    match StreamFrame::parse(&sse.data) {
        Ok(frame) => {
            tracing::debug!(frame = ?frame, "Lesson stream frame");
            if tx.send(Event::StreamMessage(frame)).is_err() {
                // Nobody is listening anymore.
                return guard.complete();
            }
        }
        Err(err) => {
            tracing::warn!(error = ?err, data = sse.data, "Skipping malformed lesson stream frame");
        }
    }

    return None;
}

/// Drives a lesson stream until it completes, dies, or is cancelled.
///
/// Frames are forwarded as [`Event::StreamMessage`]. Unless cancelled by the
/// caller, exactly one [`Event::StreamEnd`] is sent when the stream stops.
/// After that, or after cancellation, nothing else is sent.
pub async fn pump<S, E, T>(
    mut events: S,
    mut ticker: T,
    mut guard: StreamGuard,
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) -> StreamStatus
where
    S: Stream<Item = Result<SseEvent, E>> + Unpin,
    E: Display,
    T: Ticker,
{
    guard.start();

    loop {
        let outcome = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(status = %guard.status(), "Lesson stream closed by caller");
                return guard.status();
            }
            next = events.next() => {
                match next {
                    Some(Ok(sse)) => {
                        guard.on_message();
                        handle_sse(sse, &mut guard, &tx)
                    }
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, errors = guard.errors() + 1, "Lesson stream transport error");
                        let outcome = guard.on_transport_error();
                        if outcome.is_some() {
                            let _ = tx.send(Event::StreamError(err.to_string()));
                        }
                        outcome
                    }
                    None => guard.on_disconnect(),
                }
            }
            _ = ticker.tick() => guard.on_tick(),
        };

        if let Some(outcome) = outcome {
            cancel.cancel();
            let _ = tx.send(Event::StreamEnd(outcome));
            return outcome.status;
        }
    }
}
