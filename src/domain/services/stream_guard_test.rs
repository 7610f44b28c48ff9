use super::StreamGuard;
use crate::domain::models::StreamOutcome;
use crate::domain::models::StreamStatus;

fn streaming(timeout_ticks: u64, max_errors: u32) -> StreamGuard {
    let mut guard = StreamGuard::new(timeout_ticks, max_errors);
    guard.start();
    return guard;
}

#[test]
fn it_starts_idle() {
    let mut guard = StreamGuard::default();
    assert_eq!(guard.status(), StreamStatus::Idle);
    assert_eq!(guard.on_tick(), None);
    assert_eq!(guard.on_transport_error(), None);
    assert_eq!(guard.elapsed_ticks(), 0);

    guard.start();
    assert_eq!(guard.status(), StreamStatus::Streaming);
}

#[test]
fn it_times_out_after_default_threshold() {
    let mut guard = streaming(300, 3);
    for _ in 0..300 {
        assert_eq!(guard.on_tick(), None);
    }

    let outcome = guard.on_tick();
    assert_eq!(
        outcome,
        Some(StreamOutcome {
            status: StreamStatus::TimedOut,
            can_resend: true,
        })
    );
    assert_eq!(guard.status(), StreamStatus::TimedOut);
}

#[test]
fn it_resets_ticks_on_message() {
    let mut guard = streaming(5, 3);
    for _ in 0..5 {
        assert_eq!(guard.on_tick(), None);
    }
    guard.on_message();
    assert_eq!(guard.elapsed_ticks(), 0);

    for _ in 0..5 {
        assert_eq!(guard.on_tick(), None);
    }
    assert!(guard.on_tick().is_some());
}

#[test]
fn it_errors_after_exceeding_max_errors() {
    let mut guard = streaming(300, 3);
    assert_eq!(guard.on_transport_error(), None);
    assert_eq!(guard.on_transport_error(), None);
    assert_eq!(guard.on_transport_error(), None);

    let outcome = guard.on_transport_error();
    assert_eq!(
        outcome,
        Some(StreamOutcome {
            status: StreamStatus::Errored,
            can_resend: true,
        })
    );
    assert_eq!(guard.errors(), 4);
}

#[test]
fn it_ignores_input_once_terminal() {
    let mut guard = streaming(1, 0);
    assert!(guard.on_transport_error().is_some());

    assert_eq!(guard.on_tick(), None);
    assert_eq!(guard.on_tick(), None);
    assert_eq!(guard.on_transport_error(), None);
    assert_eq!(guard.complete(), None);
    assert_eq!(guard.status(), StreamStatus::Errored);
}

#[test]
fn it_completes_once() {
    let mut guard = streaming(300, 3);
    assert_eq!(guard.complete(), Some(StreamOutcome::completed()));
    assert_eq!(guard.complete(), None);
    assert_eq!(guard.on_tick(), None);
    assert_eq!(guard.status(), StreamStatus::Completed);
}

#[test]
fn it_fails_when_body_ends_before_done() {
    let mut guard = streaming(300, 3);
    assert_eq!(guard.on_transport_error(), None);

    assert_eq!(
        guard.on_disconnect(),
        Some(StreamOutcome::failed(StreamStatus::Errored))
    );
    assert_eq!(guard.on_disconnect(), None);
    assert_eq!(guard.status(), StreamStatus::Errored);
}

#[test]
fn it_ignores_disconnect_after_done() {
    let mut guard = streaming(300, 3);
    guard.complete();
    assert_eq!(guard.on_disconnect(), None);
    assert_eq!(guard.status(), StreamStatus::Completed);
}
