#[cfg(test)]
#[path = "stream_guard_test.rs"]
mod tests;

use crate::domain::models::StreamOutcome;
use crate::domain::models::StreamStatus;

pub const DEFAULT_TIMEOUT_TICKS: u64 = 300;
pub const DEFAULT_MAX_ERRORS: u32 = 3;

/// Liveness and transport-error failsafe for a single lesson stream.
///
/// Every inbound message resets the idle counter. A tick source increments
/// it, and once it exceeds `timeout_ticks` the stream is considered dead.
/// Transport errors are counted separately and the stream is abandoned once
/// there are more than `max_errors` of them. Neither path reconnects; both
/// report `can_resend` so the learner can retry by hand.
pub struct StreamGuard {
    status: StreamStatus,
    elapsed_ticks: u64,
    timeout_ticks: u64,
    errors: u32,
    max_errors: u32,
}

impl Default for StreamGuard {
    fn default() -> StreamGuard {
        return StreamGuard::new(DEFAULT_TIMEOUT_TICKS, DEFAULT_MAX_ERRORS);
    }
}

impl StreamGuard {
    pub fn new(timeout_ticks: u64, max_errors: u32) -> StreamGuard {
        return StreamGuard {
            status: StreamStatus::Idle,
            elapsed_ticks: 0,
            timeout_ticks,
            errors: 0,
            max_errors,
        };
    }

    pub fn status(&self) -> StreamStatus {
        return self.status;
    }

    pub fn elapsed_ticks(&self) -> u64 {
        return self.elapsed_ticks;
    }

    pub fn errors(&self) -> u32 {
        return self.errors;
    }

    pub fn start(&mut self) {
        if self.status == StreamStatus::Idle {
            self.status = StreamStatus::Streaming;
        }
    }

    pub fn on_message(&mut self) {
        if self.status == StreamStatus::Streaming {
            self.elapsed_ticks = 0;
        }
    }

    pub fn on_tick(&mut self) -> Option<StreamOutcome> {
        if self.status != StreamStatus::Streaming {
            return None;
        }

        self.elapsed_ticks += 1;
        if self.elapsed_ticks > self.timeout_ticks {
            tracing::warn!(
                ticks = self.elapsed_ticks,
                "No lesson stream activity, closing stream"
            );
            self.status = StreamStatus::TimedOut;
            return Some(StreamOutcome::failed(self.status));
        }

        return None;
    }

    pub fn on_transport_error(&mut self) -> Option<StreamOutcome> {
        if self.status != StreamStatus::Streaming {
            return None;
        }

        self.errors += 1;
        if self.errors > self.max_errors {
            tracing::warn!(errors = self.errors, "Too many lesson stream errors");
            self.status = StreamStatus::Errored;
            return Some(StreamOutcome::failed(self.status));
        }

        return None;
    }

    /// The body ended without the done sentinel. Transports do not retry
    /// after a dropped connection, so this is a failure the learner can
    /// resend.
    pub fn on_disconnect(&mut self) -> Option<StreamOutcome> {
        if self.status.is_terminal() {
            return None;
        }

        tracing::warn!(errors = self.errors, "Lesson stream ended before it was done");
        self.status = StreamStatus::Errored;
        return Some(StreamOutcome::failed(self.status));
    }

    pub fn complete(&mut self) -> Option<StreamOutcome> {
        if self.status.is_terminal() {
            return None;
        }

        self.status = StreamStatus::Completed;
        return Some(StreamOutcome::completed());
    }
}
