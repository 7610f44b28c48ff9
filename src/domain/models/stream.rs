#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StreamStatus {
    Idle,
    Streaming,
    Completed,
    TimedOut,
    Errored,
}

impl StreamStatus {
    pub fn is_terminal(&self) -> bool {
        return matches!(
            self,
            StreamStatus::Completed | StreamStatus::TimedOut | StreamStatus::Errored
        );
    }
}

/// Final state reported exactly once when a lesson stream stops.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StreamOutcome {
    pub status: StreamStatus,
    pub can_resend: bool,
}

impl StreamOutcome {
    pub fn completed() -> StreamOutcome {
        return StreamOutcome {
            status: StreamStatus::Completed,
            can_resend: false,
        };
    }

    pub fn failed(status: StreamStatus) -> StreamOutcome {
        return StreamOutcome {
            status,
            can_resend: true,
        };
    }
}
