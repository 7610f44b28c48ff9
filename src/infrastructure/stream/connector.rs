#[cfg(test)]
#[path = "connector_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use eventsource_stream::Eventsource;
use reqwest::header;
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::pump;
use super::IntervalTicker;
use super::TICK_PERIOD;
use crate::configuration::ClientSettings;
use crate::domain::models::ApiError;
use crate::domain::models::Event;
use crate::domain::models::RunRequest;
use crate::domain::models::StreamStatus;
use crate::domain::services::StreamGuard;
use crate::domain::services::UserStore;

/// Handle to a running lesson stream.
pub struct StreamHandle {
    cancel: CancellationToken,
    task: JoinHandle<StreamStatus>,
}

impl StreamHandle {
    /// Stops the stream. Safe to call any number of times, also after the
    /// stream ended on its own.
    pub fn close(&self) {
        if self.cancel.is_cancelled() {
            return;
        }

        tracing::debug!("Closing lesson stream");
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        return self.cancel.is_cancelled();
    }

    /// Waits for the stream task and returns the state it stopped in.
    pub async fn join(self) -> Result<StreamStatus> {
        return Ok(self.task.await?);
    }
}

pub struct StreamConnector {
    client: reqwest::Client,
    url: String,
    user: UserStore,
    timeout_ticks: u64,
    max_errors: u32,
}

impl StreamConnector {
    pub fn new(settings: &ClientSettings, user: UserStore) -> StreamConnector {
        return StreamConnector {
            client: reqwest::Client::new(),
            url: settings.api_url.trim_end_matches('/').to_string(),
            user,
            timeout_ticks: settings.stream_timeout_ticks,
            max_errors: settings.stream_max_errors,
        };
    }

    /// Opens the lesson-run stream. Fails without spawning anything when the
    /// server refuses the request; otherwise events are delivered on `tx`.
    pub async fn open(
        &self,
        request: &RunRequest,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Result<StreamHandle> {
        let request_id = Uuid::new_v4().to_string();
        let mut req = self
            .client
            .post(format!("{url}/api/study/run", url = self.url))
            .header("X-Request-ID", &request_id)
            .header(header::ACCEPT, "text/event-stream")
            .json(request);

        let token = self.user.token();
        if !token.is_empty() {
            req = req.bearer_auth(&token).query(&[("token", &token)]);
        }

        tracing::debug!(
            request_id = request_id,
            input_type = %request.input_type,
            lesson_id = request.lesson_id,
            "Opening lesson stream"
        );
        let res = req.send().await?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(status = status.as_u16(), "Lesson stream requires login");
            self.user.logout();
            bail!(ApiError::Unauthorized(status.to_string()));
        }
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                request_id = request_id,
                "Failed to open lesson stream"
            );
            bail!("Failed to open lesson stream ({status})");
        }

        let events = Box::pin(res.bytes_stream().eventsource());
        let guard = StreamGuard::new(self.timeout_ticks, self.max_errors);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(pump(
            events,
            IntervalTicker::every(TICK_PERIOD),
            guard,
            tx,
            cancel.clone(),
        ));

        return Ok(StreamHandle { cancel, task });
    }
}
