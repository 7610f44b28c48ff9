#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use super::ProgressStore;
use crate::domain::models::Action;
use crate::domain::models::ApiError;
use crate::domain::models::Event;
use crate::domain::models::LearnerApiBox;
use crate::domain::models::RunRequest;
use crate::domain::models::StreamOutcome;
use crate::domain::models::StreamStatus;
use crate::infrastructure::stream::StreamConnector;
use crate::infrastructure::stream::StreamHandle;

fn open_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    if let Some(ApiError::Unauthorized(_)) = err.downcast_ref::<ApiError>() {
        tx.send(Event::AuthRequired())?;
        return Ok(());
    }

    tracing::error!(error = ?err, "Failed to open lesson stream");
    tx.send(Event::StreamError(format!(
        "The lesson could not be loaded: {err}"
    )))?;
    tx.send(Event::StreamEnd(StreamOutcome::failed(StreamStatus::Errored)))?;

    return Ok(());
}

async fn stream_open(
    connector: &StreamConnector,
    request: RunRequest,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<Option<StreamHandle>> {
    match connector.open(&request, tx.clone()).await {
        Ok(handle) => {
            return Ok(Some(handle));
        }
        Err(err) => {
            open_error(err, tx)?;
            return Ok(None);
        }
    }
}

async fn reset_chapter(
    api: &LearnerApiBox,
    progress: &ProgressStore,
    chapter_id: &str,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    if let Err(err) = progress.reset_chapter(api.as_ref(), chapter_id).await {
        if let Some(ApiError::Unauthorized(_)) = err.downcast_ref::<ApiError>() {
            tx.send(Event::AuthRequired())?;
            return Ok(());
        }

        tx.send(Event::Notice(format!(
            "The chapter could not be reset: {err}"
        )))?;
        return Ok(());
    }

    tx.send(Event::ChapterReset(chapter_id.to_string()))?;
    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs until the action channel closes. At most one lesson stream is
    /// open at a time; opening a new one closes the previous.
    pub async fn start(
        connector: StreamConnector,
        api: LearnerApiBox,
        progress: ProgressStore,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut stream: Option<StreamHandle> = None;

        while let Some(action) = rx.recv().await {
            match action {
                Action::StreamOpen(request) => {
                    if let Some(handle) = stream.take() {
                        handle.close();
                    }
                    stream = stream_open(&connector, request, &tx).await?;
                }
                Action::StreamAbort() => {
                    if let Some(handle) = &stream {
                        handle.close();
                    }
                }
                Action::ResetChapter(chapter_id) => {
                    if let Some(handle) = stream.take() {
                        handle.close();
                    }
                    reset_chapter(&api, &progress, &chapter_id, &tx).await?;
                }
            }
        }

        if let Some(handle) = stream {
            handle.close();
        }

        return Ok(());
    }
}
