#[cfg(test)]
#[path = "progress_store_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use crate::domain::models::LearnerApi;
use crate::domain::models::SessionProgress;

/// Course, lesson and chapter position of the learner. Cloned handles share
/// the same state, and subscribers are only notified on actual changes so
/// that listeners reacting to their own writes settle.
#[derive(Clone)]
pub struct ProgressStore {
    tx: Arc<watch::Sender<SessionProgress>>,
}

impl Default for ProgressStore {
    fn default() -> ProgressStore {
        let (tx, _rx) = watch::channel(SessionProgress::default());
        return ProgressStore { tx: Arc::new(tx) };
    }
}

impl ProgressStore {
    pub fn init(&self, course_id: &str, lesson_id: &str) {
        self.tx.send_replace(SessionProgress {
            course_id: course_id.to_string(),
            lesson_id: lesson_id.to_string(),
            ..SessionProgress::default()
        });
    }

    pub fn reset(&self) {
        self.tx.send_replace(SessionProgress::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionProgress> {
        return self.tx.subscribe();
    }

    pub fn snapshot(&self) -> SessionProgress {
        return self.tx.borrow().clone();
    }

    pub fn update_chapter_id(&self, chapter_id: &str) -> bool {
        return self.tx.send_if_modified(|progress| {
            if progress.chapter_id == chapter_id {
                return false;
            }

            progress.chapter_id = chapter_id.to_string();
            progress.reseted_chapter_id = None;
            return true;
        });
    }

    pub fn update_lesson_id(&self, lesson_id: &str) -> bool {
        return self.tx.send_if_modified(|progress| {
            if progress.lesson_id == lesson_id {
                return false;
            }

            progress.lesson_id = lesson_id.to_string();
            return true;
        });
    }

    pub fn set_purchased(&self, purchased: bool) -> bool {
        return self.tx.send_if_modified(|progress| {
            if progress.purchased == purchased {
                return false;
            }

            progress.purchased = purchased;
            return true;
        });
    }

    /// Resets the chapter server side, then moves to it with a single
    /// notification carrying both `chapter_id` and `reseted_chapter_id`.
    pub async fn reset_chapter(
        &self,
        api: &(dyn LearnerApi + Send + Sync),
        chapter_id: &str,
    ) -> Result<()> {
        api.reset_chapter(chapter_id).await?;

        self.tx.send_modify(|progress| {
            progress.chapter_id = chapter_id.to_string();
            progress.reseted_chapter_id = Some(chapter_id.to_string());
        });
        tracing::info!(chapter_id = chapter_id, "Chapter reset");

        return Ok(());
    }
}
