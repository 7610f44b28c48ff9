#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub course_id: String,
    pub lesson_id: String,
    pub chapter_id: String,
    pub purchased: bool,
    /// Set together with `chapter_id` when the chapter was reset rather than
    /// navigated to.
    pub reseted_chapter_id: Option<String>,
}

/// How the learner got from one progress snapshot to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressChange {
    ChapterReset(String),
    ChapterNavigated(String),
    Other,
}

impl SessionProgress {
    pub fn change_from(&self, previous: &SessionProgress) -> ProgressChange {
        if let Some(reseted) = &self.reseted_chapter_id {
            if *reseted == self.chapter_id && previous.reseted_chapter_id.as_ref() != Some(reseted)
            {
                return ProgressChange::ChapterReset(reseted.to_string());
            }
        }

        if self.chapter_id != previous.chapter_id {
            return ProgressChange::ChapterNavigated(self.chapter_id.to_string());
        }

        return ProgressChange::Other;
    }
}
