use super::RunRequest;

pub enum Action {
    ResetChapter(String),
    StreamAbort(),
    StreamOpen(RunRequest),
}
