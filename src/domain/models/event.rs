use super::StreamFrame;
use super::StreamOutcome;

pub enum Event {
    AuthRequired(),
    ChapterReset(String),
    Notice(String),
    StreamEnd(StreamOutcome),
    StreamError(String),
    StreamMessage(StreamFrame),
}
