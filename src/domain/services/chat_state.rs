#[cfg(test)]
#[path = "chat_state_test.rs"]
mod tests;

use super::MessageReducer;
use super::ProgressStore;
use super::Transcript;
use crate::domain::models::InputType;
use crate::domain::models::InteractionDescriptor;
use crate::domain::models::Message;
use crate::domain::models::OutboundPayload;
use crate::domain::models::Role;
use crate::domain::models::RunRequest;
use crate::domain::models::StreamEvent;
use crate::domain::models::StreamFrame;
use crate::domain::models::StreamOutcome;
use crate::domain::models::StudyRecord;

/// What changed in the chat after handling a stream frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatUpdate {
    Delta(String),
    Finalized(Message),
    Interaction(InteractionDescriptor),
    Separator(Message),
    Progress,
    Ignored,
}

pub struct ChatState {
    pub transcript: Transcript,
    pub pending: Option<InteractionDescriptor>,
    pub waiting_for_stream: bool,
    pub can_resend: bool,
    reducer: MessageReducer,
    progress: ProgressStore,
    preview_mode: bool,
    script_id: Option<String>,
    last_request: Option<RunRequest>,
}

impl ChatState {
    pub fn new(progress: ProgressStore, preview_mode: bool) -> ChatState {
        return ChatState {
            transcript: Transcript::default(),
            pending: None,
            waiting_for_stream: false,
            can_resend: false,
            reducer: MessageReducer::default(),
            progress,
            preview_mode,
            script_id: None,
            last_request: None,
        };
    }

    /// Text streamed so far for the assistant message in flight.
    pub fn in_flight(&self) -> &str {
        return self.reducer.content();
    }

    /// Seeds the transcript with what the learner already went through.
    pub fn restore(&mut self, record: StudyRecord) {
        for item in record.records {
            match item.role {
                Role::User => self.transcript.push_user(&item.content),
                Role::Assistant => self.transcript.push_assistant(&item.content),
                Role::System => self.transcript.push_system(&item.content),
            };
            if item.script_id.is_some() {
                self.script_id = item.script_id;
            }
        }
    }

    fn request(&self, input_type: InputType, input: Option<String>) -> RunRequest {
        let progress = self.progress.snapshot();
        return RunRequest {
            course_id: progress.course_id,
            lesson_id: progress.lesson_id,
            input,
            input_type,
            script_id: self.script_id.clone(),
            preview_mode: self.preview_mode,
        };
    }

    pub fn start_request(&self) -> RunRequest {
        return self.request(InputType::Start, None);
    }

    /// Builds the run request answering the pending interaction. Answers the
    /// learner typed or picked are echoed into the transcript.
    pub fn next_request(&mut self, payload: OutboundPayload) -> RunRequest {
        if let Some(input) = &payload.input {
            match payload.input_type {
                InputType::Select
                | InputType::Text
                | InputType::Ask
                | InputType::Phone
                | InputType::Checkcode => {
                    self.transcript.push_user(input);
                }
                _ => {}
            }
        }

        return self.request(payload.input_type, payload.input);
    }

    pub fn resend_request(&self) -> Option<RunRequest> {
        return self.last_request.clone();
    }

    pub fn begin_request(&mut self, request: &RunRequest) {
        self.last_request = Some(request.clone());
        self.pending = None;
        self.can_resend = false;
        self.waiting_for_stream = true;
    }

    /// The chapter was reset server side: drop the pending interaction and
    /// start over from the server's progress.
    pub fn handle_chapter_reset(&mut self, chapter_id: &str) -> RunRequest {
        self.pending = None;
        self.can_resend = false;
        self.script_id = None;
        tracing::info!(chapter_id = chapter_id, "Restarting chapter");

        return self.start_request();
    }

    fn finalize(&mut self) -> Option<Message> {
        let content = self.reducer.finalize()?;
        return Some(self.transcript.push_assistant(&content).clone());
    }

    pub fn handle_stream_frame(&mut self, frame: StreamFrame) -> ChatUpdate {
        if frame.script_id.is_some() {
            self.script_id = frame.script_id;
        }

        match frame.event {
            StreamEvent::Text(delta) => {
                return ChatUpdate::Delta(self.reducer.push(&delta).to_string());
            }
            StreamEvent::TextEnd => {
                if let Some(message) = self.finalize() {
                    return ChatUpdate::Finalized(message);
                }
                return ChatUpdate::Ignored;
            }
            StreamEvent::Interaction(descriptor) => {
                self.pending = Some(descriptor.clone());
                return ChatUpdate::Interaction(descriptor);
            }
            StreamEvent::LessonUpdate(update) => {
                if update.lesson_id.is_empty() || !self.progress.update_lesson_id(&update.lesson_id)
                {
                    return ChatUpdate::Ignored;
                }

                let title = if update.name.is_empty() {
                    update.lesson_id
                } else {
                    update.name
                };
                let message = self.transcript.push_separator(&title).clone();
                return ChatUpdate::Separator(message);
            }
            StreamEvent::ChapterUpdate(update) => {
                if update.chapter_id.is_empty()
                    || !self.progress.update_chapter_id(&update.chapter_id)
                {
                    return ChatUpdate::Ignored;
                }
                return ChatUpdate::Progress;
            }
            StreamEvent::Heartbeat => {
                return ChatUpdate::Ignored;
            }
            StreamEvent::Unknown(tag) => {
                tracing::warn!(tag = tag, "Unknown lesson stream event type");
                return ChatUpdate::Ignored;
            }
        }
    }

    /// Freezes whatever was streamed so far, so a stream that died mid-turn
    /// still leaves its partial text in the transcript.
    pub fn handle_stream_end(&mut self, outcome: StreamOutcome) -> Option<Message> {
        self.waiting_for_stream = false;
        self.can_resend = outcome.can_resend;
        if outcome.can_resend {
            self.pending = None;
        }

        return self.finalize();
    }
}
