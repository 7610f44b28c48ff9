#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::Role;

/// Ordered lesson transcript. Messages are only ever appended, and ids
/// increase by one per message within a session.
#[derive(Default)]
pub struct Transcript {
    messages: Vec<Message>,
    last_id: u64,
}

impl Transcript {
    fn push(&mut self, role: Role, mtype: MessageType, content: &str) -> &Message {
        self.last_id += 1;
        self.messages
            .push(Message::new_with_type(self.last_id, role, mtype, content));

        return &self.messages[self.messages.len() - 1];
    }

    pub fn push_user(&mut self, content: &str) -> &Message {
        return self.push(Role::User, MessageType::Text, content);
    }

    pub fn push_assistant(&mut self, content: &str) -> &Message {
        return self.push(Role::Assistant, MessageType::Text, content);
    }

    pub fn push_system(&mut self, content: &str) -> &Message {
        return self.push(Role::System, MessageType::Text, content);
    }

    pub fn push_separator(&mut self, title: &str) -> &Message {
        return self.push(Role::System, MessageType::LessonSeparator, title);
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn last(&self) -> Option<&Message> {
        return self.messages.last();
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }
}
