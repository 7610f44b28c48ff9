#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    Text,
    LessonSeparator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    mtype: MessageType,
    pub created_at: DateTime<Local>,
}

impl Message {
    pub fn new(id: u64, role: Role, content: &str) -> Message {
        return Message::new_with_type(id, role, MessageType::Text, content);
    }

    pub fn new_with_type(id: u64, role: Role, mtype: MessageType, content: &str) -> Message {
        return Message {
            id,
            role,
            content: content.to_string(),
            mtype,
            created_at: Local::now(),
        };
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    pub fn is_separator(&self) -> bool {
        return self.mtype == MessageType::LessonSeparator;
    }
}
