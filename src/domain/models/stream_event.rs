#[cfg(test)]
#[path = "stream_event_test.rs"]
mod tests;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;

use super::ButtonOption;
use super::InteractionDescriptor;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonUpdate {
    pub lesson_id: String,
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterUpdate {
    pub chapter_id: String,
    pub name: String,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Text(String),
    TextEnd,
    Interaction(InteractionDescriptor),
    LessonUpdate(LessonUpdate),
    ChapterUpdate(ChapterUpdate),
    Heartbeat,
    Unknown(String),
}

/// One decoded `data:` payload of the lesson-run stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamFrame {
    pub script_id: Option<String>,
    pub event: StreamEvent,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct LabelContent {
    label: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ButtonsContent {
    buttons: Vec<ButtonOption>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct PlaceholderContent {
    placeholder: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct OrderContent {
    order_id: Option<String>,
}

fn content<T: DeserializeOwned + Default>(value: &mut Value) -> Result<T> {
    let content = value.get_mut("content").map(Value::take);
    match content {
        None | Some(Value::Null) => return Ok(T::default()),
        Some(content) => return Ok(serde_json::from_value(content)?),
    }
}

fn or_default(text: String, fallback: &str) -> String {
    if text.is_empty() {
        return fallback.to_string();
    }

    return text;
}

impl StreamFrame {
    pub fn parse(data: &str) -> Result<StreamFrame> {
        let mut value: Value = serde_json::from_str(data)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let script_id = value
            .get("script_id")
            .and_then(Value::as_str)
            .map(|e| return e.to_string());

        let event = match tag.as_str() {
            "text" => {
                let text: Option<String> = content(&mut value)?;
                StreamEvent::Text(text.unwrap_or_default())
            }
            "text_end" => StreamEvent::TextEnd,
            "heartbeat" => StreamEvent::Heartbeat,
            "lesson_update" => StreamEvent::LessonUpdate(content(&mut value)?),
            "chapter_update" => StreamEvent::ChapterUpdate(content(&mut value)?),
            "continue" => {
                let res: LabelContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Continue {
                    label: or_default(res.label, "Continue"),
                })
            }
            "buttons" => {
                let res: ButtonsContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Buttons {
                    buttons: res.buttons,
                })
            }
            "input" => {
                let res: PlaceholderContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Input {
                    placeholder: res.placeholder,
                })
            }
            "ask" => {
                let res: PlaceholderContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Ask {
                    placeholder: res.placeholder,
                })
            }
            "phone" => {
                let res: PlaceholderContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Phone {
                    placeholder: res.placeholder,
                })
            }
            "checkcode" => {
                let res: PlaceholderContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Checkcode {
                    placeholder: res.placeholder,
                })
            }
            "order" => {
                let res: OrderContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::Order {
                    order_id: res.order_id,
                })
            }
            "nonblock_order" | "nonblockOrder" => {
                let res: OrderContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::NonblockOrder {
                    order_id: res.order_id,
                })
            }
            "require_login" | "requireLogin" => {
                let res: LabelContent = content(&mut value)?;
                StreamEvent::Interaction(InteractionDescriptor::RequireLogin {
                    label: or_default(res.label, "Log in"),
                })
            }
            _ => StreamEvent::Unknown(tag),
        };

        return Ok(StreamFrame { script_id, event });
    }
}
