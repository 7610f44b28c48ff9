use anyhow::Result;

use super::ChapterUpdate;
use super::LessonUpdate;
use super::StreamEvent;
use super::StreamFrame;
use crate::domain::models::ButtonOption;
use crate::domain::models::InteractionDescriptor;

#[test]
fn it_parses_text() -> Result<()> {
    let frame = StreamFrame::parse(r#"{"type":"text","content":"Hel"}"#)?;
    assert_eq!(frame.event, StreamEvent::Text("Hel".to_string()));
    assert_eq!(frame.script_id, None);

    return Ok(());
}

#[test]
fn it_parses_text_end_with_or_without_content() -> Result<()> {
    let frame = StreamFrame::parse(r#"{"type":"text_end"}"#)?;
    assert_eq!(frame.event, StreamEvent::TextEnd);

    let frame = StreamFrame::parse(r#"{"type":"text_end","content":""}"#)?;
    assert_eq!(frame.event, StreamEvent::TextEnd);

    return Ok(());
}

#[test]
fn it_keeps_script_id() -> Result<()> {
    let frame = StreamFrame::parse(r#"{"type":"text","content":"a","script_id":"s-9"}"#)?;
    assert_eq!(frame.script_id, Some("s-9".to_string()));

    return Ok(());
}

#[test]
fn it_parses_buttons() -> Result<()> {
    let frame = StreamFrame::parse(
        r#"{"type":"buttons","content":{"buttons":[{"label":"Yes","value":"y"},{"label":"No","value":"n"}]}}"#,
    )?;

    assert_eq!(
        frame.event,
        StreamEvent::Interaction(InteractionDescriptor::Buttons {
            buttons: vec![
                ButtonOption {
                    label: "Yes".to_string(),
                    value: "y".to_string(),
                },
                ButtonOption {
                    label: "No".to_string(),
                    value: "n".to_string(),
                },
            ],
        })
    );

    return Ok(());
}

#[test]
fn it_defaults_missing_labels() -> Result<()> {
    let frame = StreamFrame::parse(r#"{"type":"continue"}"#)?;
    assert_eq!(
        frame.event,
        StreamEvent::Interaction(InteractionDescriptor::Continue {
            label: "Continue".to_string(),
        })
    );

    let frame = StreamFrame::parse(r#"{"type":"require_login","content":null}"#)?;
    assert_eq!(
        frame.event,
        StreamEvent::Interaction(InteractionDescriptor::RequireLogin {
            label: "Log in".to_string(),
        })
    );

    return Ok(());
}

#[test]
fn it_accepts_camel_case_order_tags() -> Result<()> {
    let frame = StreamFrame::parse(r#"{"type":"nonblockOrder","content":{"order_id":"o-1"}}"#)?;
    assert_eq!(
        frame.event,
        StreamEvent::Interaction(InteractionDescriptor::NonblockOrder {
            order_id: Some("o-1".to_string()),
        })
    );

    let frame = StreamFrame::parse(r#"{"type":"order"}"#)?;
    assert_eq!(
        frame.event,
        StreamEvent::Interaction(InteractionDescriptor::Order { order_id: None })
    );

    return Ok(());
}

#[test]
fn it_parses_progress_updates() -> Result<()> {
    let frame = StreamFrame::parse(
        r#"{"type":"lesson_update","content":{"lesson_id":"l-2","name":"Loops","status":"learning"}}"#,
    )?;
    assert_eq!(
        frame.event,
        StreamEvent::LessonUpdate(LessonUpdate {
            lesson_id: "l-2".to_string(),
            name: "Loops".to_string(),
            status: "learning".to_string(),
        })
    );

    let frame = StreamFrame::parse(r#"{"type":"chapter_update","content":{"chapter_id":"c-1"}}"#)?;
    assert_eq!(
        frame.event,
        StreamEvent::ChapterUpdate(ChapterUpdate {
            chapter_id: "c-1".to_string(),
            name: "".to_string(),
            status: "".to_string(),
        })
    );

    return Ok(());
}

#[test]
fn it_keeps_unknown_tags() -> Result<()> {
    let frame = StreamFrame::parse(r#"{"type":"profile_update","content":{"key":"nickname"}}"#)?;
    assert_eq!(frame.event, StreamEvent::Unknown("profile_update".to_string()));

    return Ok(());
}

#[test]
fn it_fails_on_malformed_json() {
    assert!(StreamFrame::parse("{\"type\":\"text\",").is_err());
    assert!(StreamFrame::parse("[DONE]").is_err());
}

#[test]
fn it_fails_on_malformed_known_content() {
    let res = StreamFrame::parse(r#"{"type":"buttons","content":{"buttons":"nope"}}"#);
    assert!(res.is_err());
}
