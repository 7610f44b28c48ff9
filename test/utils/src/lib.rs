/// A single lesson turn as sent by the run endpoint: two text deltas, the end
/// of the text, a frame that isn't JSON, an unknown event type, the next
/// interaction, and the done sentinel.
pub fn lesson_stream_fixture() -> &'static str {
    return r#"data: {"type":"text","content":"Hel","script_id":"script-1"}

data: {"type":"text","content":"lo","script_id":"script-1"}

data: {"type":"text_end","script_id":"script-1"}

data: {"type":"text",

data: {"type":"profile_update","content":{"key":"nickname"}}

data: {"type":"buttons","content":{"buttons":[{"label":"Beginner","value":"beginner"},{"label":"Expert","value":"expert"}]},"script_id":"script-2"}

data: [DONE]

"#;
}

/// Deltas of an answer containing a code block whose closing fence arrives
/// split across frames.
pub fn codeblock_deltas() -> Vec<&'static str> {
    return vec![
        "Here's how to print in Rust.\n\n``",
        "`rust\nfn main() {\n    println!(\"hi\");\n}\n",
        "``",
        "`",
        " ",
        "That's it!",
    ];
}
