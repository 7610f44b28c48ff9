#[cfg(test)]
#[path = "message_reducer_test.rs"]
mod tests;

const FENCE: &str = "```";

/// Appends a streamed delta to the accumulated text. A code fence that ends
/// up followed by a lone trailing space has that space turned into a newline,
/// as closing fences are often split across frames and otherwise render as
/// inline text.
pub fn reduce(accumulated: &str, delta: &str) -> String {
    let mut text = String::with_capacity(accumulated.len() + delta.len());
    text.push_str(accumulated);
    text.push_str(delta);
    repair_fence(&mut text);

    return text;
}

fn repair_fence(text: &mut String) {
    if !text.ends_with(' ') {
        return;
    }

    let without_space = &text[..text.len() - 1];
    if without_space.ends_with(FENCE) {
        text.pop();
        text.push('\n');
    }
}

/// Buffer for the assistant message currently being streamed.
#[derive(Default)]
pub struct MessageReducer {
    buffer: String,
}

impl MessageReducer {
    /// Appends `delta` and returns the text that became visible because of
    /// it.
    pub fn push(&mut self, delta: &str) -> &str {
        let start = self.buffer.len();
        self.buffer.push_str(delta);
        repair_fence(&mut self.buffer);

        return &self.buffer[start..];
    }

    pub fn content(&self) -> &str {
        return &self.buffer;
    }

    pub fn is_empty(&self) -> bool {
        return self.buffer.is_empty();
    }

    /// Freezes the buffer and opens a fresh one for the next turn.
    pub fn finalize(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }

        return Some(std::mem::take(&mut self.buffer));
    }
}
