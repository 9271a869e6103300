use std::collections::HashSet;

use super::events::{AssistantEvent, ContentBlock, TranscriptEvent, decode_line, tool_target};
use crate::content::{ToolInvocation, UsageStats};

/// Splits a byte stream into complete lines, carrying the incomplete tail
/// across chunk boundaries.
///
/// The tail is kept as raw bytes so a multi-byte character split between two
/// chunks is decoded intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
}

impl LineBuffer {
    /// Appends a chunk and returns every line it completed, without the
    /// trailing `\n` / `\r\n`.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.partial.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.partial.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=idx).collect();
            let text = String::from_utf8_lossy(&line[..idx]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// The retained incomplete line.
    pub fn pending(&self) -> String {
        String::from_utf8_lossy(&self.partial).into_owned()
    }

    /// Takes the retained fragment at end of stream, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.partial);
        Some(
            String::from_utf8_lossy(&rest)
                .trim_end_matches('\r')
                .to_string(),
        )
    }
}

/// New facts produced by one parser call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseUpdate {
    /// Text appended to the accumulated transcript by this call only.
    pub text_delta: String,
    /// Tool invocations seen for the first time.
    pub tools: Vec<ToolInvocation>,
    /// Usage from an `end_turn` message.
    pub usage: Option<UsageStats>,
}

impl ParseUpdate {
    /// Returns true when the call contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.text_delta.is_empty() && self.tools.is_empty() && self.usage.is_none()
    }

    fn merge(&mut self, other: ParseUpdate) {
        self.text_delta.push_str(&other.text_delta);
        self.tools.extend(other.tools);
        if other.usage.is_some() {
            self.usage = other.usage;
        }
    }
}

/// Incremental, deduplicating parser for one agent process's transcript.
///
/// Feeding the same assistant event twice never duplicates accumulated text
/// or tool reports: text blocks are keyed by `{message}-text-{index}` and tool
/// calls by their id.
#[derive(Debug, Default)]
pub struct StreamParser {
    lines: LineBuffer,
    accumulated_text: String,
    seen_text_keys: HashSet<String>,
    seen_tool_keys: HashSet<String>,
    last_usage: Option<UsageStats>,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a raw stdout chunk.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> ParseUpdate {
        let mut update = ParseUpdate::default();
        for line in self.lines.push(chunk) {
            update.merge(self.ingest_line(&line));
        }
        update
    }

    /// Decodes whatever incomplete line is left once the stream has ended.
    pub fn finish(&mut self) -> ParseUpdate {
        match self.lines.finish() {
            Some(line) => self.ingest_line(&line),
            None => ParseUpdate::default(),
        }
    }

    /// Feeds one complete transcript line.
    pub fn ingest_line(&mut self, line: &str) -> ParseUpdate {
        match decode_line(line) {
            Some(event) => self.ingest_event(&event),
            None => ParseUpdate::default(),
        }
    }

    /// Feeds one decoded event. Only assistant events contribute.
    pub fn ingest_event(&mut self, event: &TranscriptEvent) -> ParseUpdate {
        match event {
            TranscriptEvent::Assistant(assistant) => self.ingest_assistant(assistant),
            TranscriptEvent::System(_) | TranscriptEvent::User(_) | TranscriptEvent::Other => {
                ParseUpdate::default()
            }
        }
    }

    fn ingest_assistant(&mut self, event: &AssistantEvent) -> ParseUpdate {
        let message_key = event.message_key();
        let mut update = ParseUpdate::default();
        for (index, block) in event.message.content.iter().enumerate() {
            match block {
                ContentBlock::Text { text } => {
                    if text.is_empty() {
                        continue;
                    }
                    let key = format!("{message_key}-text-{index}");
                    if !self.seen_text_keys.insert(key) {
                        continue;
                    }
                    let delta = if self.accumulated_text.is_empty() {
                        text.clone()
                    } else {
                        format!("\n{text}")
                    };
                    self.accumulated_text.push_str(&delta);
                    update.text_delta.push_str(&delta);
                }
                ContentBlock::ToolUse { id, name, input } => {
                    let key = id
                        .clone()
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| format!("{message_key}-tool-{index}"));
                    if !self.seen_tool_keys.insert(key.clone()) {
                        continue;
                    }
                    update.tools.push(ToolInvocation {
                        id: key,
                        name: name.clone(),
                        target: tool_target(input),
                    });
                }
                ContentBlock::Other => {}
            }
        }
        if let Some(usage) = event.end_turn_usage() {
            self.last_usage = Some(usage);
            update.usage = Some(usage);
        }
        update
    }

    /// Everything accumulated so far.
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    /// Usage of the most recent `end_turn` message.
    pub fn usage(&self) -> Option<UsageStats> {
        self.last_usage
    }

    /// The incomplete line currently carried across chunks.
    pub fn pending_line(&self) -> String {
        self.lines.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT_EVENT: &str = r#"{"type":"assistant","uuid":"u1","message":{"id":"msg_1","content":[{"type":"text","text":"Hello"}]}}"#;

    #[test]
    fn line_buffer_keeps_partial_line_across_any_chunking() {
        let input = b"line1\nline2\npartial";
        for split in 0..=input.len() {
            let mut buffer = LineBuffer::default();
            let mut lines = buffer.push(&input[..split]);
            lines.extend(buffer.push(&input[split..]));
            assert_eq!(lines, vec!["line1", "line2"], "split at {split}");
            assert_eq!(buffer.pending(), "partial");
        }

        let mut buffer = LineBuffer::default();
        let mut lines = Vec::new();
        for byte in input {
            lines.extend(buffer.push(std::slice::from_ref(byte)));
        }
        assert_eq!(lines, vec!["line1", "line2"]);
        assert_eq!(buffer.pending(), "partial");
        assert_eq!(buffer.finish().as_deref(), Some("partial"));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn line_buffer_handles_crlf_and_split_utf8() {
        let mut buffer = LineBuffer::default();
        let bytes = "héllo\r\nnext".as_bytes();
        // Split inside the two-byte 'é'.
        let mut lines = buffer.push(&bytes[..2]);
        lines.extend(buffer.push(&bytes[2..]));
        assert_eq!(lines, vec!["héllo"]);
        assert_eq!(buffer.pending(), "next");
    }

    #[test]
    fn same_event_twice_accumulates_once() {
        let mut parser = StreamParser::new();
        let first = parser.ingest_line(TEXT_EVENT);
        assert_eq!(first.text_delta, "Hello");
        let second = parser.ingest_line(TEXT_EVENT);
        assert!(second.is_empty());
        assert_eq!(parser.accumulated_text(), "Hello");
    }

    #[test]
    fn deltas_only_carry_new_blocks() {
        let mut parser = StreamParser::new();
        parser.ingest_line(TEXT_EVENT);
        let update = parser.ingest_line(
            r#"{"type":"assistant","message":{"id":"msg_1","content":[{"type":"text","text":"Hello"},{"type":"text","text":"World"}]}}"#,
        );
        assert_eq!(update.text_delta, "\nWorld");
        assert_eq!(parser.accumulated_text(), "Hello\nWorld");
    }

    #[test]
    fn tool_invocations_reported_once() {
        let line = r#"{"type":"assistant","message":{"id":"msg_2","content":[{"type":"tool_use","id":"toolu_9","name":"Bash","input":{"command":"cargo test"}}]}}"#;
        let mut parser = StreamParser::new();
        let update = parser.ingest_line(line);
        assert_eq!(
            update.tools,
            vec![ToolInvocation {
                id: "toolu_9".into(),
                name: "Bash".into(),
                target: "cargo test".into(),
            }]
        );
        assert!(parser.ingest_line(line).tools.is_empty());
    }

    #[test]
    fn usage_emitted_on_end_turn_only() {
        let mut parser = StreamParser::new();
        let partial = parser.ingest_line(
            r#"{"type":"assistant","message":{"id":"a","content":[],"usage":{"input_tokens":3}}}"#,
        );
        assert_eq!(partial.usage, None);
        let done = parser.ingest_line(
            r#"{"type":"assistant","message":{"id":"b","content":[],"stop_reason":"end_turn","usage":{"input_tokens":3,"output_tokens":7}}}"#,
        );
        let expected = UsageStats {
            input_tokens: 3,
            output_tokens: 7,
            cached_tokens: 0,
        };
        assert_eq!(done.usage, Some(expected));
        assert_eq!(parser.usage(), Some(expected));
    }

    #[test]
    fn chunked_stream_with_noise_yields_clean_text() {
        let stream = format!(
            "{{\"type\":\"system\",\"subtype\":\"init\"}}\n\ngarbage line\n{TEXT_EVENT}\n{TEXT_EVENT}\n{{\"type\":\"user\"}}\n"
        );
        let mut parser = StreamParser::new();
        let mut deltas = String::new();
        for chunk in stream.as_bytes().chunks(7) {
            deltas.push_str(&parser.push_chunk(chunk).text_delta);
        }
        deltas.push_str(&parser.finish().text_delta);
        assert_eq!(deltas, "Hello");
        assert_eq!(parser.accumulated_text(), "Hello");
        assert_eq!(parser.pending_line(), "");
    }

    #[test]
    fn trailing_line_without_newline_is_decoded_on_finish() {
        let mut parser = StreamParser::new();
        assert!(parser.push_chunk(TEXT_EVENT.as_bytes()).is_empty());
        assert_eq!(parser.finish().text_delta, "Hello");
    }
}
