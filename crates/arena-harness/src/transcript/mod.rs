//! Line-delimited JSON transcript decoding.
//!
//! The transcript format belongs to an external tool and drifts between
//! releases, so nothing in this module fails on malformed input: unknown
//! lines and fields decode to empty contributions.
mod events;
mod parser;

pub use events::{
    AssistantEvent, AssistantMessage, ContentBlock, SystemEvent, TranscriptEvent, UserEvent,
    decode_line, tool_target,
};
pub use parser::{LineBuffer, ParseUpdate, StreamParser};
