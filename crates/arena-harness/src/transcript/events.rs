use serde::Deserialize;

use crate::content::UsageStats;

/// One decoded transcript line.
///
/// Every field is optional at the type level; event kinds other than
/// `system`, `assistant` and `user` decode to [`TranscriptEvent::Other`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    System(SystemEvent),
    Assistant(AssistantEvent),
    User(UserEvent),
    #[serde(other)]
    Other,
}

impl TranscriptEvent {
    /// Returns the transcript `type` tag (`other` for unrecognized kinds).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::Assistant(_) => "assistant",
            Self::User(_) => "user",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SystemEvent {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub model: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserEvent {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AssistantEvent {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub subtype: Option<String>,
    /// Transcript-level line id, used when the message id is absent.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub message: AssistantMessage,
}

impl AssistantEvent {
    /// Identity used for deduplication keys: message id, else line uuid.
    pub fn message_key(&self) -> &str {
        self.message
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or(self.uuid.as_deref())
            .unwrap_or_default()
    }

    /// Usage of this message, only when the turn ended normally.
    pub fn end_turn_usage(&self) -> Option<UsageStats> {
        if self.message.stop_reason.as_deref() != Some("end_turn") {
            return None;
        }
        Some(self.message.usage.unwrap_or_default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AssistantMessage {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub stop_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient::usage")]
    pub usage: Option<UsageStats>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

/// Decodes one transcript line. Blank or invalid lines yield `None`.
pub fn decode_line(line: &str) -> Option<TranscriptEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Best-effort file path or command a tool call acts on.
pub fn tool_target(input: &serde_json::Value) -> String {
    ["file_path", "path", "command"]
        .iter()
        .filter_map(|key| input.get(key).and_then(|v| v.as_str()))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

mod lenient {
    use serde::Deserialize as _;
    use serde::Deserializer;
    use serde::de::DeserializeOwned;
    use serde_json::Value;

    use super::ContentBlock;
    use crate::content::UsageStats;

    pub(super) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub(super) fn blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let Value::Array(items) = value else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or(ContentBlock::Other))
            .collect())
    }

    pub(super) fn usage<'de, D>(deserializer: D) -> Result<Option<UsageStats>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(None);
        }
        let field = |key: &str| value.get(key).and_then(Value::as_u64).unwrap_or(0);
        Ok(Some(UsageStats {
            input_tokens: field("input_tokens"),
            output_tokens: field("output_tokens"),
            cached_tokens: field("cache_read_input_tokens"),
        }))
    }
}
