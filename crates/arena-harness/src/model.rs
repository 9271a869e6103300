use std::fmt;
use std::str::FromStr;

/// Model selection for a run (for example `sonnet` or `opus`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ModelRef(pub String);

impl ModelRef {
    /// Creates a model reference from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the model identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModelRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Whether an agent process sees the user's ambient configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// No configuration sources and an empty tool-integration config.
    Isolated,
    /// Loads the user's configuration; tool integrations are left alone.
    Inherited,
}

impl IsolationMode {
    /// Value passed as the configuration-sources selector.
    pub fn setting_sources(self) -> &'static str {
        match self {
            Self::Isolated => "",
            Self::Inherited => "user",
        }
    }
}

/// Permission/sandbox profile handed to the agent process.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Every tool call is allowed without prompting.
    #[default]
    BypassPermissions,
    /// File edits are accepted, other tools prompt.
    AcceptEdits,
    /// The agent's own default policy.
    Default,
    /// Read-only planning.
    Plan,
}

impl PermissionMode {
    /// Returns the command-line spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BypassPermissions => "bypassPermissions",
            Self::AcceptEdits => "acceptEdits",
            Self::Default => "default",
            Self::Plan => "plan",
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "bypassPermissions" => Ok(Self::BypassPermissions),
            "acceptEdits" => Ok(Self::AcceptEdits),
            "default" => Ok(Self::Default),
            "plan" => Ok(Self::Plan),
            other => Err(format!("unknown permission mode: {other}")),
        }
    }
}

/// Session control for a single run. Start and resume are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SessionControl {
    /// One-shot run without a persistent conversation.
    #[default]
    None,
    /// Start a new conversation under the given id.
    Start(uuid::Uuid),
    /// Continue the conversation with the given id.
    Resume(uuid::Uuid),
}

impl SessionControl {
    /// Returns the session id, if any.
    pub fn session_id(&self) -> Option<uuid::Uuid> {
        match self {
            Self::None => None,
            Self::Start(id) | Self::Resume(id) => Some(*id),
        }
    }
}

/// Generic run behavior options.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RunOptions {
    /// Bounded event buffer size used by the streaming channel.
    pub stream_buffer_capacity: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stream_buffer_capacity: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_default_buffer_capacity() {
        assert_eq!(RunOptions::default().stream_buffer_capacity, 128);
    }

    #[test]
    fn isolation_modes_map_to_setting_sources() {
        assert_eq!(IsolationMode::Isolated.setting_sources(), "");
        assert_eq!(IsolationMode::Inherited.setting_sources(), "user");
    }

    #[test]
    fn permission_mode_parses_its_own_spelling() {
        for mode in [
            PermissionMode::BypassPermissions,
            PermissionMode::AcceptEdits,
            PermissionMode::Default,
            PermissionMode::Plan,
        ] {
            assert_eq!(mode.as_str().parse::<PermissionMode>(), Ok(mode));
        }
        assert!("yolo".parse::<PermissionMode>().is_err());
    }

    #[test]
    fn session_control_exposes_id() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(SessionControl::None.session_id(), None);
        assert_eq!(SessionControl::Start(id).session_id(), Some(id));
        assert_eq!(SessionControl::Resume(id).session_id(), Some(id));
    }
}
