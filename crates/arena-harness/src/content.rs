/// Token usage reported by an agent at the end of a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UsageStats {
    /// Prompt tokens billed for the turn.
    pub input_tokens: u64,
    /// Tokens generated by the model.
    pub output_tokens: u64,
    /// Prompt tokens served from cache.
    pub cached_tokens: u64,
}

impl UsageStats {
    /// Returns input plus output tokens.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// A tool invocation observed in a transcript.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolInvocation {
    /// Stable id of the tool call within the stream.
    pub id: String,
    /// Tool name (for example `Write` or `Bash`).
    pub name: String,
    /// Best-effort file path or command the tool acts on. Empty when unknown.
    pub target: String,
}

impl ToolInvocation {
    /// One-line label such as `Write: src/main.rs`.
    pub fn label(&self) -> String {
        if self.target.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.target)
        }
    }
}

/// Final aggregated output for a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunOutput {
    /// Deduplicated transcript text in the order it was produced.
    pub text: String,
    /// Process exit code. `0` means success.
    pub exit_code: i32,
    /// Usage of the last completed turn, when reported.
    pub usage: Option<UsageStats>,
    /// Tool invocations in first-seen order.
    pub tools: Vec<ToolInvocation>,
}

impl RunOutput {
    /// Returns true when the process exited with code `0`.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
