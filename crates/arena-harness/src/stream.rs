use crate::content::{RunOutput, ToolInvocation, UsageStats};
use crate::errors::RunFailure;
use crate::model::{ModelRef, SessionControl};

/// Normalized stream events exposed by `RunStream`.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// First event for every run.
    RunStarted {
        run_id: uuid::Uuid,
        model: ModelRef,
        session: SessionControl,
    },
    /// Newly accumulated transcript text. Never repeats earlier text.
    TextDelta {
        run_id: uuid::Uuid,
        seq: u64,
        text: String,
    },
    /// A tool invocation seen for the first time.
    ToolUse {
        run_id: uuid::Uuid,
        tool: ToolInvocation,
    },
    /// Usage reported at the end of an agent turn.
    Usage {
        run_id: uuid::Uuid,
        usage: UsageStats,
    },
    /// Terminal event once the process has exited, whatever its exit code.
    Completed {
        run_id: uuid::Uuid,
        output: RunOutput,
    },
    /// Terminal failure event.
    Error {
        run_id: uuid::Uuid,
        error: RunFailure,
    },
}

impl StreamEvent {
    /// Returns true for `Completed` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }
}
