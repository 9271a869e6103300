use std::fmt;
use std::sync::Arc;

/// Maximum length, in characters, of a live status preview.
pub const PREVIEW_CHARS: usize = 60;

/// Which pipeline task an event is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    Judge,
    Variation(u32),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Judge => f.write_str("judge"),
            Self::Variation(n) => write!(f, "variation {n}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskState {
    /// Returns true once the task will not report again.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    pub task: TaskId,
    pub state: TaskState,
    /// Short human-readable detail, at most [`PREVIEW_CHARS`] characters for
    /// running updates.
    pub detail: String,
}

/// Receives progress events from every concurrent task.
pub type StatusCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Optional callback wrapper shared by the orchestrator, judge and runners.
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<StatusCallback>,
}

impl Progress {
    pub fn new(callback: StatusCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, task: TaskId, state: TaskState, detail: impl Into<String>) {
        if let Some(callback) = &self.callback {
            callback(ProgressEvent {
                task,
                state,
                detail: detail.into(),
            });
        }
    }
}

/// One-line preview of streamed text: the last non-blank line, truncated to
/// [`PREVIEW_CHARS`] characters.
pub fn preview(text: &str) -> String {
    let line = text
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let mut short: String = line.chars().take(PREVIEW_CHARS - 3).collect();
    short.push_str("...");
    short
}
