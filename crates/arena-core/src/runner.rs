use std::path::Path;
use std::sync::Arc;

use arena_harness::{Harness, HarnessError, IsolationMode, ModelRef, RunBuilder, RunOutput, StreamEvent};
use tracing::{debug, info, warn};

use crate::progress::{Progress, TaskId, TaskState, preview};
use crate::prompts::Prompts;
use crate::variation::VariationResult;

/// Model and configuration mode every variation runs with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionProfile {
    pub model: ModelRef,
    /// When set, the baseline runs with the user's own agent configuration
    /// instead of receiving the original prompt as appended instructions.
    pub user_mode: bool,
}

/// Runs one variation's agent against the task.
#[derive(Clone)]
pub struct VariationRunner {
    harness: Harness,
    prompts: Arc<Prompts>,
    profile: ExecutionProfile,
    progress: Progress,
}

impl VariationRunner {
    pub fn new(harness: Harness, prompts: Arc<Prompts>, profile: ExecutionProfile, progress: Progress) -> Self {
        Self {
            harness,
            prompts,
            profile,
            progress,
        }
    }

    /// Runs variation `number` inside `workspace`.
    ///
    /// Never fails: launch and stream errors come back as a result with exit
    /// code 1 and an `ERROR:` output.
    pub async fn run(&self, number: u32, task: &str, variation_text: &str, workspace: &Path) -> VariationResult {
        let task_id = TaskId::Variation(number);
        let message = match self.prompts.variation_task(task) {
            Ok(message) => message,
            Err(err) => return self.fail(number, workspace, err.to_string()),
        };

        let inherited = number == 0 && self.profile.user_mode;
        let mut builder = self
            .harness
            .run(self.profile.model.clone())
            .prompt(message)
            .working_dir(workspace);
        builder = if inherited {
            builder.isolation(IsolationMode::Inherited)
        } else {
            builder
                .isolation(IsolationMode::Isolated)
                .append_system_prompt(variation_text)
        };

        info!(variation = number, inherited, workspace = %workspace.display(), "starting variation");
        self.progress.emit(task_id, TaskState::Running, "starting");
        match drive(builder, &self.progress, task_id).await {
            Ok(output) => {
                let state = if output.is_success() {
                    TaskState::Completed
                } else {
                    TaskState::Failed
                };
                info!(variation = number, exit_code = output.exit_code, tools = output.tools.len(), "variation finished");
                self.progress
                    .emit(task_id, state, format!("exit {}", output.exit_code));
                VariationResult {
                    variation_number: number,
                    output: output.text,
                    exit_code: output.exit_code,
                    usage: output.usage,
                    workspace: workspace.to_path_buf(),
                }
            }
            Err(err) => self.fail(number, workspace, err.to_string()),
        }
    }

    fn fail(&self, number: u32, workspace: &Path, reason: String) -> VariationResult {
        warn!(variation = number, error = %reason, "variation failed");
        self.progress
            .emit(TaskId::Variation(number), TaskState::Failed, preview(&reason));
        VariationResult::failed(number, workspace, reason)
    }
}

/// Starts `builder` and forwards text and tool activity to `progress` until
/// the run ends.
pub(crate) async fn drive(builder: RunBuilder, progress: &Progress, task: TaskId) -> Result<RunOutput, HarnessError> {
    let mut stream = builder.start_stream().await?;
    while let Some(event) = stream.next_event().await {
        match event {
            StreamEvent::TextDelta { seq, text, .. } => {
                debug!(%task, seq, chars = text.len(), "text delta");
                progress.emit(task, TaskState::Running, preview(&text));
            }
            StreamEvent::ToolUse { tool, .. } => {
                debug!(%task, tool = %tool.name, target = %tool.target, "tool use");
                progress.emit(task, TaskState::Running, preview(&tool.label()));
            }
            StreamEvent::Completed { .. } | StreamEvent::Error { .. } => break,
            StreamEvent::RunStarted { .. } | StreamEvent::Usage { .. } => {}
        }
    }
    stream.finish().await
}
