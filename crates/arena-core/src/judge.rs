use std::path::Path;
use std::sync::Arc;

use arena_harness::{ModelRef, RunOutput, Session};
use tracing::info;

use crate::error::ArenaError;
use crate::progress::{Progress, TaskId, TaskState};
use crate::prompts::Prompts;
use crate::runner::drive;

/// The judge conversation: one session started by the design call and
/// resumed by every later call.
pub struct Judge {
    session: Session,
    model: ModelRef,
    prompts: Arc<Prompts>,
    progress: Progress,
}

impl Judge {
    pub fn new(session: Session, model: ModelRef, prompts: Arc<Prompts>, progress: Progress) -> Self {
        Self {
            session,
            model,
            prompts,
            progress,
        }
    }

    pub fn session_id(&self) -> uuid::Uuid {
        self.session.id()
    }

    /// Opens the session with the design request.
    pub async fn design(&self, message: String, working_dir: &Path) -> Result<RunOutput, ArenaError> {
        info!(session_id = %self.session.id(), model = %self.model, "judge design");
        let builder = self.session.start(self.model.clone());
        self.call(builder, message, working_dir, "designing").await
    }

    /// Resumes the session with the evaluation request.
    pub async fn evaluate(&self, message: String, working_dir: &Path) -> Result<RunOutput, ArenaError> {
        info!(session_id = %self.session.id(), model = %self.model, "judge evaluation");
        let builder = self.session.resume(self.model.clone());
        self.call(builder, message, working_dir, "evaluating").await
    }

    async fn call(
        &self,
        builder: arena_harness::RunBuilder,
        message: String,
        working_dir: &Path,
        activity: &str,
    ) -> Result<RunOutput, ArenaError> {
        self.progress.emit(TaskId::Judge, TaskState::Running, activity);
        let builder = builder
            .prompt(message)
            .system_prompt(self.prompts.judge_system())
            .working_dir(working_dir);
        match drive(builder, &self.progress, TaskId::Judge).await {
            Ok(output) => {
                let state = if output.is_success() {
                    TaskState::Completed
                } else {
                    TaskState::Failed
                };
                self.progress
                    .emit(TaskId::Judge, state, format!("{activity} finished (exit {})", output.exit_code));
                Ok(output)
            }
            Err(err) => {
                self.progress
                    .emit(TaskId::Judge, TaskState::Failed, format!("{activity} failed"));
                Err(err.into())
            }
        }
    }
}
