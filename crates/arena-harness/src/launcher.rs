use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::LaunchError;
use crate::model::{IsolationMode, ModelRef, SessionControl};

/// Raw standard-output chunks of a running agent process.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, LaunchError>> + Send + 'static>>;

/// Resolves to the process exit code once the agent has terminated.
pub type ExitFuture = Pin<Box<dyn Future<Output = Result<i32, LaunchError>> + Send + 'static>>;

/// Fully validated request handed to a launcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentRequest {
    pub run_id: uuid::Uuid,
    pub model: ModelRef,
    /// Instruction the agent should complete (the user message).
    pub prompt: String,
    /// Replaces the agent's system prompt (judge runs).
    pub system_prompt: Option<String>,
    /// Supplementary instructions appended to the agent's own system prompt.
    /// Never `Some("")`.
    pub append_system_prompt: Option<String>,
    /// Configuration isolation. `None` leaves the agent's defaults untouched.
    pub isolation: Option<IsolationMode>,
    pub session: SessionControl,
    /// Directory the process is started in.
    pub working_dir: PathBuf,
}

/// Handle returned by a launcher for a started process.
///
/// Consumers must drain `stdout` before awaiting `exit`.
pub struct AgentStreamHandle {
    pub stdout: ByteStream,
    pub exit: ExitFuture,
}

/// Starts agent processes. Implemented by `vendors::*` and by test fakes.
#[async_trait::async_trait]
pub trait AgentLauncher: Send + Sync {
    /// Short name used in logs (for example `claude`).
    fn name(&self) -> &str;

    /// Starts one agent process for the request.
    async fn launch(&self, req: AgentRequest) -> Result<AgentStreamHandle, LaunchError>;
}
