use std::process::Stdio;

use tokio::io::AsyncReadExt as _;
use tokio::process::{ChildStdout, Command};
use tracing::debug;

use crate::errors::{HarnessError, LaunchError};
use crate::launcher::{AgentLauncher, AgentRequest, AgentStreamHandle};

use super::args::build_args;
use super::config::ClaudeCliConfig;

const CLAUDE_LAUNCHER: &str = "claude";
const READ_CHUNK: usize = 8 * 1024;

/// Launches the Claude Code CLI as a child process.
///
/// Standard input is closed and standard error is discarded. The child is
/// killed if its handle is dropped before it exits.
pub struct ClaudeCli {
    config: ClaudeCliConfig,
}

impl ClaudeCli {
    /// Creates a launcher from explicit configuration.
    pub fn new(config: ClaudeCliConfig) -> Result<Self, HarnessError> {
        if config.program.trim().is_empty() {
            return Err(HarnessError::Config(
                "Claude CLI program must not be empty".into(),
            ));
        }
        Ok(Self { config })
    }

    /// Creates a launcher from `ARENA_AGENT_BIN` / `ARENA_PERMISSION_MODE`.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::new(ClaudeCliConfig::from_env()?)
    }

    pub fn config(&self) -> &ClaudeCliConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl AgentLauncher for ClaudeCli {
    fn name(&self) -> &str {
        CLAUDE_LAUNCHER
    }

    async fn launch(&self, req: AgentRequest) -> Result<AgentStreamHandle, LaunchError> {
        let args = build_args(&req, self.config.permission_mode);
        debug!(
            run_id = %req.run_id,
            model = %req.model,
            cwd = %req.working_dir.display(),
            session = ?req.session.session_id(),
            "spawning claude"
        );

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .current_dir(&req.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::spawn(&self.config.program, e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LaunchError::spawn(&self.config.program, "stdout was not captured"))?;

        let exit = async move {
            let status = child
                .wait()
                .await
                .map_err(|e| LaunchError::wait(e.to_string()))?;
            // Killed by a signal: no exit code.
            Ok::<_, LaunchError>(status.code().unwrap_or(-1))
        };

        Ok(AgentStreamHandle {
            stdout: Box::pin(read_chunks(stdout)),
            exit: Box::pin(exit),
        })
    }
}

fn read_chunks(
    stdout: ChildStdout,
) -> impl futures::Stream<Item = Result<bytes::Bytes, LaunchError>> + Send + 'static {
    futures::stream::try_unfold(stdout, |mut stdout| async move {
        let mut buf = vec![0_u8; READ_CHUNK];
        let read = stdout
            .read(&mut buf)
            .await
            .map_err(|e| LaunchError::stream(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok::<_, LaunchError>(Some((bytes::Bytes::from(buf), stdout)))
    })
}
