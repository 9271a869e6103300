/// Errors returned by an agent launcher before they are normalized for the
/// public run stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    /// The agent process could not be started.
    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },
    /// Reading the agent's standard output failed.
    #[error("stream read failed: {message}")]
    Stream { message: String },
    /// Waiting for the agent process to exit failed.
    #[error("wait failed: {message}")]
    Wait { message: String },
}

impl LaunchError {
    /// Creates a spawn error.
    pub fn spawn(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Spawn {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Creates a stream read error.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// Creates a process wait error.
    pub fn wait(message: impl Into<String>) -> Self {
        Self::Wait {
            message: message.into(),
        }
    }
}

/// Terminal run failure sent through `StreamEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum RunFailure {
    /// The agent process never started.
    #[error("launch failure: {message}")]
    Launch { message: String },
    /// Stdout could not be drained or the exit status was unavailable.
    #[error("transport failure: {message}")]
    Transport { message: String },
}

/// Top-level error type for the public harness API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// Invalid harness/launcher configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid user input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// Terminal failure returned from a started run.
    #[error(transparent)]
    RunFailed(RunFailure),
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl HarnessError {
    pub(crate) fn run_failed(failure: RunFailure) -> Self {
        Self::RunFailed(failure)
    }

    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<RunFailure> for HarnessError {
    fn from(value: RunFailure) -> Self {
        HarnessError::RunFailed(value)
    }
}

pub(crate) fn run_failure_from_launch_error(err: &LaunchError) -> RunFailure {
    match err {
        LaunchError::Spawn { .. } => RunFailure::Launch {
            message: err.to_string(),
        },
        LaunchError::Stream { .. } | LaunchError::Wait { .. } => RunFailure::Transport {
            message: err.to_string(),
        },
    }
}
