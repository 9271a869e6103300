use std::path::PathBuf;

use arena_harness::HarnessError;

/// Fatal pipeline errors. Per-variation failures never surface here; they
/// become failing [`VariationResult`](crate::VariationResult)s instead.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Design phase failed (judge exit code {exit_code})")]
    DesignFailed { exit_code: i32 },
    #[error("Design phase did not produce a task file at {path}")]
    MissingTask { path: PathBuf },
    #[error("Design phase did not produce any variation files")]
    NoVariations,
    #[error("No variations completed successfully")]
    NoResults,
    #[error("judge run failed: {0}")]
    Judge(#[from] HarnessError),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(String),
    #[error("failed to serialize run summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ArenaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
