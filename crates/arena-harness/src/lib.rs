//! Streaming harness for command-line coding agents.
//!
//! A run spawns one agent process through an [`AgentLauncher`], decodes its
//! line-delimited JSON transcript incrementally and exposes normalized
//! [`StreamEvent`]s. Vendor-specific process contracts live under
//! `vendors::*`.
//!
//! # Builder-first usage (Claude CLI)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use arena_harness::prelude::*;
//! use arena_harness::vendors::claude::ClaudeCli;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), HarnessError> {
//! let harness = Harness::builder()
//!     .launcher(Arc::new(ClaudeCli::from_env()?))
//!     .build()?;
//!
//! let output = harness
//!     .run(ModelRef::new("sonnet"))
//!     .prompt("Create hello.txt containing a greeting.")
//!     .isolation(IsolationMode::Isolated)
//!     .working_dir("/tmp/scratch")
//!     .collect_output()
//!     .await?;
//!
//! println!("exit={} text={}", output.exit_code, output.text);
//! # Ok(())
//! # }
//! ```

/// Final run output and the facts extracted from a transcript.
pub mod content;
/// Public error types used by the harness API.
pub mod errors;
/// Harness entry point and builder.
pub mod harness;
/// Process launcher contract used by vendor integrations.
pub mod launcher;
/// Model identifiers and execution profile options.
pub mod model;
/// Common imports for typical usage.
pub mod prelude;
/// Run builder and streaming handle.
pub mod run;
/// Resumable agent sessions.
pub mod session;
/// Normalized public stream events.
pub mod stream;
/// Transcript decoding and the incremental stream parser.
pub mod transcript;
/// Vendor-specific process integrations.
pub mod vendors;

pub use content::{RunOutput, ToolInvocation, UsageStats};
pub use errors::{HarnessError, LaunchError, RunFailure};
pub use harness::{Harness, HarnessBuilder};
pub use launcher::{AgentLauncher, AgentRequest, AgentStreamHandle, ByteStream, ExitFuture};
pub use model::{IsolationMode, ModelRef, PermissionMode, RunOptions, SessionControl};
pub use run::{RunBuilder, RunStream};
pub use session::{Session, SessionConfig};
pub use stream::StreamEvent;
pub use transcript::{LineBuffer, ParseUpdate, StreamParser};
