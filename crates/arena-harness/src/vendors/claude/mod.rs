//! Claude Code CLI integration.
//!
//! The CLI is started once per run in non-interactive mode and streams its
//! transcript as line-delimited JSON on standard output.
mod args;
mod config;
mod process;

pub use args::build_args;
pub use config::ClaudeCliConfig;
pub use process::ClaudeCli;
