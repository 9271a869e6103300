//! Variation-test pipeline for system prompts.
//!
//! An [`Arena`] asks a judge agent to design a task and rewrite a prompt into
//! several variations, runs one agent per variation concurrently, then
//! resumes the judge's session to score the results.
pub mod arena;
pub mod error;
pub mod imports;
pub mod judge;
pub mod layout;
pub mod observability;
pub mod progress;
pub mod prompts;
pub mod runner;
pub mod variation;

#[cfg(test)]
pub(crate) mod test_support;

pub use arena::{Arena, ArenaConfig, ArenaRun};
pub use error::ArenaError;
pub use imports::{FileSource, FsSource, resolve_file, resolve_imports};
pub use layout::RunLayout;
pub use progress::{ProgressEvent, StatusCallback, TaskId, TaskState};
pub use runner::{ExecutionProfile, VariationRunner};
pub use variation::{VariationInfo, VariationResult, fallback_variation_info, parse_variation_info};
