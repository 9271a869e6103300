//! Resolves the arena configuration from flags, then `ARENA_*` variables,
//! then defaults.

use std::path::PathBuf;

use arena_core::ArenaConfig;
use arena_harness::ModelRef;

use crate::cli::Cli;

pub const DEFAULT_MODEL: &str = "sonnet";
pub const DEFAULT_JUDGE_MODEL: &str = "opus";
pub const DEFAULT_OUTPUT_DIR: &str = "arena-results";

pub fn arena_config(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> ArenaConfig {
    let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());
    ArenaConfig {
        variations: cli.variations,
        model: ModelRef::new(
            cli.model
                .clone()
                .or_else(|| env("ARENA_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        ),
        judge_model: ModelRef::new(
            cli.judge_model
                .clone()
                .or_else(|| env("ARENA_JUDGE_MODEL"))
                .unwrap_or_else(|| DEFAULT_JUDGE_MODEL.to_string()),
        ),
        user_mode: cli.user_mode,
        task: cli.task.clone().filter(|task| !task.trim().is_empty()),
        output_root: cli
            .output_dir
            .clone()
            .or_else(|| env("ARENA_OUTPUT_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        max_concurrency: cli
            .max_concurrency
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
    }
}
