//! `prompt-arena`: rewrite a system prompt into variations, run each on the
//! same task and let a judge pick the best.

mod cli;
mod config;
mod output;

use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use arena_core::observability::init_observability;
use arena_core::{Arena, ArenaRun, FsSource, resolve_file};
use arena_harness::Harness;
use arena_harness::vendors::claude::ClaudeCli;
use clap::Parser;
use tracing::debug;

use crate::cli::Cli;
use crate::output::ProgressReporter;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_observability(if cli.verbose { "debug" } else { "warn" });

    match run(cli).await {
        Ok(run) if run.success => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            output::error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ArenaRun, Box<dyn Error>> {
    let prompt = load_prompt(&cli.prompt_file)?;
    let config = config::arena_config(&cli, |key| std::env::var(key).ok());
    debug!(?config, "resolved configuration");

    let launcher = ClaudeCli::from_env()?;
    let harness = Harness::builder().launcher(Arc::new(launcher)).build()?;

    output::header("Prompt arena");
    output::kv("prompt", cli.prompt_file.display());
    output::kv("variations", config.variations);
    output::kv("model", &config.model);
    output::kv("judge", &config.judge_model);
    if config.user_mode {
        output::kv("baseline", "user configuration");
    }
    println!();

    let reporter = Arc::new(ProgressReporter::new());
    let arena = Arena::new(harness, config)?.with_status_callback(reporter.callback());
    let result = arena.run(&prompt).await;
    reporter.finish();

    let run = result?;
    output::report(&run);
    Ok(run)
}

/// Reads the prompt file with its `@path.md` imports inlined.
fn load_prompt(path: &Path) -> Result<String, Box<dyn Error>> {
    let prompt = resolve_file(path, &FsSource)
        .map_err(|err| format!("cannot read prompt file {}: {err}", path.display()))?;
    if prompt.trim().is_empty() {
        return Err(format!("prompt file {} is empty", path.display()).into());
    }
    Ok(prompt)
}
