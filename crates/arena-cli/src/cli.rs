//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Compare rewritten variations of a system prompt on a judge-designed task
#[derive(Parser, Debug)]
#[command(name = "prompt-arena", about, version)]
pub struct Cli {
    /// Markdown file holding the system prompt to test (`@./file.md` imports are inlined)
    pub prompt_file: PathBuf,

    /// Use this task instead of letting the judge design one
    #[arg(long)]
    pub task: Option<String>,

    /// Number of variations the judge writes (the baseline runs in addition)
    #[arg(short = 'n', long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub variations: u32,

    /// Model for the variation agents. Uses ARENA_MODEL if not set.
    #[arg(long)]
    pub model: Option<String>,

    /// Model for the judge. Uses ARENA_JUDGE_MODEL if not set.
    #[arg(long)]
    pub judge_model: Option<String>,

    /// Run the baseline with your own agent configuration instead of isolated
    #[arg(long)]
    pub user_mode: bool,

    /// Directory for run output. Uses ARENA_OUTPUT_DIR if not set.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of variation agents running at once
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrency: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["prompt-arena", "prompt.md"]).expect("parse");
        assert_eq!(cli.prompt_file, PathBuf::from("prompt.md"));
        assert_eq!(cli.variations, 3);
        assert!(!cli.user_mode);
        assert!(cli.task.is_none());
        assert!(cli.max_concurrency.is_none());
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "prompt-arena",
            "p.md",
            "--task",
            "Write a parser",
            "-n",
            "5",
            "--model",
            "haiku",
            "--judge-model",
            "sonnet",
            "--user-mode",
            "--output-dir",
            "out",
            "--max-concurrency",
            "2",
            "-v",
        ])
        .expect("parse");
        assert_eq!(cli.task.as_deref(), Some("Write a parser"));
        assert_eq!(cli.variations, 5);
        assert_eq!(cli.model.as_deref(), Some("haiku"));
        assert_eq!(cli.judge_model.as_deref(), Some("sonnet"));
        assert!(cli.user_mode);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.max_concurrency, Some(2));
        assert!(cli.verbose);
    }

    #[test]
    fn rejects_zero_variations_and_missing_file() {
        assert!(Cli::try_parse_from(["prompt-arena", "p.md", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["prompt-arena"]).is_err());
        assert!(Cli::try_parse_from(["prompt-arena", "p.md", "--max-concurrency", "0"]).is_err());
    }
}
