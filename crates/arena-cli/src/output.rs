//! Terminal rendering: live progress bars and the final results table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arena_core::{ArenaRun, ProgressEvent, StatusCallback, TaskId, TaskState};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub fn header(text: &str) {
    println!("\n{}", style(text).bold().cyan());
}

pub fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{key}:")).dim(), value);
}

pub fn success(text: &str) {
    println!("{} {}", style("✓").green().bold(), text);
}

pub fn warning(text: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), text);
}

pub fn error(text: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(text).red());
}

/// One spinner per task, created on the task's first event.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<TaskId, ProgressBar>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    pub fn callback(self: &Arc<Self>) -> StatusCallback {
        let reporter = Arc::clone(self);
        Arc::new(move |event: ProgressEvent| reporter.update(event))
    }

    pub fn update(&self, event: ProgressEvent) {
        let Ok(mut bars) = self.bars.lock() else {
            return;
        };
        let bar = bars
            .entry(event.task)
            .or_insert_with(|| self.add_bar(event.task))
            .clone();
        drop(bars);

        match event.state {
            TaskState::Pending => bar.set_message(style("queued").dim().to_string()),
            TaskState::Running => bar.set_message(event.detail),
            TaskState::Completed => bar.finish_with_message(format!("{} {}", style("✓").green(), event.detail)),
            TaskState::Failed => bar.finish_with_message(format!("{} {}", style("✗").red(), event.detail)),
            TaskState::Skipped => bar.finish_with_message(format!("{} {}", style("-").yellow(), event.detail)),
        }
    }

    /// Stops every spinner that has not reached a final state.
    pub fn finish(&self) {
        if let Ok(bars) = self.bars.lock() {
            for bar in bars.values().filter(|bar| !bar.is_finished()) {
                bar.finish();
            }
        }
    }

    fn add_bar(&self, task: TaskId) -> ProgressBar {
        let spinner = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(spinner);
        bar.set_prefix(format!("{:<12}", task.to_string()));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

/// One row per variation: strategy, exit code and token usage.
pub fn results_table(run: &ArenaRun) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["#", "Strategy", "Exit", "Tokens in", "Tokens out", "Cached"]
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(comfy_table::Attribute::Bold)),
        );

    for result in &run.results {
        let strategy = run
            .info(result.variation_number)
            .map(|info| info.strategy.clone())
            .unwrap_or_else(|| "-".to_string());
        let exit = if result.is_success() {
            Cell::new(result.exit_code).fg(Color::Green)
        } else {
            Cell::new(result.exit_code).fg(Color::Red)
        };
        let (input, output, cached) = match &result.usage {
            Some(usage) => (
                usage.input_tokens.to_string(),
                usage.output_tokens.to_string(),
                usage.cached_tokens.to_string(),
            ),
            None => ("-".into(), "-".into(), "-".into()),
        };
        table.add_row(vec![
            Cell::new(result.variation_number),
            Cell::new(strategy),
            exit,
            Cell::new(input),
            Cell::new(output),
            Cell::new(cached),
        ]);
    }
    table
}

pub fn report(run: &ArenaRun) {
    header("Results");
    println!("{}", results_table(run));

    header("Evaluation");
    println!("{}", run.evaluation_output.trim());

    println!();
    if run.success {
        success("Evaluation complete");
    } else {
        warning("Judge evaluation exited with a non-zero code");
    }
    kv("output", run.output_dir.display());
    kv("judge session", run.judge_session_id);
}
