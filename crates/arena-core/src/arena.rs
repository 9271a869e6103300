use std::path::{Path, PathBuf};
use std::sync::Arc;

use arena_harness::{Harness, ModelRef, SessionConfig};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{Instrument as _, info, info_span, warn};

use crate::error::ArenaError;
use crate::judge::Judge;
use crate::layout::{RunLayout, write_file};
use crate::progress::{Progress, StatusCallback, TaskId, TaskState};
use crate::prompts::Prompts;
use crate::runner::{ExecutionProfile, VariationRunner};
use crate::variation::{VariationInfo, VariationResult, parse_variation_info};

/// Settings for one arena run.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Number of judge-authored variations (the baseline comes on top).
    pub variations: u32,
    pub model: ModelRef,
    pub judge_model: ModelRef,
    pub user_mode: bool,
    /// Fixed task. When unset the judge designs one.
    pub task: Option<String>,
    /// Directory the timestamped run directory is created in.
    pub output_root: PathBuf,
    /// Upper bound on concurrently running variation agents. Unbounded when
    /// unset.
    pub max_concurrency: Option<usize>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            variations: 3,
            model: ModelRef::new("sonnet"),
            judge_model: ModelRef::new("opus"),
            user_mode: false,
            task: None,
            output_root: PathBuf::from("arena-results"),
            max_concurrency: None,
        }
    }
}

/// Summary of a finished run, also written to `arena.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaRun {
    pub judge_session_id: uuid::Uuid,
    pub task: String,
    pub variation_info: Vec<VariationInfo>,
    /// Ascending by variation number.
    pub results: Vec<VariationResult>,
    pub evaluation_output: String,
    /// True when the evaluation call exited with code 0.
    pub success: bool,
    pub output_dir: PathBuf,
}

impl ArenaRun {
    pub fn result(&self, number: u32) -> Option<&VariationResult> {
        self.results.iter().find(|r| r.variation_number == number)
    }

    pub fn info(&self, number: u32) -> Option<&VariationInfo> {
        self.variation_info.iter().find(|v| v.number == number)
    }
}

/// The three-phase pipeline: judge design, parallel variation runs, judge
/// evaluation.
pub struct Arena {
    harness: Harness,
    config: ArenaConfig,
    prompts: Arc<Prompts>,
    progress: Progress,
}

impl Arena {
    pub fn new(harness: Harness, config: ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self {
            harness,
            config,
            prompts: Arc::new(Prompts::new()?),
            progress: Progress::silent(),
        })
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.progress = Progress::new(callback);
        self
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Runs the pipeline in a fresh `<output_root>/arena-<timestamp>` directory.
    pub async fn run(&self, original_prompt: &str) -> Result<ArenaRun, ArenaError> {
        let layout = RunLayout::timestamped(&self.config.output_root, chrono::Local::now());
        self.run_in(&layout, original_prompt).await
    }

    /// Runs the pipeline in `layout`.
    pub async fn run_in(&self, layout: &RunLayout, original_prompt: &str) -> Result<ArenaRun, ArenaError> {
        layout.create().await?;
        let judge = Judge::new(
            self.harness
                .session(SessionConfig::named("judge").with_id(uuid::Uuid::new_v4())),
            self.config.judge_model.clone(),
            self.prompts.clone(),
            self.progress.clone(),
        );
        let span = info_span!("arena", session_id = %judge.session_id(), dir = %layout.root().display());

        async {
            let (task, variation_info) = self.design(layout, &judge, original_prompt).await?;
            let results = self.test_variations(layout, &task).await?;
            self.evaluate(layout, &judge, original_prompt, task, variation_info, results)
                .await
        }
        .instrument(span)
        .await
    }

    async fn design(
        &self,
        layout: &RunLayout,
        judge: &Judge,
        original_prompt: &str,
    ) -> Result<(String, Vec<VariationInfo>), ArenaError> {
        let count = self.config.variations;
        info!(count, fixed_task = self.config.task.is_some(), "phase 1: design");
        if let Some(task) = &self.config.task {
            write_file(&layout.task_file(), task).await?;
        }
        let message = self.prompts.design(
            original_prompt,
            self.config.task.as_deref(),
            count,
            &layout.relative(&layout.task_file()),
            &layout.relative(&layout.variations_dir()),
        )?;
        let output = judge.design(message, layout.root()).await?;
        if !output.is_success() {
            return Err(ArenaError::DesignFailed {
                exit_code: output.exit_code,
            });
        }

        let task = match &self.config.task {
            Some(task) => task.clone(),
            None => read_task(&layout.task_file()).await?,
        };

        let mut authored = 0;
        for number in 1..=count {
            if path_exists(&layout.variation_file(number)).await {
                authored += 1;
            }
        }
        if authored == 0 {
            return Err(ArenaError::NoVariations);
        }

        let mut variation_info = vec![VariationInfo::baseline()];
        variation_info.extend(
            parse_variation_info(&output.text, count)
                .into_iter()
                .filter(|info| !info.is_baseline()),
        );
        variation_info.sort_by_key(|info| info.number);
        write_file(&layout.variation_file(0), original_prompt).await?;
        info!(authored, "design complete");
        Ok((task, variation_info))
    }

    async fn test_variations(&self, layout: &RunLayout, task: &str) -> Result<Vec<VariationResult>, ArenaError> {
        info!(variations = self.config.variations, max_concurrency = ?self.config.max_concurrency, "phase 2: parallel test");
        let runner = Arc::new(VariationRunner::new(
            self.harness.clone(),
            self.prompts.clone(),
            ExecutionProfile {
                model: self.config.model.clone(),
                user_mode: self.config.user_mode,
            },
            self.progress.clone(),
        ));
        let limit = self
            .config
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))));
        let task: Arc<str> = Arc::from(task);

        let mut started = Vec::new();
        for number in 0..=self.config.variations {
            let variation_file = layout.variation_file(number);
            let text = match tokio::fs::read_to_string(&variation_file).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(variation = number, path = %variation_file.display(), error = %e, "variation file missing, skipping");
                    self.progress
                        .emit(TaskId::Variation(number), TaskState::Skipped, "no variation file");
                    continue;
                }
            };
            let workspace = layout.workspace(number);
            tokio::fs::create_dir_all(&workspace)
                .await
                .map_err(|e| ArenaError::io(&workspace, e))?;
            self.progress
                .emit(TaskId::Variation(number), TaskState::Pending, "queued");

            let runner = runner.clone();
            let task = task.clone();
            let limit = limit.clone();
            let task_workspace = workspace.clone();
            let handle = tokio::spawn(
                async move {
                    let _permit = match limit {
                        Some(limit) => match limit.acquire_owned().await {
                            Ok(permit) => Some(permit),
                            Err(_) => {
                                return VariationResult::failed(number, task_workspace, "concurrency limiter closed");
                            }
                        },
                        None => None,
                    };
                    runner.run(number, &task, &text, &task_workspace).await
                }
                .in_current_span(),
            );
            started.push((number, workspace, handle));
        }

        let (meta, handles): (Vec<_>, Vec<_>) = started
            .into_iter()
            .map(|(number, workspace, handle)| ((number, workspace), handle))
            .unzip();
        let mut results: Vec<VariationResult> = join_all(handles)
            .await
            .into_iter()
            .zip(meta)
            .map(|(joined, (number, workspace))| match joined {
                Ok(result) => result,
                Err(err) => {
                    warn!(variation = number, error = %err, "variation task did not complete");
                    self.progress
                        .emit(TaskId::Variation(number), TaskState::Failed, "task aborted");
                    VariationResult::failed(number, workspace, format!("variation task failed: {err}"))
                }
            })
            .collect();
        results.sort_by_key(|r| r.variation_number);

        if results.is_empty() {
            return Err(ArenaError::NoResults);
        }
        for result in &results {
            write_file(&layout.result_file(result.variation_number), &result.output).await?;
        }
        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(completed = results.len(), failed, "parallel test complete");
        Ok(results)
    }

    async fn evaluate(
        &self,
        layout: &RunLayout,
        judge: &Judge,
        original_prompt: &str,
        task: String,
        variation_info: Vec<VariationInfo>,
        results: Vec<VariationResult>,
    ) -> Result<ArenaRun, ArenaError> {
        info!(results = results.len(), "phase 3: evaluate");
        let message = self
            .prompts
            .evaluate(original_prompt, &task, &variation_info, &results)?;
        let output = judge.evaluate(message, layout.root()).await?;
        write_file(&layout.evaluation_file(), &output.text).await?;

        let success = output.is_success();
        let run = ArenaRun {
            judge_session_id: judge.session_id(),
            task,
            variation_info,
            results,
            evaluation_output: output.text,
            success,
            output_dir: layout.root().to_path_buf(),
        };
        write_file(&layout.summary_file(), &serde_json::to_string_pretty(&run)?).await?;
        info!(success = run.success, "arena run complete");
        Ok(run)
    }
}

async fn read_task(path: &Path) -> Result<String, ArenaError> {
    match tokio::fs::read_to_string(path).await {
        Ok(task) => Ok(task),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ArenaError::MissingTask {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(ArenaError::io(path, e)),
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
