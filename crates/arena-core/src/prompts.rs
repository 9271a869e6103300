//! Handlebars templates for every message the pipeline sends to an agent.
use handlebars::Handlebars;
use serde_json::json;

use crate::error::ArenaError;
use crate::variation::{VariationInfo, VariationResult};

const JUDGE_SYSTEM: &str = "\
You are the judge of a prompt arena. You compare variations of a system prompt: \
you design a realistic coding task, rewrite the prompt into distinct variations, \
and later score how well coding agents driven by each variation performed.

Work only inside the current directory and write files exactly where you are told.";

const DESIGN: &str = r#"# Original system prompt

<original_prompt>
{{original_prompt}}
</original_prompt>

{{#if task_provided}}
The task is fixed and already saved in `{{task_path}}`:

<task>
{{task}}
</task>
{{else}}
Design one self-contained coding task that exercises the behaviors this prompt is meant to shape. A coding agent must be able to complete it inside an empty directory without network access. Write the task description to `{{task_path}}`.
{{/if}}

Write {{count}} variations of the original system prompt. Each variation keeps the prompt's intent but follows a different improvement strategy. Write variation N to `{{variations_dir}}/variation_N.md` for N from 1 to {{count}}. Do not write variation 0: it is the unmodified original.

End your reply with a fenced json block describing the variations, for example:

```json
{"variations": [{"number": 1, "strategy": "CLARITY", "summary": "One sentence on what changed"}]}
```
"#;

const EVALUATE: &str = r#"All variations have finished. Evaluate them against the task you designed.

# Original system prompt

<original_prompt>
{{original_prompt}}
</original_prompt>

# Task

<task>
{{task}}
</task>

# Variations

{{#each variations}}
- Variation {{number}} ({{strategy}}): {{summary}}
{{/each}}

# Results

{{#each results}}
## Variation {{number}}

Exit code: {{exit_code}}
Workspace: {{workspace}}

<transcript>
{{output}}
</transcript>

{{/each}}
Inspect each workspace to check the files that were actually produced. Score every variation from 1 to 10 on task completion, instruction adherence and code quality. Explain the differences that mattered and finish with a clear recommendation of the best variation."#;

const VARIATION_TASK: &str = "\
Complete the following task in the current directory.

{{task}}";

/// Renders judge and variation messages.
pub struct Prompts {
    registry: Handlebars<'static>,
}

impl Prompts {
    pub fn new() -> Result<Self, ArenaError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        for (name, template) in [("design", DESIGN), ("evaluate", EVALUATE), ("variation_task", VARIATION_TASK)] {
            registry
                .register_template_string(name, template)
                .map_err(|e| ArenaError::Template(format!("{name}: {e}")))?;
        }
        Ok(Self { registry })
    }

    /// System prompt for every judge call.
    pub fn judge_system(&self) -> &'static str {
        JUDGE_SYSTEM
    }

    /// First judge message. `task` is `Some` when the caller fixed the task.
    pub fn design(
        &self,
        original_prompt: &str,
        task: Option<&str>,
        count: u32,
        task_path: &str,
        variations_dir: &str,
    ) -> Result<String, ArenaError> {
        self.render(
            "design",
            &json!({
                "original_prompt": original_prompt,
                "task_provided": task.is_some(),
                "task": task.unwrap_or_default(),
                "task_path": task_path,
                "variations_dir": variations_dir,
                "count": count,
            }),
        )
    }

    /// Message resuming the judge session for scoring. `results` must already
    /// be in ascending variation order.
    pub fn evaluate(
        &self,
        original_prompt: &str,
        task: &str,
        variations: &[VariationInfo],
        results: &[VariationResult],
    ) -> Result<String, ArenaError> {
        let results: Vec<_> = results
            .iter()
            .map(|result| {
                json!({
                    "number": result.variation_number,
                    "exit_code": result.exit_code,
                    "workspace": result.workspace.display().to_string(),
                    "output": result.output,
                })
            })
            .collect();
        self.render(
            "evaluate",
            &json!({
                "original_prompt": original_prompt,
                "task": task,
                "variations": variations,
                "results": results,
            }),
        )
    }

    /// Instruction given to each variation's agent.
    pub fn variation_task(&self, task: &str) -> Result<String, ArenaError> {
        self.render("variation_task", &json!({ "task": task }))
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, ArenaError> {
        self.registry
            .render(name, data)
            .map_err(|e| ArenaError::Template(format!("{name}: {e}")))
    }
}
