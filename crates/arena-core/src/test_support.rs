use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use arena_harness::{AgentLauncher, AgentRequest, AgentStreamHandle, LaunchError, SessionControl};
use bytes::Bytes;
use serde_json::json;

use crate::progress::{Progress, ProgressEvent};

/// Fake agent that plays both the judge and the variation agents.
///
/// Judge calls are recognized by their system prompt. The design call writes
/// `task.md` and the configured variation files into its working directory.
pub(crate) struct ScriptedLauncher {
    requests: Mutex<Vec<AgentRequest>>,
    design_exit: i32,
    write_task: bool,
    overwrite_task: bool,
    judge_writes: Vec<u32>,
    manifest: bool,
    fail_launch: HashSet<u32>,
    exit_codes: HashMap<u32, i32>,
}

impl Default for ScriptedLauncher {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            design_exit: 0,
            write_task: true,
            overwrite_task: false,
            judge_writes: vec![1, 2, 3],
            manifest: true,
            fail_launch: HashSet::new(),
            exit_codes: HashMap::new(),
        }
    }
}

impl ScriptedLauncher {
    pub(crate) fn fail_launch(mut self, number: u32) -> Self {
        self.fail_launch.insert(number);
        self
    }

    pub(crate) fn exit_code(mut self, number: u32, code: i32) -> Self {
        self.exit_codes.insert(number, code);
        self
    }

    pub(crate) fn design_exit(mut self, code: i32) -> Self {
        self.design_exit = code;
        self
    }

    pub(crate) fn without_task(mut self) -> Self {
        self.write_task = false;
        self
    }

    /// Rewrites `task.md` during design even when it already exists.
    pub(crate) fn overwrite_task(mut self) -> Self {
        self.overwrite_task = true;
        self
    }

    pub(crate) fn judge_writes(mut self, numbers: Vec<u32>) -> Self {
        self.judge_writes = numbers;
        self
    }

    pub(crate) fn without_manifest(mut self) -> Self {
        self.manifest = false;
        self
    }

    pub(crate) fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().expect("lock").clone()
    }

    pub(crate) fn judge_requests(&self) -> Vec<AgentRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.system_prompt.is_some())
            .collect()
    }

    pub(crate) fn variation_requests(&self) -> Vec<AgentRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.system_prompt.is_none())
            .collect()
    }

    fn design(&self, dir: &Path) -> (Vec<String>, i32) {
        if self.write_task && (self.overwrite_task || !dir.join("task.md").exists()) {
            std::fs::write(dir.join("task.md"), "Judge task: build a CLI").expect("write task");
        }
        std::fs::create_dir_all(dir.join("variations")).expect("variations dir");
        for n in &self.judge_writes {
            std::fs::write(
                dir.join("variations").join(format!("variation_{n}.md")),
                format!("Variation {n} instructions"),
            )
            .expect("write variation");
        }
        let mut text = "Designed the arena.".to_string();
        if self.manifest {
            let variations: Vec<_> = self
                .judge_writes
                .iter()
                .map(|n| json!({"number": n, "strategy": format!("STRATEGY_{n}"), "summary": format!("summary {n}")}))
                .collect();
            text.push_str(&format!(
                "\n\n```json\n{}\n```",
                json!({ "variations": variations })
            ));
        }
        (vec![assistant_text("design", &text, true)], self.design_exit)
    }

    fn variation(&self, number: u32) -> (Vec<String>, i32) {
        let lines = vec![
            json!({
                "type": "system",
                "subtype": "init",
            })
            .to_string(),
            json!({
                "type": "assistant",
                "message": {
                    "id": format!("v{number}-a"),
                    "content": [
                        {"type": "text", "text": format!("Working on variation {number}")},
                        {"type": "tool_use", "id": format!("tool-{number}"), "name": "Write", "input": {"file_path": "solution.py"}},
                    ],
                },
            })
            .to_string(),
            assistant_text(&format!("v{number}-b"), &format!("Done with variation {number}"), true),
        ];
        (lines, self.exit_codes.get(&number).copied().unwrap_or(0))
    }
}

fn assistant_text(id: &str, text: &str, end_turn: bool) -> String {
    json!({
        "type": "assistant",
        "message": {
            "id": id,
            "content": [{"type": "text", "text": text}],
            "stop_reason": if end_turn { "end_turn" } else { "tool_use" },
            "usage": {"input_tokens": 100, "output_tokens": 20, "cache_read_input_tokens": 5},
        },
    })
    .to_string()
}

fn variation_number(dir: &Path) -> u32 {
    dir.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix("variation_"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}

#[async_trait::async_trait]
impl AgentLauncher for ScriptedLauncher {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn launch(&self, req: AgentRequest) -> Result<AgentStreamHandle, LaunchError> {
        self.requests.lock().expect("lock").push(req.clone());
        let (lines, exit) = if req.system_prompt.is_some() {
            match req.session {
                SessionControl::Resume(_) => (
                    vec![assistant_text("eval", "Variation 1 wins.", true)],
                    0,
                ),
                _ => self.design(&req.working_dir),
            }
        } else {
            let number = variation_number(&req.working_dir);
            if self.fail_launch.contains(&number) {
                return Err(LaunchError::spawn("claude", "simulated launch failure"));
            }
            self.variation(number)
        };

        let transcript = lines.join("\n") + "\n";
        let chunks: Vec<Result<Bytes, LaunchError>> = transcript
            .as_bytes()
            .chunks(16)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(AgentStreamHandle {
            stdout: Box::pin(futures::stream::iter(chunks)),
            exit: Box::pin(async move { Ok(exit) }),
        })
    }
}

/// A progress sink that records every event.
pub(crate) fn progress_log() -> (Progress, Arc<Mutex<Vec<ProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let progress = Progress::new(Arc::new(move |event: ProgressEvent| {
        sink.lock().expect("lock").push(event);
    }));
    (progress, events)
}
