use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::content::RunOutput;
use crate::errors::{HarnessError, RunFailure, run_failure_from_launch_error};
use crate::harness::HarnessInner;
use crate::launcher::{AgentLauncher, AgentRequest};
use crate::model::{IsolationMode, ModelRef, RunOptions, SessionControl};
use crate::stream::StreamEvent;
use crate::transcript::{ParseUpdate, StreamParser};

/// Builder for configuring and starting a single agent run.
///
/// Provide the prompt and execution profile, then either stream events with
/// [`RunBuilder::start_stream`] or wait for the final output with
/// [`RunBuilder::collect_output`].
pub struct RunBuilder {
    harness: Arc<HarnessInner>,
    model: ModelRef,
    session: SessionControl,
    prompt: Option<String>,
    system_prompt: Option<String>,
    append_system_prompt: Option<String>,
    isolation: Option<IsolationMode>,
    working_dir: Option<PathBuf>,
    options: RunOptions,
}

impl RunBuilder {
    pub(crate) fn new(harness: Arc<HarnessInner>, model: ModelRef, session: SessionControl) -> Self {
        Self {
            harness,
            model,
            session,
            prompt: None,
            system_prompt: None,
            append_system_prompt: None,
            isolation: None,
            working_dir: None,
            options: RunOptions::default(),
        }
    }

    /// Sets the instruction the agent should complete.
    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = Some(text.into());
        self
    }

    /// Replaces the agent's system prompt.
    pub fn system_prompt(mut self, text: impl Into<String>) -> Self {
        self.system_prompt = Some(text.into());
        self
    }

    /// Appends instructions to the agent's own system prompt.
    ///
    /// Blank text is dropped instead of being passed through as an empty
    /// argument.
    pub fn append_system_prompt(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.append_system_prompt = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Selects whether the agent may read user-level configuration.
    pub fn isolation(mut self, mode: IsolationMode) -> Self {
        self.isolation = Some(mode);
        self
    }

    /// Sets the directory the agent process is started in.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the bounded stream buffer size used between the runtime task and
    /// the consumer.
    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.options.stream_buffer_capacity = capacity;
        self
    }

    /// Validates the builder state and starts a streaming run.
    ///
    /// The returned `RunStream` yields `RunStarted`, then text, tool and usage
    /// events as the transcript arrives, and a terminal `Completed`/`Error`.
    pub async fn start_stream(self) -> Result<RunStream, HarnessError> {
        let launcher = self.harness.launcher();
        let capacity = self.options.stream_buffer_capacity;
        let request = self.validate_and_build_request()?;

        let (tx, rx) = mpsc::channel(capacity);
        let (final_tx, final_rx) = oneshot::channel();

        let run_id = request.run_id;
        let model = request.model.clone();
        tokio::spawn(run_task(launcher, request, tx, final_tx));

        Ok(RunStream {
            run_id,
            model,
            rx,
            final_rx,
            saw_terminal: false,
        })
    }

    /// Runs to completion and returns the final aggregated output.
    ///
    /// A non-zero exit code is not an error here; inspect
    /// [`RunOutput::exit_code`].
    pub async fn collect_output(self) -> Result<RunOutput, HarnessError> {
        let stream = self.start_stream().await?;
        stream.finish().await
    }

    fn validate_and_build_request(self) -> Result<AgentRequest, HarnessError> {
        if self.model.as_str().trim().is_empty() {
            return Err(HarnessError::Validation("model must not be empty".into()));
        }
        if self.options.stream_buffer_capacity == 0 {
            return Err(HarnessError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }
        let prompt = match self.prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => return Err(HarnessError::Validation("prompt must not be empty".into())),
        };
        let Some(working_dir) = self.working_dir else {
            return Err(HarnessError::Validation("working_dir must be set".into()));
        };

        Ok(AgentRequest {
            run_id: uuid::Uuid::new_v4(),
            model: self.model,
            prompt,
            system_prompt: self.system_prompt.filter(|s| !s.trim().is_empty()),
            append_system_prompt: self.append_system_prompt,
            isolation: self.isolation,
            session: self.session,
            working_dir,
        })
    }
}

/// Streaming handle returned by `RunBuilder::start_stream`.
///
/// Use `next_event()` to consume events as they arrive and `finish()` to obtain
/// the final result after the terminal event.
pub struct RunStream {
    run_id: uuid::Uuid,
    model: ModelRef,
    rx: mpsc::Receiver<StreamEvent>,
    final_rx: oneshot::Receiver<Result<RunOutput, HarnessError>>,
    saw_terminal: bool,
}

impl RunStream {
    /// Returns the run id for this stream.
    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Waits for and returns the next normalized stream event.
    ///
    /// Returns `None` after the stream channel is closed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let event = self.rx.recv().await;
        if event.as_ref().is_some_and(StreamEvent::is_terminal) {
            self.saw_terminal = true;
        }
        event
    }

    /// Drains the stream (if needed) and returns the terminal run result.
    ///
    /// This is safe to call after consuming events manually with `next_event()`.
    pub async fn finish(mut self) -> Result<RunOutput, HarnessError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(event) if event.is_terminal() => self.saw_terminal = true,
                Some(_) => {}
                None => break,
            }
        }

        match self.final_rx.await {
            Ok(result) => result,
            Err(_) => Err(HarnessError::protocol_msg(format!(
                "run task ended without final result (model={})",
                self.model
            ))),
        }
    }
}

async fn run_task(
    launcher: Arc<dyn AgentLauncher>,
    request: AgentRequest,
    tx: mpsc::Sender<StreamEvent>,
    final_tx: oneshot::Sender<Result<RunOutput, HarnessError>>,
) {
    let run_id = request.run_id;
    let launcher_name = launcher.name().to_string();

    if !send_event(
        &tx,
        StreamEvent::RunStarted {
            run_id,
            model: request.model.clone(),
            session: request.session,
        },
    )
    .await
    {
        let _ = final_tx.send(Err(HarnessError::protocol_msg(
            "run stream receiver dropped before RunStarted",
        )));
        return;
    }

    let mut handle = match launcher.launch(request).await {
        Ok(handle) => handle,
        Err(err) => {
            warn!(run_id = %run_id, launcher = %launcher_name, error = %err, "agent launch failed");
            fail(&tx, final_tx, run_id, run_failure_from_launch_error(&err)).await;
            return;
        }
    };

    let mut parser = StreamParser::new();
    let mut output = RunOutput::default();
    let mut seq = 0_u64;

    while let Some(next) = handle.stdout.next().await {
        let chunk = match next {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(run_id = %run_id, launcher = %launcher_name, error = %err, "agent stdout failed");
                fail(&tx, final_tx, run_id, run_failure_from_launch_error(&err)).await;
                return;
            }
        };
        let update = parser.push_chunk(&chunk);
        if !forward_update(&tx, run_id, &mut seq, &mut output, update).await {
            let _ = final_tx.send(Err(HarnessError::protocol_msg(
                "run stream receiver dropped during output",
            )));
            return;
        }
    }
    let update = parser.finish();
    if !forward_update(&tx, run_id, &mut seq, &mut output, update).await {
        let _ = final_tx.send(Err(HarnessError::protocol_msg(
            "run stream receiver dropped during output",
        )));
        return;
    }

    let exit_code = match handle.exit.await {
        Ok(code) => code,
        Err(err) => {
            warn!(run_id = %run_id, launcher = %launcher_name, error = %err, "agent exit status unavailable");
            fail(&tx, final_tx, run_id, run_failure_from_launch_error(&err)).await;
            return;
        }
    };

    output.text = parser.accumulated_text().to_string();
    output.usage = parser.usage();
    output.exit_code = exit_code;
    debug!(run_id = %run_id, launcher = %launcher_name, exit_code, chars = output.text.len(), "agent run finished");

    let sent = send_event(
        &tx,
        StreamEvent::Completed {
            run_id,
            output: output.clone(),
        },
    )
    .await;
    let _ = final_tx.send(if sent {
        Ok(output)
    } else {
        Err(HarnessError::protocol_msg(
            "run stream receiver dropped before completion",
        ))
    });
}

async fn forward_update(
    tx: &mpsc::Sender<StreamEvent>,
    run_id: uuid::Uuid,
    seq: &mut u64,
    output: &mut RunOutput,
    update: ParseUpdate,
) -> bool {
    if !update.text_delta.is_empty() {
        let event = StreamEvent::TextDelta {
            run_id,
            seq: *seq,
            text: update.text_delta,
        };
        *seq = seq.saturating_add(1);
        if !send_event(tx, event).await {
            return false;
        }
    }
    for tool in update.tools {
        debug!(run_id = %run_id, tool = %tool.label(), "agent tool use");
        output.tools.push(tool.clone());
        if !send_event(tx, StreamEvent::ToolUse { run_id, tool }).await {
            return false;
        }
    }
    if let Some(usage) = update.usage
        && !send_event(tx, StreamEvent::Usage { run_id, usage }).await
    {
        return false;
    }
    true
}

async fn fail(
    tx: &mpsc::Sender<StreamEvent>,
    final_tx: oneshot::Sender<Result<RunOutput, HarnessError>>,
    run_id: uuid::Uuid,
    failure: RunFailure,
) {
    let _ = send_event(
        tx,
        StreamEvent::Error {
            run_id,
            error: failure.clone(),
        },
    )
    .await;
    let _ = final_tx.send(Err(HarnessError::run_failed(failure)));
}

async fn send_event(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    tx.send(event).await.is_ok()
}
