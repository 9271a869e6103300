use std::sync::Arc;

use crate::errors::HarnessError;
use crate::launcher::AgentLauncher;
use crate::model::{ModelRef, SessionControl};
use crate::run::RunBuilder;
use crate::session::{Session, SessionConfig};

pub(crate) struct HarnessInner {
    launcher: Arc<dyn AgentLauncher>,
}

impl HarnessInner {
    pub(crate) fn launcher(&self) -> Arc<dyn AgentLauncher> {
        self.launcher.clone()
    }
}

/// Entry point for one-shot runs and sessions.
#[derive(Clone)]
pub struct Harness {
    pub(crate) inner: Arc<HarnessInner>,
}

impl Harness {
    /// Starts a builder for configuring the launcher and creating a `Harness`.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Starts building a run with no persistent conversation.
    pub fn run(&self, model: ModelRef) -> RunBuilder {
        RunBuilder::new(self.inner.clone(), model, SessionControl::None)
    }

    /// Creates a persistent conversation for grouping related runs.
    pub fn session(&self, config: SessionConfig) -> Session {
        Session::new(self.inner.clone(), config)
    }

    /// Name of the configured launcher.
    pub fn launcher_name(&self) -> &str {
        self.inner.launcher.name()
    }
}

/// Builder used to configure the agent launcher before creating a `Harness`.
#[derive(Default)]
pub struct HarnessBuilder {
    launcher: Option<Arc<dyn AgentLauncher>>,
}

impl HarnessBuilder {
    /// Sets the launcher every run is started with.
    pub fn launcher(mut self, launcher: Arc<dyn AgentLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Builds the harness. A launcher is required.
    pub fn build(self) -> Result<Harness, HarnessError> {
        let launcher = self
            .launcher
            .ok_or_else(|| HarnessError::Config("no agent launcher configured".into()))?;
        Ok(Harness {
            inner: Arc::new(HarnessInner { launcher }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LaunchError;
    use crate::launcher::{AgentRequest, AgentStreamHandle};

    struct DummyLauncher;

    #[async_trait::async_trait]
    impl AgentLauncher for DummyLauncher {
        fn name(&self) -> &str {
            "dummy"
        }

        async fn launch(&self, _req: AgentRequest) -> Result<AgentStreamHandle, LaunchError> {
            unreachable!("not used in this test")
        }
    }

    #[test]
    fn build_requires_a_launcher() {
        let result = Harness::builder().build();
        assert!(
            matches!(result, Err(HarnessError::Config(message)) if message.contains("no agent launcher"))
        );
    }

    #[test]
    fn build_keeps_launcher() {
        let harness = Harness::builder()
            .launcher(Arc::new(DummyLauncher))
            .build()
            .expect("build harness");
        assert_eq!(harness.launcher_name(), "dummy");
    }
}
