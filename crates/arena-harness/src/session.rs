use std::sync::Arc;

use crate::harness::HarnessInner;
use crate::model::{ModelRef, SessionControl};
use crate::run::RunBuilder;

/// Configuration used to create a `Session`.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Human-readable session name used in logs.
    pub name: String,
    /// Fixed conversation id. A fresh v4 id is generated when unset.
    pub id: Option<uuid::Uuid>,
}

impl SessionConfig {
    /// Creates a named session config.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// Pins the conversation id, for example to resume an earlier session.
    pub fn with_id(mut self, id: uuid::Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

/// A persistent agent conversation.
///
/// The first run is started with [`Session::start`]; every later run that
/// should see the earlier context uses [`Session::resume`]. The conversation
/// itself is kept by the agent, keyed by [`Session::id`].
#[derive(Clone)]
pub struct Session {
    harness: Arc<HarnessInner>,
    id: uuid::Uuid,
    name: String,
}

impl Session {
    pub(crate) fn new(harness: Arc<HarnessInner>, config: SessionConfig) -> Self {
        Self {
            harness,
            id: config.id.unwrap_or_else(uuid::Uuid::new_v4),
            name: config.name,
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the run that opens the conversation.
    pub fn start(&self, model: ModelRef) -> RunBuilder {
        RunBuilder::new(self.harness.clone(), model, SessionControl::Start(self.id))
    }

    /// Builds a run that continues the conversation.
    pub fn resume(&self, model: ModelRef) -> RunBuilder {
        RunBuilder::new(self.harness.clone(), model, SessionControl::Resume(self.id))
    }
}
