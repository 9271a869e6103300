//! Builder and stream types most callers need.
pub use crate::{
    Harness, HarnessBuilder, HarnessError, IsolationMode, ModelRef, PermissionMode, RunBuilder,
    RunOutput, RunStream, Session, SessionConfig, StreamEvent, ToolInvocation, UsageStats,
};
