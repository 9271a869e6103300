use crate::errors::HarnessError;
use crate::model::PermissionMode;

/// Configuration for the Claude CLI launcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaudeCliConfig {
    /// Executable name or path.
    pub program: String,
    /// Permission mode passed to every run.
    pub permission_mode: PermissionMode,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            program: "claude".to_string(),
            permission_mode: PermissionMode::default(),
        }
    }
}

impl ClaudeCliConfig {
    /// Builds a config from `ARENA_AGENT_BIN` and `ARENA_PERMISSION_MODE`.
    pub fn from_env() -> Result<Self, HarnessError> {
        let mut config = Self::default();
        if let Ok(program) = std::env::var("ARENA_AGENT_BIN")
            && !program.trim().is_empty()
        {
            config.program = program.trim().to_string();
        }
        if let Ok(mode) = std::env::var("ARENA_PERMISSION_MODE")
            && !mode.trim().is_empty()
        {
            config.permission_mode = mode
                .trim()
                .parse()
                .map_err(|e: String| HarnessError::Config(format!("ARENA_PERMISSION_MODE: {e}")))?;
        }
        Ok(config)
    }

    /// Overrides the executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Overrides the permission mode.
    pub fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_claude_with_bypass_permissions() {
        let config = ClaudeCliConfig::default();
        assert_eq!(config.program, "claude");
        assert_eq!(config.permission_mode, PermissionMode::BypassPermissions);
    }

    #[test]
    fn builder_overrides() {
        let config = ClaudeCliConfig::default()
            .program("/opt/bin/claude")
            .permission_mode(PermissionMode::AcceptEdits);
        assert_eq!(config.program, "/opt/bin/claude");
        assert_eq!(config.permission_mode, PermissionMode::AcceptEdits);
    }
}
