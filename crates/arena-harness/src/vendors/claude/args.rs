use crate::launcher::AgentRequest;
use crate::model::{IsolationMode, PermissionMode, SessionControl};

/// Empty MCP server set used to keep isolated runs free of user servers.
const EMPTY_MCP_CONFIG: &str = r#"{"mcpServers":{}}"#;

/// Builds the CLI argument list for one run.
///
/// The prompt must stay first: `--mcp-config` accepts several values and
/// would otherwise swallow a trailing positional prompt.
pub fn build_args(req: &AgentRequest, permission_mode: PermissionMode) -> Vec<String> {
    let mut args = vec![
        "-p".to_string(),
        req.prompt.clone(),
        "--model".to_string(),
        req.model.as_str().to_string(),
        "--output-format".to_string(),
        "stream-json".to_string(),
        "--verbose".to_string(),
        "--permission-mode".to_string(),
        permission_mode.as_str().to_string(),
    ];

    if let Some(system_prompt) = &req.system_prompt {
        args.push("--system-prompt".to_string());
        args.push(system_prompt.clone());
    }
    if let Some(append) = req.append_system_prompt.as_ref().filter(|s| !s.is_empty()) {
        args.push("--append-system-prompt".to_string());
        args.push(append.clone());
    }

    match req.session {
        SessionControl::None => {}
        SessionControl::Start(id) => {
            args.push("--session-id".to_string());
            args.push(id.to_string());
        }
        SessionControl::Resume(id) => {
            args.push("--resume".to_string());
            args.push(id.to_string());
        }
    }

    match req.isolation {
        None => {}
        Some(IsolationMode::Isolated) => {
            args.push("--setting-sources".to_string());
            args.push(IsolationMode::Isolated.setting_sources().to_string());
            args.push("--mcp-config".to_string());
            args.push(EMPTY_MCP_CONFIG.to_string());
            args.push("--strict-mcp-config".to_string());
        }
        Some(IsolationMode::Inherited) => {
            args.push("--setting-sources".to_string());
            args.push(IsolationMode::Inherited.setting_sources().to_string());
        }
    }

    args
}
