/// Claude Code CLI process integration.
pub mod claude;
