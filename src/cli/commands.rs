//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Agent;
use crate::core::Result;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as a normal question
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// No output needed
    None,
}

/// Parse and handle special commands
pub fn handle_command(input: &str, agent: &Agent) -> Result<CommandResult> {
    let input = input.trim();
    let cmd = input.to_lowercase();

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "tools" => Ok(CommandResult::Handled(agent.tools().catalog())),

        "tables" => {
            let description = agent.table_description();
            if description.is_empty() {
                Ok(CommandResult::Handled(
                    "No table description available.".to_string(),
                ))
            } else {
                Ok(CommandResult::Handled(description.to_string()))
            }
        }

        "status" => {
            let config = agent.config();
            let status = format!(
                "tableqa status:\n\
                 ─────────────────────────────\n\
                 Model:        {}\n\
                 Endpoint:     {}\n\
                 Max attempts: {}\n\
                 Top-k:        {}\n\
                 Shards:       {}",
                config.model.chat_model,
                config.model.endpoint,
                config.agent.max_attempts,
                config.retrieval.top_k,
                config
                    .retrieval
                    .shard_count
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "single index".to_string()),
            );
            Ok(CommandResult::Handled(status))
        }

        _ => {
            if input.is_empty() {
                Ok(CommandResult::None)
            } else if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    input
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

/// Generate help text
fn help_text() -> String {
    r#"tableqa commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit tableqa
  status           Show current configuration
  tools            Show the tool catalog
  tables           Show the ingested table descriptions

Anything else is treated as a question about the
uploaded tables.
─────────────────────────────────────────────"#
        .to_string()
}
