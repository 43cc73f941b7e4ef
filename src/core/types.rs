//! Shared types used across tableqa modules
//!
//! Contains the model reply structures, the action schema, and run outcomes.

use serde::{Deserialize, Serialize};

/// Reserved action name that terminates the reasoning loop
pub const FINAL_ANSWER: &str = "Final Answer";

/// A structured reply from the reasoning model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReply {
    /// Free-form reasoning text
    #[serde(default)]
    pub thoughts: String,
    /// The action the model wants to take
    pub action: AgentAction,
}

/// An action requested by the reasoning model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAction {
    /// Name of the tool to invoke (or the reserved final-answer name)
    #[serde(default)]
    pub name: String,
    /// JSON arguments for the tool
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
}

impl AgentAction {
    /// Create a new action
    pub fn new(name: impl Into<String>, args: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Whether this is the reserved final-answer action
    pub fn is_final(&self) -> bool {
        self.name == FINAL_ANSWER
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.args
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

impl ModelReply {
    /// Parse a raw model response into a structured reply.
    ///
    /// Accepts a bare JSON object or one wrapped in a ```json fence.
    pub fn parse(raw: &str) -> Option<Self> {
        let stripped = strip_code_fence(raw.trim());
        serde_json::from_str(stripped).ok()
    }
}

/// Strip a leading/trailing markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Terminal outcome of one agent run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model produced the reserved final-answer action
    Answer(String),
    /// The attempt budget was exhausted without a final answer
    Exhausted,
}

impl RunOutcome {
    /// The answer text, if the run produced one
    pub fn answer(&self) -> Option<&str> {
        match self {
            RunOutcome::Answer(a) => Some(a),
            RunOutcome::Exhausted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let raw = r#"{"thoughts": "need data", "action": {"name": "retrieve_context", "args": {"query": ["cities"]}}}"#;
        let reply = ModelReply::parse(raw).unwrap();
        assert_eq!(reply.thoughts, "need data");
        assert_eq!(reply.action.name, "retrieve_context");
        assert!(!reply.action.is_final());
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"thoughts\": \"done\", \"action\": {\"name\": \"Final Answer\", \"args\": {\"answer\": \"42\"}}}\n```";
        let reply = ModelReply::parse(raw).unwrap();
        assert!(reply.action.is_final());
        assert_eq!(reply.action.get_string("answer").unwrap(), "42");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(ModelReply::parse("not json at all").is_none());
        assert!(ModelReply::parse("").is_none());
    }

    #[test]
    fn test_missing_thoughts_defaults_empty() {
        let raw = r#"{"action": {"name": "add", "args": {"a": 1, "b": 2}}}"#;
        let reply = ModelReply::parse(raw).unwrap();
        assert!(reply.thoughts.is_empty());
        assert_eq!(reply.action.name, "add");
    }
}
