//! Agent scratchpad
//!
//! The append-only thought/action/observation history of one run. Entries
//! are structured; they are serialized to text only when the next prompt
//! is composed, which keeps the loop state inspectable independent of
//! prompt formatting.

use serde::{Deserialize, Serialize};

use crate::core::types::AgentAction;

/// One completed reasoning round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchpadEntry {
    /// The model's reasoning for this round
    pub thought: String,
    /// The action it chose
    pub action: AgentAction,
    /// What the dispatched tool returned (or the uniform error text)
    pub observation: String,
}

/// Append-only history for a single in-flight run
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    entries: Vec<ScratchpadEntry>,
}

impl Scratchpad {
    /// Create an empty scratchpad
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed round
    pub fn push(&mut self, entry: ScratchpadEntry) {
        self.entries.push(entry);
    }

    /// Append the closing round for a final answer
    pub fn push_final(&mut self, thought: impl Into<String>, answer: impl Into<String>) {
        let answer = answer.into();
        let mut args = serde_json::Map::new();
        args.insert(
            "answer".to_string(),
            serde_json::Value::from(answer.clone()),
        );
        self.entries.push(ScratchpadEntry {
            thought: thought.into(),
            action: AgentAction::new(crate::core::FINAL_ANSWER, args),
            observation: answer,
        });
    }

    /// The recorded entries, oldest first
    pub fn entries(&self) -> &[ScratchpadEntry] {
        &self.entries
    }

    /// Number of recorded rounds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no rounds have been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the history for the prompt's scratchpad placeholder
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if entry.action.is_final() {
                out.push_str(&format!(
                    "\nThought: {}\nFinal answer: {}\n",
                    entry.thought, entry.observation
                ));
            } else {
                let action_json =
                    serde_json::to_string(&entry.action).unwrap_or_else(|_| "{}".to_string());
                out.push_str(&format!(
                    "\nThought: {}\nAction: {}\nObservation: {}\n",
                    entry.thought, action_json, entry.observation
                ));
            }
        }
        out
    }
}
