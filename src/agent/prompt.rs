//! Prompt templates
//!
//! Two externally supplied opaque texts: a system template with
//! placeholders for the tool catalog, the question, the table description,
//! and the running scratchpad; and a fixed human-turn template. The
//! placeholder syntax is a contract honored verbatim. Embedded defaults
//! are used when no template directory is configured.

use std::fs;
use std::path::Path;

use crate::core::{Result, TableqaError};

/// Placeholder for the rendered tool catalog
pub const TOOLS_PLACEHOLDER: &str = "{Tools}";
/// Placeholder for the user question
pub const QUESTION_PLACEHOLDER: &str = "{question}";
/// Placeholder for the table description block
pub const DATA_DESC_PLACEHOLDER: &str = "{DATA_DESC}";
/// Placeholder for the running scratchpad, substituted every attempt
pub const SCRATCH_PLACEHOLDER: &str = "[agent_scratch]";

const DEFAULT_SYSTEM: &str = include_str!("../../prompts/system_prompt.txt");
const DEFAULT_HUMAN: &str = include_str!("../../prompts/human_prompt.txt");

/// Loaded prompt templates
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    human: String,
}

impl PromptTemplate {
    /// Load templates from a directory, or fall back to the embedded defaults
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Ok(Self {
                system: read_template(&dir.join("system_prompt.txt"))?,
                human: read_template(&dir.join("human_prompt.txt"))?,
            }),
            None => Ok(Self::default()),
        }
    }

    /// Render the base prompt: catalog, question, and data description.
    ///
    /// The scratchpad placeholder is left in place for per-attempt
    /// substitution.
    pub fn render_base(&self, catalog: &str, question: &str, data_desc: &str) -> String {
        self.system
            .replace(TOOLS_PLACEHOLDER, catalog)
            .replace(QUESTION_PLACEHOLDER, question)
            .replace(DATA_DESC_PLACEHOLDER, data_desc)
    }

    /// Substitute the current scratchpad into a rendered base prompt
    pub fn compose(&self, base: &str, scratch: &str) -> String {
        base.replace(SCRATCH_PLACEHOLDER, scratch)
    }

    /// The fixed human-turn text
    pub fn human(&self) -> &str {
        &self.human
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM.to_string(),
            human: DEFAULT_HUMAN.to_string(),
        }
    }
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        TableqaError::template(format!(
            "failed to read prompt template {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_has_placeholders() {
        let template = PromptTemplate::default();
        assert!(template.system.contains(TOOLS_PLACEHOLDER));
        assert!(template.system.contains(QUESTION_PLACEHOLDER));
        assert!(template.system.contains(DATA_DESC_PLACEHOLDER));
        assert!(template.system.contains(SCRATCH_PLACEHOLDER));
        assert!(!template.human.is_empty());
    }

    #[test]
    fn test_render_base_substitutes_all_but_scratch() {
        let template = PromptTemplate::default();
        let base = template.render_base("toolA(...)", "how many cities?", "Table: x.csv");
        assert!(base.contains("toolA(...)"));
        assert!(base.contains("how many cities?"));
        assert!(base.contains("Table: x.csv"));
        assert!(base.contains(SCRATCH_PLACEHOLDER));
    }

    #[test]
    fn test_compose_substitutes_scratchpad() {
        let template = PromptTemplate::default();
        let base = template.render_base("", "q", "");
        let prompt = template.compose(&base, "\nThought: t\n");
        assert!(prompt.contains("Thought: t"));
        assert!(!prompt.contains(SCRATCH_PLACEHOLDER));
    }

    #[test]
    fn test_load_from_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(PromptTemplate::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("system_prompt.txt"), "S {question} [agent_scratch]")
            .unwrap();
        std::fs::write(dir.path().join("human_prompt.txt"), "H").unwrap();

        let template = PromptTemplate::load(Some(dir.path())).unwrap();
        assert_eq!(template.human(), "H");
        assert!(template.render_base("", "q", "").starts_with("S q"));
    }
}
