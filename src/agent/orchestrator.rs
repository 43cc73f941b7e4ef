//! Agent orchestrator
//!
//! Main agent that drives the think-act-observe loop: compose the prompt,
//! call the reasoning model, parse its thought/action reply, dispatch the
//! action through the tool registry, feed the observation back, and stop
//! on the reserved Final Answer action or when the attempt budget runs out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::agent::prompt::PromptTemplate;
use crate::agent::scratchpad::{Scratchpad, ScratchpadEntry};
use crate::core::{Config, ModelReply, Result, RunOutcome};
use crate::llm::ModelProvider;
use crate::tools::ToolRegistry;

/// Everything one finished run leaves behind
#[derive(Debug)]
pub struct RunReport {
    /// Terminal outcome: an answer or exhaustion
    pub outcome: RunOutcome,
    /// Reasoning attempts consumed
    pub attempts: usize,
    /// The run's full thought/action/observation history
    pub scratchpad: Scratchpad,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Main agent that orchestrates the reasoning model and tools
pub struct Agent {
    /// Configuration
    config: Config,
    /// Reasoning-model client
    model: Arc<dyn ModelProvider>,
    /// Tool registry (shared, read-only after startup)
    tools: Arc<ToolRegistry>,
    /// Prompt templates
    template: PromptTemplate,
    /// Description of the ingested tables, inserted into every base prompt
    table_description: String,
}

impl Agent {
    /// Create an agent over a model provider and a built tool registry
    pub fn new(
        config: Config,
        model: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        table_description: impl Into<String>,
    ) -> Result<Self> {
        let template = PromptTemplate::load(config.agent.prompt_dir.as_deref())?;
        Ok(Self {
            config,
            model,
            tools,
            template,
            table_description: table_description.into(),
        })
    }

    /// Run the reasoning loop for one question.
    ///
    /// Each run owns a fresh scratchpad; entries accumulate across attempts
    /// and are never reset mid-run. Model failures, per-attempt timeouts,
    /// and unparsable replies consume an attempt without aborting the run.
    /// The loop is bounded: at most `max_attempts` reasoning rounds.
    pub async fn execute(&self, query: &str) -> RunReport {
        let base = self
            .template
            .render_base(&self.tools.catalog(), query, &self.table_description);
        let attempt_deadline = Duration::from_secs(self.config.agent.attempt_timeout_secs);
        let max_attempts = self.config.agent.max_attempts;

        let mut scratchpad = Scratchpad::new();
        let start = Instant::now();

        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, "starting reasoning round");

            let prompt = self.template.compose(&base, &scratchpad.render());

            let call_start = Instant::now();
            let response = timeout(
                attempt_deadline,
                self.model.complete(&prompt, self.template.human()),
            )
            .await;
            info!(
                attempt,
                elapsed_ms = call_start.elapsed().as_millis() as u64,
                "model call finished"
            );

            let raw = match response {
                Err(_) => {
                    warn!(attempt, "reasoning call exceeded the attempt deadline");
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(attempt, error = %e, "model call failed");
                    continue;
                }
                Ok(Ok(raw)) => raw,
            };

            let Some(reply) = ModelReply::parse(&raw) else {
                warn!(attempt, "model response was not a valid thought/action reply");
                continue;
            };

            if reply.action.is_final() {
                let answer = reply.action.get_string("answer").unwrap_or_default();
                scratchpad.push_final(&reply.thoughts, &answer);
                info!(
                    attempt,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "final answer produced"
                );
                return RunReport {
                    outcome: RunOutcome::Answer(answer),
                    attempts: attempt,
                    scratchpad,
                    elapsed: start.elapsed(),
                };
            }

            let observation = match self
                .tools
                .dispatch(&reply.action.name, &reply.action.args)
                .await
            {
                Ok(value) => render_observation(&value),
                Err(e) => e.to_string(),
            };
            info!(attempt, tool = %reply.action.name, "action dispatched");

            scratchpad.push(ScratchpadEntry {
                thought: reply.thoughts,
                action: reply.action,
                observation,
            });
        }

        error!(
            attempts = max_attempts,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "run exhausted without a final answer"
        );
        RunReport {
            outcome: RunOutcome::Exhausted,
            attempts: max_attempts,
            scratchpad,
            elapsed: start.elapsed(),
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the shared tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// The table description fed into every prompt
    pub fn table_description(&self) -> &str {
        &self.table_description
    }
}

/// Render a dispatched tool's JSON result as an observation string
fn render_observation(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
