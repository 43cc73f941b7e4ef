//! Query decomposition tool
//!
//! Asks the reasoning model to break a report-style question into a small
//! set of analysis sub-questions grounded in the corpus description. The
//! sub-questions feed well into `retrieve_context` one at a time.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::ToolError;
use crate::llm::ModelProvider;
use crate::tools::registry::{Tool, ToolDescriptor, ToolParameter};

const SPLIT_PROMPT: &str = "\
Read the table names, headers, and key-column indicators, then produce 4-5 \
analysis sub-questions suitable for a data report. The first sub-question \
must summarize the overall data (trend, regional differences, indicator \
basics); the last must draw conclusions over the others and offer targeted \
recommendations. Each middle sub-question picks one angle: change over \
time, seasonality, periodicity, year-on-year or month-on-month growth, \
outliers (top or bottom ranks), share of a total, the same indicator across \
times, regions, or categories, or different indicators compared at one \
time and place. Fit the angles to the data actually present so every \
sub-question is answerable from it. Output only the questions.";

/// Tool that decomposes a question into sub-questions
pub struct SplitQueryTool {
    model: Arc<dyn ModelProvider>,
    data_description: String,
}

impl SplitQueryTool {
    /// Create the tool over a shared model provider and corpus description
    pub fn new(model: Arc<dyn ModelProvider>, data_description: impl Into<String>) -> Self {
        Self {
            model,
            data_description: data_description.into(),
        }
    }
}

#[async_trait]
impl Tool for SplitQueryTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "split_query",
            vec![ToolParameter::new(
                "query",
                "string",
                "The report-style question to decompose",
            )],
            "string",
            "Splits a broad report question into focused sub-questions based \
             on the uploaded tables",
        )
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::Execution("missing required argument: query".to_string()))?;

        let system = format!("{}\n\nQuestion: {}", SPLIT_PROMPT, query);
        let user = format!("The data is as follows:\n{}", self.data_description);

        let response = self
            .model
            .complete(&system, &user)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        Ok(Value::from(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Result;

    struct CannedModel;

    #[async_trait]
    impl ModelProvider for CannedModel {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            assert!(user.contains("Table: output.csv"));
            Ok("1. What is the overall trend?".to_string())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_split_query_passes_description() {
        let tool = SplitQueryTool::new(Arc::new(CannedModel), "Table: output.csv");
        let mut args = serde_json::Map::new();
        args.insert("query".to_string(), Value::from("write a report"));

        let result = tool.invoke(&args).await.unwrap();
        assert!(result.as_str().unwrap().contains("overall trend"));
    }

    #[tokio::test]
    async fn test_split_query_requires_query() {
        let tool = SplitQueryTool::new(Arc::new(CannedModel), "");
        let err = tool.invoke(&serde_json::Map::new()).await.unwrap_err();
        assert!(err.to_string().contains("query"));
    }
}
