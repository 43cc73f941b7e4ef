//! Retrieval tool
//!
//! Exposes the corpus searcher to the reasoning model under the fixed
//! `retrieve_context` name: a list of query strings in, a list of ranked
//! context strings out.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::ToolError;
use crate::retrieval::Searcher;
use crate::tools::registry::{Tool, ToolDescriptor, ToolParameter};

/// Tool that answers similarity queries against the ingested corpus
pub struct RetrieveContextTool {
    searcher: Arc<Searcher>,
}

impl RetrieveContextTool {
    /// Create the tool over a shared searcher
    pub fn new(searcher: Arc<Searcher>) -> Self {
        Self { searcher }
    }
}

#[async_trait]
impl Tool for RetrieveContextTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "retrieve_context",
            vec![ToolParameter::new(
                "query",
                "list",
                "List of questions to answer from the local knowledge base",
            )],
            "list",
            "Prefer this over general knowledge when the question concerns the \
             uploaded tables: retrieves the most similar table rows for each query",
        )
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let queries = parse_queries(args.get("query"))?;
        let contexts = self.searcher.query_batch(&queries).await;
        Ok(Value::Array(contexts.into_iter().map(Value::from).collect()))
    }
}

/// Accept a list of strings or a single bare string
fn parse_queries(value: Option<&Value>) -> std::result::Result<Vec<String>, ToolError> {
    match value {
        Some(Value::Array(items)) => {
            let queries: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect();
            if queries.is_empty() {
                Err(ToolError::Execution(
                    "query list contained no strings".to_string(),
                ))
            } else {
                Ok(queries)
            }
        }
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        _ => Err(ToolError::Execution(
            "missing required argument: query".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_queries_list() {
        let value = json!(["a", "b"]);
        assert_eq!(parse_queries(Some(&value)).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_queries_bare_string() {
        let value = json!("single");
        assert_eq!(parse_queries(Some(&value)).unwrap(), vec!["single"]);
    }

    #[test]
    fn test_parse_queries_missing() {
        assert!(parse_queries(None).is_err());
        assert!(parse_queries(Some(&json!(42))).is_err());
        assert!(parse_queries(Some(&json!([1, 2]))).is_err());
    }
}
