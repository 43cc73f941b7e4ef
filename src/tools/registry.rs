//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing action requests to handlers.
//! Registration is an explicit table: every tool supplies a structured
//! descriptor up front, and the rendered catalog text is part of the wire
//! contract with the reasoning model - its formatting must stay stable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::ToolError;

/// One declared parameter of a tool
#[derive(Debug, Clone)]
pub struct ToolParameter {
    /// Parameter name as the model must spell it
    pub name: String,
    /// Loose type tag shown to the model (e.g. "number", "list", "string")
    pub ty: String,
    /// Short human-readable purpose
    pub description: String,
}

impl ToolParameter {
    /// Create a new parameter
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            description: description.into(),
        }
    }

    /// Display name: underscores to spaces, each word title-cased
    fn display_name(&self) -> String {
        self.name
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Immutable description of a callable tool
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Declared parameters, in signature order
    pub parameters: Vec<ToolParameter>,
    /// Loose return type tag
    pub return_type: String,
    /// What the tool does, phrased for the model
    pub description: String,
}

impl ToolDescriptor {
    /// Create a new descriptor
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ToolParameter>,
        return_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type: return_type.into(),
            description: description.into(),
        }
    }

    /// Render the single catalog line for this tool.
    ///
    /// Format: `name(arg: type, ...) -> ret - description, args: {arg: {name: "Arg", type: "type"}}`
    pub fn render(&self) -> String {
        let signature = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(", ");

        let args_info = self
            .parameters
            .iter()
            .map(|p| {
                format!(
                    "{}: {{name: \"{}\", type: \"{}\"}}",
                    p.name,
                    p.display_name(),
                    p.ty
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{}({}) -> {} - {}, args: {{{}}}",
            self.name, signature, self.return_type, self.description, args_info
        )
    }
}

/// A callable capability the reasoning model can select
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's structured descriptor
    fn descriptor(&self) -> ToolDescriptor;

    /// Invoke the tool with the model-supplied argument map
    async fn invoke(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError>;
}

/// Registry of available tools
///
/// Built once at startup, read-only afterwards. Holds each tool's
/// descriptor next to its callable, in registration order.
pub struct ToolRegistry {
    /// (descriptor, callable) pairs in registration order
    tools: Vec<(ToolDescriptor, Arc<dyn Tool>)>,
    /// Tool name to position in `tools`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool, rejecting duplicate names
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<(), ToolError> {
        let descriptor = tool.descriptor();
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateName(descriptor.name));
        }
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push((descriptor, tool));
        Ok(())
    }

    /// Register a batch of tools in order
    pub fn register_all(
        &mut self,
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> std::result::Result<(), ToolError> {
        for tool in tools {
            self.register(tool)?;
        }
        Ok(())
    }

    /// Render the full catalog text, one line per tool, registration order.
    ///
    /// Inserted verbatim into the reasoning prompt.
    pub fn catalog(&self) -> String {
        self.tools
            .iter()
            .map(|(descriptor, _)| descriptor.render())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Dispatch an action by name.
    ///
    /// Failures come back as uniform [`ToolError`] values; the underlying
    /// tool's own error type never escapes.
    pub async fn dispatch(
        &self,
        name: &str,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let position = self
            .index
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let (_, tool) = &self.tools[*position];
        tool.invoke(args)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))
    }

    /// Whether a tool name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(
                "echo",
                vec![ToolParameter::new("text", "string", "Text to echo back")],
                "string",
                "Returns its input unchanged",
            )
        }

        async fn invoke(
            &self,
            args: &serde_json::Map<String, Value>,
        ) -> std::result::Result<Value, ToolError> {
            Ok(args.get("text").cloned().unwrap_or(Value::Null))
        }
    }

    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("fail", vec![], "none", "Always fails")
        }

        async fn invoke(
            &self,
            _args: &serde_json::Map<String, Value>,
        ) -> std::result::Result<Value, ToolError> {
            Err(ToolError::Execution("boom".to_string()))
        }
    }

    fn args(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        let err = registry.register(Arc::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(name) if name == "echo"));
    }

    #[test]
    fn test_catalog_format_and_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailTool)).unwrap();
        registry.register(Arc::new(EchoTool)).unwrap();

        let catalog = registry.catalog();
        let lines: Vec<&str> = catalog.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("fail() -> none - Always fails"));
        assert_eq!(
            lines[1],
            "echo(text: string) -> string - Returns its input unchanged, \
             args: {text: {name: \"Text\", type: \"string\"}}"
        );
    }

    #[test]
    fn test_multi_word_display_name() {
        let param = ToolParameter::new("chunk_nums", "number", "");
        assert_eq!(param.display_name(), "Chunk Nums");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.dispatch("missing", &args(json!({}))).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "missing"));
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        let result = registry
            .dispatch("echo", &args(json!({"text": "hi"})))
            .await
            .unwrap();
        assert_eq!(result, json!("hi"));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_uniform() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailTool)).unwrap();
        let err = registry.dispatch("fail", &args(json!({}))).await.unwrap_err();
        assert!(matches!(err, ToolError::Execution(msg) if msg == "boom"));
    }
}
