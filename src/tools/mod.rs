//! Tools module - callable capabilities for the agent
//!
//! Contains the registry plus the built-in retrieval, query-splitting, and
//! arithmetic tools.

pub mod math;
pub mod registry;
pub mod retriever;
pub mod splitter;

use std::sync::Arc;

use crate::core::ToolError;
use crate::llm::ModelProvider;
use crate::retrieval::Searcher;

pub use math::{AddTool, ExponentialTool, MultiplyTool};
pub use registry::{Tool, ToolDescriptor, ToolParameter, ToolRegistry};
pub use retriever::RetrieveContextTool;
pub use splitter::SplitQueryTool;

/// Build the default registry: retrieval first, then query splitting, then
/// the arithmetic helpers. Registration order is catalog order.
pub fn default_registry(
    searcher: Arc<Searcher>,
    model: Arc<dyn ModelProvider>,
    data_description: impl Into<String>,
) -> std::result::Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(RetrieveContextTool::new(searcher)))?;
    registry.register(Arc::new(SplitQueryTool::new(model, data_description)))?;
    registry.register(Arc::new(MultiplyTool))?;
    registry.register(Arc::new(AddTool))?;
    registry.register(Arc::new(ExponentialTool))?;
    Ok(registry)
}
