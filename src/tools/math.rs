//! Arithmetic tools
//!
//! Small numeric helpers the reasoning model can call instead of doing
//! arithmetic in-context.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::ToolError;
use crate::tools::registry::{Tool, ToolDescriptor, ToolParameter};

/// Extract a required numeric argument
fn require_number(
    args: &serde_json::Map<String, Value>,
    key: &str,
) -> std::result::Result<f64, ToolError> {
    args.get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| ToolError::Execution(format!("missing numeric argument: {}", key)))
}

/// Tool that adds two numbers
pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "add",
            vec![
                ToolParameter::new("a", "number", "First addend"),
                ToolParameter::new("b", "number", "Second addend"),
            ],
            "number",
            "Returns the sum of two numbers",
        )
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let a = require_number(args, "a")?;
        let b = require_number(args, "b")?;
        Ok(Value::from(a + b))
    }
}

/// Tool that multiplies two numbers
pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "multiply",
            vec![
                ToolParameter::new("a", "number", "First factor"),
                ToolParameter::new("b", "number", "Second factor"),
            ],
            "number",
            "Returns the product of two numbers",
        )
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let a = require_number(args, "a")?;
        let b = require_number(args, "b")?;
        Ok(Value::from(a * b))
    }
}

/// Tool that raises a base to an exponent
pub struct ExponentialTool;

#[async_trait]
impl Tool for ExponentialTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "exponential",
            vec![
                ToolParameter::new("base", "number", "Base value"),
                ToolParameter::new("exponent", "number", "Exponent to raise the base to"),
            ],
            "number",
            "Returns base raised to the given exponent",
        )
    }

    async fn invoke(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let base = require_number(args, "base")?;
        let exponent = require_number(args, "exponent")?;
        Ok(Value::from(base.powf(exponent)))
    }
}
