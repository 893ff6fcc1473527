//! Tools and the trusted executor.
//!
//! A tool performs an outbound call to a protected resource on behalf
//! of the caller. The decision engine only ever sees tool names and
//! argument schemas; the bound identity reaches a tool exclusively
//! through [`executor::ToolExecutor`].

pub mod executor;
pub mod sales;

use async_trait::async_trait;

use crate::context::Identity;
use crate::engine::ToolDefinition;
use crate::error::ToolError;

pub use executor::ToolExecutor;
pub use sales::SalesDataTool;

/// A tool invocable by the decision engine through the executor.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique identifier used in the engine's tool definitions.
    /// Lowercase alphanumeric + underscores (e.g. "fetch_sales_data").
    fn name(&self) -> &str;

    /// Human-readable description shown to the engine so it knows
    /// when to invoke this tool.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters this tool accepts.
    /// Identity is never part of the schema.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Performs the outbound call, asserting `identity` on it.
    ///
    /// Only the executor can supply `identity` — it is read from the
    /// execution context after the fail-closed check.
    async fn call(
        &self,
        params: serde_json::Value,
        identity: &Identity,
    ) -> Result<String, ToolError>;
}

/// Registry of the tools exposed to the decision engine.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions advertised to the decision engine: name,
    /// description, and parameter schema — nothing more.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.parameters_schema(),
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Test tool that echoes the identity it was handed, so tests can
    /// verify exactly which identity the executor asserted.
    pub struct EchoIdentityTool;

    #[async_trait]
    impl Tool for EchoIdentityTool {
        fn name(&self) -> &str {
            "echo_identity"
        }

        fn description(&self) -> &str {
            "Echoes the asserted identity (test only)"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn call(
            &self,
            _params: serde_json::Value,
            identity: &Identity,
        ) -> Result<String, ToolError> {
            Ok(format!("asserted:{}", identity.as_str()))
        }
    }
}
