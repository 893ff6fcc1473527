//! Trusted tool executor.
//!
//! The only component that reads the bound identity. Every execution
//! starts with the fail-closed check: no binding, no outbound call.
//! The identity read from the context is passed to the tool unchanged;
//! the executor never substitutes, elevates, or combines identities.

use tracing::{info, warn};

use crate::context;
use crate::engine::{ToolCall, ToolDefinition};
use crate::error::ToolError;

use super::ToolRegistry;

pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Definitions of the registered tools, for the decision engine.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Executes one tool call requested by the decision engine.
    ///
    /// Reads the calling unit's identity binding first; if absent the
    /// call is refused before any tool code runs.
    pub async fn execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        let Some(identity) = context::current() else {
            warn!("Tool {} blocked: no identity bound", call.name);
            return Err(ToolError::NoIdentityBound);
        };

        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

        info!("Executing tool {} on behalf of the caller", call.name);
        tool.call(call.input.clone(), &identity).await
    }
}
