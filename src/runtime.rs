//! The agent loop — bounded multi-step tool calling.
//!
//! Drives the decision engine: each step either produces a final
//! answer or requests tool calls, which are run through the trusted
//! executor and fed back as tool results. The loop is capped by the
//! configured step budget; exhausting it is a terminal error.

use futures::future::join_all;
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::engine::{ContentBlock, DecisionEngine, Message, ToolCall};
use crate::error::AgentError;
use crate::tools::ToolExecutor;

pub struct AgentRuntime {
    agent_name: String,
    max_steps: usize,
    engine: Box<dyn DecisionEngine>,
    executor: ToolExecutor,
}

impl AgentRuntime {
    pub fn new(config: &AgentConfig, engine: Box<dyn DecisionEngine>, executor: ToolExecutor) -> Self {
        Self {
            agent_name: config.name.clone(),
            max_steps: config.max_steps,
            engine,
            executor,
        }
    }

    /// Processes one user message and produces the final response.
    ///
    /// Runs within the caller's execution unit, so every tool call the
    /// engine requests sees this request's identity binding — including
    /// calls dispatched concurrently, which are joined on the same task.
    pub async fn handle_message(&self, body: &str) -> Result<String, AgentError> {
        let tools = self.executor.definitions();
        let system_prompt = self.build_system_prompt();
        let mut messages = vec![Message::user(body)];

        for step in 0..self.max_steps {
            let decision = self
                .engine
                .decide(&system_prompt, &messages, &tools)
                .await
                .map_err(AgentError::Engine)?;

            if decision.tool_calls.is_empty() {
                info!(
                    "Agent finished after {} step(s): {} chars",
                    step + 1,
                    decision.text.len()
                );
                return Ok(decision.text);
            }

            info!(
                "Step {}: engine requested {} tool call(s)",
                step + 1,
                decision.tool_calls.len()
            );

            messages.push(Message::assistant_blocks(decision.content_blocks));

            let outcomes = join_all(
                decision
                    .tool_calls
                    .iter()
                    .map(|call| self.run_tool(call)),
            )
            .await;
            messages.push(Message::tool_results(outcomes));
        }

        warn!("Agent exhausted its step budget of {}", self.max_steps);
        Err(AgentError::StepLimitExceeded {
            limit: self.max_steps,
        })
    }

    /// Runs one tool call and renders the outcome as a tool result.
    ///
    /// Tool errors — denial, no binding, transport — are recoverable
    /// from the engine's point of view: they come back as structured
    /// error text, never as a crash of the unit.
    async fn run_tool(&self, call: &ToolCall) -> ContentBlock {
        let content = match self.executor.execute(call).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {e}", call.name);
                format!("Error: {e}")
            }
        };
        ContentBlock::ToolResult {
            tool_use_id: call.id.clone(),
            content,
        }
    }

    fn build_system_prompt(&self) -> String {
        format!(
            "You are {}, an assistant that acts strictly on behalf of the \
             current caller.\n\
             Rules:\n\
             - Use the available tools to answer questions about protected data\n\
             - If a tool reports an access denial, tell the user they are not \
               authorized; never retry on someone else's behalf\n\
             - Respond concisely",
            self.agent_name
        )
    }
}
