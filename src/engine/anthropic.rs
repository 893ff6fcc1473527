//! Anthropic Messages API engine.
//!
//! Calls `POST https://api.anthropic.com/v1/messages` with the shared
//! message/tool types, which already follow the Anthropic block format
//! (`text`, `tool_use`, `tool_result`). Tool definitions are passed in
//! the `tools[]` array; a `tool_use` stop reason drives the agent loop.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LlmConfig;

use super::{
    ContentBlock, Decision, DecisionEngine, Message, StopReason, ToolCall, ToolDefinition,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ── Anthropic API types ──────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

// ── AnthropicEngine ──────────────────────────────────────

/// Decision engine backed by the Anthropic Messages API.
pub struct AnthropicEngine {
    client: Client,
    config: LlmConfig,
}

impl AnthropicEngine {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl DecisionEngine for AnthropicEngine {
    async fn decide(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Decision> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens_per_request,
            system: system_prompt,
            messages,
            tools: (!tools.is_empty()).then_some(tools),
        };

        debug!(
            "Calling Anthropic API ({}) with {} messages{}",
            self.config.model,
            messages.len(),
            if tools.is_empty() { "" } else { " + tools" }
        );

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error ({status}): {body}");
        }

        let resp: MessagesResponse = response.json().await?;
        Ok(decision_from_blocks(resp.content, resp.stop_reason))
    }

    fn description(&self) -> String {
        format!("{} ({})", self.config.provider, self.config.model)
    }
}

/// Normalizes Anthropic response blocks into a `Decision`.
fn decision_from_blocks(blocks: Vec<ContentBlock>, stop_reason: Option<String>) -> Decision {
    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in &blocks {
        match block {
            ContentBlock::Text { text } => text_parts.push(text.clone()),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
            // Responses never contain tool_result blocks.
            ContentBlock::ToolResult { .. } => {}
        }
    }

    let stop_reason = if !tool_calls.is_empty() {
        StopReason::ToolUse
    } else {
        match stop_reason.as_deref() {
            Some("end_turn") | None => StopReason::EndTurn,
            Some("max_tokens") => StopReason::MaxTokens,
            Some(other) => StopReason::Other(other.to_string()),
        }
    };

    info!(
        "Anthropic decision: {} tool call(s), stop reason {:?}",
        tool_calls.len(),
        stop_reason
    );

    Decision {
        text: text_parts.join("\n"),
        tool_calls,
        stop_reason,
        content_blocks: blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmConfig {
        LlmConfig {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5-20250929".to_string(),
            api_key: "test-key".to_string(),
            max_tokens_per_request: 1024,
        }
    }

    #[test]
    fn test_description() {
        let engine = AnthropicEngine::new(test_config());
        assert_eq!(
            engine.description(),
            "anthropic (claude-sonnet-4-5-20250929)"
        );
    }

    #[test]
    fn test_request_serialization_with_tools() {
        let tools = vec![ToolDefinition {
            name: "fetch_sales_data".to_string(),
            description: "Fetch sales data".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
        }];
        let messages = vec![Message::user("Show me US sales")];
        let request = MessagesRequest {
            model: "claude-sonnet-4-5-20250929",
            max_tokens: 1024,
            system: "You are an assistant.",
            messages: &messages,
            tools: Some(&tools),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(json["messages"][0]["content"], "Show me US sales");
        assert_eq!(json["tools"][0]["name"], "fetch_sales_data");
    }

    #[test]
    fn test_request_serialization_without_tools_omits_field() {
        let messages = vec![Message::user("Hello")];
        let request = MessagesRequest {
            model: "m",
            max_tokens: 100,
            system: "",
            messages: &messages,
            tools: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_response_parsing_text_only() {
        let json = r#"{
            "content": [{"type": "text", "text": "Hello!"}],
            "stop_reason": "end_turn"
        }"#;
        let resp: MessagesResponse = serde_json::from_str(json).unwrap();
        let decision = decision_from_blocks(resp.content, resp.stop_reason);
        assert_eq!(decision.text, "Hello!");
        assert!(decision.tool_calls.is_empty());
        assert_eq!(decision.stop_reason, StopReason::EndTurn);
    }

    #[test]
    fn test_response_parsing_with_tool_use() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_1", "name": "fetch_sales_data",
                 "input": {"region": "US"}}
            ],
            "stop_reason": "tool_use"
        }"#;
        let resp: MessagesResponse = serde_json::from_str(json).unwrap();
        let decision = decision_from_blocks(resp.content, resp.stop_reason);
        assert_eq!(decision.text, "Let me check.");
        assert_eq!(decision.tool_calls.len(), 1);
        assert_eq!(decision.tool_calls[0].name, "fetch_sales_data");
        assert_eq!(decision.tool_calls[0].input["region"], "US");
        assert_eq!(decision.stop_reason, StopReason::ToolUse);
        // Blocks are preserved for re-submission in the loop.
        assert_eq!(decision.content_blocks.len(), 2);
    }

    #[test]
    fn test_stop_reason_max_tokens() {
        let decision = decision_from_blocks(vec![], Some("max_tokens".to_string()));
        assert_eq!(decision.stop_reason, StopReason::MaxTokens);
    }

    #[test]
    fn test_stop_reason_unknown() {
        let decision = decision_from_blocks(vec![], Some("refusal".to_string()));
        assert_eq!(decision.stop_reason, StopReason::Other("refusal".to_string()));
    }
}
