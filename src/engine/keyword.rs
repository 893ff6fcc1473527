//! Deterministic keyword engine.
//!
//! Stands in for a real LLM in dev configs and tests: scans the user
//! message for a known region code and requests a single
//! `fetch_sales_data` call, then terminates with the tool result as
//! the final answer. Exercises exactly the same tool-call loop as the
//! Anthropic engine, without network access or API keys.

use anyhow::Result;
use async_trait::async_trait;

use super::{
    ContentBlock, Decision, DecisionEngine, Message, MessageContent, StopReason, ToolCall,
    ToolDefinition,
};

/// Tool the keyword engine knows how to request.
const SALES_TOOL: &str = "fetch_sales_data";

pub struct KeywordEngine {
    regions: Vec<String>,
}

impl KeywordEngine {
    /// Engine recognizing the given region codes as whole words.
    pub fn new(regions: Vec<String>) -> Self {
        Self { regions }
    }

    /// Demo engine recognizing the regions of the mock resource.
    pub fn demo() -> Self {
        Self::new(vec!["US".to_string(), "EU".to_string()])
    }

    fn region_in(&self, text: &str) -> Option<&str> {
        text.split(|c: char| !c.is_ascii_alphanumeric())
            .find_map(|word| {
                self.regions
                    .iter()
                    .find(|r| r.as_str() == word)
                    .map(String::as_str)
            })
    }
}

#[async_trait]
impl DecisionEngine for KeywordEngine {
    async fn decide(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<Decision> {
        // If a tool already ran, its result is the final answer.
        let mut results = Vec::new();
        for msg in messages {
            if let MessageContent::Blocks(blocks) = &msg.content {
                for block in blocks {
                    if let ContentBlock::ToolResult { content, .. } = block {
                        results.push(content.clone());
                    }
                }
            }
        }
        if !results.is_empty() {
            return Ok(Decision {
                text: results.join("\n"),
                tool_calls: vec![],
                stop_reason: StopReason::EndTurn,
                content_blocks: vec![],
            });
        }

        // Otherwise look for a region code in the user's text.
        let region = messages.iter().rev().find_map(|msg| match &msg.content {
            MessageContent::Text(text) => self.region_in(text),
            MessageContent::Blocks(_) => None,
        });

        match region {
            Some(region) => {
                let input = serde_json::json!({ "region": region });
                Ok(Decision {
                    text: String::new(),
                    tool_calls: vec![ToolCall {
                        id: "keyword_tool_0".to_string(),
                        name: SALES_TOOL.to_string(),
                        input: input.clone(),
                    }],
                    stop_reason: StopReason::ToolUse,
                    content_blocks: vec![ContentBlock::ToolUse {
                        id: "keyword_tool_0".to_string(),
                        name: SALES_TOOL.to_string(),
                        input,
                    }],
                })
            }
            None => Ok(Decision {
                text: "I don't know which region to query.".to_string(),
                tool_calls: vec![],
                stop_reason: StopReason::EndTurn,
                content_blocks: vec![],
            }),
        }
    }

    fn description(&self) -> String {
        format!("keyword ({})", self.regions.join(", "))
    }
}
