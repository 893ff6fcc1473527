//! Decision-engine boundary.
//!
//! The decision engine chooses which tool to invoke and with what
//! arguments. It never receives the caller's identity: none of the
//! types in this module carry an identity field, and the trait
//! signature has no access to the execution context. Identity flows
//! exclusively through the trusted tool executor.

pub mod anthropic;
pub mod keyword;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use anthropic::AnthropicEngine;
pub use keyword::KeywordEngine;

/// A message in the conversation between caller and engine.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

impl Message {
    /// A plain-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// An assistant message made of content blocks (text + tool_use),
    /// re-submitted verbatim in the next loop iteration.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageContent::Blocks(blocks),
        }
    }

    /// A user message carrying tool results back to the engine.
    pub fn tool_results(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Blocks(blocks),
        }
    }
}

/// Message content: plain text or structured blocks.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A structured content block (Anthropic-style wire format).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

/// A tool invocation requested by the engine: name and argument
/// payload only, no identity.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// A tool advertised to the engine.
#[derive(Debug, Serialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Why the engine stopped producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other(String),
}

/// One decision step: final text and/or requested tool calls.
#[derive(Debug)]
pub struct Decision {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    /// Raw content blocks, re-submitted as the assistant turn when the
    /// loop continues.
    pub content_blocks: Vec<ContentBlock>,
}

/// Abstraction over decision engines (Anthropic, scripted, …).
///
/// Deliberately narrow: the engine sees the conversation and the tool
/// definitions, nothing else. In particular there is no way to hand it
/// the execution context or the bound identity.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Runs one decision step over the conversation.
    async fn decide(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Decision>;

    /// Human-readable description of the engine, e.g.
    /// `"anthropic (claude-sonnet-4-5-20250929)"`.
    fn description(&self) -> String;
}
