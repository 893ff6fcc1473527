//! Error taxonomy for tool execution and the agent loop.
//!
//! Tool errors are recoverable from the decision engine's point of
//! view: the runtime renders them into tool results and keeps going.
//! Agent errors terminate the request and are turned into structured
//! JSON at the HTTP boundary.

use thiserror::Error;

/// A single tool invocation failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The executor was invoked with no active identity binding.
    /// Fail closed: no outbound call was made.
    #[error("no identity bound for this request")]
    NoIdentityBound,

    /// The decision engine requested a tool that is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The tool arguments were missing or of the wrong shape.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The downstream resource rejected the asserted identity
    /// (401/403). Expected and reportable, not a fault.
    #[error("access denied by resource: {detail}")]
    AuthorizationDenied { detail: String },

    /// The downstream resource could not be reached at all.
    /// Kept distinct from a denial so "rejected" and "unreachable"
    /// are never conflated.
    #[error("resource unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The downstream resource answered with an unexpected status.
    #[error("resource returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
}

/// The agent loop failed as a whole.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The bounded tool-call loop exhausted its step budget.
    #[error("agent exceeded its step budget of {limit}")]
    StepLimitExceeded { limit: usize },

    /// The decision engine itself failed (API error, bad response).
    #[error("decision engine error: {0}")]
    Engine(anyhow::Error),
}
