mod auth;
mod config;
mod context;
mod engine;
mod error;
mod resource;
mod runtime;
mod server;
mod tools;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::engine::{AnthropicEngine, DecisionEngine, KeywordEngine};
use crate::resource::SalesDirectory;
use crate::runtime::AgentRuntime;
use crate::tools::{SalesDataTool, ToolExecutor, ToolRegistry};

fn print_help() {
    println!(
        "\
obo-agent v{}

An agent runtime that acts on behalf of the caller: the inbound
identity is bound to the request and re-asserted on every outbound
tool call. The decision engine never sees the credential.

USAGE:
    obo-agent [OPTIONS] [CONFIG_PATH]

ARGUMENTS:
    CONFIG_PATH    Path to TOML configuration file [default: config/agent.toml]

OPTIONS:
    -h, --help       Print this help message and exit
    -V, --version    Print version and exit

ENVIRONMENT VARIABLES:
    Variables are referenced in the config file via ${{VAR_NAME}} syntax.

    RUST_LOG              Log level filter for tracing
                          (e.g. debug, obo_agent=debug,warn)
    ANTHROPIC_API_KEY     API key for Anthropic Claude models
                          (required when llm.provider = \"anthropic\")

EXAMPLES:
    obo-agent                          # uses config/agent.toml
    obo-agent /etc/obo/agent.toml      # custom config path
    RUST_LOG=debug obo-agent           # with debug logging",
        env!("CARGO_PKG_VERSION"),
    );
}

/// Builds the decision engine selected by the config.
fn build_engine(config: &Config) -> Box<dyn DecisionEngine> {
    match config.llm.provider.as_str() {
        "keyword" => Box::new(KeywordEngine::demo()),
        // Config::load only admits "anthropic" and "keyword".
        _ => Box::new(AnthropicEngine::new(config.llm.clone())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --help / --version before anything else
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("obo-agent v{}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
    }

    // Initialize logging (RUST_LOG=debug for debug mode)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("obo_agent=info")),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    info!("Loading configuration from {config_path}");
    let config = Config::load(&config_path)?;

    let engine = build_engine(&config);
    info!("Agent: {}", config.agent.name);
    info!("Decision engine: {}", engine.description());
    info!("Step budget: {}", config.agent.max_steps);
    info!("Protected resource: {}", config.resource.base_url);

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SalesDataTool::new(&config.resource.base_url)));
    info!("Tools: {} registered", registry.len());

    let runtime = Arc::new(AgentRuntime::new(
        &config.agent,
        engine,
        ToolExecutor::new(registry),
    ));

    let mock_directory = config
        .resource
        .mount_mock
        .then(|| Arc::new(SalesDirectory::demo()));
    if mock_directory.is_some() {
        info!("Mock protected resource mounted at /mock");
    }

    let app = server::app(runtime, mock_directory);
    server::serve(&config.bind_addr(), app).await
}
