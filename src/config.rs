use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub resource: ResourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// "anthropic" or "keyword" (deterministic planner for dev/tests)
    pub provider: String,
    #[serde(default)]
    pub model: String,
    /// Supports ${ENV_VAR} substitution
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens_per_request: u32,
}

fn default_max_tokens() -> u32 {
    1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    /// Step budget for the tool-call loop; exhausting it is a
    /// terminal error, never a silent truncation.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResourceConfig {
    /// Base URL of the protected resource the sales tool calls.
    #[serde(default = "default_resource_base_url")]
    pub base_url: String,
    /// Mount the built-in mock resource under /mock on this server.
    #[serde(default = "default_mount_mock")]
    pub mount_mock: bool,
}

fn default_resource_base_url() -> String {
    "http://127.0.0.1:8080/mock".to_string()
}

fn default_mount_mock() -> bool {
    true
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        // Expand environment variables like ${ANTHROPIC_API_KEY}
        let expanded = shellexpand::env(&content)?;
        let config: Config = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.resource.base_url)
            .map_err(|e| anyhow::anyhow!("invalid resource.base_url: {e}"))?;
        if self.agent.max_steps == 0 {
            anyhow::bail!("agent.max_steps must be at least 1");
        }
        match self.llm.provider.as_str() {
            "anthropic" | "keyword" => Ok(()),
            other => anyhow::bail!("unknown llm provider: {other}"),
        }
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
        [server]

        [llm]
        provider = "keyword"

        [agent]
        name = "OBO Agent"

        [resource]
    "#;

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.resource.base_url, "http://127.0.0.1:8080/mock");
        assert!(config.resource.mount_mock);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("OBO_TEST_API_KEY", "sk-test-123");
        let file = write_config(
            r#"
            [server]

            [llm]
            provider = "anthropic"
            model = "claude-sonnet-4-5-20250929"
            api_key = "${OBO_TEST_API_KEY}"

            [agent]
            name = "OBO Agent"

            [resource]
        "#,
        );
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.llm.api_key, "sk-test-123");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let file = write_config(
            r#"
            [server]

            [llm]
            provider = "keyword"

            [agent]
            name = "OBO Agent"

            [resource]
            base_url = "not a url"
        "#,
        );
        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("resource.base_url"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config(
            r#"
            [server]

            [llm]
            provider = "gemini"

            [agent]
            name = "OBO Agent"

            [resource]
        "#,
        );
        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown llm provider"));
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let file = write_config(
            r#"
            [server]

            [llm]
            provider = "keyword"

            [agent]
            name = "OBO Agent"
            max_steps = 0

            [resource]
        "#,
        );
        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    }
}
