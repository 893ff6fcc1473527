//! Sales-data tool — outbound call to the protected resource.
//!
//! Calls `GET {base_url}/sales/data?region=R` with the bound identity
//! re-asserted as a bearer credential. The downstream resource makes
//! its own authorization decision; a 401/403 comes back as a
//! structured denial, a connection failure as a transport fault.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::context::Identity;
use crate::error::ToolError;

use super::Tool;

pub struct SalesDataTool {
    client: Client,
    base_url: String,
}

impl SalesDataTool {
    /// Tool targeting the resource at `base_url` (no trailing slash).
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Tool for SalesDataTool {
    fn name(&self) -> &str {
        "fetch_sales_data"
    }

    fn description(&self) -> &str {
        "Fetches sales data for a region from the protected sales resource. \
         Access is decided by the resource based on who is asking."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "region": {
                    "type": "string",
                    "description": "Region code, e.g. \"US\" or \"EU\""
                }
            },
            "required": ["region"]
        })
    }

    async fn call(
        &self,
        params: serde_json::Value,
        identity: &Identity,
    ) -> Result<String, ToolError> {
        let region = params
            .get("region")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing \"region\"".to_string()))?;

        let url = format!("{}/sales/data", self.base_url);
        debug!("Fetching sales data for region {region}");

        // The identity read from the execution context is stamped on
        // the outbound call here. The decision engine never sees it.
        let response = self
            .client
            .get(&url)
            .query(&[("region", region)])
            .bearer_auth(identity.as_str())
            .send()
            .await
            .map_err(ToolError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ToolError::Transport)?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Resource denied access for region {region}");
                Err(ToolError::AuthorizationDenied { detail: body })
            }
            s => Err(ToolError::Upstream {
                status: s.as_u16(),
                detail: body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{self, SalesDirectory};
    use std::sync::Arc;

    /// Serves the mock resource on an ephemeral port and returns its
    /// base URL.
    async fn spawn_mock_resource() -> String {
        let app = resource::router(Arc::new(SalesDirectory::demo()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_entitled_region_returns_data() {
        let base_url = spawn_mock_resource().await;
        let tool = SalesDataTool::new(&base_url);
        let body = tool
            .call(
                serde_json::json!({"region": "US"}),
                &Identity::new("user_a_token"),
            )
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["region"], "US");
        assert_eq!(json["data"][0], "Sales A1");
    }

    #[tokio::test]
    async fn test_unentitled_region_is_a_denial() {
        let base_url = spawn_mock_resource().await;
        let tool = SalesDataTool::new(&base_url);
        let err = tool
            .call(
                serde_json::json!({"region": "EU"}),
                &Identity::new("user_a_token"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::AuthorizationDenied { .. }));
    }

    #[tokio::test]
    async fn test_unknown_token_is_a_denial() {
        let base_url = spawn_mock_resource().await;
        let tool = SalesDataTool::new(&base_url);
        let err = tool
            .call(
                serde_json::json!({"region": "US"}),
                &Identity::new("stranger"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::AuthorizationDenied { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_resource_is_a_transport_fault() {
        // Port 9 (discard) is not listening.
        let tool = SalesDataTool::new("http://127.0.0.1:9");
        let err = tool
            .call(
                serde_json::json!({"region": "US"}),
                &Identity::new("user_a_token"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Transport(_)));
    }

    #[tokio::test]
    async fn test_missing_region_argument() {
        let tool = SalesDataTool::new("http://127.0.0.1:9");
        let err = tool
            .call(serde_json::json!({}), &Identity::new("user_a_token"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let tool = SalesDataTool::new("http://localhost:8080/mock/");
        assert_eq!(tool.base_url, "http://localhost:8080/mock");
    }
}
