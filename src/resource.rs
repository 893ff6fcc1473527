//! Mock protected resource.
//!
//! Stands in for the downstream service the agent acts against. It
//! authorizes each request on its own, keyed on the bearer token it
//! receives and the requested region — it knows nothing about the
//! agent's execution context. In a real deployment this would be a
//! separate service; here it can be mounted under `/mock`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::parse_bearer;

/// Per-token entitlements: display name plus region → data rows.
pub struct SalesDirectory {
    accounts: HashMap<String, Account>,
}

struct Account {
    display_name: String,
    regions: HashMap<String, Vec<String>>,
}

impl SalesDirectory {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Adds a token entitled to one region's rows.
    pub fn entitle(
        &mut self,
        token: &str,
        display_name: &str,
        region: &str,
        rows: Vec<String>,
    ) {
        let account = self
            .accounts
            .entry(token.to_string())
            .or_insert_with(|| Account {
                display_name: display_name.to_string(),
                regions: HashMap::new(),
            });
        account.regions.insert(region.to_string(), rows);
    }

    /// Demo directory: User A may read US data, User B may read EU data.
    pub fn demo() -> Self {
        let mut dir = Self::new();
        dir.entitle(
            "user_a_token",
            "User A",
            "US",
            vec!["Sales A1".to_string(), "Sales A2".to_string()],
        );
        dir.entitle(
            "user_b_token",
            "User B",
            "EU",
            vec!["Sales B1".to_string(), "Sales B2".to_string()],
        );
        dir
    }
}

impl Default for SalesDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct SalesQuery {
    region: String,
}

/// Router serving `GET /sales/data?region=R`.
pub fn router(directory: Arc<SalesDirectory>) -> Router {
    Router::new()
        .route("/sales/data", get(sales_data))
        .with_state(directory)
}

async fn sales_data(
    State(directory): State<Arc<SalesDirectory>>,
    Query(query): Query<SalesQuery>,
    headers: HeaderMap,
) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_bearer(Some(v)));

    let Some(token) = token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "missing or malformed bearer token"})),
        )
            .into_response();
    };

    let Some(account) = directory.accounts.get(token.as_str()) else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "invalid or unauthorized token"})),
        )
            .into_response();
    };

    match account.regions.get(&query.region) {
        Some(rows) => {
            info!(
                "Sales data for region {} served to {}",
                query.region, account.display_name
            );
            Json(json!({
                "data": rows,
                "region": query.region,
                "authorized_as": account.display_name,
            }))
            .into_response()
        }
        None => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "detail": format!(
                    "{} is not authorized for region {}",
                    account.display_name, query.region
                )
            })),
        )
            .into_response(),
    }
}
