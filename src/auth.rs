//! Identity binder — the edge component.
//!
//! Parses the inbound `Authorization: Bearer <token>` header once per
//! request and establishes the token as the active identity for that
//! request's execution unit. A missing or malformed header yields "no
//! identity" rather than an error; endpoints that require
//! authentication enforce it themselves.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::context::{self, Identity};

/// Parses a `Bearer <token>` header value into an identity.
///
/// The scheme is matched case-insensitively and the value must be
/// exactly two whitespace-separated parts. Anything else — absent
/// header, extra parts, another scheme — is "no identity".
pub fn parse_bearer(header: Option<&str>) -> Option<Identity> {
    let header = header?;
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(Identity::new(token))
}

/// Axum middleware that binds the caller's identity for the lifetime
/// of the request.
///
/// The whole downstream processing — handler, agent loop, tool calls —
/// runs inside the context scope, so the binding is released on every
/// exit path, including client disconnects that cancel the future.
pub async fn bind_identity(request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match parse_bearer(header) {
        Some(identity) => {
            debug!("identity bound for request");
            context::bind(identity, next.run(request)).await
        }
        None => {
            debug!("no identity on request, proceeding unauthenticated");
            context::unauthenticated(next.run(request)).await
        }
    }
}
