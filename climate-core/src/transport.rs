use std::fmt::Debug;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Request, StatusCode};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// HTTP-executing capability injected into the client.
///
/// Implementations only report transport-level failures as errors; any
/// response that arrives, whatever its status, is returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: Request) -> anyhow::Result<HttpResponse>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: Request) -> anyhow::Result<HttpResponse> {
        let url = request.url().clone();

        let res = self
            .execute(request)
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        Ok(HttpResponse { status, body })
    }
}

/// Shortens a response body for inclusion in error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
