use std::time::Duration;

use reqwest::{
    Method, Request,
    header::{ACCEPT, HeaderValue},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::{ParseError, Url};

use crate::error::ClimateError;

/// Per-call cancellation and deadline.
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A fully qualified GET request bound to the context it was built for.
#[derive(Debug)]
pub struct GetRequest {
    pub request: Request,
    pub context: CallContext,
}

impl GetRequest {
    pub fn url(&self) -> &Url {
        self.request.url()
    }
}

/// Builds a GET request for `path_or_url`.
///
/// Input with both a scheme and a host is used verbatim; anything else is
/// appended to `base_url` with exactly one `/` between them. No I/O happens.
pub fn build_request(
    ctx: &CallContext,
    base_url: &str,
    path_or_url: &str,
) -> Result<GetRequest, ClimateError> {
    let url = resolve_url(base_url, path_or_url)?;
    debug!(%url, "built climate request");

    let mut request = Request::new(Method::GET, url);
    request.headers_mut().insert(ACCEPT, HeaderValue::from_static("application/xml"));
    *request.timeout_mut() = ctx.timeout();

    Ok(GetRequest { request, context: ctx.clone() })
}

fn resolve_url(base_url: &str, path_or_url: &str) -> Result<Url, ClimateError> {
    if let Some(reason) = malformed_escape(path_or_url) {
        return Err(invalid(path_or_url, reason));
    }

    match Url::parse(path_or_url) {
        Ok(url) if url.host().is_some() => Ok(url),
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            let joined = format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path_or_url.trim_start_matches('/')
            );
            Url::parse(&joined).map_err(|e| invalid(&joined, e.to_string()))
        }
        Err(e) => Err(invalid(path_or_url, e.to_string())),
    }
}

fn malformed_escape(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        let well_formed = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        (b == b'%' && !well_formed).then(|| format!("malformed percent escape at byte {i}"))
    })
}

fn invalid(input: &str, reason: impl Into<String>) -> ClimateError {
    ClimateError::InvalidUrl { input: input.to_string(), reason: reason.into() }
}
