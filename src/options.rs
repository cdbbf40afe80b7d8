//! Instance and per-request option records, and the request-options
//! normalizer that lowers the `json` / `query_string` shorthands into
//! standard request fields

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

use crate::error::Error;
use crate::headers::HeaderSource;
use crate::hooks::{AfterResponseHook, BeforeRequestHook};

/// Configuration captured once at instance construction
///
/// The instance owns these options for its entire lifetime and never
/// mutates them; hooks are held by reference and invoked once per call.
#[derive(Default)]
pub struct InstanceOptions {
    /// Base URL prepended to non-absolute request URLs
    pub prefix_url: Option<String>,
    /// Bearer credential, injected as `Authorization: Bearer <token>`
    /// unless the caller supplies its own `Authorization` header
    pub jwt_token: Option<String>,
    /// Default headers merged into every request at lowest precedence
    pub headers: Option<HeaderSource>,
    /// Invoked with the resolved URL and request parts before dispatch
    pub before_request_hook: Option<Arc<dyn BeforeRequestHook>>,
    /// Invoked with the response after dispatch
    pub after_response_hook: Option<Arc<dyn AfterResponseHook>>,
}

impl fmt::Debug for InstanceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceOptions")
            .field("prefix_url", &self.prefix_url)
            .field("jwt_token", &self.jwt_token.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers)
            .field("before_request_hook", &self.before_request_hook.is_some())
            .field("after_response_hook", &self.after_response_hook.is_some())
            .finish()
    }
}

/// Per-call request options: the standard request-init fields plus the
/// `json` and `query_string` shorthands
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method; defaults to GET, overridden by the verb shorthands
    pub method: Option<Method>,
    /// Headers for this call, merged at highest precedence
    pub headers: Option<HeaderSource>,
    /// Preset request body; mutually exclusive with `json`
    pub body: Option<Vec<u8>>,
    /// JSON shorthand: serialized into the body, implying
    /// `Content-Type: application/json` unless the caller sets one
    pub json: Option<serde_json::Value>,
    /// Query-string shorthand: percent-encoded and appended to the URL in
    /// iteration order
    pub query_string: Option<Vec<(String, String)>>,
    /// Per-request deadline, passed through to the transport untouched
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the per-call headers
    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Append a single header to the per-call headers
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut pairs = match self.headers.take() {
            None => Vec::new(),
            Some(HeaderSource::Pairs(pairs)) => pairs,
            Some(HeaderSource::Map(map)) => map
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
        };
        pairs.push((name.into(), value.into()));
        self.headers = Some(HeaderSource::Pairs(pairs));
        self
    }

    /// Set a preset request body
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the JSON body shorthand
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::InvalidRequest(format!("unserializable json body: {e}")))?;
        self.json = Some(value);
        Ok(self)
    }

    /// Set the query-string shorthand
    pub fn query_string<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query_string = Some(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Set the per-request deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The standard request fields the pipeline dispatches and hooks see
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    /// HTTP method
    pub method: Method,
    /// Assembled headers
    pub headers: HeaderMap,
    /// Request body bytes
    pub body: Option<Vec<u8>>,
    /// Per-request deadline
    pub timeout: Option<Duration>,
}

/// What a pipeline call is addressed at: a URL string or a prepared request
///
/// For the `Request` variant the URL is taken from the request verbatim and
/// the instance `prefix_url` is ignored; the request's method, headers and
/// body seed the assembled parts at lowest precedence.
#[derive(Debug)]
pub enum RequestInfo {
    /// A URL, absolute or relative to the instance `prefix_url`
    Url(String),
    /// A prepared request object
    Request(reqwest::Request),
}

impl From<&str> for RequestInfo {
    fn from(url: &str) -> Self {
        RequestInfo::Url(url.to_string())
    }
}

impl From<String> for RequestInfo {
    fn from(url: String) -> Self {
        RequestInfo::Url(url)
    }
}

impl From<url::Url> for RequestInfo {
    fn from(url: url::Url) -> Self {
        RequestInfo::Url(url.into())
    }
}

impl From<reqwest::Request> for RequestInfo {
    fn from(request: reqwest::Request) -> Self {
        RequestInfo::Request(request)
    }
}

/// Output of [`normalize`]: the rewritten URL, the lowered request parts,
/// and the headers the shorthands implied (kept apart from the caller's own
/// headers so precedence can be applied by the pipeline)
#[derive(Debug)]
pub(crate) struct NormalizedRequest {
    pub url: String,
    pub parts: RequestParts,
    pub implied_headers: HeaderMap,
    pub caller_headers: Option<HeaderSource>,
}

/// Lower extended [`RequestOptions`] onto standard request fields
///
/// Expands `json` into a serialized body plus an implied
/// `Content-Type: application/json`, and `query_string` into a
/// percent-encoded query appended to `url`. Does not dispatch anything.
pub(crate) fn normalize(
    url: String,
    options: RequestOptions,
    base: Option<RequestParts>,
) -> Result<NormalizedRequest, Error> {
    if options.json.is_some() && options.body.is_some() {
        return Err(Error::InvalidRequest(
            "`json` and `body` are mutually exclusive".to_string(),
        ));
    }

    let mut parts = base.unwrap_or_default();
    let mut implied_headers = HeaderMap::new();

    if let Some(method) = options.method {
        parts.method = method;
    }
    if let Some(timeout) = options.timeout {
        parts.timeout = Some(timeout);
    }

    if let Some(body) = options.body {
        parts.body = Some(body);
    } else if let Some(json) = options.json {
        let body = serde_json::to_vec(&json)
            .map_err(|e| Error::InvalidRequest(format!("unserializable json body: {e}")))?;
        parts.body = Some(body);
        implied_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let url = match options.query_string {
        None => url,
        Some(pairs) => {
            let query = pairs
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect::<Vec<_>>()
                .join("&");
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{query}")
        }
    };

    Ok(NormalizedRequest {
        url,
        parts,
        implied_headers,
        caller_headers: options.headers,
    })
}
