//! The `FetchHooks` instance and its request pipeline

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Response};
use url::Url;

use crate::error::Error;
use crate::headers::HeaderSource;
use crate::hooks::{AfterResponseHook, BeforeRequestHook};
use crate::options::{
    normalize, InstanceOptions, NormalizedRequest, RequestInfo, RequestOptions, RequestParts,
};

/// A configured HTTP caller wrapping [`reqwest::Client`]
///
/// Captures its [`InstanceOptions`] at construction and applies them to
/// every request: URL prefixing, default headers, bearer-token injection
/// and the before/after hooks. Cloning is cheap and shares the underlying
/// connection pool and configuration.
#[derive(Debug, Clone)]
pub struct FetchHooks {
    inner: Client,
    options: Arc<InstanceOptions>,
}

impl Default for FetchHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchHooks {
    /// Create an instance with all-default options
    pub fn new() -> Self {
        Self::with_options(InstanceOptions::default())
    }

    /// Create an instance from explicit options
    pub fn with_options(options: InstanceOptions) -> Self {
        Self {
            inner: Client::new(),
            options: Arc::new(options),
        }
    }

    /// Create a new instance builder
    pub fn builder() -> FetchHooksBuilder {
        FetchHooksBuilder::default()
    }

    /// Fold header sources into a single header map, later sources winning
    ///
    /// `None` sources are skipped; name comparison is case-insensitive.
    pub fn merge_headers<I>(sources: I) -> Result<HeaderMap, Error>
    where
        I: IntoIterator<Item = Option<HeaderSource>>,
    {
        crate::headers::merge_headers(sources)
    }

    /// Dispatch a request through the full pipeline
    ///
    /// Resolves the URL against `prefix_url`, lowers the option shorthands,
    /// assembles headers in precedence order, runs the before-request hook,
    /// awaits the transport and runs the after-response hook. Responses with
    /// `status >= 400` resolve `Ok`; install an after-response hook to turn
    /// statuses into errors.
    pub async fn fetch(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options).await
    }

    /// GET shorthand; overrides any method in `options`
    pub async fn get(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options.method(Method::GET)).await
    }

    /// HEAD shorthand; overrides any method in `options`
    pub async fn head(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options.method(Method::HEAD)).await
    }

    /// DELETE shorthand; overrides any method in `options`
    pub async fn delete(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options.method(Method::DELETE)).await
    }

    /// POST shorthand; overrides any method in `options`
    pub async fn post(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options.method(Method::POST)).await
    }

    /// PUT shorthand; overrides any method in `options`
    pub async fn put(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options.method(Method::PUT)).await
    }

    /// PATCH shorthand; overrides any method in `options`
    pub async fn patch(
        &self,
        info: impl Into<RequestInfo>,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        self.run(info.into(), options.method(Method::PATCH)).await
    }

    async fn run(&self, info: RequestInfo, options: RequestOptions) -> Result<Response, Error> {
        let (url, base) = match info {
            RequestInfo::Url(raw) => (self.resolve_url(&raw)?, None),
            RequestInfo::Request(request) => {
                // The URL comes from the request verbatim; prefix_url is
                // never applied to prepared requests.
                let url = request.url().to_string();
                (url, Some(Self::parts_from_request(&request)?))
            }
        };

        let base_headers = base
            .as_ref()
            .map(|parts| HeaderSource::Map(parts.headers.clone()));

        let NormalizedRequest {
            url,
            mut parts,
            implied_headers,
            caller_headers,
        } = normalize(url, options, base)?;

        // Precedence, lowest to highest: prepared-request headers, instance
        // defaults, bearer token, shorthand-implied, per-call.
        parts.headers = crate::headers::merge_headers([
            base_headers,
            self.options.headers.clone(),
            self.authorization_source()?,
            Some(HeaderSource::Map(implied_headers)),
            caller_headers,
        ])?;

        if let Some(hook) = &self.options.before_request_hook {
            match hook.before_request(&url, &mut parts).await {
                Ok(Some(replacement)) => parts = replacement,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("before-request hook failed: {}", err);
                    return Err(Error::Hook(err));
                }
            }
        }

        tracing::debug!(method = %parts.method, url = %url, "dispatching request");

        let mut request = self
            .inner
            .request(parts.method.clone(), &url)
            .headers(parts.headers.clone());
        if let Some(body) = parts.body.clone() {
            request = request.body(body);
        }
        if let Some(timeout) = parts.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        match &self.options.after_response_hook {
            None => Ok(response),
            Some(hook) => hook
                .after_response(response, &url, &parts)
                .await
                .map_err(|err| {
                    tracing::warn!("after-response hook failed: {}", err);
                    Error::Hook(err)
                }),
        }
    }

    /// Resolve a caller URL against the instance `prefix_url`
    ///
    /// A URL that parses with a scheme bypasses the prefix. Otherwise the
    /// prefix and path are joined with exactly one `/` between them.
    fn resolve_url(&self, raw: &str) -> Result<String, Error> {
        if Url::parse(raw).is_ok() {
            return Ok(raw.to_string());
        }

        let prefix = self.options.prefix_url.as_deref().ok_or_else(|| {
            Error::InvalidRequest(format!("relative URL without a prefix_url: {raw}"))
        })?;

        let joined = format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            raw.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| Error::InvalidRequest(format!("malformed prefix_url: {e}")))?;

        Ok(joined)
    }

    fn authorization_source(&self) -> Result<Option<HeaderSource>, Error> {
        let Some(token) = &self.options.jwt_token else {
            return Ok(None);
        };

        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::InvalidRequest("jwt token is not a valid header value".to_string())
        })?;
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, value);
        Ok(Some(HeaderSource::Map(map)))
    }

    fn parts_from_request(request: &reqwest::Request) -> Result<RequestParts, Error> {
        let body = match request.body() {
            None => None,
            Some(body) => match body.as_bytes() {
                Some(bytes) => Some(bytes.to_vec()),
                None => {
                    return Err(Error::InvalidRequest(
                        "streaming request bodies are not supported".to_string(),
                    ))
                }
            },
        };

        Ok(RequestParts {
            method: request.method().clone(),
            headers: request.headers().clone(),
            body,
            timeout: request.timeout().copied(),
        })
    }
}

/// Builder for a configured [`FetchHooks`] instance
#[derive(Debug, Default)]
pub struct FetchHooksBuilder {
    client: Option<Client>,
    options: InstanceOptions,
}

impl FetchHooksBuilder {
    /// Base URL prepended to non-absolute request URLs
    pub fn prefix_url(mut self, prefix_url: impl Into<String>) -> Self {
        self.options.prefix_url = Some(prefix_url.into());
        self
    }

    /// Bearer credential injected as `Authorization: Bearer <token>` when
    /// the caller does not supply its own `Authorization` header
    pub fn jwt_token(mut self, jwt_token: impl Into<String>) -> Self {
        self.options.jwt_token = Some(jwt_token.into());
        self
    }

    /// Default headers merged into every request at lowest precedence
    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.options.headers = Some(headers.into());
        self
    }

    /// Hook invoked before every dispatch
    pub fn before_request_hook(mut self, hook: impl BeforeRequestHook + 'static) -> Self {
        self.options.before_request_hook = Some(Arc::new(hook));
        self
    }

    /// Hook invoked after every dispatch
    pub fn after_response_hook(mut self, hook: impl AfterResponseHook + 'static) -> Self {
        self.options.after_response_hook = Some(Arc::new(hook));
        self
    }

    /// Use a preconfigured [`reqwest::Client`] as the transport
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the instance
    pub fn build(self) -> FetchHooks {
        FetchHooks {
            inner: self.client.unwrap_or_default(),
            options: Arc::new(self.options),
        }
    }
}

/// One-shot GET on a default instance
pub async fn fetch(url: impl Into<RequestInfo>) -> Result<Response, Error> {
    FetchHooks::new().fetch(url, RequestOptions::default()).await
}
