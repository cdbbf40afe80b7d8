//! User hook traits invoked by the request pipeline

use async_trait::async_trait;
use reqwest::Response;

use crate::error::BoxError;
use crate::options::RequestParts;

/// Hook invoked with the resolved URL and assembled request parts before
/// dispatch
///
/// The hook may mutate `parts` in place and return `Ok(None)`, or return
/// `Ok(Some(parts))` to replace the request parts wholesale. An error skips
/// dispatch entirely and surfaces to the caller unchanged.
///
/// Plain functions and closures of the matching shape implement this trait,
/// so a synchronous hook needs no boilerplate:
///
/// ```
/// use fetch_hooks::{BoxError, RequestParts};
///
/// fn add_trace_header(
///     _url: &str,
///     parts: &mut RequestParts,
/// ) -> Result<Option<RequestParts>, BoxError> {
///     parts.headers.insert("X-Trace", "on".parse()?);
///     Ok(None)
/// }
/// ```
#[async_trait]
pub trait BeforeRequestHook: Send + Sync {
    /// Observe or rewrite the request before it is dispatched
    async fn before_request(
        &self,
        url: &str,
        parts: &mut RequestParts,
    ) -> Result<Option<RequestParts>, BoxError>;
}

#[async_trait]
impl<F> BeforeRequestHook for F
where
    F: Fn(&str, &mut RequestParts) -> Result<Option<RequestParts>, BoxError> + Send + Sync,
{
    async fn before_request(
        &self,
        url: &str,
        parts: &mut RequestParts,
    ) -> Result<Option<RequestParts>, BoxError> {
        (self)(url, parts)
    }
}

/// Hook invoked with the response after dispatch
///
/// The hook owns the response and returns the response the caller will see;
/// returning it untouched observes without replacing. An error replaces the
/// response with a failure, surfaced to the caller unchanged. The hook does
/// not run when the transport itself rejects.
#[async_trait]
pub trait AfterResponseHook: Send + Sync {
    /// Observe or replace the response before it is returned
    async fn after_response(
        &self,
        response: Response,
        url: &str,
        parts: &RequestParts,
    ) -> Result<Response, BoxError>;
}

#[async_trait]
impl<F> AfterResponseHook for F
where
    F: Fn(Response, &str, &RequestParts) -> Result<Response, BoxError> + Send + Sync,
{
    async fn after_response(
        &self,
        response: Response,
        url: &str,
        parts: &RequestParts,
    ) -> Result<Response, BoxError> {
        (self)(response, url, parts)
    }
}
