//! Hook-driven HTTP client convenience layer
//!
//! This crate wraps [`reqwest`] with a configurable instance: URL
//! prefixing, default-header merging, bearer-token injection, JSON body and
//! query-string shorthands, and before/after hooks that can inspect,
//! mutate or replace the request and response. Application code gets a
//! reusable, opinionated caller instead of repeating boilerplate at every
//! call site.
//!
//! # Example
//!
//! ```no_run
//! use fetch_hooks::{Error, FetchHooks, RequestOptions};
//!
//! async fn example() -> Result<(), Error> {
//!     let client = FetchHooks::builder()
//!         .prefix_url("https://api.example.com")
//!         .jwt_token("my-token")
//!         .build();
//!
//!     let response = client
//!         .post("/widgets", RequestOptions::new().json(&serde_json::json!({
//!             "name": "Doodad",
//!         }))?)
//!         .await?;
//!
//!     println!("status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! HTTP statuses are not errors: a 404 resolves `Ok`. Install an
//! after-response hook to raise on `!status().is_success()` if you want
//! status-based failure.

mod client;
mod error;
mod headers;
mod hooks;
mod options;

pub use client::{fetch, FetchHooks, FetchHooksBuilder};
pub use error::{BoxError, Error};
pub use headers::{merge_headers, HeaderSource};
pub use hooks::{AfterResponseHook, BeforeRequestHook};
pub use options::{InstanceOptions, RequestInfo, RequestOptions, RequestParts};
// Platform types, re-exported so downstream code can avoid a direct
// reqwest dependency.
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, Response, StatusCode};
