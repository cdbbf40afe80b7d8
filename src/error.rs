//! Error types for the request pipeline

use thiserror::Error;

/// Boxed error produced by a user hook, propagated verbatim.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the request pipeline
///
/// HTTP status codes are not errors: a response with `status >= 400`
/// resolves normally. Callers that want status-based failure install an
/// after-response hook that returns an error on `!response.status().is_success()`.
#[derive(Debug, Error)]
pub enum Error {
    /// The request options could not be assembled into a dispatchable request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// A before-request or after-response hook failed
    ///
    /// The hook's own error is carried unchanged, so its message and source
    /// chain are what the caller observes.
    #[error(transparent)]
    Hook(BoxError),
    /// The underlying transport rejected (connection failure, timeout, abort)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// Whether this is a request-assembly error
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }

    /// Whether this error came out of a user hook
    pub fn is_hook(&self) -> bool {
        matches!(self, Error::Hook(_))
    }

    /// Whether this is a transport-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_display() {
        let error = Error::InvalidRequest("both json and body supplied".to_string());
        assert_eq!(
            format!("{}", error),
            "Invalid request: both json and body supplied"
        );
        assert!(error.is_invalid_request());
        assert!(!error.is_hook());
        assert!(!error.is_transport());
    }

    #[test]
    fn test_hook_error_is_transparent() {
        let inner: BoxError = "404 Not Found".into();
        let error = Error::Hook(inner);
        // The hook's message passes through without decoration.
        assert_eq!(format!("{}", error), "404 Not Found");
        assert!(error.is_hook());
    }

    #[test]
    fn test_hook_error_preserves_typed_errors() {
        #[derive(Debug, Error)]
        #[error("custom hook failure: {code}")]
        struct HookProblem {
            code: u16,
        }

        let error = Error::Hook(Box::new(HookProblem { code: 401 }));
        assert_eq!(format!("{}", error), "custom hook failure: 401");
    }
}
