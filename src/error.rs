// Typed API errors.
//
// Almost everything in geotox is an anyhow error with context attached.
// The exception is an authentication rejection: the pipeline has to tell it
// apart from an ordinary failed call, because a rejected key fails every
// remaining call the same way.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote service rejected our credentials (HTTP 401 or 403).
    #[error("{service} rejected the credentials ({status}): {body}")]
    Unauthorized {
        service: &'static str,
        status: u16,
        body: String,
    },
}

/// True if anywhere in the error chain there is an auth rejection.
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized { .. })))
}
