//! Error types for the Systems90 client.

use formfetch_core::{FetchError, StatusError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The call needs a session and none was given.
    #[error("systems90: to use this endpoint, you need to be logged in")]
    InvalidSession,

    /// The provider answered with a failure status. `text` is its own
    /// explanation from the response envelope.
    #[error("systems90: {source}: {text}")]
    Rejected {
        #[source]
        source: StatusError,
        text: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("systems90: domain not managed ({0})")]
    DomainNotManaged(String),

    #[error("systems90: dns record not found ({0})")]
    RecordNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_carries_provider_text() {
        let err = ApiError::Rejected {
            source: StatusError {
                url: "https://admin.systems90.cz/api/login".to_string(),
                status: 403,
                status_line: "403 Forbidden".to_string(),
            },
            text: "invalid credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "systems90: request: failed https://admin.systems90.cz/api/login: 403 Forbidden: invalid credentials"
        );
    }
}
