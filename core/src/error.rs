//! Error types for building, sending and decoding requests.
//!
//! # Design
//! Configuration problems are collected: a [`BuildError`] carries every
//! [`ConfigError`] recorded by the builder, in call order. The dispatch stages
//! after that fail on the first problem, and each stage has its own type so a
//! caller can tell a dead network from an unreadable body from a provider that
//! answered but refused.

use std::fmt;

use thiserror::Error;

use crate::params::MarshalError;

/// A single failed builder step.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("invalid base url {raw:?}: {reason}")]
    InvalidBaseUrl { raw: String, reason: String },

    #[error("no base url configured")]
    MissingBaseUrl,

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// Every configuration error of one builder, reported together.
#[derive(Debug, Clone)]
pub struct BuildError {
    pub errors: Vec<ConfigError>,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildError {}

/// The request could not be delivered or its response could not be read.
#[derive(Debug, Error)]
#[error("request: transport failed {url}: {source}")]
pub struct TransportError {
    pub url: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(url: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// The response body did not match the expected shape.
#[derive(Debug, Error)]
#[error("request: cannot decode response from {url} ({status}): {source}")]
pub struct DecodeError {
    pub url: String,
    pub status: u16,
    #[source]
    pub source: quick_xml::DeError,
}

/// The response decoded fine but its status denotes failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request: failed {url}: {status_line}")]
pub struct StatusError {
    pub url: String,
    pub status: u16,
    pub status_line: String,
}

/// Any failure of a fetch, one variant per stage.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Configuration(#[from] BuildError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Status(#[from] StatusError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_joins_with_newlines() {
        let err = BuildError {
            errors: vec![
                ConfigError::InvalidBaseUrl {
                    raw: "::".to_string(),
                    reason: "relative URL without a base".to_string(),
                },
                ConfigError::MissingBaseUrl,
            ],
        };
        assert_eq!(
            err.to_string(),
            "invalid base url \"::\": relative URL without a base\nno base url configured"
        );
    }

    #[test]
    fn status_error_mentions_url_and_status() {
        let err = StatusError {
            url: "https://example.test/api/login".to_string(),
            status: 403,
            status_line: "403 Forbidden".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request: failed https://example.test/api/login: 403 Forbidden"
        );
    }

    #[test]
    fn transport_error_wraps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::new("http://127.0.0.1:1/", io);
        assert!(err.to_string().contains("refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
