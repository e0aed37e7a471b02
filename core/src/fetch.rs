//! Build, send, decode and classify one request/response exchange.
//!
//! # Design
//! [`fetch`] is strictly staged: configuration, transport, decode, status.
//! The first failing stage ends the call and nothing is retried. Status is
//! only looked at once the body decoded, so a refused request whose body is
//! well formed still hands the decoded value back in
//! [`FetchOutcome::Rejected`]; providers put their diagnostics there.
//!
//! [`classify`] is the decode-and-classify half on its own. It does no I/O.

use serde::de::DeserializeOwned;
use tracing::{debug, info_span, warn};
use url::Url;

use crate::builder::Builder;
use crate::error::{DecodeError, FetchError, StatusError};
use crate::http::HttpResponse;
use crate::transport::Transport;

/// Result of a fetch.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// Decoded and the status signals success.
    Success(T),

    /// Decoded, but the status signals failure. `value` holds whatever the
    /// body carried, typically the provider's own status and message.
    Rejected { value: T, error: StatusError },

    /// No usable value: configuration, transport or decode failed. Never
    /// holds [`FetchError::Status`].
    Failed(FetchError),
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// The decoded value, present for both `Success` and `Rejected`.
    pub fn value(&self) -> Option<&T> {
        match self {
            FetchOutcome::Success(value) | FetchOutcome::Rejected { value, .. } => Some(value),
            FetchOutcome::Failed(_) => None,
        }
    }

    /// The failure, if any. A status error is only ever the `Rejected` one.
    pub fn error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Rejected { error, .. } => Some(error),
            FetchOutcome::Failed(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            FetchOutcome::Success(value) => Ok(value),
            FetchOutcome::Rejected { error, .. } => Err(error.into()),
            FetchOutcome::Failed(error) => Err(error),
        }
    }

    /// Split into an optional value and an optional error. A rejected
    /// outcome yields both.
    pub fn into_parts(self) -> (Option<T>, Option<FetchError>) {
        match self {
            FetchOutcome::Success(value) => (Some(value), None),
            FetchOutcome::Rejected { value, error } => (Some(value), Some(error.into())),
            FetchOutcome::Failed(error) => (None, Some(error)),
        }
    }
}

/// Run `configure` against a fresh [`Builder`], send the request and decode
/// the XML response into `T`.
pub fn fetch<T, Tr, F>(transport: &Tr, configure: F) -> FetchOutcome<T>
where
    T: DeserializeOwned,
    Tr: Transport + ?Sized,
    F: FnOnce(&mut Builder),
{
    let mut builder = Builder::new();
    configure(&mut builder);

    let request = match builder.finalize() {
        Ok(request) => request,
        Err(e) => {
            warn!(errors = e.errors.len(), "request configuration failed");
            return FetchOutcome::Failed(e.into());
        }
    };

    let span = info_span!("fetch", method = %request.method, url = %request.url);
    let _guard = span.enter();

    debug!("sending request");
    let response = match transport.execute(&request) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "transport failed");
            return FetchOutcome::Failed(e.into());
        }
    };

    classify(&request.url, response)
}

/// Decode `response` into `T`, then classify its status.
pub fn classify<T: DeserializeOwned>(url: &Url, response: HttpResponse) -> FetchOutcome<T> {
    let value: T = match quick_xml::de::from_str(&response.body) {
        Ok(value) => value,
        Err(source) => {
            warn!(status = response.status, error = %source, "response decode failed");
            return FetchOutcome::Failed(
                DecodeError {
                    url: url.to_string(),
                    status: response.status,
                    source,
                }
                .into(),
            );
        }
    };

    if response.is_success() {
        debug!(status = response.status, "request succeeded");
        return FetchOutcome::Success(value);
    }

    warn!(status = response.status, "request rejected");
    FetchOutcome::Rejected {
        value,
        error: StatusError {
            url: url.to_string(),
            status: response.status,
            status_line: response.status_line(),
        },
    }
}
