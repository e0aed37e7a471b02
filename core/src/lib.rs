//! Request construction and dispatch for form-encoded, XML-answering APIs.
//!
//! # Overview
//! A caller describes one request with a closure over a [`Builder`]; [`fetch`]
//! finalizes it, sends it through a [`Transport`], decodes the XML body into
//! the caller's type and classifies the HTTP status. Query strings and form
//! payloads come from records marshaled by [`marshal`], driven by per-field
//! tags such as `"priority,omitempty"`.
//!
//! # Design
//! - Configuration errors accumulate. Neither [`marshal`] nor the builder stops
//!   at the first bad field or setter; everything is reported together.
//! - Dispatch is staged and fails fast: config, transport, decode, status.
//! - A bad status after a good decode is [`FetchOutcome::Rejected`], which
//!   still carries the decoded value.
//! - Everything is synchronous and call-scoped. A transport may be shared
//!   across threads; builders and outcomes are not.

pub mod builder;
pub mod error;
pub mod fetch;
pub mod http;
pub mod params;
pub mod tag;
pub mod transport;
pub mod value;

pub use builder::Builder;
pub use error::{BuildError, ConfigError, DecodeError, FetchError, StatusError, TransportError};
pub use fetch::{classify, fetch, FetchOutcome};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{marshal, Field, FieldError, FieldErrorKind, MarshalError, Params, UrlParams};
pub use tag::{parse_tag, FieldTag, TagError, TagFlags};
pub use transport::{Transport, TransportConfig, UreqTransport};
pub use value::{Complex, ParamValue, ValueError};
