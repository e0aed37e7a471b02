//! Blocking client for the Systems90 DNS administration API.
//!
//! # Overview
//! [`Systems90Api`] maps each provider endpoint to one method on top of
//! `formfetch_core`. [`Client`] and [`DomainClient`] hold the session and a
//! selected zone so callers can manage records by name.
//!
//! ```no_run
//! use systems90_client::{ApiConfig, Client, Credentials, DnsType, RecordOptions, Systems90Api};
//!
//! let api = Systems90Api::new(ApiConfig::default());
//! let client = Client::new(api, &Credentials::new("uid", "password"))?;
//! let domain = client.domain("example.com")?;
//! domain.add_record("www", "192.0.2.1", DnsType::A, RecordOptions::default())?;
//! client.close()?;
//! # Ok::<(), systems90_client::ApiError>(())
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod model;
pub mod types;

pub use api::{ApiConfig, Systems90Api, DEFAULT_BASE_URL};
pub use client::{Client, DomainClient, RecordOptions, DEFAULT_TTL};
pub use error::{ApiError, Result};
pub use model::{Credentials, DnsRecord, DnsType, Domain, SessionDomain, UnknownDnsType};
