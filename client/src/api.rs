//! One method per Systems90 endpoint.
//!
//! # Design
//! [`Systems90Api`] holds a shared transport and a base configuration closure
//! that every call runs first (base URL and form content type). Each endpoint
//! then adds its method, path, query and payload. Both are behind `Arc`, so
//! the API handle is cheap to clone and safe to use from several threads.

use std::sync::Arc;
use std::time::Duration;

use formfetch_core::{fetch, Builder, FetchOutcome, HttpMethod, Transport, TransportConfig, UreqTransport};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::model::{Credentials, DnsRecord, Domain, SessionDomain};
use crate::types::{
    AddDnsPayload, AddDnsResponse, DeleteDnsRequest, DomainRequest, ListDnsResponse, ListDomainsResponse,
    LoginRequest, LoginResponse, SessionRequest, Status, StatusResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://admin.systems90.cz/api/";

/// Configuration for [`Systems90Api::new`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub transport: TransportConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: TransportConfig::default(),
        }
    }
}

/// Responses that carry the provider's status envelope.
trait Envelope {
    fn status(&self) -> &Status;
}

macro_rules! envelope {
    ($($ty:ty),*) => {
        $(
            impl Envelope for $ty {
                fn status(&self) -> &Status {
                    &self.status
                }
            }
        )*
    };
}

envelope!(LoginResponse, StatusResponse, ListDomainsResponse, ListDnsResponse, AddDnsResponse);

type Configure = dyn Fn(&mut Builder) + Send + Sync;

#[derive(Clone)]
pub struct Systems90Api {
    transport: Arc<dyn Transport + Send + Sync>,
    base: Arc<Configure>,
}

impl Systems90Api {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_transport(config.base_url, UreqTransport::new(config.transport))
    }

    pub fn with_transport(base_url: impl Into<String>, transport: impl Transport + Send + Sync + 'static) -> Self {
        let base_url = base_url.into();
        Self {
            transport: Arc::new(transport),
            base: Arc::new(move |b: &mut Builder| {
                b.set_base_url(&base_url);
                b.set_headers([("Content-Type", "application/x-www-form-urlencoded")]);
            }),
        }
    }

    /// Run the base configuration, then `configure`, and map the outcome.
    /// A refusal keeps the provider's status text.
    fn call<T>(&self, configure: impl FnOnce(&mut Builder)) -> Result<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let outcome = fetch(&*self.transport, |b| {
            (self.base)(b);
            configure(b);
        });

        match outcome {
            FetchOutcome::Success(value) => Ok(value),
            FetchOutcome::Rejected { value, error } => Err(ApiError::Rejected {
                source: error,
                text: value.status().text.clone(),
            }),
            FetchOutcome::Failed(e) => Err(e.into()),
        }
    }

    /// Log in and return the session id.
    pub fn login(&self, credentials: &Credentials) -> Result<String> {
        let resp: LoginResponse = self.call(|b| {
            b.set_method(HttpMethod::Post);
            b.set_path("login");
            b.set_payload(&LoginRequest {
                uid: credentials.uid.clone(),
                password: credentials.password.clone(),
            });
        })?;

        info!(uid = %resp.uid, "logged in");
        Ok(resp.sid)
    }

    /// Invalidate a session id.
    pub fn logout(&self, sid: &str) -> Result<()> {
        require_session(sid)?;

        let _: StatusResponse = self.call(|b| {
            b.set_path("logout");
            b.set_query_params(&SessionRequest { sid: sid.to_string() });
        })?;
        Ok(())
    }

    /// Domains managed by the logged-in account.
    pub fn list_domains(&self, sid: &str) -> Result<Vec<Domain>> {
        require_session(sid)?;

        let resp: ListDomainsResponse = self.call(|b| {
            b.set_method(HttpMethod::Get);
            b.set_path("domain_list");
            b.set_query_params(&SessionRequest { sid: sid.to_string() });
        })?;

        Ok(resp
            .domains
            .entries
            .into_iter()
            .map(|d| Domain {
                domain_id: d.domain_id,
                zone: d.name,
            })
            .collect())
    }

    /// DNS records of one domain. Unparsable TTL or priority read as 0. An
    /// empty priority is `None`.
    pub fn list_dns(&self, session: &SessionDomain) -> Result<Vec<DnsRecord>> {
        require_session(&session.sid)?;
        require_session(&session.domain_id)?;

        let resp: ListDnsResponse = self.call(|b| {
            b.set_method(HttpMethod::Get);
            b.set_path("domain_list_dns");
            b.set_query_params(&DomainRequest {
                sid: session.sid.clone(),
                domain_id: session.domain_id.clone(),
            });
        })?;

        let records: Vec<DnsRecord> = resp
            .zone
            .records
            .into_iter()
            .map(|r| DnsRecord {
                ttl: Duration::from_secs(r.ttl.parse().unwrap_or(0)),
                kind: r.kind.parse().ok(),
                priority: match r.priority.trim() {
                    "" => None,
                    p => Some(p.parse().unwrap_or(0)),
                },
                id: r.dns_id,
                name: r.name,
                value: r.ip,
                locked: r.locked,
            })
            .collect();

        debug!(domain_id = %session.domain_id, count = records.len(), "listed records");
        Ok(records)
    }

    /// Add a record and return the id the provider assigned. The priority is
    /// only sent when the record has one.
    pub fn add_dns(&self, session: &SessionDomain, record: &DnsRecord) -> Result<String> {
        require_session(&session.sid)?;
        require_session(&session.domain_id)?;

        let resp: AddDnsResponse = self.call(|b| {
            b.set_method(HttpMethod::Post);
            b.set_path("domain_add_dns");
            b.set_query_params(&DomainRequest {
                sid: session.sid.clone(),
                domain_id: session.domain_id.clone(),
            });
            b.set_payload(&AddDnsPayload {
                name: record.name.clone(),
                ttl: record.ttl.as_secs().to_string(),
                kind: record.kind.map(|k| k.as_str()).unwrap_or_default().to_string(),
                ip: record.value.clone(),
                priority: record.priority.map(|p| p.to_string()).unwrap_or_default(),
            });
        })?;

        info!(domain_id = %session.domain_id, name = %record.name, dns_id = %resp.dns_id, "record added");
        Ok(resp.dns_id)
    }

    pub fn delete_dns(&self, sid: &str, dns_id: &str) -> Result<()> {
        require_session(sid)?;

        let _: StatusResponse = self.call(|b| {
            b.set_method(HttpMethod::Get);
            b.set_path("domain_delete_dns");
            b.set_query_params(&DeleteDnsRequest {
                sid: sid.to_string(),
                dns_id: dns_id.to_string(),
            });
        })?;

        info!(dns_id, "record deleted");
        Ok(())
    }
}

fn require_session(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ApiError::InvalidSession);
    }
    Ok(())
}
