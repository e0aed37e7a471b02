//! Session-holding wrappers over [`Systems90Api`].
//!
//! # Design
//! [`Client`] logs in once and keeps the session id. [`DomainClient`] binds
//! that session to one zone and manages its records. Both clone the API
//! handle, which only shares the transport.

use std::time::Duration;

use tracing::debug;

use crate::api::Systems90Api;
use crate::error::{ApiError, Result};
use crate::model::{Credentials, DnsRecord, DnsType, Domain, SessionDomain};

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

pub struct Client {
    api: Systems90Api,
    sid: String,
}

impl Client {
    /// Log in with `credentials`.
    pub fn new(api: Systems90Api, credentials: &Credentials) -> Result<Self> {
        let sid = api.login(credentials)?;
        Ok(Self { api, sid })
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn domains(&self) -> Result<Vec<Domain>> {
        self.api.list_domains(&self.sid)
    }

    /// Look up a managed zone by name.
    pub fn domain(&self, zone: &str) -> Result<DomainClient> {
        let domain = self
            .domains()?
            .into_iter()
            .find(|d| d.zone == zone)
            .ok_or_else(|| ApiError::DomainNotManaged(zone.to_string()))?;

        debug!(zone, domain_id = %domain.domain_id, "domain selected");
        Ok(DomainClient {
            api: self.api.clone(),
            zone: domain.zone,
            session: SessionDomain {
                sid: self.sid.clone(),
                domain_id: domain.domain_id,
            },
        })
    }

    /// Log out. The session id is invalid afterwards.
    pub fn close(self) -> Result<()> {
        self.api.logout(&self.sid)
    }
}

/// Optional settings for [`DomainClient::add_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOptions {
    pub ttl: Duration,
    pub priority: Option<u32>,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            priority: None,
        }
    }
}

impl RecordOptions {
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }
}

pub struct DomainClient {
    api: Systems90Api,
    zone: String,
    session: SessionDomain,
}

impl DomainClient {
    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn domain_id(&self) -> &str {
        &self.session.domain_id
    }

    pub fn records(&self) -> Result<Vec<DnsRecord>> {
        self.api.list_dns(&self.session)
    }

    /// Add a record and return the id the provider assigned.
    pub fn add_record(&self, name: &str, value: &str, kind: DnsType, options: RecordOptions) -> Result<String> {
        let mut record = DnsRecord::new(name, kind, value);
        record.ttl = options.ttl;
        record.priority = options.priority;
        self.api.add_dns(&self.session, &record)
    }

    pub fn remove_record_by_id(&self, dns_id: &str) -> Result<()> {
        self.api.delete_dns(&self.session.sid, dns_id)
    }

    /// Remove the record named `name`. With several matches, the last listed
    /// one goes.
    pub fn remove_record_by_name(&self, name: &str) -> Result<()> {
        let record = self
            .records()?
            .into_iter()
            .rfind(|r| r.name == name)
            .ok_or_else(|| ApiError::RecordNotFound(name.to_string()))?;
        self.remove_record_by_id(&record.id)
    }
}
