//! Caller-facing types for the Systems90 client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub uid: String,
    pub password: String,
}

impl Credentials {
    pub fn new(uid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("uid", &self.uid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A zone managed by the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub domain_id: String,
    pub zone: String,
}

/// A session bound to one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDomain {
    pub sid: String,
    pub domain_id: String,
}

/// DNS record types the provider supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsType {
    A,
    Aaaa,
    Cname,
    Dname,
    Loc,
    Mx,
    Ns,
    Srv,
    Sshfp,
    Txt,
    Caa,
}

impl DnsType {
    pub fn as_str(self) -> &'static str {
        match self {
            DnsType::A => "A",
            DnsType::Aaaa => "AAAA",
            DnsType::Cname => "CNAME",
            DnsType::Dname => "DNAME",
            DnsType::Loc => "LOC",
            DnsType::Mx => "MX",
            DnsType::Ns => "NS",
            DnsType::Srv => "SRV",
            DnsType::Sshfp => "SSHFP",
            DnsType::Txt => "TXT",
            DnsType::Caa => "CAA",
        }
    }
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dns record type {0:?}")]
pub struct UnknownDnsType(pub String);

impl FromStr for DnsType {
    type Err = UnknownDnsType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "A" => DnsType::A,
            "AAAA" => DnsType::Aaaa,
            "CNAME" => DnsType::Cname,
            "DNAME" => DnsType::Dname,
            "LOC" => DnsType::Loc,
            "MX" => DnsType::Mx,
            "NS" => DnsType::Ns,
            "SRV" => DnsType::Srv,
            "SSHFP" => DnsType::Sshfp,
            "TXT" => DnsType::Txt,
            "CAA" => DnsType::Caa,
            other => return Err(UnknownDnsType(other.to_string())),
        })
    }
}

/// A DNS record. `id` is empty until the provider assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    pub ttl: Duration,
    /// `None` when the provider reports a type this client does not know.
    pub kind: Option<DnsType>,
    pub value: String,
    /// `None` when the record carries no priority. Zero is a real priority.
    pub priority: Option<u32>,
    pub locked: bool,
}

impl DnsRecord {
    pub fn new(name: impl Into<String>, kind: DnsType, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            ttl: Duration::ZERO,
            kind: Some(kind),
            value: value.into(),
            priority: None,
            locked: false,
        }
    }
}
