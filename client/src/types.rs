//! Wire records for the Systems90 API.
//!
//! Requests are tagged for the form marshaler; responses mirror the XML the
//! provider returns. Every response carries a [`Status`] envelope whose text
//! explains refusals. Response fields default when absent, because refusals
//! omit everything but the envelope.

use formfetch_core::url_params;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};

/// Provider status code, as sent in `<status><status>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ProviderStatus {
    Ok,
    BadRequest,
    Forbidden,
    #[default]
    Unknown,
}

impl From<String> for ProviderStatus {
    fn from(code: String) -> Self {
        match code.as_str() {
            "OK" => ProviderStatus::Ok,
            "Bad request" => ProviderStatus::BadRequest,
            "Forbidden" => ProviderStatus::Forbidden,
            _ => ProviderStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Status {
    #[serde(rename = "status")]
    pub code: ProviderStatus,
    pub text: String,
}

pub struct LoginRequest {
    pub uid: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub status: Status,
    pub uid: String,
    pub sid: String,
}

pub struct SessionRequest {
    pub sid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: Status,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListDomainsResponse {
    pub status: Status,
    pub domains: DomainList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DomainList {
    #[serde(rename = "domain")]
    pub entries: Vec<DomainEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DomainEntry {
    pub domain_id: String,
    pub name: String,
}

pub struct DomainRequest {
    pub sid: String,
    pub domain_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListDnsResponse {
    pub status: Status,
    pub zone: Zone,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Zone {
    #[serde(rename = "record")]
    pub records: Vec<RecordEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordEntry {
    pub dns_id: String,
    pub name: String,
    pub ttl: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ip: String,
    pub priority: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub locked: bool,
}

/// Boolean element text. Empty or blank text reads as `false`.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "" | "0" | "f" | "F" | "false" | "False" | "FALSE" => Ok(false),
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Ok(true),
        other => Err(de::Error::invalid_value(Unexpected::Str(other), &"a boolean")),
    }
}

pub struct AddDnsPayload {
    pub name: String,
    pub ttl: String,
    pub kind: String,
    pub ip: String,
    pub priority: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddDnsResponse {
    pub status: Status,
    pub dns_id: String,
}

pub struct DeleteDnsRequest {
    pub sid: String,
    pub dns_id: String,
}

url_params! {
    LoginRequest {
        uid => "uid",
        password => "password",
    }
    SessionRequest {
        sid => "sid",
    }
    DomainRequest {
        sid => "sid",
        domain_id => "domain_id",
    }
    AddDnsPayload {
        name => "name",
        ttl => "ttl",
        kind => "type",
        ip => "ip",
        priority => "priority,omitempty",
    }
    DeleteDnsRequest {
        sid => "sid",
        dns_id => "dns_id",
    }
}
