//! In-memory stand-in for the Systems90 DNS administration API.
//!
//! Speaks the provider's wire format: form-encoded query strings and bodies in,
//! XML documents with a `<status>` envelope out. Refusals use a 4xx status and
//! still carry a well-formed body, as the real service does.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// The single account the server accepts.
#[derive(Clone, Debug)]
pub struct Account {
    pub uid: String,
    pub password: String,
    /// `(domain_id, zone)` pairs managed by this account.
    pub domains: Vec<(String, String)>,
}

impl Account {
    pub fn demo() -> Self {
        Self {
            uid: "demo".to_string(),
            password: "secret".to_string(),
            domains: vec![
                ("101".to_string(), "example.com".to_string()),
                ("102".to_string(), "example.org".to_string()),
            ],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DnsRecord {
    pub dns_id: String,
    pub name: String,
    pub ttl: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ip: String,
    pub priority: String,
    pub locked: bool,
}

#[derive(Debug, Default)]
pub struct Store {
    sessions: HashSet<String>,
    records: HashMap<String, Vec<DnsRecord>>,
}

#[derive(Clone)]
pub struct AppState {
    account: Arc<Account>,
    store: Arc<RwLock<Store>>,
}

pub fn app() -> Router {
    app_with(Account::demo())
}

pub fn app_with(account: Account) -> Router {
    let state = AppState {
        account: Arc::new(account),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", get(logout))
        .route("/api/domain_list", get(domain_list))
        .route("/api/domain_list_dns", get(domain_list_dns))
        .route("/api/domain_add_dns", post(domain_add_dns))
        .route("/api/domain_delete_dns", get(domain_delete_dns))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Wire documents
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Status {
    status: &'static str,
    text: String,
}

impl Status {
    fn ok() -> Self {
        Self { status: "OK", text: String::new() }
    }

    fn forbidden(text: &str) -> Self {
        Self { status: "Forbidden", text: text.to_string() }
    }

    fn bad_request(text: &str) -> Self {
        Self { status: "Bad request", text: text.to_string() }
    }
}

#[derive(Serialize)]
struct StatusOnly {
    status: Status,
}

#[derive(Serialize)]
struct LoginBody {
    status: Status,
    uid: String,
    sid: String,
}

#[derive(Serialize)]
struct DomainEntry {
    domain_id: String,
    name: String,
}

#[derive(Serialize)]
struct Domains {
    domain: Vec<DomainEntry>,
}

#[derive(Serialize)]
struct DomainsBody {
    status: Status,
    domains: Domains,
}

#[derive(Serialize)]
struct Zone {
    record: Vec<DnsRecord>,
}

#[derive(Serialize)]
struct ZoneBody {
    status: Status,
    zone: Zone,
}

#[derive(Serialize)]
struct AddBody {
    status: Status,
    dns_id: String,
}

fn xml<T: Serialize>(code: StatusCode, body: &T) -> Response {
    match quick_xml::se::to_string_with_root("response", body) {
        Ok(text) => (code, [(header::CONTENT_TYPE, "text/xml; charset=utf-8")], text).into_response(),
        Err(e) => {
            warn!(error = %e, "cannot serialize response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn refuse(code: StatusCode, status: Status) -> Response {
    xml(code, &StatusOnly { status })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default)]
    pub dns_id: String,
}

#[derive(Deserialize)]
pub struct AddRecordForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ttl: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub priority: String,
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if form.uid != state.account.uid || form.password != state.account.password {
        warn!(uid = %form.uid, "login refused");
        return refuse(StatusCode::FORBIDDEN, Status::forbidden("invalid credentials"));
    }

    let sid = Uuid::new_v4().simple().to_string();
    state.store.write().await.sessions.insert(sid.clone());
    info!(uid = %form.uid, "login");

    xml(
        StatusCode::OK,
        &LoginBody {
            status: Status::ok(),
            uid: form.uid,
            sid,
        },
    )
}

async fn logout(State(state): State<AppState>, Query(q): Query<SessionQuery>) -> Response {
    if !state.store.write().await.sessions.remove(&q.sid) {
        return refuse(StatusCode::FORBIDDEN, Status::forbidden("invalid session"));
    }
    xml(StatusCode::OK, &StatusOnly { status: Status::ok() })
}

async fn domain_list(State(state): State<AppState>, Query(q): Query<SessionQuery>) -> Response {
    if !state.store.read().await.sessions.contains(&q.sid) {
        return refuse(StatusCode::FORBIDDEN, Status::forbidden("invalid session"));
    }

    let domain = state
        .account
        .domains
        .iter()
        .map(|(id, zone)| DomainEntry {
            domain_id: id.clone(),
            name: zone.clone(),
        })
        .collect();

    xml(
        StatusCode::OK,
        &DomainsBody {
            status: Status::ok(),
            domains: Domains { domain },
        },
    )
}

fn owns_domain(account: &Account, domain_id: &str) -> bool {
    account.domains.iter().any(|(id, _)| id == domain_id)
}

async fn domain_list_dns(State(state): State<AppState>, Query(q): Query<SessionQuery>) -> Response {
    let store = state.store.read().await;
    if !store.sessions.contains(&q.sid) {
        return refuse(StatusCode::FORBIDDEN, Status::forbidden("invalid session"));
    }
    if !owns_domain(&state.account, &q.domain_id) {
        return refuse(StatusCode::BAD_REQUEST, Status::bad_request("unknown domain"));
    }

    let record = store.records.get(&q.domain_id).cloned().unwrap_or_default();
    xml(
        StatusCode::OK,
        &ZoneBody {
            status: Status::ok(),
            zone: Zone { record },
        },
    )
}

async fn domain_add_dns(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
    Form(form): Form<AddRecordForm>,
) -> Response {
    let mut store = state.store.write().await;
    if !store.sessions.contains(&q.sid) {
        return refuse(StatusCode::FORBIDDEN, Status::forbidden("invalid session"));
    }
    if !owns_domain(&state.account, &q.domain_id) {
        return refuse(StatusCode::BAD_REQUEST, Status::bad_request("unknown domain"));
    }
    if form.name.is_empty() || form.kind.is_empty() || form.ip.is_empty() {
        return refuse(StatusCode::BAD_REQUEST, Status::bad_request("name, type and ip are required"));
    }

    let dns_id = Uuid::new_v4().simple().to_string();
    let record = DnsRecord {
        dns_id: dns_id.clone(),
        name: form.name,
        ttl: form.ttl,
        kind: form.kind,
        ip: form.ip,
        priority: form.priority,
        locked: false,
    };
    info!(domain_id = %q.domain_id, name = %record.name, "record added");
    store.records.entry(q.domain_id).or_default().push(record);

    xml(
        StatusCode::OK,
        &AddBody {
            status: Status::ok(),
            dns_id,
        },
    )
}

async fn domain_delete_dns(State(state): State<AppState>, Query(q): Query<SessionQuery>) -> Response {
    let mut store = state.store.write().await;
    if !store.sessions.contains(&q.sid) {
        return refuse(StatusCode::FORBIDDEN, Status::forbidden("invalid session"));
    }

    let mut removed = false;
    for records in store.records.values_mut() {
        let before = records.len();
        records.retain(|r| r.dns_id != q.dns_id);
        removed |= records.len() != before;
    }

    if !removed {
        return refuse(StatusCode::BAD_REQUEST, Status::bad_request("unknown record"));
    }
    xml(StatusCode::OK, &StatusOnly { status: Status::ok() })
}
