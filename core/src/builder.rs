//! Error-accumulating request builder.
//!
//! # Design
//! Setters never fail. A setter that cannot apply its input records a
//! [`ConfigError`] and leaves the builder usable, so a configuration closure
//! runs to the end and [`Builder::finalize`] reports every problem at once.
//! Each setter replaces the previous value; nothing is merged.

use std::time::Duration;

use url::Url;

use crate::error::{BuildError, ConfigError};
use crate::http::{HttpMethod, HttpRequest};
use crate::params::Params;

/// Mutable request configuration, consumed once by [`Builder::finalize`].
#[derive(Debug, Default)]
pub struct Builder {
    errors: Vec<ConfigError>,
    base_url: Option<Url>,
    headers: Vec<(String, String)>,
    method: HttpMethod,
    path: String,
    query: String,
    payload: String,
    timeout: Option<Duration>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute base URL that the path is joined onto.
    pub fn set_base_url(&mut self, raw: &str) {
        match Url::parse(raw) {
            Ok(url) if url.cannot_be_a_base() => {
                self.base_url = None;
                self.errors.push(ConfigError::InvalidBaseUrl {
                    raw: raw.to_string(),
                    reason: "url cannot be a base".to_string(),
                });
            }
            Ok(url) => self.base_url = Some(url),
            Err(e) => {
                self.base_url = None;
                self.errors.push(ConfigError::InvalidBaseUrl {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Replace the whole header set.
    pub fn set_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    /// Path joined onto the base URL's path at finalize time.
    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    /// Query string: a string is used verbatim, a record is marshaled.
    /// Characters that cannot appear in a URL query (space, `"`, `<`, `>`,
    /// `'`, `#`) are percent-encoded when the URL is built; existing escapes
    /// and `+` are kept.
    pub fn set_query_params<P: Params + ?Sized>(&mut self, params: &P) {
        match params.encode() {
            Ok(query) => self.query = query,
            Err(e) => self.errors.push(e.into()),
        }
    }

    /// Request body: a string is used verbatim, a record is marshaled.
    pub fn set_payload<P: Params + ?Sized>(&mut self, payload: &P) {
        match payload.encode() {
            Ok(body) => self.payload = body,
            Err(e) => self.errors.push(e.into()),
        }
    }

    /// Deadline applied by the transport to this request only.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Build the request, or report every recorded configuration error.
    pub fn finalize(self) -> Result<HttpRequest, BuildError> {
        let mut errors = self.errors;

        let invalid_base = errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidBaseUrl { .. }));
        if self.base_url.is_none() && !invalid_base {
            errors.push(ConfigError::MissingBaseUrl);
        }

        let mut url = match self.base_url {
            Some(url) if errors.is_empty() => url,
            _ => return Err(BuildError { errors }),
        };

        let path = clean_join(url.path(), &self.path);
        url.set_path(&path);
        if self.query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.query));
        }

        Ok(HttpRequest {
            method: self.method,
            url,
            headers: self.headers,
            body: self.payload,
            timeout: self.timeout,
        })
    }
}

/// Join two slash-separated paths and clean the result: repeated separators
/// collapse, `.` segments vanish and `..` removes the previous segment. Empty
/// inputs are ignored.
pub fn clean_join(base: &str, suffix: &str) -> String {
    let joined = match (base.is_empty(), suffix.is_empty()) {
        (true, true) => return String::new(),
        (false, true) => base.to_string(),
        (true, false) => suffix.to_string(),
        (false, false) => format!("{base}/{suffix}"),
    };
    clean_path(&joined)
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_params;

    struct Login {
        uid: String,
        password: String,
    }

    url_params! {
        Login {
            uid => "uid",
            password => "password",
        }
    }

    struct Broken {
        name: String,
    }

    url_params! {
        Broken { name => "name,bogus" }
    }

    #[test]
    fn builds_full_request() {
        let mut b = Builder::new();
        b.set_base_url("https://admin.example.test/api/");
        b.set_headers([("Content-Type", "application/x-www-form-urlencoded")]);
        b.set_method(HttpMethod::Post);
        b.set_path("login");
        b.set_query_params("lang=en");
        b.set_payload(&Login {
            uid: "user".into(),
            password: "p&ss word".into(),
        });

        let req = b.finalize().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url.as_str(), "https://admin.example.test/api/login?lang=en");
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/x-www-form-urlencoded".to_string())]
        );
        assert_eq!(req.body, "password=p%26ss+word&uid=user");
        assert!(req.timeout.is_none());
    }

    #[test]
    fn defaults_to_get_without_query_or_body() {
        let mut b = Builder::new();
        b.set_base_url("http://localhost:3000");
        let req = b.finalize().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.as_str(), "http://localhost:3000/");
        assert!(req.body.is_empty());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn record_query_params_are_marshaled() {
        let mut b = Builder::new();
        b.set_base_url("http://localhost/api");
        b.set_path("domain_list");
        b.set_query_params(&Login {
            uid: "a b".into(),
            password: "x".into(),
        });
        let req = b.finalize().unwrap();
        assert_eq!(req.url.as_str(), "http://localhost/api/domain_list?password=x&uid=a+b");
    }

    #[test]
    fn string_query_keeps_escapes_and_encodes_url_unsafe_characters() {
        let mut b = Builder::new();
        b.set_base_url("http://localhost/api/");
        b.set_query_params("q=a b&r=\"x\"");
        assert_eq!(b.finalize().unwrap().url.query(), Some("q=a%20b&r=%22x%22"));

        let mut b = Builder::new();
        b.set_base_url("http://localhost/api/");
        b.set_query_params("q=a+b%26c&sid=1");
        assert_eq!(b.finalize().unwrap().url.query(), Some("q=a+b%26c&sid=1"));
    }

    #[test]
    fn path_join_does_not_duplicate_separators() {
        let mut b = Builder::new();
        b.set_base_url("http://localhost/api/");
        b.set_path("/logout/");
        let req = b.finalize().unwrap();
        assert_eq!(req.url.path(), "/api/logout");
    }

    #[test]
    fn last_write_wins() {
        let mut b = Builder::new();
        b.set_base_url("http://localhost/");
        b.set_method(HttpMethod::Post);
        b.set_method(HttpMethod::Delete);
        b.set_path("first");
        b.set_path("second");
        b.set_headers([("A", "1")]);
        b.set_headers([("B", "2")]);
        b.set_payload("one");
        b.set_payload("two");
        let req = b.finalize().unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url.path(), "/second");
        assert_eq!(req.headers, vec![("B".to_string(), "2".to_string())]);
        assert_eq!(req.body, "two");
    }

    #[test]
    fn timeout_is_carried() {
        let mut b = Builder::new();
        b.set_base_url("http://localhost/");
        b.set_timeout(Duration::from_secs(5));
        assert_eq!(b.finalize().unwrap().timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn invalid_url_is_reported_at_finalize() {
        let mut b = Builder::new();
        b.set_base_url("not a url");
        assert!(b.has_errors());
        b.set_path("still usable");
        let err = b.finalize().unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(matches!(err.errors[0], ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn non_base_url_is_rejected() {
        let mut b = Builder::new();
        b.set_base_url("mailto:someone@example.test");
        assert!(b.finalize().is_err());
    }

    #[test]
    fn missing_url_is_reported() {
        let err = Builder::new().finalize().unwrap_err();
        assert!(matches!(err.errors[..], [ConfigError::MissingBaseUrl]));
    }

    #[test]
    fn errors_accumulate_in_call_order() {
        let mut b = Builder::new();
        b.set_query_params(&Broken { name: "x".into() });
        b.set_base_url("::");
        b.set_payload(&Broken { name: "y".into() });
        let err = b.finalize().unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(matches!(err.errors[0], ConfigError::Marshal(_)));
        assert!(matches!(err.errors[1], ConfigError::InvalidBaseUrl { .. }));
        assert!(matches!(err.errors[2], ConfigError::Marshal(_)));
    }

    #[test]
    fn later_valid_url_does_not_clear_earlier_error() {
        let mut b = Builder::new();
        b.set_base_url("::");
        b.set_base_url("http://localhost/");
        assert!(b.finalize().is_err());
    }

    #[test]
    fn clean_join_cases() {
        assert_eq!(clean_join("/api/", "login"), "/api/login");
        assert_eq!(clean_join("/api", "/login"), "/api/login");
        assert_eq!(clean_join("/api/", ""), "/api");
        assert_eq!(clean_join("/", ""), "/");
        assert_eq!(clean_join("", ""), "");
        assert_eq!(clean_join("/api", "v1/./x/../y"), "/api/v1/y");
        assert_eq!(clean_join("/", "../.."), "/");
        assert_eq!(clean_join("a", "../../b"), "../b");
    }
}
