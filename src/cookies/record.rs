//! Canonical cookie record and its persisted-form mappings.
//!
//! The browser persists cookies in one shape, the HTTP jar consumes another.
//! Everything funnels through [`CookieRecord`] so the synchronization logic
//! never deals with representation conversions.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cdp::{CookieParam, NetworkCookie};

/// A single cookie, normalized from whatever shape the persistence layer or
/// the browser returns. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expiry: Option<DateTime<Utc>>,
    pub secure: bool,
    /// Whether the cookie applies to subdomains of `domain`.
    pub subdomains: bool,
}

/// On-disk cookie shape, compatible with what browser automation stacks dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<ExpiresField>,
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

/// Expiry as written by different producers: RFC 3339 timestamp strings or
/// unix epoch seconds (possibly `-1` for session cookies).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpiresField {
    Timestamp(String),
    Epoch(f64),
}

impl ExpiresField {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            ExpiresField::Timestamp(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            ExpiresField::Epoch(secs) if *secs > 0.0 => Utc.timestamp_opt(*secs as i64, 0).single(),
            ExpiresField::Epoch(_) => None,
        }
    }
}

impl CookieRecord {
    /// Normalize a persisted cookie. Persisted cookies always apply to
    /// subdomains once loaded into the HTTP jar.
    pub fn from_persisted(cookie: &PersistedCookie) -> Self {
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.trim_start_matches('.').to_string(),
            path: cookie.path.clone(),
            expiry: cookie.expires.as_ref().and_then(ExpiresField::to_utc),
            secure: cookie.secure,
            subdomains: true,
        }
    }

    /// Map back to the on-disk shape.
    pub fn to_persisted(&self) -> PersistedCookie {
        PersistedCookie {
            name: self.name.clone(),
            value: self.value.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            expires: self
                .expiry
                .map(|t| ExpiresField::Timestamp(t.to_rfc3339())),
            secure: self.secure,
        }
    }

    /// Render as a `Set-Cookie` line for seeding an HTTP jar.
    pub fn to_set_cookie(&self) -> String {
        let mut line = format!("{}={}; Path={}", self.name, self.value, self.path);
        if !self.domain.is_empty() && self.subdomains {
            line.push_str(&format!("; Domain={}", self.domain));
        }
        if let Some(expiry) = self.expiry {
            line.push_str(&format!(
                "; Expires={}",
                expiry.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.secure {
            line.push_str("; Secure");
        }
        line
    }

    /// URL against which this cookie is scoped when inserted into a jar.
    /// `None` when the record carries no usable domain.
    pub fn scope_url(&self) -> Option<Url> {
        if self.domain.is_empty() {
            return None;
        }
        let scheme = if self.secure { "https" } else { "http" };
        Url::parse(&format!("{}://{}/", scheme, self.domain)).ok()
    }

    /// Map to a CDP cookie parameter for seeding a browser context.
    pub fn to_cookie_param(&self) -> CookieParam {
        let domain = if self.subdomains {
            format!(".{}", self.domain)
        } else {
            self.domain.clone()
        };
        CookieParam {
            name: self.name.clone(),
            value: self.value.clone(),
            domain: Some(domain),
            path: Some(self.path.clone()),
            expires: self.expiry.map(|t| t.timestamp() as f64),
            secure: Some(self.secure),
        }
    }
}

impl From<&NetworkCookie> for PersistedCookie {
    fn from(cookie: &NetworkCookie) -> Self {
        PersistedCookie {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            expires: (cookie.expires > 0.0).then_some(ExpiresField::Epoch(cookie.expires)),
            secure: cookie.secure,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
