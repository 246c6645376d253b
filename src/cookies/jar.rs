//! In-memory cookie jar kept in sync with the browser's persisted cookies.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use tracing::info;
use url::Url;

use super::blob::CookieBlob;
use super::record::CookieRecord;

/// The jar attached to HTTP-path requests.
///
/// Two inner jars mirror the two cookie sources: `own` accumulates
/// `Set-Cookie` headers seen on HTTP responses, `persisted` is rebuilt from
/// the browser's cookie blob on every [`sync`](Self::sync). Rebuilding
/// rather than mutating keeps an in-flight request's view of the jar stable
/// across a resync.
pub struct SyncedJar {
    blob: CookieBlob,
    state: RwLock<JarState>,
}

struct JarState {
    own: Arc<Jar>,
    own_keys: HashSet<String>,
    persisted: Arc<Jar>,
    persisted_count: usize,
    last_reported: usize,
}

impl SyncedJar {
    pub fn new(blob: CookieBlob) -> Self {
        Self {
            blob,
            state: RwLock::new(JarState {
                own: Arc::new(Jar::default()),
                own_keys: HashSet::new(),
                persisted: Arc::new(Jar::default()),
                persisted_count: 0,
                last_reported: 0,
            }),
        }
    }

    /// Re-read the persisted blob and rebuild the persisted-side jar from
    /// it. A missing or malformed blob keeps the previous jar state and
    /// never errors.
    pub async fn sync(&self) {
        let Some(cookies) = self.blob.read().await else {
            return;
        };

        let jar = Jar::default();
        let mut kept = 0usize;
        for record in cookies.iter().map(CookieRecord::from_persisted) {
            if let Some(url) = record.scope_url() {
                jar.add_cookie_str(&record.to_set_cookie(), &url);
                kept += 1;
            }
        }

        let mut state = self.state.write();
        state.persisted = Arc::new(jar);
        state.persisted_count = kept;
        let total = state.persisted_count + state.own_keys.len();
        if total != state.last_reported {
            info!("{} cookies", total);
            state.last_reported = total;
        }
    }

    /// Drop every in-memory cookie, then sync fresh from the blob. Used when
    /// the HTTP path appears blocked and a session cookie needs to go.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write();
            state.own = Arc::new(Jar::default());
            state.own_keys.clear();
            state.persisted = Arc::new(Jar::default());
            state.persisted_count = 0;
        }
        self.sync().await;
    }

    /// Total cookies currently known across both sources.
    pub fn known_cookies(&self) -> usize {
        let state = self.state.read();
        state.persisted_count + state.own_keys.len()
    }
}

impl CookieStore for SyncedJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let headers: Vec<&HeaderValue> = cookie_headers.collect();
        let mut state = self.state.write();
        for header in &headers {
            if let Ok(line) = header.to_str() {
                if let Some((name, _)) = line.split(';').next().and_then(|p| p.split_once('=')) {
                    state.own_keys.insert(format!(
                        "{}@{}",
                        name.trim(),
                        url.host_str().unwrap_or_default()
                    ));
                }
            }
        }
        let mut iter = headers.iter().copied();
        state.own.set_cookies(&mut iter, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let state = self.state.read();
        match (state.own.cookies(url), state.persisted.cookies(url)) {
            (Some(own), Some(persisted)) => {
                let merged = format!("{}; {}", own.to_str().ok()?, persisted.to_str().ok()?);
                HeaderValue::from_str(&merged).ok()
            }
            (Some(own), None) => Some(own),
            (None, Some(persisted)) => Some(persisted),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
#[path = "jar_tests.rs"]
mod tests;
