//! Human-shaped HTTP fetch through the synchronized cookie jar.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use reqwest::{Client, Method, Response};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use super::headers::{default_headers, merge_headers};
use crate::cookies::SyncedJar;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the fetch path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Caller-side request options. Headers win over the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct FetchParams {
    /// Request method; `GET` when unset.
    pub method: Option<Method>,
    /// Extra headers, merged over the defaults.
    pub headers: HeaderMap,
}

/// HTTP client that never inspects response bodies; content checks are the
/// caller's responsibility.
pub struct FetchClient {
    client: Client,
    jar: Arc<SyncedJar>,
}

impl FetchClient {
    pub fn new(jar: Arc<SyncedJar>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, jar })
    }

    /// Two-phase fetch: a CORS-preflight-shaped `OPTIONS`, then the real
    /// request, both through the jar, separated by think-time jitter.
    /// Browsers always preflight cross-origin-shaped requests; skipping it
    /// is itself a bot signal.
    pub async fn fetch(&self, url: &str, params: &FetchParams) -> Result<Response, FetchError> {
        let url: Url = url.parse()?;
        let origin = HeaderValue::from_str(&url.origin().ascii_serialization())?;
        let method = params.method.clone().unwrap_or(Method::GET);
        let headers = merge_headers(&default_headers(), &params.headers);

        self.jar.sync().await;
        jitter(10..=100).await;

        let mut preflight = headers.clone();
        preflight.insert(ORIGIN, origin.clone());
        preflight.insert(
            ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_str(method.as_str())?,
        );
        preflight.insert(
            ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type"),
        );
        trace!("preflight OPTIONS {}", url);
        self.client
            .request(Method::OPTIONS, url.clone())
            .headers(preflight)
            .send()
            .await?;

        jitter(1..=20).await;

        let mut real = headers;
        real.insert(ORIGIN, origin);
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url).headers(real).send().await?)
    }
}

/// Sleep a uniformly random number of milliseconds in `range`.
async fn jitter(range: RangeInclusive<u64>) {
    let ms = rand::rng().random_range(range);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
