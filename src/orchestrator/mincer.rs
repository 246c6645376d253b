//! The top-level acquisition orchestrator.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::browser::BrowserSession;
use crate::config::{MincerConfig, ValidatorRule};
use crate::cookies::{CookieBlob, SyncedJar};
use crate::error::AcquisitionError;
use crate::fetch::{FetchClient, FetchError, FetchParams};

use super::strategy::{StrategyCounters, Tier};

/// One-shot cached outcome of the first acquisition attempt against an
/// origin. Diagnostic only; it never gates later strategy choice.
#[derive(Debug)]
pub struct ProbeResult {
    pub html: Option<String>,
}

/// Acquires rendered HTML for target URLs, escalating from a plain HTTP
/// fetch through a real browser to a browser retry after a hard reset.
///
/// Holds the process-wide success counters that bias tier selection, the
/// synchronized cookie jar shared with the HTTP path, and the lazily
/// started browser session.
pub struct Mincer {
    validators: Vec<ValidatorRule>,
    jar: Arc<SyncedJar>,
    fetcher: FetchClient,
    browser: BrowserSession,
    counters: StrategyCounters,
    probe: Option<ProbeResult>,
}

impl Mincer {
    pub fn new(config: MincerConfig) -> Result<Self, FetchError> {
        let blob = match config.cookie_file {
            Some(path) => CookieBlob::at(path),
            None => CookieBlob::resolve(),
        };
        let jar = Arc::new(SyncedJar::new(blob.clone()));
        let fetcher = FetchClient::new(jar.clone())?;
        let browser = BrowserSession::new(config.browser, config.context_params, blob);

        Ok(Self {
            validators: config.validators,
            jar,
            fetcher,
            browser,
            counters: StrategyCounters::default(),
            probe: None,
        })
    }

    /// Acquire validated HTML for `url`, trying the cheapest viable tier
    /// first and escalating on failure. Fails only when the URL cannot be
    /// parsed or every tier is exhausted; in the latter case all browser
    /// resources are torn down before the error is returned.
    pub async fn mince(&mut self, url: &str) -> Result<String, AcquisitionError> {
        let parsed = Url::parse(url).map_err(|source| AcquisitionError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if self.probe.is_none() {
            self.probe_origin(&parsed).await;
        }

        let mut tier = Tier::first(&self.counters);
        loop {
            if let Some(html) = self.run_tier(tier, url).await {
                self.counters.record(tier);
                info!("minced {} via {}", url, tier.name());
                return Ok(html);
            }
            match tier.next() {
                Some(next) => tier = next,
                None => break,
            }
        }

        self.close().await;
        Err(AcquisitionError::Exhausted {
            url: url.to_string(),
        })
    }

    /// One diagnostic acquisition of the URL's origin, made lazily on the
    /// first `mince` call. Runs once per instance even when it fails.
    async fn probe_origin(&mut self, url: &Url) {
        let origin = format!("{}/", url.origin().ascii_serialization());
        debug!("probing origin {}", origin);

        let mut html = self.try_fetch(&origin).await;
        if html.is_none() {
            html = self.try_browser(&origin).await;
        }

        match &html {
            Some(_) => info!("origin {} is reachable", origin),
            None => warn!("origin {} did not yield validated content", origin),
        }
        self.probe = Some(ProbeResult { html });
    }

    /// Run one tier. `None` feeds escalation; resets happen on entry to the
    /// browser tiers.
    async fn run_tier(&mut self, tier: Tier, url: &str) -> Option<String> {
        match tier {
            Tier::Fetch => self.try_fetch(url).await,
            Tier::Browser => {
                self.jar.reset().await;
                self.try_browser(url).await
            }
            Tier::BrowserRetry => {
                self.jar.reset().await;
                self.browser.reset_context().await;
                self.try_browser(url).await
            }
        }
    }

    /// HTTP tier: fetch, then require at least one validator pattern to
    /// match the raw body.
    async fn try_fetch(&self, url: &str) -> Option<String> {
        let response = match self.fetcher.fetch(url, &FetchParams::default()).await {
            Ok(response) => response,
            Err(e) => {
                debug!("fetch of {} failed: {}", url, e);
                return None;
            }
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("reading body of {} failed: {}", url, e);
                return None;
            }
        };

        if self.validators.iter().any(|rule| rule.pattern.is_match(&body)) {
            Some(body)
        } else {
            debug!("{} did not match any validator pattern", url);
            None
        }
    }

    /// Browser tier: infrastructure failures are logged and treated the same
    /// as a non-validating page.
    async fn try_browser(&mut self, url: &str) -> Option<String> {
        match self.browser.try_browser(url, &self.validators).await {
            Ok(html) => html,
            Err(e) => {
                warn!("browser attempt for {} failed: {}", url, e);
                None
            }
        }
    }

    /// Success counts per tier, for this instance's lifetime.
    pub fn counters(&self) -> &StrategyCounters {
        &self.counters
    }

    #[cfg(test)]
    pub(crate) fn set_counters(&mut self, counters: StrategyCounters) {
        self.counters = counters;
    }

    /// The cached origin probe outcome, if a `mince` call has run yet.
    pub fn probe(&self) -> Option<&ProbeResult> {
        self.probe.as_ref()
    }

    /// Tear down the browser, its context, and the Chrome process if this
    /// instance launched it. Safe to call repeatedly.
    pub async fn close(&mut self) {
        self.browser.close().await;
    }
}
