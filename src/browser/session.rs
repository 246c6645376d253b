//! Browser-backed acquisition: one Chrome process, one isolated context,
//! fresh pages per attempt.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde_json::Value;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::cdp::{CdpClient, CookieParam};
use crate::config::{LaunchOptions, ValidatorRule};
use crate::cookies::{CookieBlob, CookieRecord, PersistedCookie};

use super::{launcher, BrowserError};

/// How long a page gets to satisfy every validator selector.
const SELECTOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Chrome startup poll: 30 attempts at 200ms.
const STARTUP_ATTEMPTS: u32 = 30;
const STARTUP_INTERVAL: Duration = Duration::from_millis(200);

/// Owns the Chrome process, the CDP connection, and the current isolated
/// browser context. Everything is lazy: nothing starts until the first
/// browser-tier attempt needs it.
pub struct BrowserSession {
    options: LaunchOptions,
    context_params: Option<Value>,
    blob: CookieBlob,
    chrome: Option<Child>,
    client: Option<Arc<CdpClient>>,
    context_id: Option<String>,
}

impl BrowserSession {
    pub fn new(options: LaunchOptions, context_params: Option<Value>, blob: CookieBlob) -> Self {
        Self {
            options,
            context_params,
            blob,
            chrome: None,
            client: None,
            context_id: None,
        }
    }

    /// Path of the cookie blob this session persists into.
    pub fn blob(&self) -> &CookieBlob {
        &self.blob
    }

    async fn is_chrome_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.options.endpoint()))
            .await
            .is_ok()
    }

    /// Connect to Chrome, launching it first when nothing answers on the
    /// debug port.
    async fn ensure_client(&mut self) -> Result<Arc<CdpClient>, BrowserError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }

        if !self.is_chrome_running().await {
            info!(
                "Chrome not running on port {}, launching",
                self.options.debug_port
            );
            let child = launcher::launch_chrome(&self.options).await?;
            self.chrome = Some(child);

            let mut attempts = 0;
            while attempts < STARTUP_ATTEMPTS {
                tokio::time::sleep(STARTUP_INTERVAL).await;
                if self.is_chrome_running().await {
                    break;
                }
                attempts += 1;
            }
            if attempts >= STARTUP_ATTEMPTS {
                return Err(BrowserError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        } else {
            info!("Chrome already running on port {}", self.options.debug_port);
        }

        let client = Arc::new(CdpClient::connect(&self.options.endpoint()).await?);
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Create the isolated browser context on first use and seed it with
    /// whatever the persisted cookie blob holds.
    async fn ensure_context(&mut self) -> Result<(Arc<CdpClient>, String), BrowserError> {
        let client = self.ensure_client().await?;

        if let Some(id) = &self.context_id {
            return Ok((client, id.clone()));
        }

        let context_id = client
            .create_browser_context(self.context_params.clone())
            .await?;

        if let Some(persisted) = self.blob.read().await {
            let params: Vec<CookieParam> = persisted
                .iter()
                .map(|cookie| CookieRecord::from_persisted(cookie).to_cookie_param())
                .collect();
            if !params.is_empty() {
                debug!("seeding {} cookies into browser context", params.len());
                client.set_cookies(&context_id, &params).await?;
            }
        }

        self.context_id = Some(context_id.clone());
        Ok((client, context_id))
    }

    /// One browser-tier attempt. `Ok(Some(html))` when the page loaded and
    /// every validator selector attached in time; `Ok(None)` when the page
    /// did not validate; `Err` only for infrastructure failures.
    pub async fn try_browser(
        &mut self,
        url: &str,
        validators: &[ValidatorRule],
    ) -> Result<Option<String>, BrowserError> {
        let (client, context_id) = self.ensure_context().await?;
        let page = client.create_page(&context_id).await?;

        let loaded = async {
            page.navigate(url).await?;
            let waits = validators
                .iter()
                .map(|rule| page.wait_for_selector_attached(&rule.selector, SELECTOR_TIMEOUT));
            tokio::try_join!(
                try_join_all(waits),
                page.wait_for_dom_content_loaded(SELECTOR_TIMEOUT),
            )?;
            Ok::<_, BrowserError>(())
        }
        .await;

        if let Err(e) = loaded {
            debug!("browser attempt for {} did not validate: {}", url, e);
            if let Err(e) = client.close_page(page.target_id()).await {
                warn!("failed to close page: {}", e);
            }
            return Ok(None);
        }

        // Page validated: persist the context's cookies before reading it.
        match client.get_cookies(&context_id).await {
            Ok(cookies) => {
                let persisted: Vec<PersistedCookie> =
                    cookies.iter().map(PersistedCookie::from).collect();
                if let Err(e) = self.blob.write(&persisted).await {
                    warn!("failed to persist browser cookies: {}", e);
                }
            }
            Err(e) => warn!("failed to read browser cookies: {}", e),
        }

        let html = page.get_content().await;
        if let Err(e) = client.close_page(page.target_id()).await {
            warn!("failed to close page: {}", e);
        }

        Ok(Some(html?))
    }

    /// Throw away the browser context and the persisted cookie blob. The
    /// next attempt starts from a context with no history.
    pub async fn reset_context(&mut self) {
        info!("resetting browser context");
        if let (Some(client), Some(context_id)) = (&self.client, self.context_id.take()) {
            if let Err(e) = client.dispose_browser_context(&context_id).await {
                warn!("failed to dispose browser context: {}", e);
            }
        }
        self.blob.remove().await;
    }

    /// Tear everything down: context, CDP connection, and the Chrome
    /// process if this session launched it. Safe to call more than once.
    pub async fn close(&mut self) {
        if let (Some(client), Some(context_id)) = (&self.client, self.context_id.take()) {
            if let Err(e) = client.dispose_browser_context(&context_id).await {
                warn!("failed to dispose browser context: {}", e);
            }
        }
        self.client = None;
        if let Some(mut child) = self.chrome.take() {
            info!("shutting down Chrome");
            let _ = child.kill().await;
        }
    }
}
