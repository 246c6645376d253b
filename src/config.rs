//! Orchestrator configuration, supplied once at construction and immutable
//! thereafter.

use std::path::PathBuf;

use regex::Regex;
use serde_json::Value;

/// A criterion deciding whether acquired content is a genuine page rather
/// than a block or challenge page.
///
/// The HTTP path tests `pattern` against the raw response body; the browser
/// path waits for `selector` to attach to the live DOM.
#[derive(Debug, Clone)]
pub struct ValidatorRule {
    /// DOM-queryable locator, e.g. `[property="og:description"]`.
    pub selector: String,
    /// Text pattern matched against raw HTML.
    pub pattern: Regex,
}

impl ValidatorRule {
    pub fn new(selector: impl Into<String>, pattern: Regex) -> Self {
        Self {
            selector: selector.into(),
            pattern,
        }
    }
}

/// Chrome launch configuration.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run Chrome headless.
    pub headless: bool,
    /// Remote debugging port.
    pub debug_port: u16,
    /// Explicit Chrome executable; auto-discovered when `None`.
    pub chrome_path: Option<PathBuf>,
    /// Profile directory; defaults to one under the project scratch dir.
    pub profile_dir: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            debug_port: 9222,
            chrome_path: None,
            profile_dir: None,
        }
    }
}

impl LaunchOptions {
    /// CDP endpoint URL for the debug port.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}

/// Configuration accepted by [`crate::Mincer::new`].
#[derive(Debug, Clone)]
pub struct MincerConfig {
    /// At least one rule is required for any validation to succeed.
    pub validators: Vec<ValidatorRule>,
    /// Browser launch options.
    pub browser: LaunchOptions,
    /// Passed opaquely to browser context creation
    /// (`Target.createBrowserContext` parameters, e.g. a proxy server).
    pub context_params: Option<Value>,
    /// Explicit cookie blob location; defaults to `cookies.json` under the
    /// project scratch directory.
    pub cookie_file: Option<PathBuf>,
}

impl Default for MincerConfig {
    fn default() -> Self {
        let pattern = Regex::new(r#"(?i)\sproperty="og:description"\s"#)
            .expect("default validator pattern is valid");
        Self {
            validators: vec![ValidatorRule::new(r#"[property="og:description"]"#, pattern)],
            browser: LaunchOptions::default(),
            context_params: None,
            cookie_file: None,
        }
    }
}
