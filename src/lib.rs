//! Adaptive HTML acquisition with bot-detection evasion.
//!
//! Acquires rendered HTML for a target URL using the cheapest viable method
//! first and escalating only on failure:
//!
//! 1. **HTTP fetch**: a human-shaped two-phase request (CORS preflight,
//!    jitter, realistic headers) through a cookie jar kept in sync with the
//!    browser's persisted cookies.
//! 2. **Browser**: a real Chrome driven over the DevTools Protocol
//!    (WebSocket CDP), navigating in an isolated context seeded from the
//!    same persisted cookies.
//! 3. **Browser retry**: the browser again, after the context and every
//!    persisted cookie have been thrown away.
//!
//! Which tier runs first is decided by rolling success counters: the HTTP
//! path is preferred while history is thin or while it is winning, the
//! browser otherwise.
//!
//! ```text
//! ┌──────────┐  sync   ┌────────────┐  Set-Cookie   ┌────────┐
//! │  Mincer  │ ──────► │ SyncedJar  │ ◄───────────► │ origin │
//! │          │         └────────────┘   HTTP fetch  │ server │
//! │          │  CDP    ┌────────────┐               │        │
//! │          │ ──────► │  Chrome    │ ◄───────────► │        │
//! └──────────┘         └────────────┘   navigate    └────────┘
//!                            │ cookies.json
//!                            ▼
//!                      scratch dir (.mincer)
//! ```
//!
//! Content is accepted only when it passes a [`config::ValidatorRule`]: a
//! text pattern on the HTTP path, a live DOM selector on the browser path.
//! Everything short of full exhaustion is handled by escalation; a caller
//! only ever sees [`AcquisitionError`] when the URL is unparseable or all
//! three tiers failed.
//!
//! ```no_run
//! use mincer::{Mincer, MincerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut mincer = Mincer::new(MincerConfig::default())?;
//! let html = mincer.mince("https://example.com/article").await?;
//! mincer.close().await;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod cdp;
pub mod config;
pub mod cookies;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod scratch;

pub use browser::{BrowserError, BrowserSession};
pub use config::{LaunchOptions, MincerConfig, ValidatorRule};
pub use cookies::{CookieBlob, CookieRecord, PersistedCookie, SyncedJar};
pub use error::AcquisitionError;
pub use fetch::{FetchClient, FetchError, FetchParams};
pub use orchestrator::{Mincer, ProbeResult, StrategyCounters, Tier};
