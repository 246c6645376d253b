//! Real-browser acquisition tier: Chrome lifecycle and validated page loads.

pub mod launcher;
pub mod session;

use thiserror::Error;

use crate::cdp::CdpError;

pub use session::BrowserSession;

/// Browser tier errors.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Chrome executable not found")]
    ChromeNotFound,

    #[error("failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] CdpError),
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
