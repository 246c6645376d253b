//! Chrome DevTools Protocol plumbing: WebSocket client, per-page sessions,
//! and the protocol message types the crate exchanges with Chrome.

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::{BrowserVersion, CookieParam, NetworkCookie};
pub use session::PageSession;
