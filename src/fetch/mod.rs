//! Human-shaped HTTP acquisition path.

mod client;
mod headers;

pub use client::{FetchClient, FetchError, FetchParams};
pub use headers::{default_headers, merge_headers};
