//! Cookie synchronization between the browser's persisted state and the
//! in-memory jar used by the HTTP fetch path.

mod blob;
mod jar;
mod record;

pub use blob::CookieBlob;
pub use jar::SyncedJar;
pub use record::{CookieRecord, ExpiresField, PersistedCookie};
