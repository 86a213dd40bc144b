//! Remote collaborators: the LegiScan HTTP API and durable storage of the data directory.

pub mod durable;

#[cfg(feature = "git")]
pub mod git;
#[cfg(feature = "http")]
pub mod http;

pub use durable::{DurableStore, LocalOnly, SyncError};
#[cfg(feature = "git")]
pub use git::{AUTO_UPDATE_MESSAGE, GitStore};
#[cfg(feature = "http")]
pub use http::{ApiError, LegiScanClient};
