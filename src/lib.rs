//! Release distribution for App Center style build-distribution services
//!
//! Uploads a compiled application binary (and optionally its debug-symbol
//! archive) through a release-upload session, commits or aborts the session
//! based on the transfer outcome, and attaches the committed release to a
//! named distribution group.

pub mod api;
pub mod core;
pub mod orchestration;
pub mod security;

pub use api::{API_BASE_URL, ApiClient};
pub use self::core::*;
pub use orchestration::{DistributeReport, ReleasePipeline};
pub use security::SecureTokenManager;
