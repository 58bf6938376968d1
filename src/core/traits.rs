//! Core trait and wire types for release distribution
//!
//! This module defines the abstraction over the remote distribution API and
//! the data types that flow between pipeline steps: upload sessions, transfer
//! outcomes, committed and published releases.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::core::error::DistributeError;

// ============================================================================
// Upload URL
// ============================================================================

/// Server-issued one-time upload endpoint
///
/// Distinct from the API host and valid for a single transfer. The inner URL
/// can only be reached by consuming the value, so a session's upload URL
/// cannot accidentally be reused for an unrelated call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct UploadUrl(String);

impl UploadUrl {
    /// Wrap a raw URL, used by tests and deserialization
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Consume the value, yielding the raw URL for the one transfer
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for UploadUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Release-upload session minted by the distribution API
///
/// Lives for one pipeline run only and is never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSession {
    /// Opaque session identifier, echoed back in the upload and commit calls
    pub upload_id: String,

    /// One-time endpoint for the binary transfer
    pub upload_url: UploadUrl,
}

/// Symbol-upload session, only created for iOS binaries with symbols supplied
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolSession {
    /// Opaque session identifier
    pub symbol_upload_id: String,

    /// One-time endpoint for the symbol archive transfer
    pub upload_url: UploadUrl,
}

// ============================================================================
// Transfer outcome
// ============================================================================

/// Result of a binary or symbol transfer
///
/// A non-2xx upload response is an outcome, not an error: the orchestrator
/// decides whether it triggers the abort transition (binary) or a warning
/// (symbols).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The upload endpoint accepted the bytes (any 2xx status)
    Success,
    /// The upload endpoint rejected the transfer
    Failure { status: u16, body: String },
}

impl UploadOutcome {
    /// Check whether the transfer was accepted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

// ============================================================================
// Commit / abort
// ============================================================================

/// Terminal status for a release-upload session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Retain the uploaded bytes as a release
    Committed,
    /// Discard the uploaded bytes
    Aborted,
}

impl ReleaseStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }
}

/// Response of a successful commit call
#[derive(Debug, Clone, Deserialize)]
pub struct CommittedRelease {
    /// Relative resource path of the release, input to the group publish call
    #[serde(default)]
    pub release_url: String,
}

// ============================================================================
// Published release
// ============================================================================

/// Terminal artifact of the pipeline: the release as visible to testers
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedRelease {
    /// Human-readable version of the published release
    #[serde(default)]
    pub short_version: String,

    /// Public download link, absent for some release states
    #[serde(default)]
    pub download_url: Option<String>,

    /// Remaining release metadata as returned by the service
    #[serde(flatten)]
    pub metadata: HashMap<String, serde_json::Value>,
}

// ============================================================================
// Distribution API
// ============================================================================

/// Remote distribution API as seen by the pipeline orchestrator
///
/// Implemented by [`ApiClient`](crate::api::ApiClient); the trait keeps the
/// orchestrator independent of the HTTP transport.
#[async_trait]
pub trait DistributionApi: Send + Sync {
    /// Create a release-upload session for the app
    async fn create_release_session(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
    ) -> Result<ReleaseSession, DistributeError>;

    /// Create a symbol-upload session for the app
    async fn create_symbol_session(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
    ) -> Result<SymbolSession, DistributeError>;

    /// Stream the release binary to its one-time upload URL
    async fn upload_binary(
        &self,
        token: &SecretString,
        upload_id: &str,
        upload_url: UploadUrl,
        file: &Path,
    ) -> Result<UploadOutcome, DistributeError>;

    /// Stream the symbol archive to its one-time upload URL
    async fn upload_symbols(
        &self,
        token: &SecretString,
        symbol_upload_id: &str,
        upload_url: UploadUrl,
        archive: &Path,
    ) -> Result<UploadOutcome, DistributeError>;

    /// Commit or abort a release-upload session
    async fn update_release_status(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
        upload_id: &str,
        status: ReleaseStatus,
    ) -> Result<CommittedRelease, DistributeError>;

    /// Attach a committed release to a distribution group
    async fn publish_to_group(
        &self,
        token: &SecretString,
        release_url: &str,
        group: &str,
        release_notes: &str,
    ) -> Result<PublishedRelease, DistributeError>;
}
