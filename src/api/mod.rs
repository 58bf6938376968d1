//! Distribution API client
//!
//! [`ApiClient`] implements each pipeline step as an inherent method in its
//! own module, and exposes them together through the
//! [`DistributionApi`] trait the orchestrator consumes.

pub mod committer;
pub mod publisher;
pub mod sessions;
pub mod transport;
pub mod uploader;

pub use transport::{API_BASE_URL, ApiClient, USER_AGENT};

use std::path::Path;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::core::error::DistributeError;
use crate::core::traits::{
    CommittedRelease, DistributionApi, PublishedRelease, ReleaseSession, ReleaseStatus,
    SymbolSession, UploadOutcome, UploadUrl,
};

#[async_trait]
impl DistributionApi for ApiClient {
    async fn create_release_session(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
    ) -> Result<ReleaseSession, DistributeError> {
        ApiClient::create_release_session(self, token, owner, app).await
    }

    async fn create_symbol_session(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
    ) -> Result<SymbolSession, DistributeError> {
        ApiClient::create_symbol_session(self, token, owner, app).await
    }

    async fn upload_binary(
        &self,
        token: &SecretString,
        upload_id: &str,
        upload_url: UploadUrl,
        file: &Path,
    ) -> Result<UploadOutcome, DistributeError> {
        ApiClient::upload_binary(self, token, upload_id, upload_url, file).await
    }

    async fn upload_symbols(
        &self,
        token: &SecretString,
        symbol_upload_id: &str,
        upload_url: UploadUrl,
        archive: &Path,
    ) -> Result<UploadOutcome, DistributeError> {
        ApiClient::upload_symbols(self, token, symbol_upload_id, upload_url, archive).await
    }

    async fn update_release_status(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
        upload_id: &str,
        status: ReleaseStatus,
    ) -> Result<CommittedRelease, DistributeError> {
        ApiClient::update_release_status(self, token, owner, app, upload_id, status).await
    }

    async fn publish_to_group(
        &self,
        token: &SecretString,
        release_url: &str,
        group: &str,
        release_notes: &str,
    ) -> Result<PublishedRelease, DistributeError> {
        ApiClient::publish_to_group(self, token, release_url, group, release_notes).await
    }
}
