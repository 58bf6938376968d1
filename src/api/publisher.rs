//! Group publisher: attaching a committed release to a distribution group
//!
//! Patches the server-supplied `release_url` directly; the path is never
//! re-derived from owner and app names.

use secrecy::SecretString;
use serde_json::json;
use tracing::info;

use crate::api::transport::ApiClient;
use crate::core::error::DistributeError;
use crate::core::traits::PublishedRelease;

impl ApiClient {
    /// Attach a committed release to a named distribution group
    ///
    /// Returns the full release metadata; `download_url` and `short_version`
    /// are lifted into typed fields. 404 means the group name is unknown.
    pub async fn publish_to_group(
        &self,
        token: &SecretString,
        release_url: &str,
        group: &str,
        release_notes: &str,
    ) -> Result<PublishedRelease, DistributeError> {
        info!(release_url, group, "adding release to distribution group");

        let body = json!({
            "distribution_group_name": group,
            "release_notes": release_notes,
        });
        let response = self.patch_json(token, release_url, &body).await?;

        if response.is_success() {
            let release: PublishedRelease = response.json("publish to group")?;
            info!(
                short_version = %release.short_version,
                "release was successfully distributed"
            );
            return Ok(release);
        }

        match response.status.as_u16() {
            404 => Err(DistributeError::NotFound {
                resource: format!("distribution group '{group}'"),
            }),
            status => Err(DistributeError::Remote {
                step: "publish to group".to_string(),
                status,
                body: response.body().to_string(),
            }),
        }
    }
}
