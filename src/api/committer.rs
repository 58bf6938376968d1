//! Release committer: the commit/abort status transition
//!
//! Called exactly once per release-upload session, with the status chosen
//! solely by the preceding transfer outcome. Once issued the transition
//! cannot be retracted.

use secrecy::SecretString;
use serde_json::json;
use tracing::info;

use crate::api::transport::ApiClient;
use crate::core::error::DistributeError;
use crate::core::traits::{CommittedRelease, ReleaseStatus};

impl ApiClient {
    /// Commit or abort a release-upload session
    ///
    /// On commit the response carries the `release_url` the group publish
    /// step patches against.
    pub async fn update_release_status(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
        upload_id: &str,
        status: ReleaseStatus,
    ) -> Result<CommittedRelease, DistributeError> {
        info!(upload_id, status = status.as_str(), "updating release upload status");

        let path = format!("v0.1/apps/{owner}/{app}/release_uploads/{upload_id}");
        let response = self
            .patch_json(token, &path, &json!({ "status": status.as_str() }))
            .await?;

        let step = match status {
            ReleaseStatus::Committed => "commit release",
            ReleaseStatus::Aborted => "abort release",
        };
        if response.is_success() {
            // The abort response has no JSON content type; an empty
            // release_url is fine there because the result is discarded.
            if response.body().is_empty() {
                return Ok(CommittedRelease {
                    release_url: String::new(),
                });
            }
            serde_json::from_str(response.body()).map_err(|e| DistributeError::Remote {
                step: step.to_string(),
                status: response.status.as_u16(),
                body: format!("malformed JSON response ({e}): {}", response.body()),
            })
        } else {
            Err(DistributeError::Remote {
                step: step.to_string(),
                status: response.status.as_u16(),
                body: response.body().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> SecretString {
        SecretString::new("xxx".into())
    }

    #[tokio::test]
    async fn test_commit_returns_release_url() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v0.1/apps/owner/app/release_uploads/upload_id"))
            .and(header("X-API-Token", "xxx"))
            .and(body_json(serde_json::json!({ "status": "committed" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"release_url":"v0.1/apps/owner/app/releases/1"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;
        let client = ApiClient::with_base_url(&server.uri());

        let release = client
            .update_release_status(
                &token(),
                "owner",
                "app",
                "upload_id",
                ReleaseStatus::Committed,
            )
            .await
            .unwrap();

        assert_eq!(release.release_url, "v0.1/apps/owner/app/releases/1");
    }

    #[tokio::test]
    async fn test_abort_tolerates_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(body_json(serde_json::json!({ "status": "aborted" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = ApiClient::with_base_url(&server.uri());

        let release = client
            .update_release_status(&token(), "owner", "app", "u1", ReleaseStatus::Aborted)
            .await
            .unwrap();

        assert!(release.release_url.is_empty());
    }

    #[tokio::test]
    async fn test_non_2xx_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let client = ApiClient::with_base_url(&server.uri());

        let error = client
            .update_release_status(&token(), "owner", "app", "u1", ReleaseStatus::Committed)
            .await
            .unwrap_err();

        assert_eq!(error.code(), "REMOTE_ERROR");
        assert!(error.to_string().contains("commit release"));
    }
}
