//! Session manager: minting upload sessions against the distribution API
//!
//! Each session is a short-lived identifier plus a one-time upload URL. A
//! fresh session is created on every pipeline run, which is what makes
//! re-invoking the whole pipeline safe.

use secrecy::SecretString;
use serde_json::json;
use tracing::info;

use crate::api::transport::{ApiClient, ApiResponse};
use crate::core::error::DistributeError;
use crate::core::traits::{ReleaseSession, SymbolSession};

impl ApiClient {
    /// Create a release-upload session, yielding its id and one-time URL
    ///
    /// 401 means the token was rejected, 404 means the owner or app does not
    /// exist; both halt the pipeline before any upload is attempted.
    pub async fn create_release_session(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
    ) -> Result<ReleaseSession, DistributeError> {
        info!(owner, app, "creating release upload session");

        let path = format!("v0.1/apps/{owner}/{app}/release_uploads");
        let response = self.post_json(token, &path, &json!({})).await?;

        map_session_response(response, owner, app, "create release session")
    }

    /// Create a symbol-upload session for an iOS binary's debug symbols
    pub async fn create_symbol_session(
        &self,
        token: &SecretString,
        owner: &str,
        app: &str,
    ) -> Result<SymbolSession, DistributeError> {
        info!(owner, app, "creating symbol upload session");

        let path = format!("v0.1/apps/{owner}/{app}/symbol_uploads");
        let response = self
            .post_json(token, &path, &json!({ "symbol_type": "Apple" }))
            .await?;

        map_session_response(response, owner, app, "create symbol session")
    }
}

fn map_session_response<T: serde::de::DeserializeOwned>(
    response: ApiResponse,
    owner: &str,
    app: &str,
    step: &str,
) -> Result<T, DistributeError> {
    if response.is_success() {
        return response.json(step);
    }

    match response.status.as_u16() {
        401 => Err(DistributeError::Auth),
        404 => Err(DistributeError::NotFound {
            resource: format!("owner '{owner}' or app '{app}'"),
        }),
        status => Err(DistributeError::Remote {
            step: step.to_string(),
            status,
            body: response.body().to_string(),
        }),
    }
}
