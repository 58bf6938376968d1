//! Artifact uploader: streaming binaries and symbol archives
//!
//! Transfers go to the session's one-time upload URL, not the API host, and
//! carry the legacy `X-HockeyAppToken` header the upload endpoints still
//! expect. A rejected transfer is an [`UploadOutcome::Failure`], never an
//! `Err`: whether that aborts the release (binary) or is only a warning
//! (symbols) is the orchestrator's call.

use std::path::Path;

use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::api::transport::{ApiClient, ApiResponse, UPLOAD_TOKEN_HEADER};
use crate::core::error::DistributeError;
use crate::core::traits::{UploadOutcome, UploadUrl};

/// Part name for the binary, reused for both packaging formats by the wire
/// protocol
const BINARY_PART_NAME: &str = "ipa";

/// Part name for the symbol archive
const SYMBOL_PART_NAME: &str = "dsym";

impl ApiClient {
    /// Stream the release binary to its one-time upload URL
    ///
    /// Consumes the [`UploadUrl`], so the session cannot be uploaded to
    /// twice.
    pub async fn upload_binary(
        &self,
        token: &SecretString,
        upload_id: &str,
        upload_url: UploadUrl,
        file: &Path,
    ) -> Result<UploadOutcome, DistributeError> {
        info!(upload_id, file = %file.display(), "uploading release binary");
        self.upload_artifact(token, upload_id, upload_url, file, BINARY_PART_NAME)
            .await
    }

    /// Stream the symbol archive to the symbol session's one-time upload URL
    pub async fn upload_symbols(
        &self,
        token: &SecretString,
        symbol_upload_id: &str,
        upload_url: UploadUrl,
        archive: &Path,
    ) -> Result<UploadOutcome, DistributeError> {
        info!(symbol_upload_id, archive = %archive.display(), "uploading symbol archive");
        self.upload_artifact(token, symbol_upload_id, upload_url, archive, SYMBOL_PART_NAME)
            .await
    }

    async fn upload_artifact(
        &self,
        token: &SecretString,
        upload_id: &str,
        upload_url: UploadUrl,
        file: &Path,
        part_name: &str,
    ) -> Result<UploadOutcome, DistributeError> {
        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("artifact")
            .to_string();

        // The handle is owned by the request body and closed once the
        // transfer returns, on both success and failure paths.
        let handle = tokio::fs::File::open(file).await?;
        let part = multipart::Part::stream(reqwest::Body::wrap_stream(ReaderStream::new(handle)))
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new()
            .text("upload_id", upload_id.to_string())
            .part(part_name.to_string(), part);

        let response = self
            .http
            .post(upload_url.into_inner())
            .header(UPLOAD_TOKEN_HEADER, token.expose_secret())
            .multipart(form)
            .send()
            .await?;
        let response = ApiResponse::read(response).await?;

        if response.is_success() {
            Ok(UploadOutcome::Success)
        } else {
            Ok(UploadOutcome::Failure {
                status: response.status.as_u16(),
                body: response.body().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> SecretString {
        SecretString::new("xxx".into())
    }

    fn binary_fixture() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("app.apk");
        std::fs::write(&file, b"binary-bytes").unwrap();
        (dir, file)
    }

    #[tokio::test]
    async fn test_upload_binary_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("X-HockeyAppToken", "xxx"))
            .and(body_string_contains("upload_id"))
            .and(body_string_contains("u1"))
            .and(body_string_contains("binary-bytes"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, file) = binary_fixture();
        let client = ApiClient::new();
        let outcome = client
            .upload_binary(&token(), "u1", UploadUrl::new(server.uri()), &file)
            .await
            .unwrap();

        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_upload_binary_non_2xx_is_failure_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad package"))
            .mount(&server)
            .await;

        let (_dir, file) = binary_fixture();
        let client = ApiClient::new();
        let outcome = client
            .upload_binary(&token(), "u1", UploadUrl::new(server.uri()), &file)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            UploadOutcome::Failure {
                status: 400,
                body: "bad package".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_binary_missing_file_is_io_error() {
        let client = ApiClient::new();
        let error = client
            .upload_binary(
                &token(),
                "u1",
                UploadUrl::new("https://upload.invalid"),
                Path::new("./nothing.apk"),
            )
            .await
            .unwrap_err();

        assert_eq!(error.code(), "IO_ERROR");
    }

    #[tokio::test]
    async fn test_upload_symbols_uses_symbol_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("dsym"))
            .and(body_string_contains("s1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let archive = dir.path().join("symbols.zip");
        std::fs::write(&archive, b"zip-bytes").unwrap();

        let client = ApiClient::new();
        let outcome = client
            .upload_symbols(&token(), "s1", UploadUrl::new(server.uri()), &archive)
            .await
            .unwrap();

        assert!(outcome.is_success());
    }
}
