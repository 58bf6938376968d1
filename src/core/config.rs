//! Pipeline input configuration and validation
//!
//! One [`DistributeConfig`] describes a single pipeline run and is immutable
//! for its duration. Validation mirrors the checks the distribution service
//! would otherwise reject remotely: required fields must be non-empty, the
//! artifact must exist on disk and carry one of the accepted packaging
//! formats.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::core::error::DistributeError;

/// Release notes used when neither explicit notes nor a changelog are given
pub const DEFAULT_RELEASE_NOTES: &str = "No release notes provided.";

/// Accepted packaging formats for the release binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    /// Android application package (`.apk`)
    Apk,
    /// iOS application archive (`.ipa`)
    Ipa,
}

impl BinaryKind {
    /// Determine the packaging format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("apk") => Some(Self::Apk),
            Some(ext) if ext.eq_ignore_ascii_case("ipa") => Some(Self::Ipa),
            _ => None,
        }
    }
}

/// Input for one distribution pipeline run
#[derive(Debug, Clone)]
pub struct DistributeConfig {
    /// API token for the distribution service
    pub api_token: SecretString,

    /// Owner (user or organization) the app belongs to
    pub owner_name: String,

    /// App name as registered with the distribution service
    pub app_name: String,

    /// Path to the release binary (.apk or .ipa)
    pub file: PathBuf,

    /// Optional path to a zipped debug-symbol archive, uploaded
    /// best-effort alongside iOS binaries
    pub dsym: Option<PathBuf>,

    /// Distribution group that receives the release
    pub group: String,

    /// Explicit release notes
    pub release_notes: Option<String>,

    /// Previously generated changelog, used when no explicit notes are given
    pub changelog: Option<String>,

    /// Dump response bodies at debug level
    pub verbose: bool,
}

impl DistributeConfig {
    /// Validate all inputs before any network call is made
    pub fn validate(&self) -> Result<(), DistributeError> {
        if self.api_token.expose_secret().is_empty() {
            return Err(invalid("No API token given, pass using --api-token"));
        }
        if self.owner_name.is_empty() {
            return Err(invalid("No owner name given, pass using --owner-name"));
        }
        if self.app_name.is_empty() {
            return Err(invalid("No app name given, pass using --app-name"));
        }
        if self.group.is_empty() {
            return Err(invalid(
                "No distribution group given, pass using --group",
            ));
        }

        if !self.file.exists() {
            return Err(invalid(&format!(
                "Couldn't find build file at path '{}'",
                self.file.display()
            )));
        }
        if BinaryKind::from_path(&self.file).is_none() {
            let ext = self
                .file
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            return Err(invalid(&format!(
                "Only \".apk\" and \".ipa\" formats are allowed, you provided \"{ext}\""
            )));
        }

        if let Some(dsym) = &self.dsym
            && !dsym.exists()
        {
            return Err(invalid(&format!(
                "Couldn't find symbol archive at path '{}'",
                dsym.display()
            )));
        }

        Ok(())
    }

    /// Packaging format of the release binary
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded.
    pub fn binary_kind(&self) -> Option<BinaryKind> {
        BinaryKind::from_path(&self.file)
    }

    /// Whether a symbol session should be created for this run
    ///
    /// Symbols are only accepted for iOS binaries.
    pub fn wants_symbol_upload(&self) -> bool {
        self.dsym.is_some() && self.binary_kind() == Some(BinaryKind::Ipa)
    }

    /// Release notes to send with the group publish call
    ///
    /// Falls back to the recorded changelog, then to a fixed placeholder.
    pub fn effective_release_notes(&self) -> &str {
        self.release_notes
            .as_deref()
            .or(self.changelog.as_deref())
            .unwrap_or(DEFAULT_RELEASE_NOTES)
    }
}

fn invalid(message: &str) -> DistributeError {
    DistributeError::InvalidInput {
        message: message.to_string(),
    }
}
