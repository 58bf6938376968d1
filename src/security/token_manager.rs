//! Secure token manager with memory-safe handling and masking capabilities
//!
//! The API token is the only credential in the pipeline. This module
//! resolves it from the environment, wraps it in `secrecy` so it cannot leak
//! through debug output, and masks it in any text that gets logged.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::env;

/// Environment variables the token is resolved from, first match wins
///
/// The second name is the legacy one kept for existing CI configurations.
const TOKEN_ENV_VARS: &[&str] = &["APPCENTER_API_TOKEN", "MOBILE_CENTER_API_TOKEN"];

/// Secure token manager for distribution API authentication
#[derive(Debug, Default)]
pub struct SecureTokenManager;

impl SecureTokenManager {
    /// Creates a new SecureTokenManager
    pub fn new() -> Self {
        Self
    }

    /// Resolve the API token from the environment
    ///
    /// Returns `None` when no known variable is set or the value is empty.
    pub fn token_from_env(&self) -> Option<SecretString> {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.is_empty())
            .map(|value| SecretString::new(value.into()))
    }

    /// Environment variable names checked by [`token_from_env`](Self::token_from_env)
    pub fn env_var_names(&self) -> &'static [&'static str] {
        TOKEN_ENV_VARS
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification.
    /// Tokens shorter than 10 characters are fully masked as "****".
    pub fn mask_token(&self, token: &str) -> String {
        if token.is_empty() || token.len() < 10 {
            return "****".to_string();
        }

        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }

    /// Masks every occurrence of the token in a string
    ///
    /// Used before echoing request details or error bodies that could have
    /// the token interpolated into them.
    pub fn mask_token_in_string(&self, text: &str, token: &SecretString) -> String {
        let token_str = token.expose_secret();
        if token_str.is_empty() {
            return text.to_string();
        }

        match Regex::new(&regex::escape(token_str)) {
            Ok(pattern) => pattern
                .replace_all(text, self.mask_token(token_str).as_str())
                .to_string(),
            Err(_) => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the env vars so parallel tests cannot race on them.
    #[test]
    fn test_token_from_env_resolution() {
        let manager = SecureTokenManager::new();

        unsafe {
            env::set_var("APPCENTER_API_TOKEN", "current-token-123");
            env::set_var("MOBILE_CENTER_API_TOKEN", "legacy-token-123");
        }
        let token = manager.token_from_env().unwrap();
        assert_eq!(token.expose_secret(), "current-token-123");

        // Empty current name falls through to the legacy one
        unsafe {
            env::set_var("APPCENTER_API_TOKEN", "");
        }
        let token = manager.token_from_env().unwrap();
        assert_eq!(token.expose_secret(), "legacy-token-123");

        unsafe {
            env::remove_var("APPCENTER_API_TOKEN");
            env::remove_var("MOBILE_CENTER_API_TOKEN");
        }
        assert!(manager.token_from_env().is_none());
    }

    #[test]
    fn test_mask_token_with_short_token() {
        let manager = SecureTokenManager::new();
        assert_eq!(manager.mask_token("short"), "****");
        assert_eq!(manager.mask_token(""), "****");
    }

    #[test]
    fn test_mask_token_with_long_token() {
        let manager = SecureTokenManager::new();
        assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    }

    #[test]
    fn test_mask_token_in_string() {
        let manager = SecureTokenManager::new();
        let token = SecretString::new("secret-api-token-12345".into());

        let output =
            manager.mask_token_in_string("sending with token secret-api-token-12345", &token);

        assert!(output.contains("sec...345"));
        assert!(!output.contains("secret-api-token-12345"));
    }

    #[test]
    fn test_mask_token_in_string_without_match() {
        let manager = SecureTokenManager::new();
        let token = SecretString::new("secret-api-token-12345".into());

        let input = "nothing sensitive here";
        assert_eq!(manager.mask_token_in_string(input, &token), input);
    }
}
