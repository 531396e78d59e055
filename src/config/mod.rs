//! Configuration module
//!
//! This module handles settings loading and the provider credential.
//! The credential is passed explicitly through the build chain and is
//! never persisted.

pub mod storage;

use crate::error::{Result, SqlChatError};
use std::fmt;

pub use storage::Settings;

/// Environment variable that may pre-seed the credential prompt
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model-provider API key
///
/// `Debug` and `Display` never reveal the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Create a credential, rejecting blank input
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(SqlChatError::CredentialMissing);
        }
        Ok(Self(key))
    }

    /// Read a credential from `OPENAI_API_KEY`, if set and non-blank
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .and_then(|value| Self::new(value).ok())
    }

    /// Borrow the raw key for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for display (first and last four characters)
    pub fn masked(&self) -> String {
        let key = &self.0;
        let chars: Vec<char> = key.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_is_missing() {
        assert!(matches!(
            Credential::new("   "),
            Err(SqlChatError::CredentialMissing)
        ));
        assert!(matches!(
            Credential::new(""),
            Err(SqlChatError::CredentialMissing)
        ));
    }

    #[test]
    fn test_credential_is_trimmed() {
        let credential = Credential::new("  sk-test-1234  ").unwrap();
        assert_eq!(credential.expose(), "sk-test-1234");
    }

    #[test]
    fn test_credential_never_printed() {
        let credential = Credential::new("sk-abcdefghijklmnop").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("abcdefgh"));
        assert_eq!(credential.to_string(), "sk-a...mnop");
        assert_eq!(Credential::new("short").unwrap().masked(), "***");
    }
}
