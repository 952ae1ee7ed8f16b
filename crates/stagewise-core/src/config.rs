//! # Session Configuration

use crate::store::{ANONYMOUS_IDENTITY, key_with_fallback};
use serde::{Deserialize, Serialize};

/// Default store namespace for the persisted question pointer.
pub const DEFAULT_NAMESPACE: &str = "assessment_page";

/// Settings shared by every session created from one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix of every position key.
    pub namespace: String,
    /// Identity used in keys when no user is known.
    pub anonymous_identity: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            anonymous_identity: ANONYMOUS_IDENTITY.to_string(),
        }
    }
}

impl SessionConfig {
    /// Override the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Store key for a user under this configuration.
    #[must_use]
    pub fn key_for(&self, user: Option<&str>) -> String {
        key_with_fallback(&self.namespace, user, &self.anonymous_identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_store_key_format() {
        let config = SessionConfig::default();
        assert_eq!(config.key_for(Some("dana")), "assessment_page_dana");
        assert_eq!(config.key_for(None), "assessment_page_anonymous");
    }

    #[test]
    fn custom_namespace_and_anonymous_identity() {
        let config = SessionConfig {
            anonymous_identity: "guest".into(),
            ..SessionConfig::default().with_namespace("pulse_check")
        };
        assert_eq!(config.key_for(Some("")), "pulse_check_guest");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"namespace": "org_survey"}"#).expect("valid json");
        assert_eq!(config.anonymous_identity, ANONYMOUS_IDENTITY);
    }
}
