//! Interceptor configuration

use serde::{Deserialize, Serialize};

/// What load/store do with targets missing from the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnregisteredPolicy {
    /// Fail the whole call before touching any target
    #[default]
    Strict,
    /// Log, skip the target, continue with the rest
    Tolerant,
}

/// What registration does with sites the factory declines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedPolicy {
    /// Log and leave the site unbound
    #[default]
    Skip,
    /// Fail registration
    Reject,
}

/// Interceptor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterceptorConfig {
    /// Unregistered target handling
    #[serde(default)]
    pub unregistered: UnregisteredPolicy,

    /// Declined site handling
    #[serde(default)]
    pub unsupported: UnsupportedPolicy,
}

impl InterceptorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that skips unregistered targets
    #[inline]
    #[must_use]
    pub fn tolerant() -> Self {
        Self::new().with_unregistered(UnregisteredPolicy::Tolerant)
    }

    /// With unregistered target policy
    #[inline]
    #[must_use]
    pub fn with_unregistered(mut self, policy: UnregisteredPolicy) -> Self {
        self.unregistered = policy;
        self
    }

    /// With declined site policy
    #[inline]
    #[must_use]
    pub fn with_unsupported(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_and_skip() {
        let config = InterceptorConfig::new();
        assert_eq!(config.unregistered, UnregisteredPolicy::Strict);
        assert_eq!(config.unsupported, UnsupportedPolicy::Skip);
    }

    #[test]
    fn builders() {
        let config = InterceptorConfig::tolerant().with_unsupported(UnsupportedPolicy::Reject);
        assert_eq!(config.unregistered, UnregisteredPolicy::Tolerant);
        assert_eq!(config.unsupported, UnsupportedPolicy::Reject);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: InterceptorConfig = serde_json::from_str(r#"{"unregistered": "tolerant"}"#).unwrap();
        assert_eq!(config.unregistered, UnregisteredPolicy::Tolerant);
        assert_eq!(config.unsupported, UnsupportedPolicy::Skip);
    }
}
