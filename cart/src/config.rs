//! Configuration for the storefront.
//!
//! Loaded from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Cart session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds a session may stay idle before `purge_expired` drops it
    pub session_ttl: u64,
}

impl SessionConfig {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            session_ttl: env::var("CART_SESSION_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_209_600), // 2 weeks
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl: 1_209_600,
        }
    }
}
