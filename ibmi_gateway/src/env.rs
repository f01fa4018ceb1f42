//! Environment abstraction for testability.
//!
//! Configuration is the only place the gateway touches ambient process
//! state; routing that single concern through the [`Environment`] trait
//! keeps every test free of real env-var mutation.

use std::collections::HashMap;

/// Abstracts environment-variable access.
///
/// The real application uses [`RealEnvironment`]; tests inject
/// [`MockEnvironment`].
pub trait Environment: Send + Sync {
    /// Read an environment variable.
    fn var(&self, key: &str) -> Option<String>;
}

/// Production [`Environment`] backed by the real process environment.
pub struct RealEnvironment;

impl Environment for RealEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fully in-memory [`Environment`] for sandboxed testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnvironment {
    pub env_vars: HashMap<String, String>,
}

impl MockEnvironment {
    #[must_use]
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MockEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.env_vars.get(key).cloned()
    }
}
