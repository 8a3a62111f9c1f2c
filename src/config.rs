//! Process-global configuration.
//!
//! The global configuration is consulted only when issues are finalized, so
//! changing it never affects the behaviour of validation itself, only the
//! messages attached to the resulting issues.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::ErrorMap;

/// Settings shared by every parse in the process.
#[derive(Clone, Default)]
pub struct GlobalConfig {
    /// Lowest-priority custom message resolver, consulted after node,
    /// check and per-call error maps.
    pub custom_error: Option<ErrorMap>,
}

impl GlobalConfig {
    pub fn with_custom_error<F>(mut self, map: F) -> Self
    where
        F: Fn(&crate::error::RawIssue) -> Option<String> + Send + Sync + 'static,
    {
        self.custom_error = Some(Arc::new(map));
        self
    }
}

impl std::fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("custom_error", &self.custom_error.is_some())
            .finish()
    }
}

static GLOBAL: RwLock<GlobalConfig> = parking_lot::const_rwlock(GlobalConfig { custom_error: None });

/// Replaces the global configuration.
pub fn configure(config: GlobalConfig) {
    tracing::debug!(custom_error = config.custom_error.is_some(), "global config replaced");
    *GLOBAL.write() = config;
}

/// Restores the default global configuration.
pub fn reset() {
    *GLOBAL.write() = GlobalConfig::default();
}

/// Read access to the global configuration.
pub fn global() -> RwLockReadGuard<'static, GlobalConfig> {
    GLOBAL.read()
}
