//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::service::PayrollService;
use crate::storage::{InMemoryStore, PayrollStore};

/// Shared application state.
///
/// Holds the payroll service, which in turn shares the store and the loaded
/// pay schedule across all request handlers.
#[derive(Clone)]
pub struct AppState {
    service: PayrollService,
}

impl AppState {
    /// Creates application state over the given store and configuration.
    pub fn new(store: Arc<dyn PayrollStore>, config: ConfigLoader) -> Self {
        Self {
            service: PayrollService::new(store, config),
        }
    }

    /// Creates application state backed by a fresh in-memory store.
    pub fn in_memory(config: ConfigLoader) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), config)
    }

    /// Returns the payroll service.
    pub fn service(&self) -> &PayrollService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_in_memory_state_uses_config() {
        let state = AppState::in_memory(ConfigLoader::standard());
        assert_eq!(state.service().config().leave_policy().default_balance, 12);
    }
}
