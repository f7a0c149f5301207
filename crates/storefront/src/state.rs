//! Shared application state.
//!
//! Handlers only see the `TableStore` trait object, so they behave the same
//! whichever backend was selected at startup.

use std::sync::Arc;

use storefront_core::storage::TableStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active record store (JSON files, MySQL, or MySQL with JSON fallback).
    pub store: Arc<dyn TableStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Name of the active backend, for health reporting.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}
