//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use transactions_core::ports::LedgerStore;
use transactions_core::translator::Translator;

/// The shared application state, created once at startup and passed to all
/// handlers. The translator holds no mutable state, so one instance serves
/// every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub translator: Arc<Translator>,
    pub config: Arc<Config>,
}
