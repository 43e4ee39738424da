//! crates/transactions_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or language-model APIs.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{QueryOutput, TransactionRecord};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Errors surfaced by a `LedgerStore` implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The query referenced a table or column the schema does not declare.
    #[error("Unknown schema element: {0}")]
    UnknownSchema(String),
    /// The store itself could not be reached or the connection failed.
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected store error occurred: {0}")]
    Unexpected(String),
}

/// Errors surfaced by a `GenerationBackend` implementation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport or authentication failure reaching the backend.
    #[error("Generation backend unreachable: {0}")]
    Unavailable(String),
    /// The backend answered but produced no usable text.
    #[error("Generation backend returned no text")]
    EmptyCompletion,
    #[error("An unexpected backend error occurred: {0}")]
    Unexpected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type BackendResult<T> = Result<T, BackendError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read-only access to the transactions ledger.
///
/// The translator never writes; implementations are free to reject anything
/// that is not a plain query.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Executes one already-validated read-only statement and returns its
    /// dynamically-typed result set.
    async fn run_select(&self, sql: &str) -> StoreResult<QueryOutput>;

    /// All ledger rows, ordered by invoice date descending.
    async fn list_transactions(&self) -> StoreResult<Vec<TransactionRecord>>;

    /// Rows whose due date falls inside `[today, today + days]`, ordered by
    /// due date ascending. Used for the due-soon reminder in Advice.
    async fn due_within(&self, today: NaiveDate, days: i64) -> StoreResult<Vec<TransactionRecord>>;
}

/// The natural-language generation backend.
///
/// One instruction text in, one narrative text out; transport, credentials
/// and model selection are the implementation's concern.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> BackendResult<String>;
}
