//! crates/transactions_core/src/error.rs
//!
//! Defines the error type surfaced by the translator.

use crate::format::FormatError;

/// The four distinguishable ways a translation can fail.
///
/// Every failure reaches the caller as one of these; nothing is silently
/// swallowed. The null-result self-check is the single locally recovered
/// condition and never surfaces as an error.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// The backend produced no usable instruction-compliant text.
    #[error("Query generation failed: {0}")]
    QueryGeneration(String),

    /// The embedded query was invalid, unsafe, or referenced unknown schema
    /// elements. Mutating statements land here without ever being executed.
    #[error("Query execution rejected: {0}")]
    QueryExecution(String),

    /// Transport or authentication failure reaching the generation backend.
    #[error("Generation backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend narrative was missing a required labeled section.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl TranslateError {
    /// A stable machine-readable tag for the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslateError::QueryGeneration(_) => "query_generation",
            TranslateError::QueryExecution(_) => "query_execution",
            TranslateError::BackendUnavailable(_) => "backend_unavailable",
            TranslateError::Format(_) => "format",
        }
    }
}
