//! crates/transactions_core/src/translator.rs
//!
//! The natural-language query translator. One invocation renders the policy,
//! obtains narrative text from the generation backend, gates and executes the
//! embedded query against the ledger store, and assembles the three-section
//! answer.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::domain::{QueryOutput, TransactionRecord, TranslationResult};
use crate::error::TranslateError;
use crate::format::format_answer;
use crate::policy::{QueryPolicy, DUE_SOON_HORIZON_DAYS};
use crate::ports::{BackendError, GenerationBackend, LedgerStore};
use crate::sql;

/// One backend round trip: the raw narrative, the query pulled out of it,
/// and the live execution result.
struct Attempt {
    raw: String,
    sql: String,
    output: QueryOutput,
}

/// Translates free-text inquiries about the ledger into executed SQLite
/// queries and structured answers.
///
/// Holds no mutable state; every invocation is independent, so concurrent
/// callers are safe even though the reference flow is one inquiry at a time.
pub struct Translator {
    policy: QueryPolicy,
    backend: Arc<dyn GenerationBackend>,
    store: Arc<dyn LedgerStore>,
}

impl Translator {
    pub fn new(
        policy: QueryPolicy,
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            policy,
            backend,
            store,
        }
    }

    /// Answers one inquiry. `now` must carry explicit zone information; it
    /// bounds any date filters the backend derives and anchors the due-soon
    /// reminder.
    ///
    /// Issues one backend call, plus exactly one more if the first execution
    /// yields a lone null scalar. The live execution result is authoritative:
    /// when the backend's Response disagrees with it, the rendering of the
    /// real result replaces the section body.
    pub async fn translate(
        &self,
        inquiry: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<TranslationResult, TranslateError> {
        let inquiry = inquiry.trim();
        if inquiry.is_empty() {
            return Err(TranslateError::QueryGeneration(
                "inquiry must not be empty".to_string(),
            ));
        }

        let prompt = self.policy.render(&now, inquiry);
        info!(policy_version = self.policy.version(), "Submitting inquiry to generation backend");

        let mut attempt = self.attempt(&prompt).await?;
        if attempt.output.is_null_scalar() {
            warn!(sql = %attempt.sql, "Query yielded a lone null scalar; re-deriving once");
            attempt = self.attempt(&prompt).await?;
        }

        let mut result = format_answer(&attempt.raw)?;

        let rendered = attempt.output.render();
        if !result.response.contains(&rendered) {
            info!("Backend response disagreed with live execution; substituting real result");
            result.response = rendered;
        }

        self.append_due_soon_reminder(&mut result, now).await?;

        Ok(result)
    }

    /// One full generation/extraction/validation/execution round trip.
    async fn attempt(&self, prompt: &str) -> Result<Attempt, TranslateError> {
        let raw = self.backend.complete(prompt).await.map_err(|e| match e {
            BackendError::EmptyCompletion => {
                TranslateError::QueryGeneration("backend returned no text".to_string())
            }
            BackendError::Unavailable(msg) | BackendError::Unexpected(msg) => {
                TranslateError::BackendUnavailable(msg)
            }
        })?;
        if raw.trim().is_empty() {
            return Err(TranslateError::QueryGeneration(
                "backend returned empty text".to_string(),
            ));
        }

        let sql = sql::extract_query(&raw).ok_or_else(|| {
            TranslateError::QueryGeneration("no query found in backend output".to_string())
        })?;
        sql::validate_read_only(&sql).map_err(TranslateError::QueryExecution)?;
        info!(sql = %sql, "Executing embedded query");

        let output = self
            .store
            .run_select(&sql)
            .await
            .map_err(|e| TranslateError::QueryExecution(e.to_string()))?;

        Ok(Attempt { raw, sql, output })
    }

    /// Appends a deterministic due-date proximity reminder for invoices due
    /// within the policy horizon, unless the backend's Advice already names
    /// every such invoice.
    async fn append_due_soon_reminder(
        &self,
        result: &mut TranslationResult,
        now: DateTime<FixedOffset>,
    ) -> Result<(), TranslateError> {
        let today = now.date_naive();
        let due_soon = self
            .store
            .due_within(today, DUE_SOON_HORIZON_DAYS)
            .await
            .map_err(|e| TranslateError::QueryExecution(e.to_string()))?;

        let unmentioned: Vec<&TransactionRecord> = due_soon
            .iter()
            .filter(|record| !result.advice.contains(&record.invoice_number))
            .collect();
        if unmentioned.is_empty() {
            return Ok(());
        }

        let listing = unmentioned
            .iter()
            .map(|record| {
                let days_left = (record.due_date - today).num_days();
                format!(
                    "{} ({}, due {} in {} day{})",
                    record.invoice_number,
                    record.customer_name,
                    record.due_date,
                    days_left,
                    if days_left == 1 { "" } else { "s" }
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        let reminder = format!(
            "Reminder: the following invoices are due within {} days: {}.",
            DUE_SOON_HORIZON_DAYS, listing
        );

        if result.advice.is_empty() {
            result.advice = reminder;
        } else {
            result.advice.push_str("<br>");
            result.advice.push_str(&reminder);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
