//! Translator behavior tests against scripted port implementations.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use transactions_core::domain::{QueryOutput, SqlValue, TransactionRecord};
use transactions_core::error::TranslateError;
use transactions_core::policy::QueryPolicy;
use transactions_core::ports::{
    BackendError, BackendResult, GenerationBackend, LedgerStore, StoreResult,
};
use transactions_core::translator::Translator;

//=========================================================================================
// Scripted Port Implementations
//=========================================================================================

/// A backend that replays a fixed sequence of replies and counts calls.
struct ScriptedBackend {
    replies: Mutex<VecDeque<BackendResult<String>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(replies: Vec<BackendResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn complete(&self, _prompt: &str) -> BackendResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::EmptyCompletion))
    }
}

/// A store that replays canned query outputs and records every executed
/// statement.
struct CannedStore {
    outputs: Mutex<VecDeque<StoreResult<QueryOutput>>>,
    executed: Mutex<Vec<String>>,
    due_soon: Vec<TransactionRecord>,
}

impl CannedStore {
    fn new(outputs: Vec<StoreResult<QueryOutput>>) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.into()),
            executed: Mutex::new(Vec::new()),
            due_soon: Vec::new(),
        })
    }

    fn with_due_soon(
        outputs: Vec<StoreResult<QueryOutput>>,
        due_soon: Vec<TransactionRecord>,
    ) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.into()),
            executed: Mutex::new(Vec::new()),
            due_soon,
        })
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("executed lock").clone()
    }
}

#[async_trait]
impl LedgerStore for CannedStore {
    async fn run_select(&self, sql: &str) -> StoreResult<QueryOutput> {
        self.executed
            .lock()
            .expect("executed lock")
            .push(sql.to_string());
        self.outputs
            .lock()
            .expect("outputs lock")
            .pop_front()
            .unwrap_or_else(|| Ok(scalar(SqlValue::Null)))
    }

    async fn list_transactions(&self) -> StoreResult<Vec<TransactionRecord>> {
        Ok(Vec::new())
    }

    async fn due_within(
        &self,
        _today: NaiveDate,
        _days: i64,
    ) -> StoreResult<Vec<TransactionRecord>> {
        Ok(self.due_soon.clone())
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn now() -> DateTime<FixedOffset> {
    "2024-02-05T09:00:00+00:00".parse().expect("fixed timestamp")
}

fn scalar(value: SqlValue) -> QueryOutput {
    QueryOutput {
        columns: vec!["value".to_string()],
        rows: vec![vec![value]],
    }
}

fn reply(sql: &str, response: &str) -> String {
    format!(
        "Query: {}\nResponse: {}\nExplanation: Ran the query against the ledger.\nAdvice: Keep an eye on upcoming due dates.",
        sql, response
    )
}

fn record(invoice_number: &str, due_date: &str) -> TransactionRecord {
    TransactionRecord {
        id: 1,
        category: "Green".to_string(),
        customer_name: "Acme Corp".to_string(),
        customer_number: "C-100".to_string(),
        invoice_number: invoice_number.to_string(),
        invoice_amount: 250.0,
        invoice_date: "2024-01-20".parse().expect("date"),
        due_date: due_date.parse().expect("date"),
        forecast_code: "AUTO".to_string(),
        forecast_date: "2024-02-15".parse().expect("date"),
        collector: "John".to_string(),
    }
}

fn translator(
    backend: Arc<ScriptedBackend>,
    store: Arc<CannedStore>,
) -> Translator {
    Translator::new(QueryPolicy::for_ledger(), backend, store)
}

const COUNT_SQL: &str = "SELECT COUNT(*) FROM transactions";

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn agreement_keeps_backend_narrative() {
    let backend = ScriptedBackend::new(vec![Ok(reply(
        COUNT_SQL,
        "There are 3 open invoices.",
    ))]);
    let store = CannedStore::new(vec![Ok(scalar(SqlValue::Integer(3)))]);
    let result = translator(backend.clone(), store.clone())
        .translate("How many open invoices are there?", now())
        .await
        .expect("translation");

    assert_eq!(result.response, "There are 3 open invoices.");
    assert_eq!(backend.call_count(), 1);
    assert_eq!(store.executed(), vec![COUNT_SQL.to_string()]);
}

#[tokio::test]
async fn disagreement_substitutes_live_result() {
    let backend = ScriptedBackend::new(vec![Ok(reply(
        "SELECT AVG(invoice_amount) FROM transactions WHERE category = 'Green'",
        "The average is 150.",
    ))]);
    let store = CannedStore::new(vec![Ok(scalar(SqlValue::Real(200.0)))]);
    let result = translator(backend, store)
        .translate("What is the average invoice amount for Green?", now())
        .await
        .expect("translation");

    assert_eq!(result.response, "200");
}

#[tokio::test]
async fn null_scalar_triggers_exactly_one_retry() {
    let text = reply(
        "SELECT MAX(invoice_amount) FROM transactions WHERE category = 'Green'",
        "No result.",
    );
    let backend = ScriptedBackend::new(vec![Ok(text.clone()), Ok(text)]);
    let store = CannedStore::new(vec![
        Ok(scalar(SqlValue::Null)),
        Ok(scalar(SqlValue::Null)),
    ]);
    let result = translator(backend.clone(), store.clone())
        .translate("What is the highest Green invoice?", now())
        .await
        .expect("translation");

    // A second consecutive null is accepted and surfaced, not retried again.
    assert_eq!(backend.call_count(), 2);
    assert_eq!(store.executed().len(), 2);
    assert_eq!(result.response, "NULL");
}

#[tokio::test]
async fn non_null_result_is_not_retried() {
    let backend = ScriptedBackend::new(vec![Ok(reply(COUNT_SQL, "0"))]);
    let store = CannedStore::new(vec![Ok(scalar(SqlValue::Integer(0)))]);
    translator(backend.clone(), store)
        .translate("How many open invoices are there?", now())
        .await
        .expect("translation");

    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn mutating_statement_is_rejected_without_execution() {
    let backend = ScriptedBackend::new(vec![Ok(reply(
        "DELETE FROM transactions",
        "Deleted everything.",
    ))]);
    let store = CannedStore::new(vec![]);
    let err = translator(backend, store.clone())
        .translate("Clear the ledger", now())
        .await
        .expect_err("must be rejected");

    assert!(matches!(err, TranslateError::QueryExecution(_)));
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn missing_section_is_a_format_error() {
    let backend = ScriptedBackend::new(vec![Ok(format!(
        "Query: {}\nResponse: 3\nExplanation: Counted the rows.",
        COUNT_SQL
    ))]);
    let store = CannedStore::new(vec![Ok(scalar(SqlValue::Integer(3)))]);
    let err = translator(backend, store)
        .translate("How many open invoices are there?", now())
        .await
        .expect_err("missing Advice section");

    assert!(matches!(err, TranslateError::Format(_)));
}

#[tokio::test]
async fn prose_without_query_is_a_generation_error() {
    let backend = ScriptedBackend::new(vec![Ok(
        "Response: I cannot help with that.\nExplanation: n/a\nAdvice: n/a".to_string(),
    )]);
    let store = CannedStore::new(vec![]);
    let err = translator(backend, store)
        .translate("How many open invoices are there?", now())
        .await
        .expect_err("no query present");

    assert!(matches!(err, TranslateError::QueryGeneration(_)));
}

#[tokio::test]
async fn backend_outage_surfaces_as_unavailable() {
    let backend = ScriptedBackend::new(vec![Err(BackendError::Unavailable(
        "connection refused".to_string(),
    ))]);
    let store = CannedStore::new(vec![]);
    let err = translator(backend, store)
        .translate("How many open invoices are there?", now())
        .await
        .expect_err("backend down");

    assert!(matches!(err, TranslateError::BackendUnavailable(_)));
}

#[tokio::test]
async fn empty_inquiry_is_rejected_before_any_backend_call() {
    let backend = ScriptedBackend::new(vec![]);
    let store = CannedStore::new(vec![]);
    let err = translator(backend.clone(), store)
        .translate("   ", now())
        .await
        .expect_err("empty inquiry");

    assert!(matches!(err, TranslateError::QueryGeneration(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn identical_inputs_yield_identical_response() {
    let run = |_: usize| async {
        let backend = ScriptedBackend::new(vec![Ok(reply(COUNT_SQL, "4 invoices."))]);
        let store = CannedStore::new(vec![Ok(scalar(SqlValue::Integer(4)))]);
        translator(backend, store)
            .translate("How many open invoices are there?", now())
            .await
            .expect("translation")
            .response
    };
    assert_eq!(run(0).await, run(1).await);
}

#[tokio::test]
async fn due_soon_invoices_are_added_to_advice() {
    let backend = ScriptedBackend::new(vec![Ok(reply(COUNT_SQL, "1"))]);
    let store = CannedStore::with_due_soon(
        vec![Ok(scalar(SqlValue::Integer(1)))],
        vec![record("INV-1001", "2024-02-10")],
    );
    let result = translator(backend, store)
        .translate("How many open invoices are there?", now())
        .await
        .expect("translation");

    assert!(result.advice.contains("INV-1001"));
    assert!(result.advice.contains("due within 10 days"));
}

#[tokio::test]
async fn advice_already_naming_the_invoice_is_left_alone() {
    let backend = ScriptedBackend::new(vec![Ok(format!(
        "Query: {}\nResponse: 1\nExplanation: Counted.\nAdvice: INV-1001 is due soon, follow up now.",
        COUNT_SQL
    ))]);
    let store = CannedStore::with_due_soon(
        vec![Ok(scalar(SqlValue::Integer(1)))],
        vec![record("INV-1001", "2024-02-10")],
    );
    let result = translator(backend, store)
        .translate("How many open invoices are there?", now())
        .await
        .expect("translation");

    assert_eq!(result.advice, "INV-1001 is due soon, follow up now.");
}
