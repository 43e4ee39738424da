//! services/api/src/adapters/store.rs
//!
//! This module contains the ledger store adapter, which is the concrete
//! implementation of the `LedgerStore` port from the `core` crate. It handles
//! all interactions with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::sqlite::SqlitePool;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use transactions_core::domain::{QueryOutput, SqlValue, TransactionRecord};
use transactions_core::ports::{LedgerStore, StoreError, StoreResult};

/// Column list shared by every record-shaped query, in schema order.
const RECORD_COLUMNS: &str = "id, category, customer_name, customer_number, invoice_number, \
     invoice_amount, invoice_date, due_date, forecast_code, forecast_date, collector";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A SQLite adapter that implements the `LedgerStore` port.
///
/// Connections are pooled; each query borrows one for exactly its own
/// duration, so nothing stays held open between translator invocations.
#[derive(Clone)]
pub struct SqliteLedgerAdapter {
    pool: SqlitePool,
}

impl SqliteLedgerAdapter {
    /// Creates a new `SqliteLedgerAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    category: String,
    customer_name: String,
    customer_number: String,
    invoice_number: String,
    invoice_amount: f64,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    forecast_code: String,
    forecast_date: NaiveDate,
    collector: String,
}

impl TransactionRow {
    fn to_domain(self) -> TransactionRecord {
        TransactionRecord {
            id: self.id,
            category: self.category,
            customer_name: self.customer_name,
            customer_number: self.customer_number,
            invoice_number: self.invoice_number,
            invoice_amount: self.invoice_amount,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            forecast_code: self.forecast_code,
            forecast_date: self.forecast_date,
            collector: self.collector,
        }
    }
}

/// Maps an sqlx failure onto the port's error kinds. SQLite reports schema
/// misses as database errors with a recognizable message prefix.
fn classify_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            if message.contains("no such column")
                || message.contains("no such table")
                || message.contains("no such function")
            {
                StoreError::UnknownSchema(message)
            } else {
                StoreError::Unexpected(message)
            }
        }
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        _ => StoreError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `LedgerStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl LedgerStore for SqliteLedgerAdapter {
    async fn run_select(&self, sql: &str) -> StoreResult<QueryOutput> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(classify_error)?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut out_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(row.columns().len());
            for i in 0..row.columns().len() {
                let raw = row
                    .try_get_raw(i)
                    .map_err(|e| StoreError::Unexpected(e.to_string()))?;
                let value = if raw.is_null() {
                    SqlValue::Null
                } else {
                    // SQLite's dynamic typing: decode by the value's declared
                    // storage class, falling back to text.
                    match raw.type_info().name() {
                        "INTEGER" => SqlValue::Integer(
                            row.try_get::<i64, _>(i)
                                .map_err(|e| StoreError::Unexpected(e.to_string()))?,
                        ),
                        "REAL" => SqlValue::Real(
                            row.try_get::<f64, _>(i)
                                .map_err(|e| StoreError::Unexpected(e.to_string()))?,
                        ),
                        _ => SqlValue::Text(
                            row.try_get::<String, _>(i)
                                .map_err(|e| StoreError::Unexpected(e.to_string()))?,
                        ),
                    }
                };
                values.push(value);
            }
            out_rows.push(values);
        }

        Ok(QueryOutput {
            columns,
            rows: out_rows,
        })
    }

    async fn list_transactions(&self) -> StoreResult<Vec<TransactionRecord>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions ORDER BY invoice_date DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify_error)?;

        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn due_within(&self, today: NaiveDate, days: i64) -> StoreResult<Vec<TransactionRecord>> {
        let horizon = today + Duration::days(days);
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE due_date >= ? AND due_date <= ? ORDER BY due_date ASC",
            RECORD_COLUMNS
        ))
        .bind(today)
        .bind(horizon)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_error)?;

        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }
}
