//! crates/transactions_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::NaiveDate;

/// The name of the ledger table the translator queries.
pub const TABLE_NAME: &str = "transactions";

/// The ledger columns, in schema order. The policy template and the
/// read-only validation gate both derive their column knowledge from here.
pub const COLUMNS: [&str; 11] = [
    "id",
    "category",
    "customer_name",
    "customer_number",
    "invoice_number",
    "invoice_amount",
    "invoice_date",
    "due_date",
    "forecast_code",
    "forecast_date",
    "collector",
];

/// The small fixed set of category labels a ledger row can carry.
pub const CATEGORY_LABELS: [&str; 3] = ["Yellow", "Red", "Green"];

/// Represents one open-invoice row of the ledger.
///
/// Rows are created by external seeding or transaction-entry processes and
/// are never mutated here; the translator only ever reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: i64,
    pub category: String,
    pub customer_name: String,
    pub customer_number: String,
    pub invoice_number: String,
    pub invoice_amount: f64,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub forecast_code: String,
    pub forecast_date: NaiveDate,
    pub collector: String,
}

/// The three-section structured answer returned for one inquiry.
///
/// All three sections are always present; a partially-labeled answer is a
/// `FormatError`, never a `TranslationResult`. Line breaks inside sections
/// are normalized to `<br>` markup for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub response: String,
    pub explanation: String,
    pub advice: String,
}

/// A single dynamically-typed SQLite value from a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// The raw outcome of executing one embedded query against the ledger store.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryOutput {
    /// True when the result set is exactly one row holding a single NULL —
    /// the degenerate shape that triggers the one-time re-derivation.
    pub fn is_null_scalar(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].len() == 1 && self.rows[0][0] == SqlValue::Null
    }

    /// Renders the result for display, using `<br>` between rows so the
    /// rendering can be substituted directly into a formatted Response
    /// section.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "No matching records.".to_string();
        }
        if self.rows.len() == 1 && self.rows[0].len() == 1 {
            return self.rows[0][0].to_string();
        }
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, value)| {
                        let name = self.columns.get(i).map(String::as_str).unwrap_or("?");
                        format!("{}: {}", name, value)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join("<br>")
    }
}
