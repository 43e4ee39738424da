//! crates/transactions_core/src/policy.rs
//!
//! The query-generation policy: the single, versioned instruction template
//! that constrains every query the backend derives. The template is rendered
//! in exactly one place so the output contract is enforced in exactly one
//! place.

use chrono::{DateTime, FixedOffset};

use crate::domain::{COLUMNS, TABLE_NAME};

/// Bumped whenever the instruction text below changes in a way the backend
/// could observe.
pub const POLICY_VERSION: &str = "2024-02";

/// Invoices due within this many days of the current time get a reminder in
/// the Advice section.
pub const DUE_SOON_HORIZON_DAYS: i64 = 10;

const POLICY_TEMPLATE: &str = r#"You are a powerful text-to-SQLite model, and your role is to answer questions about a database. You are given questions and context regarding the invoice details table, which represents the detailed records of currently open invoices.
The table name is {table} and corresponding columns are {columns}.
You must derive a single SQLite query against the table to find the answer. Ensure your query does not include any non-SQLite syntax such as DATE_TRUNC or any use of backticks (`) or "```sql". The query will be executed against the {table} table on your behalf and the result compared with your answer, so emit the query exactly as it should run.

Guidelines:
- Filter results using the current time: {now} only when the inquiry specifies a specific date/time period. You should use ">=" or "<=" operators to filter the date or use "GROUP BY strftime('%m', date)" for grouping into month. Assume the date format in the database is 'YYYY-MM-DD'.
- If the query result is [(None,)], run the SQLite query again to double check the answer.
- If a specific category is mentioned in the inquiry, such as 'Yellow', 'Red', or 'Green', use the "WHERE" condition in your SQL query to filter transactions by that category. For example, when asked for the complete invoice details for 'Green', use "FROM {table} WHERE category = 'Green'".
- If not asked for a specific category, you shouldn't filter any category out. On the other hand, you should use "WHERE" condition to do the filtering for any other explicit condition in the inquiry. When asked for the average amount in a category, use the AVG() aggregate over the invoice amount column, scoped with "WHERE category = 'category_name'".
- When asked for 'highest' or 'lowest', use SQL function MAX() or MIN() respectively.
- If a specific condition is provided in the inquiry, such as mentioning a specific collector like 'John', 'David', 'Lisa', 'Mary', or 'Michael', and specifying a category such as 'Yellow', 'Red', or 'Green', use the "WHERE" clause in your SQL query to filter transactions accordingly. For example, if you need to fetch invoice details for 'John' and 'Green', you would use "FROM {table} WHERE collector = 'John' AND category = 'Green'".

Use the following format to answer the inquiry:

Query: the single SQLite query you derived, on one line.
Response: Result of the SQLite-compatible SQL query. If you know the transaction details such as the category, customer name, customer number, invoice number, invoice amount, invoice date, due date, forecast code, forecast date, and collector, mention it in your answer to be more clear.
Explanation: Concise and succinct explanation on your thought process on how to get the final answer including the relevant transaction details such as the category, customer name, customer number, invoice number, invoice amount, invoice date, due date, forecast code, forecast date, and collector.
Advice: Provide tips here, such as reminding users of progress for invoices with a due date within {due_days} days by comparing the due date with today.

Inquiry: {inquiry}"#;

/// The fixed instruction template, parameterized by table name and column
/// list so the same policy serves any schema with matching shape.
#[derive(Debug, Clone)]
pub struct QueryPolicy {
    table: String,
    columns: Vec<String>,
}

impl QueryPolicy {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    /// The policy bound to the ledger schema this repository declares.
    pub fn for_ledger() -> Self {
        Self::new(TABLE_NAME, COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    pub fn version(&self) -> &'static str {
        POLICY_VERSION
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Binds `(table, columns, now, inquiry)` into the instruction text sent
    /// to the generation backend.
    pub fn render(&self, now: &DateTime<FixedOffset>, inquiry: &str) -> String {
        POLICY_TEMPLATE
            .replace("{table}", &self.table)
            .replace("{columns}", &self.columns.join(", "))
            .replace("{now}", &now.to_rfc3339())
            .replace("{due_days}", &DUE_SOON_HORIZON_DAYS.to_string())
            .replace("{inquiry}", inquiry)
    }
}
