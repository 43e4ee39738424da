//! crates/transactions_core/src/sql.rs
//!
//! Extraction of the embedded query from backend narrative text, and the
//! read-only validation gate that sits between query generation and query
//! execution.

use regex::Regex;

/// Statement-leading keywords that mutate or administer the database.
/// Anything matching one of these is rejected outright, never executed.
/// `replace` doubles as a scalar function in SQLite; the function form loses
/// to strictness here.
const FORBIDDEN_KEYWORDS: &str =
    "insert|update|delete|drop|alter|create|replace|attach|detach|pragma|vacuum|reindex";

/// Pulls the embedded SQLite query out of the backend's raw answer text.
///
/// The policy instructs the backend to lead with a `Query:` line; decorated
/// or free-floating statements are tolerated as a fallback since the backend
/// does not always comply. A labeled statement is returned even when it is
/// not a query, so the validation gate can reject it explicitly instead of
/// it vanishing as "no query found". Returns `None` when no statement is
/// present at all.
pub fn extract_query(raw: &str) -> Option<String> {
    let labeled =
        Regex::new(r"(?is)\bQuery:\s*(.+?)(?:\bResponse:|\bExplanation:|\bAdvice:|\z)").unwrap();
    if let Some(caps) = labeled.captures(raw) {
        let cleaned = clean_statement(caps.get(1)?.as_str());
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }

    // The bare fallback keys on SELECT only: "with" is far too common in
    // narrative prose to anchor a CTE search. Labeled CTEs still come through
    // the `Query:` branch above.
    let bare = Regex::new(r"(?is)\bSELECT\b.*?(?:;|\n\s*\n|\z)").unwrap();
    let cleaned = clean_statement(bare.find(raw)?.as_str());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Rejects anything that is not a single read-only statement against the
/// ledger. Returns a human-readable reason on rejection.
pub fn validate_read_only(sql: &str) -> Result<(), String> {
    let statement = sql.trim().trim_end_matches(';').trim();
    if statement.is_empty() {
        return Err("empty statement".to_string());
    }
    if statement.contains(';') {
        return Err("multiple statements are not allowed".to_string());
    }

    let leading = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if leading != "select" && leading != "with" {
        return Err(format!(
            "only SELECT statements may run against the ledger, got '{}'",
            leading
        ));
    }

    let forbidden = Regex::new(&format!(r"(?i)\b({})\b", FORBIDDEN_KEYWORDS)).unwrap();
    if let Some(found) = forbidden.find(statement) {
        return Err(format!(
            "mutating or administrative keyword '{}' is not allowed",
            found.as_str()
        ));
    }

    Ok(())
}

/// Strips fence/backtick decoration the policy forbids but backends still
/// occasionally emit, and collapses the statement onto one line.
fn clean_statement(candidate: &str) -> String {
    let stripped = candidate
        .replace("```sql", " ")
        .replace("```", " ")
        .replace('`', " ");
    let collapsed = Regex::new(r"\s+").unwrap().replace_all(stripped.trim(), " ");
    collapsed.trim().trim_end_matches(';').trim().to_string()
}
