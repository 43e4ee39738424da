//! crates/transactions_core/src/format.rs
//!
//! The result formatter: splits the backend's raw narrative into the three
//! labeled sections of the output contract and normalizes line breaks into
//! the presentation layer's `<br>` markup. Pure and side-effect free.

use regex::Regex;

use crate::domain::TranslationResult;

/// The three section labels, in the order the output contract requires.
const SECTION_LABELS: [&str; 3] = ["Response", "Explanation", "Advice"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Backend answer is missing its '{0}:' section")]
    MissingSection(&'static str),
}

/// Splits `raw` into Response / Explanation / Advice.
///
/// Labels are matched case-insensitively at line starts and must appear in
/// contract order; the first label missing (or out of order) names the
/// error. Section content is preserved verbatim apart from break
/// normalization and the decorative separator rows the backend sometimes
/// copies from its instructions.
pub fn format_answer(raw: &str) -> Result<TranslationResult, FormatError> {
    let mut bounds = Vec::with_capacity(SECTION_LABELS.len());
    let mut search_from = 0usize;
    for label in SECTION_LABELS {
        let pattern = Regex::new(&format!(r"(?im)^[ \t]*{}:", label)).unwrap();
        let found = pattern
            .find_at(raw, search_from)
            .ok_or(FormatError::MissingSection(label))?;
        bounds.push((found.start(), found.end()));
        search_from = found.end();
    }

    let section = |i: usize| -> String {
        let start = bounds[i].1;
        let end = if i + 1 < bounds.len() {
            bounds[i + 1].0
        } else {
            raw.len()
        };
        normalize_breaks(&raw[start..end])
    };

    Ok(TranslationResult {
        response: section(0),
        explanation: section(1),
        advice: section(2),
    })
}

/// Replaces newline characters with `<br>` markup, dropping separator rows
/// and bare break tags so sections never carry doubled breaks.
fn normalize_breaks(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    unified
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("----") && *line != "<br>")
        .collect::<Vec<_>>()
        .join("<br>")
}
