use serde_json::Value;

use crate::domain::row::Cell;

/// Text shown for an absent column or a SQL `NULL`.
pub const NULL_TEXT: &str = "(null)";

/// Render a cell as markup-safe text.
///
/// `Absent` and `null` both render as [`NULL_TEXT`]. Never fails.
pub fn escape(cell: Cell<'_>) -> String {
    match cell {
        Cell::Absent | Cell::Present(Value::Null) => NULL_TEXT.to_string(),
        Cell::Present(v) => escape_str(&display_string(v)),
    }
}

/// Display string of a non-null JSON value, before escaping.
///
/// Strings are taken verbatim; everything else uses its compact JSON text.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace `& < > " '` with their entities.
///
/// Single pass, so an `&` produced by a substitution is never escaped again.
/// Input is expected to be raw text: already-escaped input gets escaped twice.
pub fn escape_str(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
