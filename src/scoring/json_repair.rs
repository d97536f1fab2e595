//! Repair of JSON-ish model output
//!
//! Language models wrap JSON in prose and code fences and sometimes trail off
//! mid-document. [`parse_model_json`] recovers the first well-formed JSON
//! array or object it can find.

use serde_json::Value;

/// Best-effort parse of a model reply into JSON.
///
/// Tries, in order: the raw text; the text with code fences removed, cut at
/// the bracket that balances the first opening bracket; the same text cut at
/// the last closing bracket.
pub fn parse_model_json(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Some(value);
    }

    let cleaned = strip_code_fences(raw);
    let start = cleaned.find(['{', '['])?;
    let candidate = &cleaned[start..];
    let (open, close) = if candidate.starts_with('{') {
        ('{', '}')
    } else {
        ('[', ']')
    };

    let mut depth: i64 = 0;
    for (idx, ch) in candidate.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
        }
        if depth == 0 {
            match serde_json::from_str::<Value>(&candidate[..idx + ch.len_utf8()]) {
                Ok(value) => return Some(value),
                Err(_) => break,
            }
        }
    }

    let last_close = candidate.rfind(close)?;
    serde_json::from_str::<Value>(&candidate[..=last_close]).ok()
}

/// Coerce a parsed reply into a list of entries: arrays pass through, a
/// lone object becomes a one-element list, anything else is rejected.
pub fn into_entries(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(_) => Some(vec![value]),
        _ => None,
    }
}

fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        {
            rest = &rest[4..];
        }
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out.trim().to_string()
}
