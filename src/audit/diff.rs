//! Change summaries for audit entries
//!
//! Compares the top-level fields of two serialized rows and describes what
//! changed, e.g. `amount: 500000 -> 650000, name: "Luz" -> "Luz y gas"`.

use serde_json::Value;

/// Fields that change on every write and say nothing about the edit
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_CHARS: usize = 40;

/// Describe the differences between two JSON values
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return (before != after)
            .then(|| format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();

    for (key, before_val) in before_obj {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after_obj.get(key) {
            Some(after_val) if after_val == before_val => {}
            Some(after_val) => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(before_val),
                format_value(after_val)
            )),
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
        }
    }

    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let truncated: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", truncated)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
