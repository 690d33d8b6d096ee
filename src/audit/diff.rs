//! Change summaries for audit entries
//!
//! Compares the JSON form of an entity before and after an update and lists
//! the leaf fields that changed, as dotted paths (`kind.category`,
//! `exchange_rates.rates.USD`).

use serde_json::Value;

/// Bookkeeping fields that change on every update
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Summarize what changed between two entity states
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn describe_changes(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    collect_changes(before, after, "", &mut changes);

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn collect_changes(before: &Value, after: &Value, path: &str, changes: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            let keys = old
                .keys()
                .chain(new.keys().filter(|k| !old.contains_key(*k)));
            for key in keys {
                if path.is_empty() && IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                let field = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                let old_value = old.get(key).unwrap_or(&Value::Null);
                let new_value = new.get(key).unwrap_or(&Value::Null);
                collect_changes(old_value, new_value, &field, changes);
            }
        }
        _ if before != after => {
            changes.push(format!(
                "{}: {} -> {}",
                path,
                format_value(before),
                format_value(after)
            ));
        }
        _ => {}
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(37).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
