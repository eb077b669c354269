//! Utility functions shared across the application.

use serde::Serialize;

/// Render each item as a JSON string literal and join them with `separator`.
///
/// Used to enumerate attribute and role names in rejection messages, so that
/// names containing quotes or separators stay unambiguous.
///
/// # Example
/// ```
/// use rolegate::util::quote_list;
///
/// assert_eq!(quote_list(&["title", "ownerId"], ", "), r#""title", "ownerId""#);
/// ```
pub fn quote_list<S: AsRef<str>>(items: &[S], separator: &str) -> String {
    items
        .iter()
        .map(|item| json_quote(item.as_ref()))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Render a string as a JSON string literal.
pub fn json_quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Compact JSON rendering used for selectors in diagnostics.
///
/// Falls back to the `Debug` form if the value cannot be serialized.
pub fn render_json<T: Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}
