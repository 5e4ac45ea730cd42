//! Minimal escaping for values placed in double-quoted HTML attributes.

/// Escape `"`, `<` and `>`.
///
/// Only safe inside a double-quoted attribute value such as
/// `<input value="...">`. Not a general HTML or script escaper.
pub fn html_escape(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
