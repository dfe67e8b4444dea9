//! Escaping of recovered values into safe selector fragments
//!
//! Three contracts, one per embedding position. Each is total and
//! deterministic; none is required to be invertible.

/// Reserved punctuation for bare identifiers used after `#` or `.`
const IDENTIFIER_RESERVED: &str = "!\"#$%&'()*+,./:;<=>?@[\\]^`{|}~";

/// Escape a value for use inside a double-quoted attribute selector
/// fragment, `[name="VALUE"]`.
///
/// Backslashes are escaped before quotes; the reverse order would
/// double-escape the inserted escape characters.
pub fn escape_attribute_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a bare identifier used after `#` or `.` by prefixing every
/// reserved punctuation character with a backslash.
pub fn escape_identifier(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if IDENTIFIER_RESERVED.contains(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape free text embedded inside a quoted `:contains("...")` matcher.
///
/// Backslash first, then both quote styles, then newline, carriage return
/// and tab to their two-character forms.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
