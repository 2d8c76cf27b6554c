//! Text and parameter-value escaping (RFC 5545 §3.3.11, RFC 6868).

/// Escapes a TEXT value: backslash, comma, semicolon, and newline.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a quoted parameter value using RFC 6868 caret-encoding.
///
/// Callers only need this when the value contains a character that
/// requires quoting (`,`, `;`, `:`) or caret-escaping (`"`, newline, `^`
/// itself); plain values are returned unquoted.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    let needs_quoting = s.contains([',', ';', ':']);
    let needs_caret = s.contains(['"', '\n', '^']);

    if !needs_quoting && !needs_caret {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '^' => out.push_str("^^"),
            '\n' => out.push_str("^n"),
            '"' => out.push_str("^'"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_basic() {
        assert_eq!(escape_text("hello, world"), "hello\\, world");
        assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_text("a;b\\c"), "a\\;b\\\\c");
    }

    #[test]
    fn escape_param_plain_value_unquoted() {
        assert_eq!(escape_param_value("America/New_York"), "America/New_York");
    }

    #[test]
    fn escape_param_with_comma_is_quoted() {
        assert_eq!(escape_param_value("Doe, Jane"), "\"Doe, Jane\"");
    }

    #[test]
    fn escape_param_caret_encoding() {
        assert_eq!(escape_param_value("Test\nName"), "\"Test^nName\"");
    }
}
