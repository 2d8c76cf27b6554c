//! Content-line folding at 75 octets (RFC 5545 §3.1).

/// Folds a single logical content line into physical lines no longer
/// than 75 octets, continuation lines prefixed with a single space.
///
/// Folding happens on byte boundaries that respect UTF-8 character
/// boundaries, never splitting a multi-byte sequence.
#[must_use]
pub fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;

    if line.len() <= LIMIT {
        return format!("{line}\r\n");
    }

    let mut out = String::with_capacity(line.len() + line.len() / LIMIT * 3);
    let bytes = line.as_bytes();
    let mut start = 0;
    let mut first = true;

    while start < bytes.len() {
        let budget = if first { LIMIT } else { LIMIT - 1 };
        let mut end = (start + budget).min(bytes.len());
        while end > start && !line.is_char_boundary(end) {
            end -= 1;
        }

        if !first {
            out.push(' ');
        }
        out.push_str(&line[start..end]);
        out.push_str("\r\n");

        start = end;
        first = false;
    }

    out
}
