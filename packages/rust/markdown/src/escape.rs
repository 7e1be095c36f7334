//! Cell-level text passes for Markdown table output.
//!
//! Each pass is a function `&str -> String`. Truncation runs before escaping
//! so an escape sequence is never cut in half.

/// Suffix appended to truncated values.
const ELLIPSIS: &str = "...";

/// Make text safe inside a single table cell, including as link text.
///
/// Line breaks of any flavor become one space. Backslashes, pipes and square
/// brackets are backslash-escaped and `<` becomes `&lt;`, so listing text can
/// neither split a cell, break a `[text](url)` link, nor open an HTML comment.
pub fn escape_cell(s: &str) -> String {
    let flat = s.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let mut out = String::with_capacity(flat.len());
    for ch in flat.chars() {
        match ch {
            '\\' | '|' | '[' | ']' => {
                out.push('\\');
                out.push(ch);
            }
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Make a URL safe as a Markdown link target inside a table cell.
///
/// Whitespace and every character with meaning to the table or link syntax
/// is percent-encoded.
pub fn escape_link(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.trim().chars() {
        match ch {
            '\r' | '\n' => {}
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '[' => out.push_str("%5B"),
            '\\' => out.push_str("%5C"),
            ']' => out.push_str("%5D"),
            '|' => out.push_str("%7C"),
            _ => out.push(ch),
        }
    }
    out
}

/// Cap `s` at `max_chars` characters, ending overlong values with `...`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}
