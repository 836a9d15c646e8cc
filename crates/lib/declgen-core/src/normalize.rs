//! Lexical helpers shared by both parsers.
//!
//! None of these are aware of string literals; a `--` inside a quoted Lua
//! value truncates it just like a real comment would.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static SHIFT_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)<<(\d+)$").expect("valid shift literal regex"));

/// Drops everything from the first `--` onward.
pub fn strip_line_comment(line: &str) -> &str {
    line.find("--").map_or(line, |pos| &line[..pos])
}

/// Trims trailing whitespace, at most one trailing comma, then trailing whitespace again.
pub fn trim_entry_value(value: &str) -> &str {
    let value = value.trim_end();
    value.strip_suffix(',').unwrap_or(value).trim_end()
}

/// Rewrites `3<<4` as `3 << 4`. Anything else is returned unchanged.
pub fn normalize_shift_literal(value: &str) -> Cow<'_, str> {
    SHIFT_LITERAL_RE.replace(value, "$1 << $2")
}

/// First whitespace-delimited token of `text`, or an empty string.
pub fn first_token(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}
