//! Lua enum listing parser.
//!
//! Reads a listing made of table-literal constant blocks:
//!
//! ```lua
//! Color = {
//!     RED = 1,
//!     BLUE = 2<<3, -- flag
//! }
//! ```
//!
//! and produces one `enum` record per table.

use std::sync::LazyLock;
use std::{error::Error, fmt};

use declgen_store::models::{ConstantEntry, DeclarationRecord, SkippedLine};
use declgen_store::schema::{KIND_ENUM, SOURCE_KIND_LUA_ENUMS};
use regex::Regex;
use tracing::debug;

use crate::normalize::{normalize_shift_literal, strip_line_comment, trim_entry_value};

static TABLE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*) = \{$").expect("valid table regex"));

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*) = (.*)$").expect("valid entry regex")
});

/// Options for parsing a Lua enum listing.
#[derive(Debug, Clone)]
pub struct LuaEnumParseOptions {
    pub source_kind: String,
    pub normalize_shifts: bool,
}

impl LuaEnumParseOptions {
    pub fn new() -> Self {
        Self {
            source_kind: SOURCE_KIND_LUA_ENUMS.to_string(),
            normalize_shifts: true,
        }
    }

    #[must_use]
    pub const fn with_normalize_shifts(mut self, normalize_shifts: bool) -> Self {
        self.normalize_shifts = normalize_shifts;
        self
    }
}

impl Default for LuaEnumParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Output from parsing a Lua enum listing.
#[derive(Debug, Clone, Default)]
pub struct LuaEnumParseOutput {
    pub records: Vec<DeclarationRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl LuaEnumParseOutput {
    pub fn member_count(&self) -> usize {
        self.records.iter().map(DeclarationRecord::member_count).sum()
    }
}

/// Error type for a failed background parse.
///
/// Parsing itself never fails; only the blocking task running it can.
#[derive(Debug)]
pub struct LuaEnumParseError {
    message: String,
}

impl LuaEnumParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LuaEnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lua enum listing parse task failed: {}", self.message)
    }
}

impl Error for LuaEnumParseError {}

impl From<tokio::task::JoinError> for LuaEnumParseError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(err.to_string())
    }
}

/// Parser for Lua enum listings.
pub struct LuaEnumParser;

impl LuaEnumParser {
    /// Parses every `Name = {` table in `source` into an `enum` record.
    ///
    /// Records are returned in first-seen order. Lines inside a table that
    /// match no entry pattern are reported in `skipped` and otherwise ignored.
    pub fn parse(source: &str, options: &LuaEnumParseOptions) -> LuaEnumParseOutput {
        let mut output = LuaEnumParseOutput::default();
        let mut current: Option<DeclarationRecord> = None;

        for (index, line) in source.lines().enumerate() {
            if let Some(caps) = TABLE_OPEN_RE.captures(line.trim()) {
                if let Some(record) = current.take() {
                    output.records.push(finish_record(record));
                }
                current = Some(DeclarationRecord::new(KIND_ENUM, &caps[1]));
                continue;
            }

            let Some(record) = current.as_mut() else {
                continue;
            };

            let stripped = strip_line_comment(line);
            match parse_entry(stripped, options) {
                Some(entry) => record.push_member(entry),
                None if is_structural(stripped) => {}
                None => {
                    debug!(
                        source_kind = %options.source_kind,
                        line = index + 1,
                        "skipping unrecognized line in {}",
                        record.name
                    );
                    output.skipped.push(SkippedLine {
                        line: index + 1,
                        text: line.to_string(),
                    });
                }
            }
        }

        if let Some(record) = current.take() {
            output.records.push(finish_record(record));
        }

        output
    }

    /// Parses a listing on a blocking task.
    ///
    /// # Errors
    /// Returns `LuaEnumParseError` if the task panics.
    pub async fn parse_async(
        source: String,
        options: LuaEnumParseOptions,
    ) -> Result<LuaEnumParseOutput, LuaEnumParseError> {
        Ok(tokio::task::spawn_blocking(move || Self::parse(&source, &options)).await?)
    }
}

fn parse_entry(line: &str, options: &LuaEnumParseOptions) -> Option<ConstantEntry> {
    let caps = ENTRY_RE.captures(line)?;
    let value = trim_entry_value(&caps[2]);
    let value = if options.normalize_shifts {
        normalize_shift_literal(value).into_owned()
    } else {
        value.to_string()
    };
    ConstantEntry::new(&caps[1], value)
}

/// Blank lines and closing braces are expected inside a listing.
fn is_structural(line: &str) -> bool {
    matches!(line.trim(), "" | "}" | "}," | "};")
}

fn finish_record(record: DeclarationRecord) -> DeclarationRecord {
    debug!(
        name = %record.name,
        members = record.member_count(),
        "parsed enum table"
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> LuaEnumParseOutput {
        LuaEnumParser::parse(source, &LuaEnumParseOptions::new())
    }

    fn members(record: &DeclarationRecord) -> Vec<(&str, &str)> {
        record
            .members
            .iter()
            .map(|entry| (entry.name.as_str(), entry.raw_value.as_str()))
            .collect()
    }

    #[test]
    fn parses_single_table() {
        let output = parse("Color = {\n  RED = 1,\n  BLUE = 2<<3,\n}\n");

        assert_eq!(output.records.len(), 1);
        let record = &output.records[0];
        assert_eq!(record.kind, "enum");
        assert_eq!(record.name, "Color");
        assert_eq!(members(record), [("RED", "1"), ("BLUE", "2 << 3")]);
        assert!(output.skipped.is_empty());
    }

    #[test]
    fn strips_trailing_comments() {
        let output = parse("Flags = {\n  FOO = 1, -- comment\n  -- BAR = 2,\n}");

        assert_eq!(members(&output.records[0]), [("FOO", "1")]);
        assert!(output.skipped.is_empty());
    }

    #[test]
    fn consecutive_tables_without_entries_yield_empty_records() {
        let output = parse("A = {\nB = {\nC = {\n  X = 1\n}");

        let names: Vec<_> = output.records.iter().map(|record| record.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert!(output.records[0].is_empty());
        assert!(output.records[1].is_empty());
        assert_eq!(members(&output.records[2]), [("X", "1")]);
    }

    #[test]
    fn ignores_lines_before_first_table() {
        let output = parse("local x = 5\nreturn {\nColor = {\n  RED = 0,\n}");

        assert_eq!(output.records.len(), 1);
        assert_eq!(output.member_count(), 1);
    }

    #[test]
    fn reports_unrecognized_lines() {
        let output = parse("Color = {\n  RED = 1,\n  2BAD = 3,\n  [5] = 6,\n}\n");

        assert_eq!(members(&output.records[0]), [("RED", "1")]);
        let lines: Vec<_> = output.skipped.iter().map(|skipped| skipped.line).collect();
        assert_eq!(lines, [3, 4]);
    }

    #[test]
    fn entry_with_empty_value_is_skipped() {
        let output = parse("Color = {\n  RED = ,\n}");

        assert!(output.records[0].is_empty());
        assert_eq!(output.skipped.len(), 1);
    }

    #[test]
    fn shift_normalization_can_be_disabled() {
        let options = LuaEnumParseOptions::new().with_normalize_shifts(false);
        let output = LuaEnumParser::parse("F = {\n  A = 1<<2,\n}", &options);

        assert_eq!(members(&output.records[0]), [("A", "1<<2")]);
    }

    #[test]
    fn comment_marker_inside_string_truncates_value() {
        let output = parse("S = {\n  A = \"x--y\",\n}");

        assert_eq!(members(&output.records[0]), [("A", "\"x")]);
    }

    #[test]
    fn entries_need_spaces_around_single_equals() {
        let output = parse("Color = {\n  RED=1,\n  BAD == 2,\n  GREEN = 3,\n}\n");

        assert_eq!(members(&output.records[0]), [("GREEN", "3")]);
        let skipped: Vec<_> = output
            .skipped
            .iter()
            .map(|skipped| (skipped.line, skipped.text.trim()))
            .collect();
        assert_eq!(skipped, [(2, "RED=1,"), (3, "BAD == 2,")]);
    }

    #[tokio::test]
    async fn parse_async_matches_sync() {
        let source = "Color = {\n  RED = 1,\n}".to_string();
        let output = LuaEnumParser::parse_async(source, LuaEnumParseOptions::new())
            .await
            .expect("parse should succeed");

        assert_eq!(output.records.len(), 1);
    }
}
