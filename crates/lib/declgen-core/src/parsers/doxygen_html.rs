//! Doxygen HTML member-table scanner.
//!
//! Walks a reference page as a stream of markup events and turns every
//! `memitem:` row into a declaration record. The left cell supplies the kind
//! (`const`, `static`, ...), the right cell supplies the name and any
//! `{ NAME = value, ... }` initializer members.

use std::sync::LazyLock;

use declgen_store::models::{ConstantEntry, DeclarationRecord};
use declgen_store::schema::{
    LEFT_CELL_CLASS,
    RIGHT_CELL_CLASS,
    ROW_CLASS_PREFIX,
    SOURCE_KIND_DOXYGEN_HTML,
};
use regex::Regex;
use tracing::debug;

use crate::markup::{MarkupEvent, events};
use crate::normalize::{first_token, normalize_shift_literal};

static MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*\b)").expect("valid member regex")
});

/// Options for scanning Doxygen HTML pages.
#[derive(Debug, Clone)]
pub struct DoxygenParseOptions {
    pub source_kind: String,
    pub row_class_prefix: String,
    pub left_cell_class: String,
    pub right_cell_class: String,
    pub normalize_shifts: bool,
}

impl DoxygenParseOptions {
    pub fn new() -> Self {
        Self {
            source_kind: SOURCE_KIND_DOXYGEN_HTML.to_string(),
            row_class_prefix: ROW_CLASS_PREFIX.to_string(),
            left_cell_class: LEFT_CELL_CLASS.to_string(),
            right_cell_class: RIGHT_CELL_CLASS.to_string(),
            normalize_shifts: true,
        }
    }

    #[must_use]
    pub const fn with_normalize_shifts(mut self, normalize_shifts: bool) -> Self {
        self.normalize_shifts = normalize_shifts;
        self
    }
}

impl Default for DoxygenParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Output from scanning one Doxygen page.
#[derive(Debug, Clone, Default)]
pub struct DoxygenParseOutput {
    pub records: Vec<DeclarationRecord>,
    /// Qualifying rows opened, including any left unclosed at end of page.
    pub rows_seen: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InRow(Cell),
}

/// Per-page row state machine. Build a fresh one for every page.
#[derive(Debug)]
pub struct RowScanner<'o> {
    options: &'o DoxygenParseOptions,
    state: State,
    left: String,
    right: String,
    rows_seen: usize,
}

impl<'o> RowScanner<'o> {
    pub const fn new(options: &'o DoxygenParseOptions) -> Self {
        Self {
            options,
            state: State::Idle,
            left: String::new(),
            right: String::new(),
            rows_seen: 0,
        }
    }

    pub const fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    pub const fn in_row(&self) -> bool {
        matches!(self.state, State::InRow(_))
    }

    /// Feeds one event; returns a record when a qualifying row closes.
    pub fn handle(&mut self, event: &MarkupEvent) -> Option<DeclarationRecord> {
        if event.is_start_of("tr") {
            let qualifies = event
                .attribute("class")
                .is_some_and(|class| class.starts_with(&self.options.row_class_prefix));
            if qualifies {
                self.open_row();
            }
            return None;
        }

        let State::InRow(cell) = self.state else {
            return None;
        };

        match (event, cell) {
            (MarkupEvent::StartTag { .. }, Cell::None) if event.is_start_of("td") => {
                let class = event.attribute("class");
                if class == Some(self.options.left_cell_class.as_str()) {
                    self.state = State::InRow(Cell::Left);
                } else if class == Some(self.options.right_cell_class.as_str()) {
                    self.state = State::InRow(Cell::Right);
                }
                None
            }
            (MarkupEvent::Text(text), Cell::Left) => {
                self.left.push_str(text);
                None
            }
            (MarkupEvent::Text(text), Cell::Right) => {
                self.right.push_str(text);
                None
            }
            (MarkupEvent::EndTag { .. }, Cell::Left | Cell::Right) if event.is_end_of("td") => {
                self.state = State::InRow(Cell::None);
                None
            }
            (MarkupEvent::EndTag { .. }, _) if event.is_end_of("tr") => {
                self.state = State::Idle;
                Some(self.finish_row())
            }
            _ => None,
        }
    }

    fn open_row(&mut self) {
        self.state = State::InRow(Cell::None);
        self.left.clear();
        self.right.clear();
        self.rows_seen += 1;
    }

    fn finish_row(&mut self) -> DeclarationRecord {
        let left = std::mem::take(&mut self.left);
        let right = std::mem::take(&mut self.right);
        let record = format_row(&left, &right, self.options);
        debug!(
            kind = %record.kind,
            name = %record.name,
            members = record.member_count(),
            "scanned member row"
        );
        record
    }
}

/// Scanner for Doxygen HTML reference pages.
pub struct DoxygenHtmlParser;

impl DoxygenHtmlParser {
    /// Scans `markup`, handing each record to `on_record` as its row closes.
    ///
    /// Returns the number of qualifying rows opened.
    pub fn scan(
        markup: &str,
        options: &DoxygenParseOptions,
        mut on_record: impl FnMut(DeclarationRecord),
    ) -> usize {
        let mut scanner = RowScanner::new(options);
        for event in events(markup) {
            if let Some(record) = scanner.handle(&event) {
                on_record(record);
            }
        }
        if scanner.in_row() {
            debug!(
                source_kind = %options.source_kind,
                "page ended inside an unclosed member row"
            );
        }
        scanner.rows_seen()
    }

    /// Scans `markup` and collects every record in row order.
    pub fn parse(markup: &str, options: &DoxygenParseOptions) -> DoxygenParseOutput {
        let mut records = Vec::new();
        let rows_seen = Self::scan(markup, options, |record| records.push(record));
        DoxygenParseOutput { records, rows_seen }
    }
}

/// Builds a record from the accumulated cell text of one row.
pub fn format_row(left: &str, right: &str, options: &DoxygenParseOptions) -> DeclarationRecord {
    let mut record = DeclarationRecord::new(first_token(left), first_token(right));

    for line in right.lines() {
        let line = line.trim();
        let line = line.find('{').map_or(line, |pos| &line[pos + 1..]);
        for segment in split_top_level(line) {
            if let Some(entry) = parse_member(segment.trim(), options) {
                record.push_member(entry);
            }
        }
    }

    record
}

fn parse_member(segment: &str, options: &DoxygenParseOptions) -> Option<ConstantEntry> {
    let caps = MEMBER_RE.captures(segment)?;
    let value = caps[2].trim();
    let value = if options.normalize_shifts {
        normalize_shift_literal(value).into_owned()
    } else {
        value.to_string()
    };
    ConstantEntry::new(&caps[1], value)
}

/// Splits on commas that are not nested inside parentheses or brackets.
fn split_top_level(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, ch) in line.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(&line[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    segments.push(&line[start..]);
    segments
}
