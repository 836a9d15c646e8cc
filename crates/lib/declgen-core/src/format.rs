//! Declaration block rendering.
//!
//! The formatter itself is stateless. Where the rendered blocks go is decided
//! by a [`DeclarationSink`]: concatenated into one document, logged one by one
//! as they complete, or handed to any `FnMut(&str)` callback.

use declgen_store::models::DeclarationRecord;
use tracing::info;

/// Receives rendered declaration blocks in order.
pub trait DeclarationSink {
    fn emit(&mut self, block: &str);
}

impl<F> DeclarationSink for F
where
    F: FnMut(&str),
{
    fn emit(&mut self, block: &str) {
        self(block);
    }
}

/// Joins blocks into one document with a single blank line between them.
#[derive(Debug, Default)]
pub struct ConcatSink {
    output: String,
    blocks: usize,
}

impl ConcatSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn finish(self) -> String {
        self.output
    }
}

impl DeclarationSink for ConcatSink {
    fn emit(&mut self, block: &str) {
        if self.blocks > 0 {
            self.output.push('\n');
        }
        self.output.push_str(block);
        self.blocks += 1;
    }
}

/// Emits every block as its own `info` event.
#[derive(Debug, Default)]
pub struct LogSink {
    source: Option<String>,
    blocks: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags every event with the page or file the blocks came from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub const fn blocks(&self) -> usize {
        self.blocks
    }
}

impl DeclarationSink for LogSink {
    fn emit(&mut self, block: &str) {
        self.blocks += 1;
        let source = self.source.as_deref().unwrap_or("-");
        info!(source = %source, "\n{}", block.trim_end());
    }
}

/// Output encodings for a list of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Declarations,
    Json,
}

/// Renders records as `declare` blocks.
pub struct DeclarationFormatter;

impl DeclarationFormatter {
    /// Renders one block, ending with exactly one newline after the closing brace.
    pub fn render(record: &DeclarationRecord) -> String {
        let mut output = format!("declare {} {} {{\n", record.kind, record.name);
        for member in &record.members {
            output.push_str(&format!("  {} = {},\n", member.name, member.raw_value));
        }
        output.push_str("}\n");
        output
    }

    /// Streams each record's block through `sink` in order.
    pub fn write_all<'r, S>(records: impl IntoIterator<Item = &'r DeclarationRecord>, sink: &mut S)
    where
        S: DeclarationSink + ?Sized,
    {
        for record in records {
            sink.emit(&Self::render(record));
        }
    }

    /// Concatenates every block into one document.
    pub fn render_all(records: &[DeclarationRecord]) -> String {
        let mut sink = ConcatSink::new();
        Self::write_all(records, &mut sink);
        sink.finish()
    }

    /// Like [`Self::render_all`], prefixed by a `// banner` line when one is given.
    pub fn render_all_with_banner(records: &[DeclarationRecord], banner: Option<&str>) -> String {
        let body = Self::render_all(records);
        match banner {
            Some(banner) if !banner.trim().is_empty() => format!("// {}\n\n{body}", banner.trim()),
            _ => body,
        }
    }

    /// Renders records in the requested format.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if JSON encoding fails.
    pub fn render_as(
        records: &[DeclarationRecord],
        format: OutputFormat,
        banner: Option<&str>,
    ) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Declarations => Ok(Self::render_all_with_banner(records, banner)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(records)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}
