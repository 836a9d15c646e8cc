use std::path::{Path, PathBuf};

use declgen_store::models::DeclarationRecord;
use declgen_store::schema::{DEFAULT_PAGE_EXTENSION, ENUM_LISTING_PAGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::format::{DeclarationFormatter, DeclarationSink, LogSink, OutputFormat};
use crate::parsers::{DoxygenHtmlParser, DoxygenParseOptions};

use super::{ControlError, DeclgenControlPlane, read_source, write_output};

/// How finished declaration blocks leave the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitMode {
    /// Collect every block into one document.
    #[default]
    Concatenate,
    /// Log each block as soon as its row closes. An output path still
    /// receives the whole document once the scan finishes.
    Stream,
}

/// Input for scanning a directory of Doxygen pages.
#[derive(Debug, Clone)]
pub struct DocScanRequest {
    pub dir: PathBuf,
    pub extension: String,
    /// File name skipped during enumeration.
    pub exclude: Option<String>,
    pub mode: EmitMode,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl DocScanRequest {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: DEFAULT_PAGE_EXTENSION.to_string(),
            exclude: Some(ENUM_LISTING_PAGE.to_string()),
            mode: EmitMode::Concatenate,
            format: OutputFormat::Declarations,
            output: None,
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, exclude: Option<String>) -> Self {
        self.exclude = exclude;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: EmitMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Summary of a documentation scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocScanReport {
    pub pages_scanned: usize,
    pub rows_seen: usize,
    pub record_count: usize,
    pub member_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Concatenated output when no output path was given; `None` when streaming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

impl DeclgenControlPlane {
    /// Scans every eligible page in `request.dir` in file-name order.
    ///
    /// # Errors
    /// Returns `ControlError::Load` if the directory or a page cannot be read,
    /// and `ControlError::Write` if the output file cannot be written.
    pub async fn scan_doc_pages(
        &self,
        request: DocScanRequest,
    ) -> Result<DocScanReport, ControlError> {
        let extension = request.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(ControlError::InvalidInput(
                "page extension is required".to_string(),
            ));
        }

        let pages = list_pages(&request.dir, extension, request.exclude.as_deref()).await?;
        if pages.is_empty() {
            warn!(
                dir = %request.dir.display(),
                extension = %extension,
                "no documentation pages found"
            );
        }

        let mut records = Vec::new();
        let mut rows_seen = 0;
        for page in &pages {
            let markup = read_source(page).await?;
            let (page_rows, page_records) =
                scan_page(markup, self.doxygen_options().clone(), request.mode, page).await?;
            debug!(
                page = %page.display(),
                rows = page_rows,
                records = page_records.len(),
                "scanned documentation page"
            );
            rows_seen += page_rows;
            records.extend(page_records);
        }

        let member_count: usize = records.iter().map(DeclarationRecord::member_count).sum();
        info!(
            dir = %request.dir.display(),
            pages = pages.len(),
            records = records.len(),
            members = member_count,
            "scanned documentation pages"
        );

        let rendered = if request.mode == EmitMode::Concatenate || request.output.is_some() {
            let text = DeclarationFormatter::render_as(&records, request.format, None)?;
            if let Some(path) = &request.output {
                write_output(path, &text).await?;
                None
            } else {
                Some(text)
            }
        } else {
            None
        };

        Ok(DocScanReport {
            pages_scanned: pages.len(),
            rows_seen,
            record_count: records.len(),
            member_count,
            output: request.output,
            rendered,
        })
    }
}

async fn scan_page(
    markup: String,
    options: DoxygenParseOptions,
    mode: EmitMode,
    page: &Path,
) -> Result<(usize, Vec<DeclarationRecord>), ControlError> {
    let source = page
        .file_name()
        .map_or_else(|| page.display().to_string(), |name| name.to_string_lossy().into_owned());
    let scanned = tokio::task::spawn_blocking(move || {
        let mut records = Vec::new();
        let mut sink = LogSink::new().with_source(source);
        let rows = DoxygenHtmlParser::scan(&markup, &options, |record| {
            if mode == EmitMode::Stream {
                sink.emit(&DeclarationFormatter::render(&record));
            }
            records.push(record);
        });
        (rows, records)
    })
    .await?;
    Ok(scanned)
}

async fn list_pages(
    dir: &Path,
    extension: &str,
    exclude: Option<&str>,
) -> Result<Vec<PathBuf>, ControlError> {
    let load_error = |source: std::io::Error| ControlError::Load {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(load_error)?;
    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(load_error)? {
        let path = entry.path();
        if !entry.file_type().await.map_err(load_error)?.is_file() {
            continue;
        }
        let matches_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        let excluded = exclude.is_some_and(|name| path.file_name().is_some_and(|file| file == name));
        if matches_extension && !excluded {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}
