use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::format::{DeclarationFormatter, OutputFormat};
use crate::parsers::LuaEnumParser;

use super::{ControlError, DeclgenControlPlane, read_source, write_output};

/// Input for turning a Lua enum listing into a declaration file.
#[derive(Debug, Clone)]
pub struct EnumGenerateRequest {
    pub input: PathBuf,
    /// Destination file; when `None` the rendered text is returned in the report.
    pub output: Option<PathBuf>,
    pub banner: Option<String>,
    pub format: OutputFormat,
}

impl EnumGenerateRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            banner: None,
            format: OutputFormat::Declarations,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Summary of an enum generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumGenerateReport {
    pub record_count: usize,
    pub member_count: usize,
    pub skipped_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

impl DeclgenControlPlane {
    /// Parses a Lua enum listing and renders one `declare enum` block per table.
    ///
    /// # Errors
    /// Returns `ControlError::Load` if the listing cannot be read, and
    /// `ControlError::Write` if the output file cannot be written.
    pub async fn generate_enums(
        &self,
        request: EnumGenerateRequest,
    ) -> Result<EnumGenerateReport, ControlError> {
        let EnumGenerateRequest {
            input,
            output,
            banner,
            format,
        } = request;

        let source = read_source(&input).await?;
        let parsed = LuaEnumParser::parse_async(source, self.lua_options().clone()).await?;
        let text = DeclarationFormatter::render_as(&parsed.records, format, banner.as_deref())?;

        let record_count = parsed.records.len();
        let member_count = parsed.member_count();
        let skipped_count = parsed.skipped.len();
        info!(
            input = %input.display(),
            records = record_count,
            members = member_count,
            skipped = skipped_count,
            "generated enum declarations"
        );

        let rendered = match &output {
            Some(path) => {
                write_output(path, &text).await?;
                None
            }
            None => Some(text),
        };

        Ok(EnumGenerateReport {
            record_count,
            member_count,
            skipped_count,
            output,
            rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_listing_is_a_load_failure() {
        let control = DeclgenControlPlane::new();
        let err = control
            .generate_enums(EnumGenerateRequest::new("does/not/exist.lua"))
            .await
            .expect_err("missing file should fail");

        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn returns_rendered_text_without_output_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("enums.lua");
        std::fs::write(&input, "Color = {\n  RED = 1,\n  BLUE = 2<<3,\n}\n").expect("write listing");

        let report = DeclgenControlPlane::new()
            .generate_enums(EnumGenerateRequest::new(&input))
            .await
            .expect("generation should succeed");

        assert_eq!(report.record_count, 1);
        assert_eq!(report.member_count, 2);
        assert_eq!(
            report.rendered.as_deref(),
            Some("declare enum Color {\n  RED = 1,\n  BLUE = 2 << 3,\n}\n")
        );
    }
}
