use std::path::{Path, PathBuf};
use std::{error::Error, fmt, io};

use crate::parsers::{DoxygenParseOptions, LuaEnumParseError, LuaEnumParseOptions};

pub mod docs;
pub mod enums;

pub use docs::{DocScanReport, DocScanRequest, EmitMode};
pub use enums::{EnumGenerateReport, EnumGenerateRequest};

#[derive(Debug)]
pub enum ControlError {
    Load { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Enums(LuaEnumParseError),
    Task(String),
    Serialize(String),
    InvalidInput(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { path, source } => write!(f, "failed to load {}: {source}", path.display()),
            Self::Write { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            Self::Enums(err) => write!(f, "{err}"),
            Self::Task(message) => write!(f, "background task failed: {message}"),
            Self::Serialize(message) => write!(f, "failed to serialize records: {message}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Enums(err) => Some(err),
            _ => None,
        }
    }
}

impl ControlError {
    /// True when the failure came from reading a source rather than processing it.
    pub const fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load { .. })
    }
}

impl From<LuaEnumParseError> for ControlError {
    fn from(err: LuaEnumParseError) -> Self {
        Self::Enums(err)
    }
}

impl From<tokio::task::JoinError> for ControlError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

/// Drives the parsers against files on disk.
#[derive(Debug, Clone, Default)]
pub struct DeclgenControlPlane {
    lua_options: LuaEnumParseOptions,
    doxygen_options: DoxygenParseOptions,
}

impl DeclgenControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn lua_options(&self) -> &LuaEnumParseOptions {
        &self.lua_options
    }

    pub const fn doxygen_options(&self) -> &DoxygenParseOptions {
        &self.doxygen_options
    }
}

async fn read_source(path: &Path) -> Result<String, ControlError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ControlError::Load {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_output(path: &Path, contents: &str) -> Result<(), ControlError> {
    let write_error = |source: io::Error| ControlError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, contents).await.map_err(write_error)
}
