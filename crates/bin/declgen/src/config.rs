use clap::{Parser, Subcommand, ValueEnum, builder::BoolishValueParser};
use declgen_core::control::{DocScanRequest, EmitMode, EnumGenerateRequest};
use declgen_core::format::OutputFormat;
use declgen_store::schema::{DEFAULT_PAGE_EXTENSION, ENUM_LISTING_PAGE};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_LOG_FILTER: &str = "declgen=info,declgen_core=info";
const DEFAULT_CONFIG_PATH: &str = "declgen.toml";

#[derive(Parser, Debug)]
#[command(name = "declgen", version, about = "Generates type declarations from enum listings and documentation pages.")]
struct CliArgs {
    #[arg(long, env = "DECLGEN_LOG", default_value = DEFAULT_LOG_FILTER, global = true)]
    log_filter: String,

    #[command(subcommand)]
    command: CommandArgs,
}

#[derive(Subcommand, Debug)]
enum CommandArgs {
    /// Convert a Lua enum listing into `declare enum` blocks.
    Enums {
        #[arg(env = "DECLGEN_ENUMS_INPUT")]
        input: PathBuf,

        #[arg(long, short, env = "DECLGEN_ENUMS_OUTPUT")]
        output: Option<PathBuf>,

        #[arg(long, env = "DECLGEN_BANNER")]
        banner: Option<String>,

        #[arg(long, env = "DECLGEN_FORMAT", value_enum, default_value_t = FormatArg::Declarations)]
        format: FormatArg,
    },
    /// Scan a directory of Doxygen HTML pages for member rows.
    Docs {
        #[arg(env = "DECLGEN_DOCS_DIR")]
        dir: PathBuf,

        #[arg(long, env = "DECLGEN_DOCS_EXTENSION", default_value = DEFAULT_PAGE_EXTENSION)]
        extension: String,

        #[arg(long, env = "DECLGEN_DOCS_EXCLUDE", default_value = ENUM_LISTING_PAGE)]
        exclude: String,

        #[arg(
            long,
            env = "DECLGEN_DOCS_STREAM",
            default_value_t = false,
            value_parser = BoolishValueParser::new()
        )]
        stream: bool,

        #[arg(long, short, env = "DECLGEN_DOCS_OUTPUT")]
        output: Option<PathBuf>,

        #[arg(long, env = "DECLGEN_FORMAT", value_enum, default_value_t = FormatArg::Declarations)]
        format: FormatArg,
    },
    /// Run every job listed in a TOML job file.
    Run {
        #[arg(long, short, env = "DECLGEN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormatArg {
    #[default]
    Declarations,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Declarations => Self::Declarations,
            FormatArg::Json => Self::Json,
        }
    }
}

/// TOML job file layout.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct JobFile {
    enums: Option<EnumJob>,
    docs: Option<DocsJob>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct EnumJob {
    input: PathBuf,
    output: Option<PathBuf>,
    banner: Option<String>,
    #[serde(default)]
    format: FormatArg,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct DocsJob {
    dir: PathBuf,
    extension: Option<String>,
    exclude: Option<String>,
    output: Option<PathBuf>,
    #[serde(default)]
    stream: bool,
    #[serde(default)]
    format: FormatArg,
}

/// A unit of work for the control plane.
#[derive(Debug, Clone)]
pub enum Job {
    Enums(EnumGenerateRequest),
    Docs(DocScanRequest),
}

/// Runtime configuration loaded from CLI arguments, environment variables and job files.
#[derive(Debug, Clone)]
pub struct DeclgenConfig {
    pub log_filter: String,
    pub jobs: Vec<Job>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
    Load { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
            Self::Load { path, message } => {
                write!(f, "failed to read job file {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse job file {}: {message}", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

impl DeclgenConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for DeclgenConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let log_filter = if args.log_filter.trim().is_empty() {
            DEFAULT_LOG_FILTER.to_string()
        } else {
            args.log_filter
        };

        let jobs = match args.command {
            CommandArgs::Enums {
                input,
                output,
                banner,
                format,
            } => vec![enum_job(EnumJob {
                input,
                output,
                banner,
                format,
            })?],
            CommandArgs::Docs {
                dir,
                extension,
                exclude,
                stream,
                output,
                format,
            } => vec![docs_job(DocsJob {
                dir,
                extension: Some(extension),
                exclude: Some(exclude),
                output,
                stream,
                format,
            })?],
            CommandArgs::Run { config } => load_job_file(&config)?,
        };

        Ok(Self { log_filter, jobs })
    }
}

fn enum_job(job: EnumJob) -> Result<Job, ConfigError> {
    if job.input.as_os_str().is_empty() {
        return Err(ConfigError::MissingSetting("DECLGEN_ENUMS_INPUT"));
    }

    let mut request = EnumGenerateRequest::new(job.input).with_format(job.format.into());
    if let Some(output) = job.output {
        request = request.with_output(output);
    }
    if let Some(banner) = job.banner.filter(|value| !value.trim().is_empty()) {
        request = request.with_banner(banner);
    }
    Ok(Job::Enums(request))
}

fn docs_job(job: DocsJob) -> Result<Job, ConfigError> {
    if job.dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingSetting("DECLGEN_DOCS_DIR"));
    }

    let extension = job
        .extension
        .unwrap_or_else(|| DEFAULT_PAGE_EXTENSION.to_string());
    if extension.trim_start_matches('.').trim().is_empty() {
        return Err(ConfigError::InvalidSetting {
            name: "DECLGEN_DOCS_EXTENSION",
            value: extension,
        });
    }

    let exclude = match job.exclude {
        Some(value) if value.trim().is_empty() => None,
        Some(value) => Some(value),
        None => Some(ENUM_LISTING_PAGE.to_string()),
    };
    let mode = if job.stream {
        EmitMode::Stream
    } else {
        EmitMode::Concatenate
    };
    // Streamed blocks are always logged as declarations; JSON needs a file.
    if job.stream && job.output.is_none() && job.format == FormatArg::Json {
        return Err(ConfigError::InvalidSetting {
            name: "DECLGEN_FORMAT",
            value: "json (streaming without an output file)".to_string(),
        });
    }

    let mut request = DocScanRequest::new(job.dir)
        .with_extension(extension)
        .with_exclude(exclude)
        .with_mode(mode)
        .with_format(job.format.into());
    if let Some(output) = job.output {
        request = request.with_output(output);
    }
    Ok(Job::Docs(request))
}

fn load_job_file(path: &Path) -> Result<Vec<Job>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|err| ConfigError::Load {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_job_file(&contents, base).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parses job file contents; relative paths resolve against `base`.
fn parse_job_file(contents: &str, base: &Path) -> Result<Vec<Job>, String> {
    let file: JobFile = toml::from_str(contents).map_err(|err| err.to_string())?;
    let mut jobs = Vec::new();

    if let Some(mut job) = file.enums {
        job.input = base.join(job.input);
        job.output = job.output.map(|output| base.join(output));
        jobs.push(enum_job(job).map_err(|err| err.to_string())?);
    }
    if let Some(mut job) = file.docs {
        job.dir = base.join(job.dir);
        job.output = job.output.map(|output| base.join(output));
        jobs.push(docs_job(job).map_err(|err| err.to_string())?);
    }

    if jobs.is_empty() {
        return Err("no [enums] or [docs] job configured".to_string());
    }
    Ok(jobs)
}
