use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use threadmark_core::dto::{block_views, segment_views};
use threadmark_core::{
    Block, BlockKind, DirectoryError, HtmlEmitOptions, Span, UserDirectory,
    emit_html_sanitized_with_options, emit_html_with_options, format_inline, format_message,
    parse_user_directory,
};

const LOG_ENV: &str = "THREADMARK_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "threadmark",
    version,
    about = "Format chat message markup as HTML or JSON segments"
)]
struct Cli {
    /// JSON object mapping user ids to display names
    #[arg(long, value_name = "FILE")]
    users: Option<PathBuf>,

    /// Format a single inline run without quote or code-block structure
    #[arg(long)]
    inline: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Run the HTML through the allow-list sanitizer
    #[arg(long)]
    sanitized: bool,

    /// Omit target="_blank" and rel from links
    #[arg(long)]
    no_new_tab: bool,

    #[arg(long, value_name = "STR", default_value = "@")]
    mention_prefix: String,

    /// Message file; stdin when omitted. One trailing newline is ignored.
    input: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read stdin")]
    ReadStdin(#[source] io::Error),
    #[error("invalid user directory {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: DirectoryError,
    },
    #[error("failed to serialize output")]
    Json(#[from] serde_json::Error),
}

fn main() -> Result<()> {
    init_tracing().context("initialising logging")?;
    let cli = Cli::parse();

    let users = match &cli.users {
        Some(path) => Some(load_users(path)?),
        None => None,
    };
    let source = read_input(cli.input.as_deref())?;
    let message = source.strip_suffix('\n').unwrap_or(&source);
    debug!(bytes = message.len(), inline = cli.inline, "formatting input");

    let output = render(&cli, message, users.as_ref())?;
    println!("{}", output);
    Ok(())
}

fn render(cli: &Cli, message: &str, users: Option<&UserDirectory>) -> Result<String, CliError> {
    if cli.inline {
        let inlines = format_inline(message, users);
        return match cli.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&segment_views(&inlines))?),
            OutputFormat::Html => {
                let paragraph = Block {
                    span: Span {
                        start: inlines.first().map_or(0, |inline| inline.span.start),
                        end: inlines.last().map_or(0, |inline| inline.span.end),
                    },
                    kind: BlockKind::Paragraph { content: inlines },
                };
                Ok(emit(cli, &[paragraph]))
            }
        };
    }

    let blocks = format_message(message, users);
    match cli.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&block_views(&blocks))?),
        OutputFormat::Html => Ok(emit(cli, &blocks)),
    }
}

fn emit(cli: &Cli, blocks: &[Block]) -> String {
    let options = HtmlEmitOptions {
        mention_prefix: cli.mention_prefix.clone(),
        open_links_in_new_tab: !cli.no_new_tab,
    };
    if cli.sanitized {
        emit_html_sanitized_with_options(blocks, &options)
    } else {
        emit_html_with_options(blocks, &options)
    }
}

fn load_users(path: &Path) -> Result<UserDirectory, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_user_directory(&json).map_err(|source| CliError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::ReadStdin)?;
            Ok(buffer)
        }
    }
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}
