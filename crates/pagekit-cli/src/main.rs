//! PageKit CLI - Command-line interface for loading a locator as text

use clap::{Parser, ValueEnum};
use pagekit::{fetch_with_options, render, strip_tags, FetchOptions, FetchResponse, Locator};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Body text with markup stripped
    #[default]
    Text,
    /// JSON with response metadata
    Json,
}

/// PageKit - load a locator and print its text content
#[derive(Parser, Debug)]
#[command(name = "pagekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Locator to load (http://, https://, file:///, data:text/html,); empty opens the default local file
    locator: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "text")]
    output: OutputFormat,

    /// Print the body without stripping markup
    #[arg(long)]
    raw: bool,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Local file opened when no locator is given
    #[arg(long)]
    default_file: Option<PathBuf>,

    /// Log connection details to stderr
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let locator = match cli.default_file {
        Some(ref path) => Locator::with_default_file(path),
        None => Locator::default(),
    };
    let target = locator.parse(cli.locator.as_deref().unwrap_or(""));
    tracing::debug!(target = %target, "Resolved locator");

    let mut options = FetchOptions::default();
    if let Some(ua) = cli.user_agent {
        options = options.user_agent(ua);
    }

    match fetch_with_options(&target, &options).await {
        Ok(response) => match cli.output {
            OutputFormat::Text if !cli.raw => {
                let stdout = io::stdout();
                let result = render(&response.content, &mut stdout.lock());
                exit_on_write_error(result);
            }
            OutputFormat::Text => write_safe(&response.content),
            OutputFormat::Json => {
                let json = format_json(response, cli.raw).unwrap_or_else(|e| {
                    eprintln!("Error serializing response: {}", e);
                    std::process::exit(1);
                });
                write_safe(&json);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout carries only page content
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Serialize the response, stripping markup from the content unless `raw`
fn format_json(mut response: FetchResponse, raw: bool) -> serde_json::Result<String> {
    if !raw {
        response.content = strip_tags(&response.content);
    }
    serde_json::to_string_pretty(&response)
}

/// Write to stdout, exit silently on broken pipe
fn write_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let result = handle
        .write_all(s.as_bytes())
        .and_then(|_| handle.flush());
    exit_on_write_error(result);
}

fn exit_on_write_error(result: io::Result<()>) {
    if let Err(e) = result {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
