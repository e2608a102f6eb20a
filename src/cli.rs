//! Command-line front end
//!
//! Resolves configuration and credentials, runs one search through
//! [`SearchService`] and renders the result. Exit codes: 0 success,
//! 1 search or input error, 2 missing credential, 130 interrupted.

use crate::config::{self, Config};
use crate::logging;
use crate::search::client::DEFAULT_TIMEOUT;
use crate::search::{
    create_search_service, Error, ReasoningEffort, SearchOptions, SearchResult, SearchService,
    WebSearchClient,
};
use anyhow::Result;
use clap::Parser;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MISSING_CREDENTIAL: u8 = 2;
pub const EXIT_INTERRUPTED: u8 = 130;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Search the web using OpenAI's Responses API
#[derive(Debug, Parser)]
#[command(name = "websearch")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Examples:\n  \
    websearch \"What are the latest AI developments?\"\n  \
    websearch \"Python 3.12 new features\" --model gpt-5\n  \
    websearch \"climate news\" --domains bbc.com,cnn.com")]
pub struct Cli {
    /// The search query
    pub query: String,

    /// Model to use (default: from config, otherwise gpt-4o-mini)
    #[arg(long)]
    pub model: Option<String>,

    /// Comma-separated list of allowed domains (e.g. 'example.com,test.com')
    #[arg(long)]
    pub domains: Option<String>,

    /// Reasoning effort hint: low, medium or high
    #[arg(long)]
    pub reasoning_effort: Option<ReasoningEffort>,

    /// Approximate user city
    #[arg(long)]
    pub city: Option<String>,

    /// Approximate user region
    #[arg(long)]
    pub region: Option<String>,

    /// Two-letter ISO country code
    #[arg(long)]
    pub country: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// API key (can also use OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to a config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Answer from canned data when no API key is available
    #[arg(long)]
    pub demo: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Main CLI entry point
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let config = config::load_config(cli.config.as_deref())?
        .with_env_overrides(|key| std::env::var(key).ok());
    let _log_guard = logging::init(&config.log, cli.verbose)?;

    tracing::info!("websearch started");

    let env_api_key = std::env::var(API_KEY_ENV).ok();
    let mut stdout = std::io::stdout().lock();
    let code = execute(&cli, &config, env_api_key, &mut stdout).await;

    tracing::info!(exit_code = code, "websearch finished");
    Ok(ExitCode::from(code))
}

/// Run one search and write the report to `out`; returns the exit code
pub async fn execute(
    cli: &Cli,
    config: &Config,
    env_api_key: Option<String>,
    out: &mut impl Write,
) -> u8 {
    let api_key = resolve_api_key(cli, env_api_key, config);

    let timeout = cli
        .timeout
        .or(config.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let configure = |client: WebSearchClient| {
        let client = match &config.api_base {
            Some(base) => client.with_base_url(base.as_str()),
            None => client,
        };
        client.with_timeout(timeout)
    };

    let service = match create_search_service(api_key.as_deref(), cli.demo, configure) {
        Ok(service) => service,
        Err(_) if api_key.is_none() => {
            tracing::error!("{API_KEY_ENV} not found");
            eprintln!(
                "Error: {API_KEY_ENV} not found. Set it in the environment or a .env file, \
                 pass --api-key, add api_key to the config file, or use --demo."
            );
            return EXIT_MISSING_CREDENTIAL;
        }
        Err(e) => return report_error(&e),
    };

    let options = match build_options(cli, config, &service) {
        Ok(options) => options,
        Err(e) => return report_error(&e),
    };

    if cli.verbose {
        eprintln!("Using model: {}", options.model);
        eprintln!("Query: {}", cli.query);
        if let Some(domains) = &options.allowed_domains {
            eprintln!("Domain filter: {}", domains.join(", "));
        }
        eprintln!("Searching...\n");
    }

    let search = service.search(&cli.query, Some(options));
    let outcome = match until_interrupted(search, tokio::signal::ctrl_c()).await {
        Some(outcome) => outcome,
        None => {
            tracing::warn!("search cancelled by user");
            eprintln!("\n\nSearch cancelled by user.");
            return EXIT_INTERRUPTED;
        }
    };

    match outcome {
        Ok(result) => match render(&service, &result, cli.json, out) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "failed to write output");
                eprintln!("Error: failed to write output: {e}");
                EXIT_FAILURE
            }
        },
        Err(e) => report_error(&e),
    }
}

/// Await `task` unless `interrupt` fires first; `None` means interrupted
///
/// If the interrupt source itself fails (no signal handler), the task still
/// runs to completion.
async fn until_interrupted<T>(
    task: impl Future<Output = T>,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> Option<T> {
    tokio::pin!(task);
    tokio::select! {
        outcome = &mut task => Some(outcome),
        signal = interrupt => match signal {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for Ctrl-C, waiting for search");
                Some(task.await)
            }
        },
    }
}

/// `--api-key`, then the environment, then the config file
pub fn resolve_api_key(cli: &Cli, env_api_key: Option<String>, config: &Config) -> Option<String> {
    [cli.api_key.clone(), env_api_key, config.api_key.clone()]
        .into_iter()
        .flatten()
        .find(|key| !key.trim().is_empty())
}

/// Merge CLI flags over config defaults into request options
pub fn build_options(cli: &Cli, config: &Config, service: &SearchService) -> Result<SearchOptions, Error> {
    let domains = split_domains(cli.domains.as_deref());
    let options = if domains.is_empty() {
        SearchOptions::default()
    } else {
        service.apply_domain_filters(&domains)?
    };

    let mut location = serde_json::Map::new();
    for (key, value) in [("city", &cli.city), ("region", &cli.region), ("country", &cli.country)] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            location.insert(key.to_string(), serde_json::Value::from(value));
        }
    }

    let options = options
        .with_model(cli.model.clone().unwrap_or_else(|| config.model.clone()))
        .with_reasoning_effort(cli.reasoning_effort.unwrap_or(config.reasoning_effort));

    if location.is_empty() {
        Ok(options)
    } else {
        location.insert("type".to_string(), serde_json::Value::from("approximate"));
        Ok(options.with_user_location(location))
    }
}

fn split_domains(raw: Option<&str>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn render(
    service: &SearchService,
    result: &SearchResult,
    json: bool,
    out: &mut impl Write,
) -> std::io::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)
    } else {
        writeln!(out, "{}", service.parser().format_for_display(result))
    }
}

fn report_error(err: &Error) -> u8 {
    match err {
        Error::InvalidInput(msg) => {
            tracing::error!(error = %msg, "invalid input");
            eprintln!("Invalid input: {msg}");
        }
        Error::Search(e) => {
            tracing::error!(code = %e.code, details = ?e.details, error = %e.message, "search error");
            eprintln!("Search error: {e}");
        }
    }
    EXIT_FAILURE
}
