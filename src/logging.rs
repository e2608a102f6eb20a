use crate::config::{LogConfig, LogFormat, LogRotation};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_FILE_NAME: &str = "websearch.log";

/// Keeps the non-blocking file writer alive; drop it last.
#[allow(dead_code)]
pub struct LogGuard(Option<WorkerGuard>);

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize logging.
///
/// Console output goes to stderr (warnings only, or info with `verbose`) so
/// stdout carries nothing but the report. When `config.file` is set, a second
/// layer writes to a log file filtered at `config.level`, as text or JSON.
pub fn init(config: &LogConfig, verbose: bool) -> Result<LogGuard> {
    let console_level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level);

    let (file_layer, guard, log_path) = if config.file {
        let (writer, path, guard) = open_writer(config)?;
        (Some(file_layer(config, writer)), Some(guard), Some(path))
    } else {
        (None, None, None)
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console)
        .try_init()
        .ok(); // If already initialized (e.g., in tests), don't crash.

    if let Some(path) = log_path {
        tracing::info!(
            log_file = %path.display(),
            rotation = ?config.rotation,
            format = ?config.format,
            level = %config.level,
            "writing logs to file"
        );
    }

    Ok(LogGuard(guard))
}

fn file_layer(config: &LogConfig, writer: NonBlocking) -> BoxedLayer {
    // Default: our crate at the configured level, warn for everything else.
    let filter = EnvFilter::try_new(format!("websearch={},warn", config.level))
        .unwrap_or_else(|_| EnvFilter::new("websearch=info,warn"));

    match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
    }
}

fn open_writer(config: &LogConfig) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let base = resolve_base_log_path(config.path.as_deref())?;

    match config.rotation {
        LogRotation::None => {
            ensure_parent_dir(&base)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&base)
                .with_context(|| format!("Failed to open log file: {}", base.display()))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Ok((non_blocking, base, guard))
        }
        LogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            // Clean up before opening new writer to keep directory tidy.
            cleanup_rotated_logs(&dir, RotationKind::Daily { base_name: base_name.clone() }, config.keep)?;

            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            Ok((non_blocking, base, guard))
        }
        LogRotation::Session => {
            let (dir, base_name) = split_dir_and_name(&base)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            cleanup_rotated_logs(&dir, RotationKind::Session { base_name: base_name.clone() }, config.keep)?;

            let session_path = build_session_log_path(&dir, &base_name);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&session_path)
                .with_context(|| format!("Failed to open log file: {}", session_path.display()))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            Ok((non_blocking, session_path, guard))
        }
    }
}

fn default_log_path() -> Result<PathBuf> {
    let config_path = crate::config::config_path()?;
    Ok(config_path.with_file_name(LOG_FILE_NAME))
}

fn resolve_base_log_path(config_value: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = config_value else {
        return default_log_path();
    };

    let path = PathBuf::from(expand_tilde(raw));

    // Trailing separator or an existing directory means "put the log in here".
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid log path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

fn build_session_log_path(dir: &Path, base_name: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    dir.join(format!("{base_name}.session-{ts}"))
}

enum RotationKind {
    Daily { base_name: String },
    Session { base_name: String },
}

fn cleanup_rotated_logs(dir: &Path, kind: RotationKind, keep: Option<usize>) -> Result<()> {
    let keep = keep.unwrap_or(match kind {
        RotationKind::Daily { .. } => 7,
        RotationKind::Session { .. } => 20,
    });

    if keep == 0 {
        return Ok(());
    }

    let prefix = match &kind {
        // tracing_appender::rolling::daily uses: `{base_name}.{YYYY-MM-DD}`
        RotationKind::Daily { base_name } => format!("{base_name}."),
        RotationKind::Session { base_name } => format!("{base_name}.session-"),
    };

    let mut candidates: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(&prefix))
        .collect();

    // Newest first; both suffix formats sort lexicographically by time.
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// Mask OpenAI-style secrets (`sk-` followed by at least 8 key characters).
pub fn redact_secrets(input: &str) -> String {
    const MARKER: &str = "sk-";
    const MIN_KEY_CHARS: usize = 8;

    let is_key_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(MARKER) {
        let (before, candidate) = rest.split_at(pos);
        out.push_str(before);

        let key_len = candidate[MARKER.len()..]
            .find(|c: char| !is_key_char(c))
            .unwrap_or(candidate.len() - MARKER.len());

        if key_len >= MIN_KEY_CHARS {
            out.push_str("sk-***REDACTED***");
            rest = &candidate[MARKER.len() + key_len..];
        } else {
            out.push_str(MARKER);
            rest = &candidate[MARKER.len()..];
        }
    }

    out.push_str(rest);
    out
}
