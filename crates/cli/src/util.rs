//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tidemark_core::{CommitMode, ConfigError, SessionConfig, StoreConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit code for configuration problems (same as clap usage errors)
const EXIT_CONFIG: u8 = 2;

/// Where to scan and where the checkpoint lives
///
/// Flags override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data root: directory, file:// URL, or s3:// prefix
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// Checkpoint record: file path or s3:// key
    #[arg(long = "checkpoint", value_name = "PATH")]
    pub checkpoint_path: Option<String>,

    /// S3-compatible endpoint (e.g. http://localhost:9000)
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    #[arg(long, value_name = "KEY")]
    pub access_key: Option<String>,

    #[arg(long, value_name = "SECRET")]
    pub secret_key: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    /// wall_clock or max_seen_mtime
    #[arg(long, value_name = "MODE")]
    pub commit_mode: Option<CommitMode>,
}

impl TargetArgs {
    /// Merge the config file and flags into a validated session config
    pub fn session_config(&self) -> Result<SessionConfig> {
        let file = self.load_file()?;

        let path = self
            .path
            .clone()
            .or_else(|| file.as_ref().map(|f| f.path.clone()))
            .ok_or_else(|| missing("path", "--path"))?;
        let checkpoint_path = self.checkpoint_path()?;

        let mut config = SessionConfig::new(path, checkpoint_path);
        config.store = self.store_config(file.as_ref().and_then(|f| f.store.clone()));
        config.commit_mode = self
            .commit_mode
            .or_else(|| file.as_ref().map(|f| f.commit_mode))
            .unwrap_or_default();

        config.validate()?;
        Ok(config)
    }

    /// Checkpoint location alone, for commands that never list
    pub fn checkpoint_path(&self) -> Result<String> {
        if let Some(path) = &self.checkpoint_path {
            return Ok(path.clone());
        }
        self.load_file()?
            .map(|f| f.checkpoint_path)
            .ok_or_else(|| missing("checkpoint_path", "--checkpoint"))
    }

    /// Store settings from flags layered over the file's `[store]` table
    pub fn store_config(&self, base: Option<StoreConfig>) -> Option<StoreConfig> {
        let has_flags = self.endpoint_url.is_some()
            || self.access_key.is_some()
            || self.secret_key.is_some()
            || self.region.is_some();
        if !has_flags {
            return base;
        }

        let mut store = base.unwrap_or_default();
        if let Some(endpoint) = &self.endpoint_url {
            store.endpoint_url = Some(endpoint.clone());
        }
        if let Some(access_key) = &self.access_key {
            store.access_key = Some(access_key.clone());
        }
        if let Some(secret_key) = &self.secret_key {
            store.secret_key = Some(secret_key.clone());
        }
        if let Some(region) = &self.region {
            store.region = Some(region.clone());
        }
        Some(store)
    }

    /// Commit mode from the flag, then the config file, then the default
    pub fn commit_mode(&self) -> Result<CommitMode> {
        if let Some(mode) = self.commit_mode {
            return Ok(mode);
        }
        Ok(self.load_file()?.map(|f| f.commit_mode).unwrap_or_default())
    }

    /// Store settings for commands that skip full session validation
    pub fn merged_store_config(&self) -> Result<Option<StoreConfig>> {
        let base = self.load_file()?.and_then(|f| f.store);
        Ok(self.store_config(base))
    }

    fn load_file(&self) -> Result<Option<SessionConfig>> {
        match &self.config {
            Some(path) => {
                let config = SessionConfig::load(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }
}

fn missing(key: &str, flag: &str) -> anyhow::Error {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("not set; pass {flag} or set `{key}` in --config"),
    }
    .into()
}

/// Install the tracing subscriber
///
/// Logs go to stderr so stdout stays machine-readable. The returned guard
/// must live until exit to flush the log file.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(dir).context("Failed to create log directory")?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(Some(guard))
}

/// 2 for configuration errors, 1 for everything else
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status(err))
}

fn exit_status(err: &anyhow::Error) -> u8 {
    let is_config = err.downcast_ref::<ConfigError>().is_some()
        || err
            .downcast_ref::<tidemark_core::Error>()
            .is_some_and(tidemark_core::Error::is_configuration);

    if is_config {
        EXIT_CONFIG
    } else {
        1
    }
}
