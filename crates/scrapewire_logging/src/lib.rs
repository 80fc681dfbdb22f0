//! Shared logging utilities for scrapewire binaries.
//!
//! Installs two tracing layers: a size-rotated log file under the
//! scrapewire home directory and a stderr layer. Both honor `RUST_LOG`;
//! without it the default filter keeps the workspace crates at `info`.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str =
    "scrapewire=info,scrapewire_relation=info,scrapewire_protocol=info";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Logging configuration shared by scrapewire binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror the full file filter onto stderr instead of warnings only.
    pub verbose: bool,
}

/// Initialize tracing with a rotating file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let writer = RollingWriter::open(&log_dir, config.app_name)
        .context("Failed to initialize rolling log writer")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// Resolve the scrapewire home directory.
///
/// Priority: `SCRAPEWIRE_HOME`, then `~/.scrapewire`, then `./.scrapewire`.
pub fn scrapewire_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("SCRAPEWIRE_HOME") {
        return PathBuf::from(override_path);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".scrapewire"),
        None => PathBuf::from(".").join(".scrapewire"),
    }
}

/// Logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    scrapewire_home().join("logs")
}

/// Default certificate spool directory: `<home>/certs`.
pub fn certs_dir() -> PathBuf {
    scrapewire_home().join("certs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Size-rotated log writer: `<app>.log`, with older generations shifted to
/// `<app>.log.1` .. `<app>.log.N`.
#[derive(Clone)]
struct RollingWriter {
    inner: Arc<Mutex<RollingState>>,
}

struct RollingState {
    dir: PathBuf,
    base_name: String,
    file: File,
    written: u64,
}

impl RollingWriter {
    fn open(dir: &Path, app_name: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let base_name = sanitize_name(app_name);
        let (file, written) = open_log_file(&log_path(dir, &base_name, 0))?;
        let mut state = RollingState {
            dir: dir.to_path_buf(),
            base_name,
            file,
            written,
        };
        if state.written > MAX_LOG_FILE_SIZE {
            state.rotate()?;
        }
        Ok(Self {
            inner: Arc::new(Mutex::new(state)),
        })
    }
}

impl RollingState {
    fn rotate(&mut self) -> io::Result<()> {
        let _ = self.file.flush();

        // Shift generations upward, dropping the oldest.
        let oldest = log_path(&self.dir, &self.base_name, MAX_LOG_FILES - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for generation in (0..MAX_LOG_FILES - 1).rev() {
            let src = log_path(&self.dir, &self.base_name, generation);
            if src.exists() {
                fs::rename(&src, log_path(&self.dir, &self.base_name, generation + 1))?;
            }
        }

        let (file, written) = open_log_file(&log_path(&self.dir, &self.base_name, 0))?;
        self.file = file;
        self.written = written;
        Ok(())
    }
}

fn log_path(dir: &Path, base_name: &str, generation: usize) -> PathBuf {
    if generation == 0 {
        dir.join(format!("{base_name}.log"))
    } else {
        dir.join(format!("{base_name}.log.{generation}"))
    }
}

fn open_log_file(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "scrapewire".to_string()
    } else {
        cleaned
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        if state.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            state.rotate()?;
        }
        let bytes = state.file.write(buf)?;
        state.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        state.file.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
