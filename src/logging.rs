//! Logging to stdout and a size-rotated log file

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::result::{BotError, Result};

pub const DEFAULT_LOG_FILE: &str = "homework_bot.log";
pub const MAX_LOG_BYTES: u64 = 50_000_000;
pub const MAX_LOG_BACKUPS: usize = 5;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log file path; `None` disables the file sink
    pub log_file: Option<PathBuf>,
    pub level: LevelFilter,
    pub max_bytes: u64,
    pub max_backups: usize,
    /// Emit JSON lines on stdout instead of plain text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            level: LevelFilter::INFO,
            max_bytes: MAX_LOG_BYTES,
            max_backups: MAX_LOG_BACKUPS,
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Read `HOMEWORK_BOT_LOG_FILE`; the value `off` disables the file sink
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("HOMEWORK_BOT_LOG_FILE") {
            config.log_file = match value.trim() {
                "" => config.log_file,
                v if v.eq_ignore_ascii_case("off") => None,
                v => Some(PathBuf::from(v)),
            };
        }

        config
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. The returned guard must be
/// held until exit, or buffered file lines are lost.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let stdout_layer = if config.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let writer = RotatingFile::open(path, config.max_bytes, config.max_backups)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(writer);
            let layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(BotError::logging)?;

    Ok(guard)
}

/// Append-only file that rotates once it would grow past `max_bytes`
///
/// Rotation shifts `name.N` to `name.N+1`, dropping the oldest beyond
/// `max_backups`, and moves the live file to `name.1`.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_backups: usize,
}

impl RotatingFile {
    pub fn open(path: impl AsRef<Path>, max_bytes: u64, max_backups: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BotError::log_file(path.clone(), e))?;
        }

        let file = open_append(&path).map_err(|e| BotError::log_file(path.clone(), e))?;
        let written = file
            .metadata()
            .map_err(|e| BotError::log_file(path.clone(), e))?
            .len();

        Ok(Self { path, file, written, max_bytes, max_backups })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_backups == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.max_backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
