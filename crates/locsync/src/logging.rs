//! Console plus size-rotated file logging on top of `env_logger`.

use chrono::Local;
use locsync_config::LoggingConfig;
use log::warn;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Size at which the log file is rotated.
pub const LOG_FILE_MAX_BYTES: u64 = 5 * 1024 * 1024;
/// Number of rotated files kept (`.1`, `.2`).
pub const LOG_FILE_BACKUPS: usize = 2;

/// Initialize the global logger for one workflow.
///
/// `RUST_LOG` still overrides the configured level. When the log file
/// cannot be opened, console logging is set up anyway and a warning is
/// emitted.
pub fn init_logging(settings: &LoggingConfig, file_name: &str) {
    let path = settings.dir.join(file_name);
    let (file, open_error) = match RotatingFile::open(&path, LOG_FILE_MAX_BYTES, LOG_FILE_BACKUPS)
    {
        Ok(file) => (Some(file), None),
        Err(err) => (None, Some(err)),
    };

    let _ = env_logger::Builder::new()
        .filter_level(settings.level.level_filter())
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(ConsoleAndFile { file })))
        .try_init();

    if let Some(err) = open_error {
        warn!("file logging disabled, cannot open {}: {err}", path.display());
    }
}

/// Writes every record to stderr and, when available, to the log file.
struct ConsoleAndFile {
    file: Option<RotatingFile>,
}

impl Write for ConsoleAndFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut()
            && file.write_all(buf).is_err()
        {
            self.file = None;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        io::stderr().flush()
    }
}

/// Append-only file that rolls over to `<name>.1`, `<name>.2`, ... by size.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: &Path, max_bytes: u64, backups: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            backups,
            file,
            written,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backups == 0 {
            self.file = File::create(&self.path)?;
        } else {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
            self.file = open_append(&self.path)?;
        }
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
