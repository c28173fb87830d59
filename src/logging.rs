//! Logger setup
//!
//! Records go to stderr and, when the data dir is writable, to a dated file
//! `screenshot_tool_YYYYMMDD.log` under `<data dir>/quicksnip/logs`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default logs directory
pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("quicksnip").join("logs"))
}

pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("screenshot_tool_{}.log", date.format("%Y%m%d"))
}

/// Writes every record to the log file and mirrors it to a console.
///
/// The file is the record of truth: its errors are returned. A console that
/// stops accepting output is dropped so file logging carries on.
struct Tee<F, C> {
    file: F,
    console: Option<C>,
}

impl<F, C> Tee<F, C> {
    fn new(file: F, console: C) -> Self {
        Self {
            file,
            console: Some(console),
        }
    }
}

impl<F: Write, C: Write> Write for Tee<F, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(console) = &mut self.console
            && console.write_all(buf).is_err()
        {
            self.console = None;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(console) = &mut self.console
            && console.flush().is_err()
        {
            self.console = None;
        }
        self.file.flush()
    }
}

fn open_log_file(dir: &Path) -> io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(chrono::Local::now().date_naive()));
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(
        file,
        "=== Session started at {} ===",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    Ok((file, path))
}

/// Install the global logger. `RUST_LOG` overrides the `warn` default.
/// Returns the log file path, if one could be opened.
pub fn init(dir: Option<&Path>) -> Option<PathBuf> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    let opened = dir.map(open_log_file);
    let path = match opened {
        Some(Ok((file, path))) => {
            builder.target(env_logger::Target::Pipe(Box::new(Tee::new(file, io::stderr()))));
            Some(path)
        }
        Some(Err(err)) => {
            eprintln!("Failed to open log file: {err}");
            None
        }
        None => None,
    };

    if builder.try_init().is_err() {
        eprintln!("Logger already initialized");
    }
    path
}
